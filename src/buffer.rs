//! Destination Buffer
//!
//! A fixed-capacity byte region owned by the application, typically the
//! backing store of a packed record. The protocol overwrites bytes at given
//! offsets and never grows or shrinks it.
//!
//! Handles are cheap to clone; every clone points at the same bytes. The
//! lock serializes whole-chunk copies, it does not make a multi-chunk
//! transfer atomic.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

/// Shared handle to a fixed-size destination buffer
#[derive(Debug, Clone)]
pub struct BufferHandle {
    bytes: Arc<Mutex<Box<[u8]>>>,
    len: usize,
}

impl BufferHandle {
    /// Allocate a zeroed buffer of `len` bytes
    pub fn zeroed(len: usize) -> Self {
        Self::from_vec(vec![0u8; len])
    }

    /// Take ownership of existing bytes; the length is fixed from here on
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Self {
            bytes: Arc::new(Mutex::new(bytes.into_boxed_slice())),
            len,
        }
    }

    /// Declared capacity
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Lock the buffer for direct access
    pub fn lock(&self) -> MutexGuard<'_, Box<[u8]>> {
        self.bytes.lock()
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes.lock().to_vec()
    }

    /// Copy `data` in at `offset`
    ///
    /// Returns false and leaves the buffer untouched if the write would run
    /// past the declared capacity.
    pub fn write_at(&self, offset: usize, data: &[u8]) -> bool {
        let mut guard = self.bytes.lock();
        match offset
            .checked_add(data.len())
            .and_then(|end| guard.get_mut(offset..end))
        {
            Some(dst) => {
                dst.copy_from_slice(data);
                true
            }
            None => false,
        }
    }

    /// Overwrite the whole buffer; `data` must be exactly `len()` bytes
    pub fn replace(&self, data: &[u8]) -> bool {
        data.len() == self.len && self.write_at(0, data)
    }

    /// True if both handles share the same storage
    pub fn same_buffer(&self, other: &BufferHandle) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}
