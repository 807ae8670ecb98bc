//! Checksum Engine
//!
//! Fletcher-16 style integrity check: two running sums mod 255, `sum2` packed
//! in the high byte and `sum1` in the low byte. This only catches transport
//! corruption. It is not authentication.
//!
//! When checking is disabled every computation yields `NO_CHECKSUM`, which
//! receivers treat as "do not compare".

/// Sentinel meaning "checksum disabled, do not verify"
pub const NO_CHECKSUM: u16 = 0xFFFF;

/// Streaming Fletcher-16 accumulator
///
/// Feeding a byte range in several `update` calls gives the same result as
/// one call over the concatenation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fletcher16 {
    sum1: u16,
    sum2: u16,
}

impl Fletcher16 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.sum1 = (self.sum1 + b as u16) % 255;
            self.sum2 = (self.sum2 + self.sum1) % 255;
        }
    }

    pub fn finish(&self) -> u16 {
        (self.sum2 << 8) | self.sum1
    }
}

/// Fletcher-16 over a byte range, ignoring the enable flag
pub fn fletcher16(bytes: &[u8]) -> u16 {
    let mut f = Fletcher16::new();
    f.update(bytes);
    f.finish()
}

/// Toggleable checksum engine
#[derive(Debug, Clone, Copy)]
pub struct Checksum {
    enabled: bool,
}

impl Checksum {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled() -> Self {
        Self::new(true)
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Checksum of `bytes`, or `NO_CHECKSUM` when disabled
    pub fn compute(&self, bytes: &[u8]) -> u16 {
        self.compute_parts(&[bytes])
    }

    /// Checksum of several ranges taken as one contiguous run
    pub fn compute_parts(&self, parts: &[&[u8]]) -> u16 {
        if !self.enabled {
            return NO_CHECKSUM;
        }
        let mut f = Fletcher16::new();
        for part in parts {
            f.update(part);
        }
        f.finish()
    }
}

impl Default for Checksum {
    fn default() -> Self {
        Self::enabled()
    }
}

impl From<&crate::config::Config> for Checksum {
    fn from(config: &crate::config::Config) -> Self {
        Self::new(config.use_checksum)
    }
}
