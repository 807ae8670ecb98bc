//! Type Registry Module
//!
//! Bidirectional mapping between compact numeric type ids and type names.
//! Every payload on either transport is tagged with one of these so that
//! sender and receiver can sanity-check each other.
//!
//! ## Layout
//! ```text
//! id:   0          1 ..= 22       23 ..          EOF
//!       UNKNOWN    primitives     app types      (out of range)
//! ```
//!
//! The table is populated once at startup and is immutable afterwards.

mod registry;

pub use registry::{
    TypeId, TypeRegistry, TypeRegistryBuilder, MAX_TYPES, PRIMITIVE_TYPES, UNKNOWN_TYPE_NAME,
};
