//! Type registry implementation
//!
//! Names are stored in id order; the id of a type is its index.

use std::fmt;

/// Name reported for the reserved id and for anything out of range
pub const UNKNOWN_TYPE_NAME: &str = "unknown type";

/// Primitive types every registry starts with, in id order (ids 1..)
pub const PRIMITIVE_TYPES: &[&str] = &[
    "bool",
    "char",
    "unsigned char",
    "int8_t",
    "uint8_t",
    "short",
    "unsigned short",
    "int16_t",
    "uint16_t",
    "int",
    "unsigned int",
    "long",
    "unsigned long",
    "int32_t",
    "uint32_t",
    "size_t",
    "float",
    "double",
    "long long",
    "unsigned long long",
    "int64_t",
    "uint64_t",
];

/// Most names a registry can hold; ids are `u16`
pub const MAX_TYPES: usize = u16::MAX as usize + 1;

/// Compact numeric type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u16);

impl TypeId {
    /// Reserved sentinel. For command bindings it means "any type".
    pub const UNKNOWN: TypeId = TypeId(0);

    pub const fn new(id: u16) -> Self {
        TypeId(id)
    }

    pub const fn as_u16(self) -> u16 {
        self.0
    }

    pub fn is_unknown(self) -> bool {
        self == TypeId::UNKNOWN
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable id <-> name table
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    names: Vec<String>,
}

impl TypeRegistry {
    /// Create a new registry builder seeded with the primitive types
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// One past the highest valid id
    pub fn eof(&self) -> usize {
        self.names.len()
    }

    /// Check whether an id is inside `[0, EOF)`
    pub fn contains(&self, id: TypeId) -> bool {
        (id.0 as usize) < self.names.len()
    }

    /// Get the name for an id
    ///
    /// Returns `UNKNOWN_TYPE_NAME` for anything outside `[0, EOF)`.
    pub fn name_of(&self, id: TypeId) -> &str {
        self.names
            .get(id.0 as usize)
            .map(|s| s.as_str())
            .unwrap_or(UNKNOWN_TYPE_NAME)
    }

    /// Resolve a type token to an id
    ///
    /// A token starting with a digit is read as a decimal id (leading digit
    /// run only) and range-checked. Any other token is matched against the
    /// names from the highest id down, so a duplicated name resolves to its
    /// highest id. Empty or unmatched tokens give `TypeId::UNKNOWN`.
    pub fn id_of(&self, token: &str) -> TypeId {
        let first = match token.as_bytes().first() {
            Some(b) => *b,
            None => return TypeId::UNKNOWN,
        };

        if first.is_ascii_digit() {
            let digits_end = token
                .bytes()
                .position(|b| !b.is_ascii_digit())
                .unwrap_or(token.len());

            return match token[..digits_end].parse::<u16>() {
                Ok(id) if self.contains(TypeId(id)) => TypeId(id),
                _ => TypeId::UNKNOWN,
            };
        }

        self.names
            .iter()
            .enumerate()
            .rev()
            .find(|(_, name)| name.as_str() == token)
            .map(|(idx, _)| TypeId(idx as u16))
            .unwrap_or(TypeId::UNKNOWN)
    }

    /// Iterate over `(id, name)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(idx, name)| (TypeId(idx as u16), name.as_str()))
    }
}

impl Default for TypeRegistry {
    /// Primitive types only
    fn default() -> Self {
        TypeRegistryBuilder::default().build()
    }
}

/// Builder for TypeRegistry
///
/// Application types are appended after the primitives in call order,
/// standing in for a generated table.
pub struct TypeRegistryBuilder {
    names: Vec<String>,
}

impl Default for TypeRegistryBuilder {
    fn default() -> Self {
        let mut names = Vec::with_capacity(1 + PRIMITIVE_TYPES.len());
        names.push(UNKNOWN_TYPE_NAME.to_string());
        names.extend(PRIMITIVE_TYPES.iter().map(|s| s.to_string()));
        Self { names }
    }
}

impl TypeRegistryBuilder {
    /// Append a type; its id is the next free index
    ///
    /// Names past `MAX_TYPES` have no id to take and are dropped.
    pub fn register(mut self, name: impl Into<String>) -> Self {
        self.push(name.into());
        self
    }

    /// Append several types in order
    pub fn register_all<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.push(name.into());
        }
        self
    }

    fn push(&mut self, name: String) {
        if self.names.len() >= MAX_TYPES {
            tracing::warn!("Type registry full ({} ids), dropping {}", MAX_TYPES, name);
            return;
        }
        self.names.push(name);
    }

    pub fn build(self) -> TypeRegistry {
        TypeRegistry { names: self.names }
    }
}
