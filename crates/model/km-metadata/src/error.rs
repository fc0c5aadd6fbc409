//! Error types for reading decoded metadata

use crate::strings::StrId;
use thiserror::Error;

/// Errors raised while reading a decoded descriptor tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// A string index points past the end of the unit's string table
    #[error("string index {index:?} out of range (table has {len} entries)")]
    StringOutOfRange {
        /// The offending index
        index: StrId,
        /// Size of the table
        len: usize,
    },

    /// The string table cannot address another entry
    #[error("string table is full ({len} entries)")]
    StringTableFull {
        /// Size of the table
        len: usize,
    },

    /// A type reference names a type parameter that no enclosing scope declares
    #[error("type parameter #{id} is not declared by any enclosing scope")]
    UnknownTypeParameter {
        /// Descriptor-level type parameter id
        id: u32,
    },
}
