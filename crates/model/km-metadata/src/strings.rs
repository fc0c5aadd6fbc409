//! The per-unit string table ("name resolver")
//!
//! Descriptor nodes never store names inline. Every name, qualified name and
//! JVM descriptor string is an index into the table decoded alongside them.

use crate::error::MetadataError;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Index into a [`StringTable`]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct StrId(pub u32);

impl StrId {
    /// Position in the table
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Ordered, deduplicated table of strings referenced by descriptor nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringTable {
    strings: IndexSet<String>,
}

impl StringTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string, reusing the existing index when it is already present
    pub fn intern(&mut self, text: &str) -> Result<StrId, MetadataError> {
        if let Some(index) = self.strings.get_index_of(text) {
            return Self::id(index);
        }
        let id = Self::id(self.strings.len())?;
        self.strings.insert(text.to_owned());
        Ok(id)
    }

    fn id(index: usize) -> Result<StrId, MetadataError> {
        u32::try_from(index)
            .map(StrId)
            .map_err(|_| MetadataError::StringTableFull { len: index })
    }

    /// Resolve an index to its string
    pub fn get(&self, id: StrId) -> Result<&str, MetadataError> {
        self.strings
            .get_index(id.index())
            .map(String::as_str)
            .ok_or(MetadataError::StringOutOfRange {
                index: id,
                len: self.strings.len(),
            })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
