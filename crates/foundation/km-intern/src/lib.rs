//! String interning for declaration names
//!
//! One interner is owned by each host declaration tree. Resolution of a
//! compiled unit is single-threaded, so the interner is a plain `Rodeo`
//! rather than a shared, locked one.

pub use lasso::Spur as Symbol;
use lasso::Rodeo;

/// Per-unit string interner
#[derive(Debug, Default)]
pub struct Interner {
    rodeo: Rodeo,
}

impl Interner {
    /// Create an empty interner
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning the existing symbol if it was seen before
    pub fn intern(&mut self, text: &str) -> Symbol {
        self.rodeo.get_or_intern(text)
    }

    /// Look up a string without interning it
    pub fn lookup(&self, text: &str) -> Option<Symbol> {
        self.rodeo.get(text)
    }

    /// Resolve a symbol back to its string
    ///
    /// Symbols from a different interner resolve to the empty string.
    pub fn resolve(&self, sym: Symbol) -> &str {
        self.rodeo.try_resolve(&sym).unwrap_or_default()
    }

    /// Number of distinct interned strings
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Whether nothing has been interned yet
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}
