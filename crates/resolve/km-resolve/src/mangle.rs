//! Module-specific name mangling of internal members

/// Appends a module-derived suffix to internal member names
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameMangler {
    suffix: String,
}

impl NameMangler {
    /// Mangler for a module; characters outside letters and digits become `_`
    pub fn new(module_name: &str) -> Self {
        let suffix = module_name
            .chars()
            .map(|ch| if ch.is_alphabetic() || ch.is_numeric() { ch } else { '_' })
            .collect();
        Self { suffix }
    }

    /// The sanitized module name
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// `name$suffix`
    pub fn mangle(&self, name: &str) -> String {
        format!("{name}${}", self.suffix)
    }
}
