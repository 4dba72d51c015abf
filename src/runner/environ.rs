//! Process-wide environment store
//!
//! An explicit, insertion-ordered key-value map passed by reference into the
//! executors instead of a true global. Variable captures are the only
//! writers, and they all run before any concurrent dispatch, so no two
//! writers ever race.

/// Ordered environment-variable store
#[derive(Debug, Clone, Default)]
pub struct Environ {
    entries: Vec<(String, String)>,
}

/// Placeholder replaced by the forwarded CLI argument string
pub const RUNARGS: &str = "RUNARGS";

impl Environ {
    /// Create an empty store
    pub fn new() -> Self {
        Environ::default()
    }

    /// Set a variable, replacing any existing value in place
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Get a variable value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Replace the literal `$RUNARGS` placeholder with the forwarded argument
    /// string before the shell ever sees the command text
    pub fn substitute_runargs(&self, code: &str) -> String {
        code.replace("$RUNARGS", self.get(RUNARGS).unwrap_or(""))
    }
}
