//! Resolved command value type

/// One resolved step of an execution plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Fully qualified task name, for logging and output tagging
    pub name: String,

    /// Shell command text; mutated only during `$RUNARGS` normalization
    pub code: String,

    /// When set, the command's captured output is assigned to an environment
    /// variable of this name instead of being streamed
    pub variable: Option<String>,
}

impl Command {
    /// Create a new command
    pub fn new(name: impl Into<String>, code: impl Into<String>, variable: Option<String>) -> Self {
        Command {
            name: name.into(),
            code: code.into(),
            variable,
        }
    }

    /// Whether this command captures its output into a variable
    pub fn is_capture(&self) -> bool {
        self.variable.is_some()
    }
}
