//! Core configuration types
//!
//! These structures represent one parsed run.yml document pair: the task
//! descriptor tree from the first document and the options mapping from the
//! optional second document.

use serde::Deserialize;

/// A fully parsed configuration file
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Synthetic root descriptor holding every top-level task
    pub root: TaskDescriptor,

    /// Options from the second YAML document
    pub options: Options,
}

/// One entry of the configuration tree, before task classification
#[derive(Debug, Clone)]
pub struct TaskDescriptor {
    /// Raw task name, possibly decorated with `/`, `!`, or parentheses
    pub name: String,

    /// Description attached from preceding comment lines or a `desc` key
    pub desc: String,

    /// Shell code or nested entries
    pub value: TaskValue,
}

/// The body of a task descriptor
#[derive(Debug, Clone)]
pub enum TaskValue {
    /// Shell command text (leaf)
    Code(String),

    /// Nested child entries (composite)
    Children(Vec<TaskDescriptor>),
}

/// Runtime options from the second YAML document
///
/// Unknown keys are ignored so the options document stays forward compatible.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Emulate a pseudo-terminal for concurrently executed commands
    pub faketty: bool,
}

impl TaskDescriptor {
    /// Create a leaf descriptor from a raw name and shell code
    pub fn leaf(name: impl Into<String>, code: impl Into<String>) -> Self {
        TaskDescriptor {
            name: name.into(),
            desc: String::new(),
            value: TaskValue::Code(code.into()),
        }
    }

    /// Create a composite descriptor from a raw name and child entries
    pub fn group(name: impl Into<String>, children: Vec<TaskDescriptor>) -> Self {
        TaskDescriptor {
            name: name.into(),
            desc: String::new(),
            value: TaskValue::Children(children),
        }
    }
}
