//! Error types for rrun

use std::io;
use thiserror::Error;

/// Result type alias for rrun operations
pub type Result<T> = std::result::Result<T, RunError>;

/// Main error type for rrun
#[derive(Error, Debug)]
pub enum RunError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task resolution errors
    #[error("{0}")]
    Resolution(#[from] ResolutionError),

    /// Command execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Configuration parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No '{0}' found")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Execution control is not supported for nested subtask '{0}'")]
    NestedGrouping(String),
}

/// Errors raised while resolving CLI arguments to a task
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("Task \"{0}\" not found")]
    TaskNotFound(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command '{0}' has failed")]
    CommandFailed(String),

    #[error("Failed to launch command '{code}': {error}")]
    Launch { code: String, error: io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;
