// ABOUTME: Error types for variable type providers
// ABOUTME: Covers discovery, filtering, and rendering failures raised by providers

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VariableError {
    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command '{name}' failed: {message}")]
    CommandFailed { name: String, message: String },

    #[error("Filter '{filter}' requires an argument")]
    MissingArgument { filter: String },

    #[error("Invalid argument for filter '{filter}': {message}")]
    InvalidArgument { filter: String, message: String },

    #[error("Cannot render candidate: {0}")]
    Unrenderable(String),
}

pub type Result<T> = std::result::Result<T, VariableError>;
