// ABOUTME: Error types for placeholder resolution and template compilation
// ABOUTME: Per-placeholder errors become inline markers; compile errors abort the whole run

use std::path::PathBuf;
use thiserror::Error;

use crate::output::OutputError;
use crate::parser::ParseError;

/// A recoverable failure confined to one placeholder.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Parse error in {raw}: {reason}")]
    Parse { raw: String, reason: ParseError },

    #[error("Variable type '{type_name}' is not registered (key '{key}': no default, not an environment variable)")]
    UnregisteredType { type_name: String, key: String },

    #[error("No value for ${type_name} (key '{key}'): {attempts}")]
    NotFound {
        type_name: String,
        key: String,
        attempts: String,
    },

    #[error("Unknown filter '{filter}' for variable type '{type_name}' in {raw}")]
    UnknownFilter {
        raw: String,
        type_name: String,
        filter: String,
    },

    #[error("Filter '{filter}' failed in {raw}: {message}")]
    Filter {
        raw: String,
        filter: String,
        message: String,
    },

    #[error("Validation error for {raw}: {message}")]
    Validation { raw: String, message: String },

    #[error("Validation failed for {raw}")]
    ValidationRejected { raw: String },

    #[error("Render error for {raw}: {message}")]
    Render { raw: String, message: String },

    #[error("Resolution of {raw} timed out after {millis}ms")]
    Timeout { raw: String, millis: u128 },

    #[error("Resolution of {raw} aborted: {message}")]
    Aborted { raw: String, message: String },
}

impl ResolveError {
    /// The inline comment that replaces the placeholder in the output.
    pub fn to_marker(&self) -> String {
        format!("<!-- {} -->", self.to_string().replace("-->", "-- >"))
    }
}

/// Failures that abort a compile before any output is written.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_wraps_message_in_comment() {
        let err = ResolveError::UnregisteredType {
            type_name: "unknownType".to_string(),
            key: "unknownType".to_string(),
        };
        assert_eq!(
            err.to_marker(),
            "<!-- Variable type 'unknownType' is not registered (key 'unknownType': no default, not an environment variable) -->"
        );
    }

    #[test]
    fn test_marker_cannot_close_early() {
        let err = ResolveError::Validation {
            raw: "{{$x}}".to_string(),
            message: "bad --> value".to_string(),
        };
        let marker = err.to_marker();
        assert_eq!(marker.matches("-->").count(), 1);
        assert!(marker.ends_with("-->"));
    }

    #[test]
    fn test_not_found_lists_attempts() {
        let err = ResolveError::NotFound {
            type_name: "greeting".to_string(),
            key: "greeting".to_string(),
            attempts: "no items discovered, no default, not an environment variable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No value for $greeting (key 'greeting'): no items discovered, no default, not an environment variable"
        );
    }
}
