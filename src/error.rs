//! Error handling module for disktool
//!
//! Provides centralized error types using thiserror. Command failures have their own
//! type because most of them are reported to the user and never leave the handler
//! that triggered them; only a missing privilege is fatal.

use thiserror::Error;

/// Failure of a single external command invocation.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The command needs root and the process does not have it
    #[error("`{command}` requires root privileges. Please run disktool with 'sudo'.")]
    MissingPrivilege { command: String },

    /// Non-zero exit status with exit-code checking enabled
    #[error("Error executing command: {command} (exit code {})", exit_code_label(.exit_code))]
    Failed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The executable is not on PATH
    #[error("Command '{program}' not found. Make sure it's installed on your system.")]
    NotFound { program: String },

    /// Any other spawn or wait error
    #[error("An unexpected error occurred running `{command}`: {source}")]
    Execution {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    /// Whether this failure must stop the whole program.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingPrivilege { .. })
    }

    /// Captured stderr for failed commands, if there was any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } if !stderr.trim().is_empty() => Some(stderr.trim()),
            _ => None,
        }
    }
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "none, killed by signal".to_string(), |c| c.to_string())
}

/// Main error type for disktool
#[derive(Error, Debug)]
pub enum DiskToolError {
    /// IO errors (terminal reads and writes)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Command errors that escaped a handler (only fatal ones do)
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Result type alias for disktool operations
pub type Result<T> = std::result::Result<T, DiskToolError>;

impl DiskToolError {
    /// Whether the error is the fatal missing-privilege stop.
    pub fn is_missing_privilege(&self) -> bool {
        matches!(self, Self::Command(e) if e.is_fatal())
    }
}
