//! Error types for command execution.

use super::command::CommandAnswer;
use thiserror::Error;

/// Errors that can occur while preparing or running a command.
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// Empty string, blank string or empty argument list.
    #[error("Empty command")]
    EmptyCommand,

    /// The shell string could not be split into words.
    #[error("Invalid command {0:?}: unbalanced quotes or trailing escape")]
    InvalidCommand(String),

    /// The process could not be started (e.g. program not found).
    #[error("Failed to spawn command '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// Reading output from or waiting on a started process failed.
    #[error("I/O error while running '{program}': {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },

    /// The command ran but exited with a non-zero code.
    #[error(
        "Command: {:?} Exitcode: {} STDERR: {}",
        .0.command.exec_form(),
        .0.exit_code,
        .0.stderr
    )]
    NonZeroExit(Box<CommandAnswer>),

    /// A background task driving a parallel command panicked or was cancelled.
    #[error("Parallel command task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ExecutorError {
    /// The failed answer, when the error is a non-zero exit.
    pub fn answer(&self) -> Option<&CommandAnswer> {
        match self {
            Self::NonZeroExit(answer) => Some(answer),
            _ => None,
        }
    }
}

/// Type alias for Result with ExecutorError.
pub type ExecutorResult<T> = Result<T, ExecutorError>;
