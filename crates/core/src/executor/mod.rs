//! Shell command execution.
//!
//! - [`Command`]: a prepared command in shell and exec form
//! - [`CmdExecutor`]: the subprocess-backed runner (normal, call and parallel modes)
//! - [`CommandRunner`]: the trait other modules depend on

pub mod cmd_executor;
pub mod command;
pub mod error;
pub mod runner;

pub use cmd_executor::{CallOutput, CmdExecutor};
pub use command::{Command, CommandAnswer, ParallelAnswer, RunOptions, HIDDEN_COMMAND};
pub use error::{ExecutorError, ExecutorResult};
pub use runner::CommandRunner;
