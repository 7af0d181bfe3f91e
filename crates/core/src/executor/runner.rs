//! The `CommandRunner` seam.
//!
//! Everything that runs external programs (truststore operations, the step
//! engine) depends on this trait instead of on `CmdExecutor` directly, so
//! tests can substitute a recording runner.

use super::command::Command;
use super::command::CommandAnswer;
use super::command::ParallelAnswer;
use super::command::RunOptions;
use super::error::ExecutorResult;
use async_trait::async_trait;

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a single command.
    async fn run(&self, command: Command, options: RunOptions) -> ExecutorResult<CommandAnswer>;

    /// Run commands concurrently, returning answers in input order.
    async fn run_parallel(&self, commands: Vec<Command>) -> ExecutorResult<Vec<ParallelAnswer>>;
}
