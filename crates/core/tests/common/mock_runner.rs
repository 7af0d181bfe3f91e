//! A `CommandRunner` that records invocations instead of spawning processes.

use async_trait::async_trait;
use pipeline_core::executor::Command;
use pipeline_core::executor::CommandAnswer;
use pipeline_core::executor::CommandRunner;
use pipeline_core::executor::ExecutorError;
use pipeline_core::executor::ExecutorResult;
use pipeline_core::executor::ParallelAnswer;
use pipeline_core::executor::RunOptions;
use std::sync::Mutex;

/// `(exit_code, stdout, stderr)` produced for a command.
pub type MockOutput = (i32, String, String);

type Handler = Box<dyn Fn(&Command) -> MockOutput + Send + Sync>;

#[derive(Debug, Clone)]
pub enum RecordedCall {
    Single {
        command: Command,
        options: RunOptions,
    },
    Parallel(Vec<Command>),
}

/// Records every call and answers through a handler.
///
/// Hidden commands and result checking behave like `CmdExecutor`, so code
/// under test sees the same errors it would in production.
pub struct MockRunner {
    handler: Handler,
    calls: Mutex<Vec<RecordedCall>>,
}

#[allow(dead_code)]
impl MockRunner {
    pub fn new(handler: impl Fn(&Command) -> MockOutput + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every command exits 0 with no output.
    pub fn succeeding() -> Self {
        Self::new(|_| (0, String::new(), String::new()))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, command: Command) -> CommandAnswer {
        let (exit_code, stdout, stderr) = (self.handler)(&command);
        CommandAnswer {
            exit_code,
            command,
            stdout,
            stderr,
        }
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: Command, options: RunOptions) -> ExecutorResult<CommandAnswer> {
        self.calls.lock().unwrap().push(RecordedCall::Single {
            command: command.clone(),
            options: options.clone(),
        });

        let mut answer = self.answer(command);
        if options.hidden_command {
            answer.command = Command::hidden();
        }
        if options.check_result && !answer.success() {
            return Err(ExecutorError::NonZeroExit(Box::new(answer)));
        }
        Ok(answer)
    }

    async fn run_parallel(&self, commands: Vec<Command>) -> ExecutorResult<Vec<ParallelAnswer>> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::Parallel(commands.clone()));

        Ok(commands
            .into_iter()
            .enumerate()
            .map(|(i, command)| ParallelAnswer {
                pid: 1000 + i as u32,
                result: self.answer(command),
            })
            .collect())
    }
}
