//! Subprocess runner behind every command the pipeline executes.
//!
//! Two modes are supported:
//! - **normal**: the exec form is spawned directly; stdout and stderr are
//!   captured separately and stdin can be fed to the process.
//! - **call**: the shell form runs through `sh -c` with stderr merged into
//!   stdout, and output is streamed line by line while the process runs.

use super::command::Command;
use super::command::CommandAnswer;
use super::command::ParallelAnswer;
use super::command::RunOptions;
use super::error::ExecutorError;
use super::error::ExecutorResult;
use super::runner::CommandRunner;
use async_trait::async_trait;
use pipeline_protocol::ExecMode;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::ExitStatus;
use std::process::Stdio;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::process::Command as ProcessCommand;
use tokio_stream::Stream;
use tokio_stream::StreamExt;
use tracing::debug;
use tracing::info;

/// One item of call-mode output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutput {
    /// A line of merged stdout/stderr, including its trailing newline if
    /// the process wrote one.
    Line(String),

    /// The process exited with this code. Always the last item.
    Exit(i32),
}

/// Shell command runner.
#[derive(Debug, Clone, Default)]
pub struct CmdExecutor {
    working_dir: Option<PathBuf>,
}

impl CmdExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every command from `dir` instead of the current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Run a command and return its answer.
    ///
    /// # Errors
    ///
    /// - `Spawn` if the process cannot be started
    /// - `NonZeroExit` if `check_result` is set and the exit code is not 0
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pipeline_core::executor::{CmdExecutor, Command, RunOptions};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let executor = CmdExecutor::new();
    /// let answer = executor
    ///     .run_cmd(Command::from_shell("git status --short")?, RunOptions::new().checked(true))
    ///     .await?;
    /// println!("{}", answer.stdout);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_cmd(
        &self,
        command: Command,
        options: RunOptions,
    ) -> ExecutorResult<CommandAnswer> {
        if !options.hidden_command {
            info!("Run command: {command}.");
        }

        let answer = match options.mode {
            ExecMode::Call => self.invoke_call(&command, options.call_log).await?,
            ExecMode::Normal => self.invoke_run(&command, options.stdin).await?,
        };

        let answer = if options.hidden_command {
            answer.hide_command()
        } else {
            answer
        };

        if options.check_result {
            Self::check_result(&answer)?;
        }

        Ok(answer)
    }

    /// Convenience wrapper parsing a shell string first.
    pub async fn run_shell(&self, cmd: &str, options: RunOptions) -> ExecutorResult<CommandAnswer> {
        self.run_cmd(Command::from_shell(cmd)?, options).await
    }

    /// Fail with `NonZeroExit` if the answer carries a non-zero exit code.
    pub fn check_result(answer: &CommandAnswer) -> ExecutorResult<()> {
        debug!(
            exit_code = answer.exit_code,
            command = %answer.command,
            stdout = %answer.stdout,
            stderr = %answer.stderr,
            "answer"
        );

        if !answer.success() {
            return Err(ExecutorError::NonZeroExit(Box::new(answer.clone())));
        }

        Ok(())
    }

    /// Run the shell form through `sh -c` and stream its merged output.
    ///
    /// The stream yields one `CallOutput::Line` per output line as soon as it
    /// is written, then a final `CallOutput::Exit`. A spawn failure yields a
    /// single `ExecutorError::Spawn`.
    pub fn stream_call(
        &self,
        command: &Command,
    ) -> Pin<Box<dyn Stream<Item = ExecutorResult<CallOutput>> + Send>> {
        let program = command.shell_form().to_string();

        // `exec 2>&1` redirects stderr for everything the script runs,
        // including compound commands and pipelines.
        let mut cmd = self.process("sh");
        cmd.arg("-c")
            .arg(format!("exec 2>&1\n{program}"))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let stream = async_stream::stream! {
            let mut child = match cmd.spawn() {
                Ok(child) => child,
                Err(source) => {
                    yield Err(ExecutorError::Spawn { program, source });
                    return;
                }
            };

            let stdout = match child.stdout.take() {
                Some(stdout) => stdout,
                None => {
                    yield Err(ExecutorError::Io {
                        program,
                        source: std::io::Error::other("stdout was not captured"),
                    });
                    return;
                }
            };

            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => yield Ok(CallOutput::Line(String::from_utf8_lossy(&buf).into_owned())),
                    Err(source) => {
                        yield Err(ExecutorError::Io { program: program.clone(), source });
                        break;
                    }
                }
            }

            match child.wait().await {
                Ok(status) => yield Ok(CallOutput::Exit(exit_code(status))),
                Err(source) => yield Err(ExecutorError::Io { program, source }),
            }
        };

        Box::pin(stream)
    }

    /// Spawn all commands concurrently and wait for every one of them.
    ///
    /// Results are returned in input order. Nothing is left running if one
    /// of the commands fails to spawn.
    pub async fn run_parallel_cmds(
        &self,
        commands: Vec<Command>,
    ) -> ExecutorResult<Vec<ParallelAnswer>> {
        for command in &commands {
            info!("Run parallel process with command: {command}");
        }

        let mut children = Vec::with_capacity(commands.len());
        for command in commands {
            let (program, args) = command.split_program()?;
            let child = self
                .process(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|source| ExecutorError::Spawn {
                    program: program.clone(),
                    source,
                })?;
            children.push((command, child));
        }

        let handles: Vec<_> = children
            .into_iter()
            .map(|(command, child)| {
                let pid = child.id().unwrap_or_default();
                (pid, command, tokio::spawn(child.wait_with_output()))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (pid, command, handle) in handles {
            let output = handle.await?.map_err(|source| ExecutorError::Io {
                program: command.program().to_string(),
                source,
            })?;

            let result = CommandAnswer {
                exit_code: exit_code(output.status),
                command,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            };

            debug!("PID done: {pid}");
            debug!("EXITCODE: {}", result.exit_code);
            debug!("STDOUT: {}", result.stdout);
            debug!("STDERR: {}", result.stderr);

            results.push(ParallelAnswer { pid, result });
        }

        Ok(results)
    }

    async fn invoke_call(&self, command: &Command, call_log: bool) -> ExecutorResult<CommandAnswer> {
        debug!("Call mode.");

        let mut stream = self.stream_call(command);
        let mut out = String::new();
        let mut code = -1;

        while let Some(item) = stream.next().await {
            match item? {
                CallOutput::Line(line) => {
                    if call_log {
                        info!("{}", line.trim_end_matches(['\r', '\n']));
                    }
                    out.push_str(&line);
                }
                CallOutput::Exit(exit) => code = exit,
            }
        }

        Ok(CommandAnswer {
            exit_code: code,
            command: command.clone(),
            stdout: out,
            stderr: String::new(),
        })
    }

    async fn invoke_run(
        &self,
        command: &Command,
        stdin: Option<String>,
    ) -> ExecutorResult<CommandAnswer> {
        debug!("Normal mode.");

        let (program, args) = command.split_program()?;
        let mut child = self
            .process(program)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecutorError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Written from a separate task so a child filling its stdout pipe
        // before draining stdin cannot deadlock us.
        let writer = match (stdin, child.stdin.take()) {
            (Some(input), Some(mut pipe)) => Some(tokio::spawn(async move {
                pipe.write_all(input.as_bytes()).await
            })),
            _ => None,
        };

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| ExecutorError::Io {
                program: program.clone(),
                source,
            })?;

        if let Some(writer) = writer {
            match writer.await? {
                Ok(()) => {}
                // The child exited without reading all of its input.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(source) => {
                    return Err(ExecutorError::Io {
                        program: program.clone(),
                        source,
                    })
                }
            }
        }

        Ok(CommandAnswer {
            exit_code: exit_code(output.status),
            command: command.clone(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn process(&self, program: &str) -> ProcessCommand {
        let mut cmd = ProcessCommand::new(program);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

#[async_trait]
impl CommandRunner for CmdExecutor {
    async fn run(&self, command: Command, options: RunOptions) -> ExecutorResult<CommandAnswer> {
        self.run_cmd(command, options).await
    }

    async fn run_parallel(&self, commands: Vec<Command>) -> ExecutorResult<Vec<ParallelAnswer>> {
        self.run_parallel_cmds(commands).await
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}
