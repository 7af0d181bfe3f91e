//! Command, answer and run option types.

use super::error::ExecutorError;
use super::error::ExecutorResult;
use pipeline_protocol::ExecMode;
use std::fmt;

/// Placeholder shown instead of a hidden command line.
pub const HIDDEN_COMMAND: &str = "HIDDEN";

/// A prepared command, held in both shell and exec form.
///
/// The shell form is what `sh -c` receives in call mode; the exec form is
/// the argument vector spawned directly in normal mode. A `Command` is
/// never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    shell: String,
    exec: Vec<String>,
}

impl Command {
    /// Build a command from a shell string.
    ///
    /// The exec form is produced with POSIX shell word splitting.
    ///
    /// # Errors
    ///
    /// `EmptyCommand` for a blank string, `InvalidCommand` when the string
    /// has unbalanced quotes.
    ///
    /// # Example
    ///
    /// ```
    /// use pipeline_core::executor::Command;
    ///
    /// let cmd = Command::from_shell("echo 'hello world'").unwrap();
    /// assert_eq!(cmd.exec_form(), ["echo", "hello world"]);
    /// ```
    pub fn from_shell(cmd: &str) -> ExecutorResult<Self> {
        if cmd.trim().is_empty() {
            return Err(ExecutorError::EmptyCommand);
        }

        let exec =
            shlex::split(cmd).ok_or_else(|| ExecutorError::InvalidCommand(cmd.to_string()))?;
        if exec.is_empty() {
            return Err(ExecutorError::EmptyCommand);
        }

        Ok(Self {
            shell: cmd.to_string(),
            exec,
        })
    }

    /// Build a command from an argument list.
    ///
    /// The shell form quotes each argument so that `sh -c` sees the same
    /// words.
    pub fn from_args<I, S>(args: I) -> ExecutorResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let exec: Vec<String> = args.into_iter().map(Into::into).collect();
        if exec.is_empty() {
            return Err(ExecutorError::EmptyCommand);
        }

        // Quoting only fails on interior NUL bytes, which no shell accepts anyway.
        let shell =
            shlex::try_join(exec.iter().map(String::as_str)).unwrap_or_else(|_| exec.join(" "));

        Ok(Self { shell, exec })
    }

    /// The placeholder command used when the real one must not be exposed.
    pub fn hidden() -> Self {
        Self {
            shell: HIDDEN_COMMAND.to_string(),
            exec: vec![HIDDEN_COMMAND.to_string()],
        }
    }

    pub fn shell_form(&self) -> &str {
        &self.shell
    }

    pub fn exec_form(&self) -> &[String] {
        &self.exec
    }

    /// Program name (first word of the exec form).
    pub fn program(&self) -> &str {
        self.exec.first().map(String::as_str).unwrap_or_default()
    }

    pub(crate) fn split_program(&self) -> ExecutorResult<(&String, &[String])> {
        self.exec.split_first().ok_or(ExecutorError::EmptyCommand)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.exec)
    }
}

impl TryFrom<&str> for Command {
    type Error = ExecutorError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_shell(value)
    }
}

impl TryFrom<Vec<String>> for Command {
    type Error = ExecutorError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_args(value)
    }
}

/// Result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandAnswer {
    /// Process exit code; `-N` when the process was killed by signal `N`.
    pub exit_code: i32,
    pub command: Command,
    pub stdout: String,
    /// Always empty in call mode, where stderr is merged into stdout.
    pub stderr: String,
}

impl CommandAnswer {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub(crate) fn hide_command(self) -> Self {
        Self {
            command: Command::hidden(),
            ..self
        }
    }
}

/// Result of one command from a parallel batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelAnswer {
    pub pid: u32,
    pub result: CommandAnswer,
}

/// Options controlling a single command run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Input written to the process; normal mode only.
    pub stdin: Option<String>,

    pub mode: ExecMode,

    /// Keep the command line out of the log and replace it in the answer.
    pub hidden_command: bool,

    /// Turn a non-zero exit code into `ExecutorError::NonZeroExit`.
    pub check_result: bool,

    /// Log each output line in call mode.
    pub call_log: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            stdin: None,
            mode: ExecMode::Normal,
            hidden_command: false,
            check_result: false,
            call_log: true,
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }

    pub fn with_mode(mut self, mode: ExecMode) -> Self {
        self.mode = mode;
        self
    }

    /// Switch to call mode.
    pub fn call(self) -> Self {
        self.with_mode(ExecMode::Call)
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden_command = hidden;
        self
    }

    pub fn checked(mut self, check: bool) -> Self {
        self.check_result = check;
        self
    }

    /// Stop logging call-mode output lines.
    pub fn quiet(mut self) -> Self {
        self.call_log = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_shell_splits_words() {
        let cmd = Command::from_shell(r#"grep -e "a b" file.txt"#).unwrap();
        assert_eq!(cmd.exec_form(), ["grep", "-e", "a b", "file.txt"]);
        assert_eq!(cmd.shell_form(), r#"grep -e "a b" file.txt"#);
        assert_eq!(cmd.program(), "grep");
    }

    #[test]
    fn test_from_shell_rejects_blank() {
        assert!(matches!(
            Command::from_shell(""),
            Err(ExecutorError::EmptyCommand)
        ));
        assert!(matches!(
            Command::from_shell("   \t"),
            Err(ExecutorError::EmptyCommand)
        ));
    }

    #[test]
    fn test_from_shell_rejects_unbalanced_quotes() {
        let result = Command::from_shell("echo 'oops");
        assert!(matches!(result, Err(ExecutorError::InvalidCommand(_))));
    }

    #[test]
    fn test_from_args_quotes_shell_form() {
        let cmd = Command::from_args(["echo", "hello world"]).unwrap();
        assert_eq!(cmd.exec_form(), ["echo", "hello world"]);
        assert_eq!(cmd.shell_form(), "echo 'hello world'");
    }

    #[test]
    fn test_from_args_rejects_empty() {
        let result = Command::from_args(Vec::<String>::new());
        assert!(matches!(result, Err(ExecutorError::EmptyCommand)));
    }

    #[test]
    fn test_display_uses_exec_form() {
        let cmd = Command::from_shell("ls -la").unwrap();
        assert_eq!(cmd.to_string(), r#"["ls", "-la"]"#);
        assert_eq!(Command::hidden().to_string(), r#"["HIDDEN"]"#);
    }

    #[test]
    fn test_hide_command_keeps_output() {
        let answer = CommandAnswer {
            exit_code: 3,
            command: Command::from_shell("secret --password x").unwrap(),
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };

        let hidden = answer.hide_command();
        assert_eq!(hidden.command, Command::hidden());
        assert_eq!(hidden.exit_code, 3);
        assert_eq!(hidden.stdout, "out");
        assert_eq!(hidden.stderr, "err");
    }

    #[test]
    fn test_default_run_options() {
        let options = RunOptions::default();
        assert_eq!(options.mode, ExecMode::Normal);
        assert!(options.call_log, "call_log should default to true");
        assert!(!options.check_result);
        assert!(!options.hidden_command);
        assert!(options.stdin.is_none());

        let options = RunOptions::new().call().quiet().checked(true);
        assert_eq!(options.mode, ExecMode::Call);
        assert!(!options.call_log);
        assert!(options.check_result);
    }
}
