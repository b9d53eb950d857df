//! Helpers for driving external command-line tools.

use std::process::{Output, Stdio};

use snafu::{ResultExt, Snafu};
use tokio::{io::AsyncWriteExt, process::Command};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to invoke `{command}`, error: {source}"))]
    Spawn { command: String, source: std::io::Error },

    #[snafu(display("`{command}` was terminated by a signal"))]
    Terminated { command: String },

    #[snafu(display("`{command}` exited with code {code}, stderr:\n{stderr}"))]
    Failed { command: String, code: i32, stderr: String },

    #[snafu(display("Failed to write to stdin of `{command}`, error: {source}"))]
    WriteStdin { command: String, source: std::io::Error },

    #[snafu(display("Output of `{command}` is not valid UTF-8, error: {source}"))]
    DecodeOutput { command: String, source: std::string::FromUtf8Error },
}

/// Extension methods for [`tokio::process::Command`].
pub trait CommandExt {
    /// Shell-escaped rendering of the program and its arguments.
    fn display(&self) -> String;

    /// Runs the command to completion, capturing its output.
    ///
    /// Succeeds only when the command exits with code 0; a non-zero exit
    /// carries the code and the captured stderr.
    async fn result(&mut self) -> Result<Output, Error>;

    /// Like [`CommandExt::result`], feeding `input` to the child's stdin
    /// before waiting for it.
    async fn result_with_stdin(&mut self, input: &[u8]) -> Result<Output, Error>;

    /// Runs the command and decodes its stdout as UTF-8.
    async fn stdout_string(&mut self) -> Result<String, Error>;
}

impl CommandExt for Command {
    fn display(&self) -> String {
        let std_command = self.as_std();
        std::iter::once(std_command.get_program())
            .chain(std_command.get_args())
            .map(|part| shell_escape::escape(part.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn result(&mut self) -> Result<Output, Error> {
        let command = self.display();
        tracing::debug!("Running `{command}`");

        let output =
            self.output().await.with_context(|_| SpawnSnafu { command: command.clone() })?;
        check_status(command, output)
    }

    async fn result_with_stdin(&mut self, input: &[u8]) -> Result<Output, Error> {
        let command = self.display();
        tracing::debug!("Running `{command}`");

        let mut child = self
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|_| SpawnSnafu { command: command.clone() })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input)
                .await
                .with_context(|_| WriteStdinSnafu { command: command.clone() })?;
            stdin
                .shutdown()
                .await
                .with_context(|_| WriteStdinSnafu { command: command.clone() })?;
        }

        let output = child
            .wait_with_output()
            .await
            .with_context(|_| SpawnSnafu { command: command.clone() })?;
        check_status(command, output)
    }

    async fn stdout_string(&mut self) -> Result<String, Error> {
        let command = self.display();
        let output = self.result().await?;
        String::from_utf8(output.stdout).context(DecodeOutputSnafu { command })
    }
}

fn check_status(command: String, output: Output) -> Result<Output, Error> {
    match output.status.code() {
        Some(0) => Ok(output),
        None => TerminatedSnafu { command }.fail(),
        Some(code) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            FailedSnafu { command, code, stderr }.fail()
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::process::Command;

    use super::{CommandExt as _, Error};

    #[test]
    fn test_display_escapes_arguments() {
        let mut command = Command::new("sh");
        let _command = command.args(["-c", "echo hello world"]);
        assert_eq!(command.display(), "sh -c 'echo hello world'");
    }

    #[tokio::test]
    async fn test_successful_command_captures_stdout() {
        let output = Command::new("sh")
            .args(["-c", "echo hi"])
            .result()
            .await
            .expect("`echo` should succeed");
        assert_eq!(String::from_utf8_lossy(&output.stdout), "hi\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit_reports_code_and_stderr() {
        let err = Command::new("sh")
            .args(["-c", "echo oops 1>&2; exit 3"])
            .result()
            .await
            .unwrap_err();
        if let Error::Failed { code, stderr, .. } = err {
            assert_eq!(code, 3);
            assert_eq!(stderr, "oops\n");
        } else {
            panic!("expected Error::Failed, got {err:?}");
        }
    }

    #[tokio::test]
    async fn test_missing_binary_reports_spawn_error() {
        let err = Command::new("nulex-test-no-such-binary").result().await.unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_stdin_is_fed_to_the_child() {
        let output = Command::new("cat")
            .result_with_stdin(b"fed through stdin")
            .await
            .expect("`cat` should succeed");
        assert_eq!(String::from_utf8_lossy(&output.stdout), "fed through stdin");
    }

    #[tokio::test]
    async fn test_stdout_string_trims_nothing() {
        let stdout = Command::new("sh")
            .args(["-c", "printf 'a b '"])
            .stdout_string()
            .await
            .expect("`printf` should succeed");
        assert_eq!(stdout, "a b ");
    }
}
