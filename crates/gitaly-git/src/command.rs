//! command execution for git subprocesses.

use std::process::Stdio;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const MAX_STDERR_BYTES: usize = 10 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    #[must_use]
    pub fn with_env(mut self, env: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(env);
        self
    }

    /// Arguments rendered for error messages, without the `-C <repo>` prefix.
    pub fn display_args(&self) -> String {
        let skip = if self.args.first().map(String::as_str) == Some("-C") {
            2
        } else {
            0
        };

        self.args
            .iter()
            .skip(skip)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed writing stdin of `{program}`: {source}")]
    Stdin {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CommandRunner;

impl CommandRunner {
    pub async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        self.run_inner(spec, None).await
    }

    pub async fn run_with_input(
        &self,
        spec: &CommandSpec,
        stdin: &[u8],
    ) -> Result<CommandOutput, CommandError> {
        self.run_inner(spec, Some(stdin)).await
    }

    async fn run_inner(
        &self,
        spec: &CommandSpec,
        stdin: Option<&[u8]>,
    ) -> Result<CommandOutput, CommandError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .envs(spec.env.iter().map(|(name, value)| (name, value)))
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| CommandError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        if let Some(payload) = stdin {
            let mut child_stdin = child.stdin.take().ok_or_else(|| CommandError::Stdin {
                program: spec.program.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "stdin was not piped for child process",
                ),
            })?;

            let written = async {
                child_stdin.write_all(payload).await?;
                child_stdin.shutdown().await
            }
            .await;
            drop(child_stdin);

            written.map_err(|source| CommandError::Stdin {
                program: spec.program.clone(),
                source,
            })?;
        }

        let mut output = child
            .wait_with_output()
            .await
            .map_err(|source| CommandError::Wait {
                program: spec.program.clone(),
                source,
            })?;

        if output.stderr.len() > MAX_STDERR_BYTES {
            output.stderr.truncate(MAX_STDERR_BYTES);
        }

        Ok(CommandOutput {
            status_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
