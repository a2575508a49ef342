//! Conversation engine backed by an external program.
//!
//! The program receives the resolved party configuration as YAML on stdin.
//! Every line it writes to stderr is forwarded to the line sink as it
//! arrives. When it exits successfully, its stdout must hold one JSON
//! document: either a bare transcript or an envelope of the form
//! `{"transcript": {...}, "output": ...}`.

use async_trait::async_trait;
use llm_eval_proto::{
    ChatTranscript, ConversationEngine, EngineError, LineSink, PartyConfig, SessionOutcome,
};
use serde::Deserialize;
use std::collections::VecDeque;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Number of stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Describes how to launch the engine program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EngineCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

#[derive(Deserialize)]
struct Envelope {
    transcript: ChatTranscript,
    #[serde(default)]
    output: serde_json::Value,
}

/// Parses the engine's stdout into a session outcome.
///
/// A top-level `"transcript"` key marks an envelope, which must then parse
/// strictly. Anything else is read as a bare transcript.
fn parse_reply(stdout: &str) -> Result<SessionOutcome, EngineError> {
    let value: serde_json::Value = serde_json::from_str(stdout.trim())?;
    if value.get("transcript").is_some() {
        let envelope: Envelope = serde_json::from_value(value)?;
        return Ok(SessionOutcome {
            transcript: envelope.transcript,
            auxiliary: envelope.output,
        });
    }
    Ok(SessionOutcome::new(serde_json::from_value(value)?))
}

/// Runs each session by spawning the engine program once.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    command: EngineCommand,
    timeout: Option<Duration>,
}

impl CommandEngine {
    pub fn new(command: EngineCommand) -> Self {
        Self {
            command,
            timeout: None,
        }
    }

    /// Terminates sessions that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &EngineCommand {
        &self.command
    }

    fn spawn(&self) -> Result<Child, EngineError> {
        let mut command = Command::new(&self.command.program);
        command
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            program = %self.command.program,
            args = ?self.command.args,
            "Spawning conversation engine"
        );

        command.spawn().map_err(|source| EngineError::Spawn {
            program: self.command.program.clone(),
            source,
        })
    }

    /// Sends SIGTERM so the engine can flush before exiting.
    #[cfg(unix)]
    fn terminate(child: &mut Child) {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        if let Some(pid) = child.id() {
            let pid = Pid::from_raw(pid as i32);
            debug!(%pid, "Sending SIGTERM to conversation engine");
            let _ = kill(pid, Signal::SIGTERM);
        }
    }

    #[cfg(not(unix))]
    fn terminate(child: &mut Child) {
        let _ = child.start_kill();
    }
}

#[async_trait]
impl ConversationEngine for CommandEngine {
    async fn start_session(
        &self,
        party: &PartyConfig,
        sink: &mut dyn LineSink,
    ) -> Result<SessionOutcome, EngineError> {
        let input = party.to_yaml()?;
        let mut child = self.spawn()?;

        let stdin_handle = child.stdin.take();
        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();
        let mut stderr_tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

        // Feed stdin, drain both streams and reap the child under one deadline
        let session = async {
            let stdin_future = async {
                if let Some(mut stdin) = stdin_handle {
                    // An engine may exit without reading its input; its exit status decides
                    match stdin.write_all(input.as_bytes()).await {
                        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                            debug!("Conversation engine closed stdin early");
                        }
                        result => result?,
                    }
                    // Dropping stdin signals EOF
                }
                Ok::<_, std::io::Error>(())
            };

            let stdout_future = async {
                let mut out = String::new();
                if let Some(mut stdout) = stdout_handle {
                    stdout.read_to_string(&mut out).await?;
                }
                Ok::<_, std::io::Error>(out)
            };

            let stderr_future = async {
                if let Some(stderr) = stderr_handle {
                    let mut lines = BufReader::new(stderr).lines();
                    while let Some(line) = lines.next_line().await? {
                        sink.emit_line(&line);
                        if stderr_tail.len() == STDERR_TAIL_LINES {
                            stderr_tail.pop_front();
                        }
                        stderr_tail.push_back(line);
                    }
                }
                Ok::<_, std::io::Error>(())
            };

            let ((), out, ()) = tokio::try_join!(stdin_future, stdout_future, stderr_future)?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((out, status))
        };

        let (stdout, status) = match self.timeout {
            Some(duration) => {
                if let Ok(result) = tokio::time::timeout(duration, session).await {
                    result?
                } else {
                    warn!(
                        timeout_secs = duration.as_secs(),
                        "Conversation engine timeout reached, sending SIGTERM"
                    );
                    Self::terminate(&mut child);
                    let _ = child.wait().await;
                    return Err(EngineError::TimedOut(duration));
                }
            }
            None => session.await?,
        };

        if !status.success() {
            return Err(EngineError::Exited {
                exit_code: status.code(),
                stderr_tail: Vec::from(stderr_tail).join("\n"),
            });
        }

        parse_reply(&stdout)
    }
}
