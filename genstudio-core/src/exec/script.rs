//! Run the active editor buffer through its interpreter.
//!
//! The buffer is written to a temp file and handed to the interpreter for
//! the buffer's language. Output is forwarded line by line over an event
//! channel so the GUI console can render it as it arrives. `stop()` kills
//! the running child; the `Finished` event still fires afterwards.

use std::io::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_process::{Command as AsyncCommand, Stdio};
use futures_lite::{AsyncBufReadExt as _, StreamExt as _, io::BufReader};
use tokio::sync::Notify;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use super::runner::ExecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLanguage {
    Python,
    JavaScript,
}

impl ScriptLanguage {
    pub fn interpreter(&self) -> &'static str {
        match self {
            ScriptLanguage::Python => "python3",
            ScriptLanguage::JavaScript => "node",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ScriptLanguage::Python => "py",
            ScriptLanguage::JavaScript => "js",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecEvent {
    Stdout(String),
    Stderr(String),
    Finished { exit_code: i32 },
}

/// Streams one script execution at a time; a second `run` while a child is
/// alive is rejected.
pub struct ScriptRunner {
    events: UnboundedSender<ExecEvent>,
    stop_signal: Arc<Notify>,
    stop_requested: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

impl ScriptRunner {
    pub fn new() -> (Self, UnboundedReceiver<ExecEvent>) {
        let (events, receiver) = unbounded_channel();
        (
            Self {
                events,
                stop_signal: Arc::new(Notify::new()),
                stop_requested: Arc::new(AtomicBool::new(false)),
                running: Arc::new(AtomicBool::new(false)),
            },
            receiver,
        )
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Request termination of the running child. No-op when idle.
    pub fn stop(&self) {
        if self.running.load(Ordering::SeqCst) {
            self.stop_requested.store(true, Ordering::SeqCst);
            self.stop_signal.notify_one();
        }
    }

    /// Execute `source` with the interpreter for `language`, forwarding
    /// output events until the child exits. Returns the exit code.
    pub async fn run(&self, language: ScriptLanguage, source: &str) -> Result<i32, ExecError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ExecError::Launch {
                program: language.interpreter().to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::ResourceBusy,
                    "a script is already running",
                ),
            });
        }

        self.stop_requested.store(false, Ordering::SeqCst);
        let result = self.run_inner(language, source).await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn run_inner(&self, language: ScriptLanguage, source: &str) -> Result<i32, ExecError> {
        let mut script_file = tempfile::Builder::new()
            .prefix("genstudio-run-")
            .suffix(&format!(".{}", language.extension()))
            .tempfile()?;
        script_file.write_all(source.as_bytes())?;
        script_file.flush()?;

        let interpreter = language.interpreter();
        let mut child = AsyncCommand::new(interpreter)
            .arg(script_file.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Launch {
                program: interpreter.to_string(),
                source,
            })?;

        let mut stdout_lines = child.stdout.take().map(|out| BufReader::new(out).lines());
        let mut stderr_lines = child.stderr.take().map(|err| BufReader::new(err).lines());
        let mut stdout_done = stdout_lines.is_none();
        let mut stderr_done = stderr_lines.is_none();

        while !(stdout_done && stderr_done) {
            tokio::select! {
                line = next_line(&mut stdout_lines), if !stdout_done => match line {
                    Some(text) => {
                        let _ = self.events.send(ExecEvent::Stdout(text));
                    }
                    None => stdout_done = true,
                },
                line = next_line(&mut stderr_lines), if !stderr_done => match line {
                    Some(text) => {
                        let _ = self.events.send(ExecEvent::Stderr(text));
                    }
                    None => stderr_done = true,
                },
                _ = self.stop_signal.notified() => {
                    // A permit left over from a stop that raced the previous
                    // child's exit carries no request; ignore it.
                    if self.stop_requested.swap(false, Ordering::SeqCst) {
                        tracing::debug!(interpreter, "stopping script on request");
                        let _ = child.kill();
                    }
                }
            }
        }

        // Streams are closed, so this resolves as soon as the child is reaped.
        let status = child.status().await?;
        let exit_code = status.code().unwrap_or(-1);
        let _ = self.events.send(ExecEvent::Finished { exit_code });
        Ok(exit_code)
    }
}

async fn next_line<R>(
    lines: &mut Option<futures_lite::io::Lines<BufReader<R>>>,
) -> Option<String>
where
    R: futures_lite::AsyncRead + Unpin,
{
    match lines {
        Some(stream) => loop {
            match stream.next().await {
                Some(Ok(text)) => return Some(text),
                Some(Err(_)) => continue,
                None => return None,
            }
        },
        None => None,
    }
}
