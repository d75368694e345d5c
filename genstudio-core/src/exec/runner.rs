//! One-shot async process execution.
//!
//! Spawns a child, drains both streams concurrently with a capture cap, and
//! races the whole thing against a timeout. The child never survives the
//! timeout: it is killed and reaped before the error is returned.

use std::collections::HashMap;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_process::{Child, Command as AsyncCommand, ExitStatus, Stdio};
use futures_lite::AsyncReadExt as _;
use genstudio_config::constants::defaults;
use tokio::sync::Mutex;
use tokio::time::{Sleep, sleep};

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{program}' timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("'{program}' exited with code {code}: {stderr}")]
    NonZeroExit {
        program: String,
        code: i32,
        stderr: String,
    },
    #[error("process i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    pub program: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub current_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl ProcessOptions {
    /// Options with the default 30 s timeout; `timeout()` overrides it.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: Some(defaults::PROCESS_TIMEOUT),
            ..Default::default()
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

pub struct ProcessRunner;

impl ProcessRunner {
    /// Run the command to completion. Non-zero exit and timeout both surface
    /// as errors; success returns the captured output.
    pub async fn run(options: ProcessOptions) -> Result<ProcessOutput, ExecError> {
        if options.program.is_empty() {
            return Err(ExecError::Launch {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "program is empty"),
            });
        }

        let start = Instant::now();
        let mut command = AsyncCommand::new(&options.program);
        command.args(&options.args);
        if let Some(dir) = &options.current_dir {
            command.current_dir(dir);
        }
        if !options.env.is_empty() {
            command.envs(&options.env);
        }
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| ExecError::Launch {
            program: options.program.clone(),
            source,
        })?;

        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();
        let shared_child = Arc::new(Mutex::new(child));

        let mut stdout_future = Box::pin(read_stream(stdout_handle));
        let mut stderr_future = Box::pin(read_stream(stderr_handle));
        let mut wait_future = Box::pin(wait_for_status(shared_child.clone()));
        let mut timeout_future = options
            .timeout
            .map(|dur| Box::pin(sleep(dur)) as Pin<Box<Sleep>>);

        let mut exit_status: Option<ExitStatus> = None;
        let mut stdout_result: Option<std::io::Result<Vec<u8>>> = None;
        let mut stderr_result: Option<std::io::Result<Vec<u8>>> = None;

        let timed_out = loop {
            tokio::select! {
                res = &mut wait_future, if exit_status.is_none() => {
                    exit_status = Some(res?);
                    // Keep looping to drain the streams
                }
                res = &mut stdout_future, if stdout_result.is_none() => {
                    stdout_result = Some(res);
                }
                res = &mut stderr_future, if stderr_result.is_none() => {
                    stderr_result = Some(res);
                }
                _ = async {
                    if let Some(fut) = timeout_future.as_mut() {
                        fut.as_mut().await;
                    } else {
                        futures::future::pending::<()>().await;
                    }
                }, if timeout_future.is_some() => {
                    break true;
                }
            }

            if exit_status.is_some() && stdout_result.is_some() && stderr_result.is_some() {
                break false;
            }
        };

        if timed_out {
            kill_child(shared_child.clone()).await?;
            if exit_status.is_none() {
                let _ = wait_future.await;
            }
            return Err(ExecError::Timeout {
                program: options.program,
                timeout: options.timeout.unwrap_or_default(),
            });
        }

        let stdout = match stdout_result {
            Some(result) => result?,
            None => stdout_future.await?,
        };
        let stderr = match stderr_result {
            Some(result) => result?,
            None => stderr_future.await?,
        };

        let status = match exit_status {
            Some(status) => status,
            None => wait_future.await?,
        };

        let stderr_text = String::from_utf8_lossy(&stderr).into_owned();
        if !status.success() {
            return Err(ExecError::NonZeroExit {
                program: options.program,
                code: status.code().unwrap_or(-1),
                stderr: stderr_text,
            });
        }

        Ok(ProcessOutput {
            exit_code: status.code().unwrap_or(0),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: stderr_text,
            duration: start.elapsed(),
        })
    }
}

async fn read_stream<R>(reader: Option<R>) -> std::io::Result<Vec<u8>>
where
    R: futures_lite::AsyncRead + Unpin,
{
    let mut reader = match reader {
        Some(r) => r,
        None => return Ok(Vec::new()),
    };

    let mut output = Vec::new();
    let mut buffer = [0u8; 4096];
    loop {
        let read = reader.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        let remaining = defaults::PROCESS_CAPTURE_LIMIT.saturating_sub(output.len());
        if remaining > 0 {
            let to_copy = remaining.min(read);
            output.extend_from_slice(&buffer[..to_copy]);
        }
    }

    Ok(output)
}

async fn wait_for_status(child: Arc<Mutex<Child>>) -> std::io::Result<ExitStatus> {
    let mut guard = child.lock().await;
    guard.status().await
}

async fn kill_child(child: Arc<Mutex<Child>>) -> std::io::Result<()> {
    let mut guard = child.lock().await;
    guard.kill()
}
