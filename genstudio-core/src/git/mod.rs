//! Git integration for the editor's source-control pane.
//!
//! Every operation shells out to the `git` CLI via the process runner with a
//! fixed timeout, against an explicitly configured repository root. Results
//! flow to the GUI as [`GitEvent`]s over an unbounded channel; read
//! operations additionally return their value so non-UI callers can use the
//! engine directly. Errors never propagate past this boundary.
//!
//! Mutating operations are driven sequentially by a single caller (the
//! source-control pane); the engine does no internal locking.

mod status;

use std::path::{Path, PathBuf};

use genstudio_config::constants::defaults;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::exec::{ExecError, ProcessOptions, ProcessRunner};

pub use status::{RepositoryStatus, branch_from_output, parse_porcelain};

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("no repository folder is open")]
    NoRepository,
    #[error(transparent)]
    Command(#[from] ExecError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitEvent {
    StatusUpdated(RepositoryStatus),
    Output(String),
    Error(String),
}

pub struct GitEngine {
    repo_root: Option<PathBuf>,
    events: UnboundedSender<GitEvent>,
}

impl GitEngine {
    pub fn new() -> (Self, UnboundedReceiver<GitEvent>) {
        let (events, receiver) = unbounded_channel();
        (
            Self {
                repo_root: None,
                events,
            },
            receiver,
        )
    }

    /// Point the engine at a repository. `None` disables all operations; the
    /// engine never infers a directory.
    pub fn set_repo_root(&mut self, root: Option<PathBuf>) {
        self.repo_root = root;
    }

    pub fn repo_root(&self) -> Option<&Path> {
        self.repo_root.as_deref()
    }

    async fn run_git(&self, args: &[&str]) -> Result<String, GitError> {
        let root = self.repo_root.as_ref().ok_or(GitError::NoRepository)?;

        let options = ProcessOptions::new("git")
            .args(args.iter().map(|arg| arg.to_string()))
            .current_dir(root)
            .timeout(defaults::PROCESS_TIMEOUT);

        let output = ProcessRunner::run(options).await?;
        Ok(output.stdout)
    }

    fn report(&self, err: &GitError) {
        tracing::warn!("git operation failed: {err}");
        let _ = self.events.send(GitEvent::Error(err.to_string()));
    }

    /// Refresh the working-tree snapshot and broadcast it.
    pub async fn status(&self) -> Option<RepositoryStatus> {
        match self.run_git(&["status", "--porcelain"]).await {
            Ok(output) => {
                let mut status = parse_porcelain(&output);
                status.branch = self.branch().await;
                let _ = self.events.send(GitEvent::StatusUpdated(status.clone()));
                Some(status)
            }
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    /// Current branch name, or the `"unknown"` sentinel when git prints
    /// nothing (detached HEAD, repository without commits).
    pub async fn branch(&self) -> String {
        match self.run_git(&["branch", "--show-current"]).await {
            Ok(output) => branch_from_output(&output),
            Err(err) => {
                self.report(&err);
                defaults::UNKNOWN_BRANCH.to_string()
            }
        }
    }

    /// Stage the given paths; `.` stages everything. Refreshes status.
    pub async fn add_files(&self, paths: &[&str]) -> bool {
        let mut args = vec!["add"];
        args.extend_from_slice(paths);

        match self.run_git(&args).await {
            Ok(_) => {
                let _ = self
                    .events
                    .send(GitEvent::Output(format!("Added files: {}", paths.join(" "))));
                self.status().await;
                true
            }
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    /// Commit staged changes. Message validation (non-empty) is the caller's
    /// contract. Refreshes status.
    pub async fn commit(&self, message: &str) -> bool {
        match self.run_git(&["commit", "-m", message]).await {
            Ok(_) => {
                let _ = self
                    .events
                    .send(GitEvent::Output(format!("Committed: {message}")));
                self.status().await;
                true
            }
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    /// Push to the remote; defaults to `origin` and the branch resolved at
    /// call time.
    pub async fn push(&self, remote: Option<&str>, branch: Option<&str>) -> bool {
        let remote = remote.unwrap_or(defaults::GIT_DEFAULT_REMOTE);
        let branch = match branch {
            Some(branch) => branch.to_string(),
            None => self.branch().await,
        };

        match self.run_git(&["push", remote, &branch]).await {
            Ok(_) => {
                let _ = self
                    .events
                    .send(GitEvent::Output(format!("Pushed to {remote}/{branch}")));
                true
            }
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    /// Pull from the remote with the same defaulting as `push`. Refreshes
    /// status afterwards since the working tree may have changed.
    pub async fn pull(&self, remote: Option<&str>, branch: Option<&str>) -> bool {
        let remote = remote.unwrap_or(defaults::GIT_DEFAULT_REMOTE);
        let branch = match branch {
            Some(branch) => branch.to_string(),
            None => self.branch().await,
        };

        match self.run_git(&["pull", remote, &branch]).await {
            Ok(output) => {
                let _ = self.events.send(GitEvent::Output(output));
                self.status().await;
                true
            }
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    /// Unified diff, optionally limited to one path. Output is returned raw.
    pub async fn diff(&self, path: Option<&str>) -> Option<String> {
        let mut args = vec!["diff"];
        if let Some(path) = path {
            args.push(path);
        }

        match self.run_git(&args).await {
            Ok(output) => {
                let _ = self.events.send(GitEvent::Output(output.clone()));
                Some(output)
            }
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    /// Last `count` commits in `--oneline` form, returned raw.
    pub async fn log(&self, count: usize) -> Option<String> {
        let count_arg = format!("-{count}");
        match self.run_git(&["log", &count_arg, "--oneline"]).await {
            Ok(output) => {
                let _ = self.events.send(GitEvent::Output(output.clone()));
                Some(output)
            }
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn operations_fail_fast_without_a_root() {
        let (engine, mut events) = GitEngine::new();

        assert!(engine.status().await.is_none());
        assert_eq!(engine.branch().await, "unknown");
        assert!(engine.diff(None).await.is_none());

        let mut errors = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, GitEvent::Error(_)) {
                errors += 1;
            }
        }
        assert!(errors >= 3);
    }
}
