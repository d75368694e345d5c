//! Background engine for the GenStudio editor shell.
//!
//! The GUI layer talks to this crate through four surfaces: the task
//! dispatcher (AI requests), the git engine (repository status and sync),
//! the process/script runners, and the prompt templates. All completion is
//! delivered over channels; nothing here blocks the interactive thread.

pub mod dispatcher;
pub mod exec;
pub mod git;
pub mod llm;
pub mod prompts;

pub use dispatcher::{Task, TaskDispatcher, TaskError, TaskMode, TaskOutcome, TaskState};
pub use git::{GitEngine, GitEvent, RepositoryStatus};
