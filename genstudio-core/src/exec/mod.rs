//! External process execution: a one-shot runner with timeout and capped
//! capture, and a script runner that streams interpreter output.

pub mod runner;
pub mod script;

pub use runner::{ExecError, ProcessOptions, ProcessOutput, ProcessRunner};
pub use script::{ExecEvent, ScriptLanguage, ScriptRunner};
