use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while running a pipeline or reading input.
///
/// All variants except [`ShellError::InputRead`] abort only the current pipeline;
/// the interactive loop prints them and moves on to the next line.
#[derive(Debug, Error)]
pub enum ShellError {
    /// `cd` target is missing or cannot be entered.
    #[error("cd: {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// `cd` without a target and no `HOME` to fall back to.
    #[error("cd: no target and HOME not set")]
    NoHomeDirectory,

    #[error("kill: invalid pid {0:?}")]
    InvalidPid(String),

    #[error("kill: ({pid}) - {reason}")]
    ProcessLookup { pid: i32, reason: String },

    #[error("ps: {0}")]
    ProcessTable(String),

    #[error("exec: {0}: executable file not found")]
    ExecutableNotFound(String),

    /// Spawn failure or non-zero exit of an external program.
    #[error("exec: {program}: {reason}")]
    ExternalProcess { program: String, reason: String },

    /// Printed verbatim and swallowed by the runner.
    #[error("Unknown command")]
    UnknownCommand(String),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Fatal: the interactive loop stops.
    #[error("failed to read input: {0}")]
    InputRead(String),
}

impl ShellError {
    /// Whether this error ends the whole session rather than a single pipeline.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::InputRead(_))
    }
}

pub type Result<T, E = ShellError> = std::result::Result<T, E>;
