use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a run before or outside of any individual check.
///
/// Tool findings are not errors: they are recorded as failed
/// [`CheckResult`](crate::pipeline::CheckResult)s.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed configuration or override. Nothing runs.
    #[error("configuration error: {0}")]
    Config(String),

    /// Explicit script override that does not exist or is not a file.
    #[error("configuration error: script override not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    /// Invalid include/exclude glob.
    #[error("configuration error: invalid glob `{pattern}`: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The sandbox (container engine) or the tool itself could not be started.
    #[error("environment unavailable: {0}")]
    EnvironmentUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error belongs to the configuration class.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::ScriptNotFound(_) | Error::Glob { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
