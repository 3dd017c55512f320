//! Error types for the dispatch core.
//!
//! Command bodies return `anyhow::Result`; the dispatcher converts their
//! failures into `DispatchError::Command` so the host only ever sees text.

use thiserror::Error;

/// Envelope decode failure. Always recoverable: callers fall back to treating
/// the input as a plain argument.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid envelope JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("envelope must be a JSON object")]
    NotAnObject,
}

/// Failures surfaced to the user as an `Error: <message>` item or line.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("No arguments were provided; expected an argument and optional data")]
    NoArguments,

    #[error("{count} args were provided; at most 2 are accepted")]
    TooManyArguments { count: usize },

    #[error("No valid command in '{0}'")]
    NoValidCommand(String),

    #[error("{0}")]
    Command(String),

    #[error("{0}")]
    Setup(String),
}

impl DispatchError {
    /// Flatten a command failure (including its context chain) into text.
    pub fn command(err: anyhow::Error) -> Self {
        DispatchError::Command(format!("{err:#}"))
    }
}

/// Registry construction failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command keyword must not be empty")]
    EmptyKeyword,

    #[error("command keyword '{0}' must not contain spaces")]
    KeywordWithSpace(String),

    #[error("duplicate command keyword '{0}'")]
    DuplicateKeyword(String),

    #[error("command '{0}' is neither a filter nor an action")]
    NoCapability(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_valid_command_message() {
        assert_eq!(
            DispatchError::NoValidCommand("zap now".into()).to_string(),
            "No valid command in 'zap now'"
        );
    }

    #[test]
    fn command_error_keeps_context_chain() {
        let err = anyhow::anyhow!("disk full").context("could not save");
        assert_eq!(
            DispatchError::command(err).to_string(),
            "could not save: disk full"
        );
    }
}
