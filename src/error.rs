use std::path::PathBuf;
use thiserror::Error;

use crate::subprocess::ProcessError;

/// The error surface of the crate.
///
/// A non-zero exit status from a packer subcommand is never represented
/// here: that is ordinary result data carried by the operation's return
/// type. Errors cover invalid configuration, processes that could not be
/// started at all, output that does not match its expected shape, and
/// installation failures.
#[derive(Debug, Error)]
pub enum PackerError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to invoke {command}")]
    Invocation {
        command: String,
        #[source]
        source: ProcessError,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("installation failed: {message}")]
    Installation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PackerError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invocation(command: impl Into<String>, source: ProcessError) -> Self {
        Self::Invocation {
            command: command.into(),
            source,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn installation(message: impl Into<String>) -> Self {
        Self::Installation {
            message: message.into(),
            source: None,
        }
    }

    pub fn installation_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Installation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
