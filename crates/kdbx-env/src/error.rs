//! Error kinds for a kdbx-env run

use std::path::PathBuf;
use thiserror::Error;

/// Message shown for every authentication/decryption failure, whatever the
/// underlying library reported.
pub const ACCESS_DENIED_MESSAGE: &str =
    "Failed to decrypt KDBX file. Check your password or keyfile.";

/// Fatal errors. Each one aborts the run before a child process is started.
#[derive(Error, Debug)]
pub enum KdbxEnvError {
    /// Store file or key file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Wrong password, wrong key file or a corrupt database
    #[error("{}", ACCESS_DENIED_MESSAGE)]
    Access {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Command could not be started
    #[error("Failed to start subprocess '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Required input missing
    #[error("{0}")]
    Config(String),
}

impl KdbxEnvError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn access(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Access {
            source: source.into(),
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub type Result<T> = std::result::Result<T, KdbxEnvError>;
