use std::path::PathBuf;
use thiserror::Error;

use super::types::Endpoint;

/// A specialized `Result` type for batch-level push operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// Fatal, batch-aborting errors. Per-item failures never reach this type;
/// they are folded into `PushOutcome::Failed` and the batch continues.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error(
        "'adb' is not invocable: {detail}. Install Android Platform Tools (https://developer.android.com/tools/adb) or add 'adb' to PATH."
    )]
    AdbUnavailable { detail: String },

    #[error("Failed to run 'adb {command}': {source}")]
    CommandFailed {
        command: String,
        source: std::io::Error,
    },

    #[error("Could not connect to device at {endpoint}. Is wireless debugging enabled?")]
    ConnectionFailed { endpoint: Endpoint },

    #[error("Failed to read config file {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read remote file '{path}': {detail}")]
    RemoteRead { path: String, detail: String },
}
