// Wifi ADB push pipeline. This module wraps the external `adb` binary:
// connection management, live progress parsing of its verbose trace
// stream, heuristic output classification, and batch push orchestration.

pub mod classify;
pub mod connection;
pub mod error;
pub mod progress;
pub mod push;
pub mod runner;
pub mod types;


// Re-export the main types and functions for easy access
pub use connection::ConnectionManager;
pub use error::{AdbError, AdbResult};
pub use progress::{LineOutcome, ProgressParser, ProgressUpdate};
pub use push::Pusher;
pub use runner::SystemAdb;
pub use types::{
    AdbRunner, AlwaysConfirm, BatchStats, Confirm, Device, Endpoint, PromptConfirm, PushOutcome,
    PushResult,
};
