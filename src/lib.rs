pub mod adb;
pub mod args;
pub mod config;

pub use adb::{ConnectionManager, Pusher, SystemAdb};
