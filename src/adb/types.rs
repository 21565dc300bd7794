// Core push-pipeline types and traits
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// A wifi debugging target, `address:port`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub address: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// Parse `addr` or `addr:port`, falling back to `default_port`.
    pub fn parse(spec: &str, default_port: u16) -> Result<Self, String> {
        match spec.rsplit_once(':') {
            Some((addr, port_str)) => {
                if addr.is_empty() {
                    return Err(format!("Missing address in endpoint '{spec}'"));
                }
                let port = port_str
                    .parse::<u16>()
                    .map_err(|_| format!("Invalid port '{port_str}' in endpoint '{spec}'"))?;
                Ok(Self::new(addr, port))
            }
            None if !spec.is_empty() => Ok(Self::new(spec, default_port)),
            None => Err("Empty endpoint".to_string()),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

#[derive(Debug, PartialEq, Serialize, Clone)]
pub struct Device {
    pub name: String,
    pub transport_id: Option<String>,
}

/// Terminal state of one pushed item. The variant payloads enforce that a
/// remote path exists only for successes and error detail only for failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PushOutcome {
    Succeeded { remote_path: String },
    Failed { detail: String },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushResult {
    pub source: PathBuf,
    pub outcome: PushOutcome,
}

impl PushResult {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, PushOutcome::Succeeded { .. })
    }
    pub fn failed(&self) -> bool {
        matches!(self.outcome, PushOutcome::Failed { .. })
    }
    pub fn skipped(&self) -> bool {
        matches!(self.outcome, PushOutcome::Skipped)
    }
    pub fn remote_path(&self) -> Option<&str> {
        match &self.outcome {
            PushOutcome::Succeeded { remote_path } => Some(remote_path),
            _ => None,
        }
    }
}

/// Per-batch counters, bumped exactly once per terminal item state.
#[derive(Debug)]
pub struct BatchStats {
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
    pub declined: u64,
    started: Instant,
}

impl BatchStats {
    pub fn new() -> Self {
        Self {
            processed: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            declined: 0,
            started: Instant::now(),
        }
    }

    pub fn record(&mut self, outcome: &PushOutcome) {
        self.processed += 1;
        match outcome {
            PushOutcome::Succeeded { .. } => self.succeeded += 1,
            PushOutcome::Failed { .. } => self.failed += 1,
            PushOutcome::Skipped => self.skipped += 1,
        }
    }

    /// A confirmation-gate refusal: the item is skipped from processing but
    /// is not a validation skip.
    pub fn record_declined(&mut self) {
        self.processed += 1;
        self.declined += 1;
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "{} pushed, {} failed, {} skipped",
            self.succeeded, self.failed, self.skipped
        );
        if self.declined > 0 {
            line.push_str(&format!(", {} declined", self.declined));
        }
        line.push_str(&format!(" in {:.1}s", self.elapsed().as_secs_f64()));
        line
    }
}

impl Default for BatchStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Confirmation gate asked before each transfer when `--confirm` is active.
pub trait Confirm {
    fn confirm(&self, description: &str) -> bool;
}

/// Non-interactive policy: every transfer proceeds.
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _description: &str) -> bool {
        true
    }
}

/// Interactive policy: prompt on stderr, read one line from stdin.
pub struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, description: &str) -> bool {
        eprint!("Push {description}? [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes" | "YES")
    }
}

/// Seam over the external `adb` binary (real subprocesses or test doubles).
#[allow(async_fn_in_trait)]
pub trait AdbRunner {
    /// Run `adb <args>` to completion and capture its output.
    async fn output(&self, args: &[&str]) -> io::Result<std::process::Output>;

    /// Spawn `adb push <source> <destination>` and stream its combined
    /// stdout+stderr line by line. Dropping the receiver ends the transfer.
    async fn spawn_push(
        &self,
        source: &Path,
        destination: &str,
    ) -> io::Result<mpsc::Receiver<String>>;
}
