use std::io::Write;
use std::path::{Path, PathBuf};

use super::classify::is_success;
use super::progress::{LineOutcome, ProgressParser, ProgressUpdate};
use super::types::{AdbRunner, BatchStats, Confirm, PushOutcome, PushResult};

/// Enables adb's verbose trace stream for the duration of one push. The
/// variable is process-wide so the spawned child inherits it; the guard
/// removes it again on every exit path.
struct TraceEnvGuard;

impl TraceEnvGuard {
    fn set() -> Self {
        unsafe { std::env::set_var("ADB_TRACE", "all") };
        Self
    }
}

impl Drop for TraceEnvGuard {
    fn drop(&mut self) {
        unsafe { std::env::remove_var("ADB_TRACE") };
    }
}

/// Sequentially pushes a batch of local files, wiring each transfer's
/// output through the progress parser and the output classifier.
pub struct Pusher<'a, R: AdbRunner> {
    runner: &'a R,
    confirm: &'a dyn Confirm,
    quiet: bool,
    show_summary: bool,
}

impl<'a, R: AdbRunner> Pusher<'a, R> {
    pub fn new(runner: &'a R, confirm: &'a dyn Confirm, quiet: bool, show_summary: bool) -> Self {
        Self {
            runner,
            confirm,
            quiet,
            show_summary,
        }
    }

    /// Push every item in order, one transfer at a time. Each result is
    /// handed to `on_result` as soon as its item reaches a terminal state,
    /// so callers see output incrementally even for streamed input.
    pub async fn push_all<I, F>(
        &self,
        items: I,
        destination: &str,
        mut on_result: F,
    ) -> Vec<PushResult>
    where
        I: IntoIterator<Item = PathBuf>,
        F: FnMut(&PushResult),
    {
        let mut stats = BatchStats::new();
        let mut results = Vec::new();

        for source in items {
            let result = self.push_one(source, destination, &mut stats).await;
            on_result(&result);
            results.push(result);
        }

        if self.show_summary {
            eprintln!("{}", stats.summary_line());
        }
        results
    }

    async fn push_one(
        &self,
        source: PathBuf,
        destination: &str,
        stats: &mut BatchStats,
    ) -> PushResult {
        // Pending -> Skipped: nothing to transfer, no subprocess.
        let total_bytes = match tokio::fs::metadata(&source).await {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => {
                log::warn!("Skipping {}: not an existing file", source.display());
                let result = PushResult {
                    source,
                    outcome: PushOutcome::Skipped,
                };
                stats.record(&result.outcome);
                return result;
            }
        };

        if !self
            .confirm
            .confirm(&format!("{} -> {destination}", source.display()))
        {
            stats.record_declined();
            return PushResult {
                source,
                outcome: PushOutcome::Skipped,
            };
        }

        let outcome = self.transfer(&source, destination, total_bytes).await;
        stats.record(&outcome);
        PushResult { source, outcome }
    }

    /// Validated -> Transferring -> {Succeeded | Failed}.
    async fn transfer(&self, source: &Path, destination: &str, total_bytes: u64) -> PushOutcome {
        let basename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());

        let _trace = TraceEnvGuard::set();
        let mut lines = match self.runner.spawn_push(source, destination).await {
            Ok(rx) => rx,
            Err(e) => {
                return PushOutcome::Failed {
                    detail: format!("Failed to invoke adb push: {e}"),
                };
            }
        };

        let mut parser = ProgressParser::new(basename.clone(), total_bytes);
        let mut captured = String::new();
        let mut progress_shown = false;

        while let Some(line) = lines.recv().await {
            match parser.feed(&line) {
                LineOutcome::Progress(update) => {
                    if !self.quiet {
                        render_progress(&update);
                        progress_shown = true;
                    }
                }
                LineOutcome::Passthrough(text) => {
                    captured.push_str(&text);
                    captured.push('\n');
                }
                LineOutcome::Abort(detail) => {
                    // Dropping the receiver tears the subprocess down.
                    drop(lines);
                    if progress_shown {
                        eprintln!();
                    }
                    return PushOutcome::Failed { detail };
                }
                LineOutcome::Ignored => {}
            }
        }
        if progress_shown {
            eprintln!();
        }

        if is_success(&captured) {
            PushOutcome::Succeeded {
                remote_path: format!("{}/{basename}", destination.trim_end_matches('/')),
            }
        } else {
            let detail = captured.trim().to_string();
            PushOutcome::Failed {
                detail: if detail.is_empty() {
                    "No output from adb push".to_string()
                } else {
                    detail
                },
            }
        }
    }
}

fn render_progress(update: &ProgressUpdate) {
    let eta = match update.eta_secs {
        Some(secs) => format!("{secs}s"),
        None => "?".to_string(),
    };
    eprint!(
        "\r{}: {:.0}% at {} ETA {eta}   ",
        update.label, update.percent, update.rate
    );
    let _ = std::io::stderr().flush();
}
