use std::time::{Duration, Instant};

/// Throttle between emitted progress updates.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(250);

/// Sample window for the weighted running rate average.
const RATE_WINDOW: f64 = 5.0;

const ERROR_MARKER: &str = "adb: error:";

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub label: String,
    pub percent: f64,
    /// Human-formatted transfer rate, e.g. `12.3 MB/s`.
    pub rate: String,
    /// Estimated seconds remaining; `None` while the rate is still unknown.
    pub eta_secs: Option<u64>,
}

/// What to do with one line of the transfer tool's combined output.
#[derive(Debug, PartialEq)]
pub enum LineOutcome {
    /// Throttled progress tick.
    Progress(ProgressUpdate),
    /// Genuine tool stdout; forward unchanged to the caller.
    Passthrough(String),
    /// Hard error line; stop the stream and fail the item with this text.
    Abort(String),
    /// Tool-internal diagnostic noise, dropped.
    Ignored,
}

/// Stateful per-push parser over the tool's verbose trace stream.
///
/// Byte counts are scraped from `writex ... len=<N> ... DATA` trace lines
/// and accumulated; updates are emitted at most once per throttle interval
/// with a smoothed rate and ETA. Non-trace lines pass through untouched so
/// the classifier still sees the tool's real output.
pub struct ProgressParser {
    label: String,
    total_bytes: u64,
    throttle: Duration,
    cumulative: u64,
    last_sample: u64,
    avg_rate: f64,
    last_emit: Instant,
}

impl ProgressParser {
    pub fn new(label: impl Into<String>, total_bytes: u64) -> Self {
        Self::with_throttle(label, total_bytes, DEFAULT_THROTTLE)
    }

    pub fn with_throttle(label: impl Into<String>, total_bytes: u64, throttle: Duration) -> Self {
        Self {
            label: label.into(),
            total_bytes,
            throttle,
            cumulative: 0,
            last_sample: 0,
            avg_rate: 0.0,
            // Starting the throttle window now means the first chunk
            // accumulates silently instead of emitting a meaningless rate.
            last_emit: Instant::now(),
        }
    }

    pub fn cumulative_bytes(&self) -> u64 {
        self.cumulative
    }

    pub fn feed(&mut self, line: &str) -> LineOutcome {
        let trimmed = line.trim_start();

        if trimmed.starts_with(ERROR_MARKER) {
            return LineOutcome::Abort(trimmed.trim_end().to_string());
        }

        if line.contains("writex") && line.contains("DATA") {
            match extract_len(line) {
                Some(len) => {
                    self.cumulative += len;
                    if self.last_emit.elapsed() >= self.throttle {
                        return LineOutcome::Progress(self.emit());
                    }
                }
                None => log::debug!("Unparseable trace chunk line: {line}"),
            }
            return LineOutcome::Ignored;
        }

        if trimmed.starts_with("adb") {
            log::debug!("Discarding adb diagnostic line: {line}");
            return LineOutcome::Ignored;
        }

        LineOutcome::Passthrough(line.to_string())
    }

    fn emit(&mut self) -> ProgressUpdate {
        let delta = self.cumulative - self.last_sample;
        let throttle_ms = self.throttle.as_millis().max(1) as f64;
        let instantaneous = delta as f64 * (1000.0 / throttle_ms);
        self.avg_rate = (self.avg_rate * (RATE_WINDOW - 1.0) + instantaneous) / RATE_WINDOW;

        let percent = if self.total_bytes == 0 {
            100.0
        } else {
            (self.cumulative as f64 / self.total_bytes as f64) * 100.0
        };
        let eta_secs = if self.avg_rate > 0.0 {
            let remaining = self.total_bytes.saturating_sub(self.cumulative) as f64;
            Some((remaining / self.avg_rate).round() as u64)
        } else {
            None
        };

        self.last_sample = self.cumulative;
        self.last_emit = Instant::now();

        ProgressUpdate {
            label: self.label.clone(),
            percent,
            rate: format_rate(self.avg_rate),
            eta_secs,
        }
    }
}

/// Extract `N` from the `len=<N>` field of a trace chunk line.
fn extract_len(line: &str) -> Option<u64> {
    let rest = &line[line.find("len=")? + 4..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn format_rate(bytes_per_sec: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    if bytes_per_sec >= MB {
        format!("{:.1} MB/s", bytes_per_sec / MB)
    } else if bytes_per_sec >= KB {
        format!("{:.1} KB/s", bytes_per_sec / KB)
    } else {
        format!("{bytes_per_sec:.0} B/s")
    }
}
