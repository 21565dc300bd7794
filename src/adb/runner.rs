use std::io;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use super::types::AdbRunner;

/// `AdbRunner` backed by the real `adb` binary on PATH.
pub struct SystemAdb;

impl AdbRunner for SystemAdb {
    async fn output(&self, args: &[&str]) -> io::Result<std::process::Output> {
        Command::new("adb").args(args).output().await
    }

    async fn spawn_push(
        &self,
        source: &Path,
        destination: &str,
    ) -> io::Result<mpsc::Receiver<String>> {
        let mut child = Command::new("adb")
            .arg("push")
            .arg(source)
            .arg(destination)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("Failed to capture adb stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("Failed to capture adb stderr"))?;

        // Both pipes feed one channel so the consumer sees a single merged
        // line stream. Trace output arrives on stderr, the push summary on
        // stdout. One task owns the child and both readers, so an aborting
        // consumer (dropped receiver) kills the child no matter which pipe
        // the last line came from.
        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            let mut out_lines = BufReader::new(stdout).lines();
            let mut err_lines = BufReader::new(stderr).lines();
            let mut out_done = false;
            let mut err_done = false;
            while !(out_done && err_done) {
                let line = tokio::select! {
                    res = out_lines.next_line(), if !out_done => match res {
                        Ok(Some(line)) => Some(line),
                        _ => {
                            out_done = true;
                            None
                        }
                    },
                    res = err_lines.next_line(), if !err_done => match res {
                        Ok(Some(line)) => Some(line),
                        _ => {
                            err_done = true;
                            None
                        }
                    },
                };
                if let Some(line) = line
                    && tx.send(line).await.is_err()
                {
                    // Receiver dropped mid-stream: the caller aborted.
                    let _ = child.kill().await;
                    break;
                }
            }
            let _ = child.wait().await;
        });

        Ok(rx)
    }
}
