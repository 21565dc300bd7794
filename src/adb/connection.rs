use std::io;

use super::error::{AdbError, AdbResult};
use super::types::{AdbRunner, Device, Endpoint};

/// Verifies the `adb` binary, checks whether an endpoint is already
/// connected, and performs a single tcpip/connect attempt if not.
pub struct ConnectionManager<'r, R: AdbRunner> {
    runner: &'r R,
}

impl<'r, R: AdbRunner> ConnectionManager<'r, R> {
    pub fn new(runner: &'r R) -> Self {
        Self { runner }
    }

    /// Probe `adb version`. Failure here is fatal for the whole batch.
    pub async fn ensure_adb_available(&self) -> AdbResult<()> {
        match self.runner.output(&["version"]).await {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(AdbError::AdbUnavailable {
                detail: format!("'adb version' returned non-zero ({})", out.status),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(AdbError::AdbUnavailable {
                detail: "'adb' binary not found in PATH".to_string(),
            }),
            Err(e) => Err(AdbError::AdbUnavailable {
                detail: e.to_string(),
            }),
        }
    }

    /// Query `adb devices -l` and look for the endpoint as an exact device
    /// name token.
    pub async fn is_connected(&self, endpoint: &Endpoint) -> AdbResult<bool> {
        let out = self
            .runner
            .output(&["devices", "-l"])
            .await
            .map_err(|source| AdbError::CommandFailed {
                command: "devices -l".to_string(),
                source,
            })?;
        if !out.status.success() {
            log::debug!(
                "adb devices -l returned non-zero: {}",
                String::from_utf8_lossy(&out.stderr)
            );
            return Ok(false);
        }
        let stdout = String::from_utf8_lossy(&out.stdout);
        let devices = parse_device_list(&stdout);
        Ok(endpoint_in_list(&devices, endpoint))
    }

    /// Connect to `endpoint` if not already connected. Exactly one attempt;
    /// the boolean is the re-queried connection state.
    pub async fn ensure_connected(&self, endpoint: &Endpoint) -> AdbResult<bool> {
        self.ensure_adb_available().await?;
        if self.is_connected(endpoint).await? {
            return Ok(true);
        }

        // Both commands are best-effort. Failures only show up in the
        // re-query below.
        let port = endpoint.port.to_string();
        match self.runner.output(&["tcpip", &port]).await {
            Ok(out) if !out.status.success() => log::debug!(
                "adb tcpip {port} failed: {}",
                String::from_utf8_lossy(&out.stderr)
            ),
            Err(e) => log::debug!("adb tcpip {port} could not run: {e}"),
            _ => {}
        }
        let target = endpoint.to_string();
        match self.runner.output(&["connect", &target]).await {
            Ok(out) if !out.status.success() => log::debug!(
                "adb connect {target} failed: {}",
                String::from_utf8_lossy(&out.stderr)
            ),
            Err(e) => log::debug!("adb connect {target} could not run: {e}"),
            _ => {}
        }

        self.is_connected(endpoint).await
    }

    /// Read a remote file's raw bytes via `adb exec-out cat`.
    pub async fn read_remote_file(&self, remote: &str) -> AdbResult<Vec<u8>> {
        let out = self
            .runner
            .output(&["exec-out", "cat", remote])
            .await
            .map_err(|source| AdbError::CommandFailed {
                command: format!("exec-out cat {remote}"),
                source,
            })?;
        if !out.status.success() {
            return Err(AdbError::RemoteRead {
                path: remote.to_string(),
                detail: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(out.stdout)
    }
}

/// Parse `adb devices -l` output into device entries. Lines whose state is
/// not `device` (offline, unauthorized) are dropped.
pub fn parse_device_list(output: &str) -> Vec<Device> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 2 && parts[1] == "device" {
                let name = parts[0].to_string();
                let transport_id = parts.iter().find_map(|part| {
                    part.strip_prefix("transport_id:").map(str::to_string)
                });
                Some(Device { name, transport_id })
            } else {
                None
            }
        })
        .collect()
}

/// True iff some device name equals `address:port` exactly. The whole-token
/// comparison avoids the substring false positive where `:555` would match
/// inside `:5555`.
pub fn endpoint_in_list(devices: &[Device], endpoint: &Endpoint) -> bool {
    let target = endpoint.to_string();
    devices.iter().any(|d| d.name == target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_device_list_basic() {
        let out = "List of devices attached\n192.168.1.20:5555 device transport_id:5\n";
        let devs = parse_device_list(out);
        assert_eq!(devs.len(), 1);
        assert_eq!(devs[0].name, "192.168.1.20:5555");
        assert_eq!(devs[0].transport_id, Some("5".to_string()));
    }

    #[test]
    fn parse_device_list_skips_offline_and_unauthorized() {
        let out = "List of devices attached\n\
                   192.168.1.20:5555      offline transport_id:4\n\
                   1d36d8f1               unauthorized usb:1-4\n\
                   oneplus6:5555          device product:OnePlus6 transport_id:3\n";
        let devs = parse_device_list(out);
        assert_eq!(
            devs,
            vec![Device {
                name: "oneplus6:5555".to_string(),
                transport_id: Some("3".to_string()),
            }]
        );
    }

    #[test]
    fn endpoint_match_is_whole_token() {
        let out = "List of devices attached\n192.168.1.20:5555 device transport_id:2\n";
        let devs = parse_device_list(out);
        assert!(endpoint_in_list(&devs, &Endpoint::new("192.168.1.20", 5555)));
        // A narrower port must not match inside the wider one.
        assert!(!endpoint_in_list(&devs, &Endpoint::new("192.168.1.20", 555)));
        assert!(!endpoint_in_list(&devs, &Endpoint::new("192.168.1.2", 5555)));
    }

    #[test]
    fn parse_device_list_empty() {
        assert!(parse_device_list("List of devices attached\n").is_empty());
        assert!(parse_device_list("").is_empty());
    }
}
