//! Readiness polling: wait for a TCP port to show up in a listening set.
//!
//! Every wait is bounded by a [`PollPolicy`]; running out of attempts is reported as
//! [`LaraboxError::ReadinessTimeout`].

use std::io::Write;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::docker::ContainerProxy;
use crate::errors::{LaraboxError, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(120);
/// Floor applied by [`PollPolicy::from_timeout`] so a zero interval still covers the timeout.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Fixed listing script; the port is matched in Rust, never interpolated into the shell.
const LISTEN_SCRIPT: &str = "ss -ltn 2>/dev/null || netstat -ltn 2>/dev/null";

pub trait Probe {
    /// Human-readable target, used in progress and timeout messages.
    fn describe(&self) -> String;

    fn is_listening(&mut self) -> Result<bool>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    /// Enough attempts to cover `timeout` at `interval` spacing (at least one).
    ///
    /// Intervals below [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn from_timeout(timeout: Duration, interval: Duration) -> Self {
        let interval = interval.max(MIN_POLL_INTERVAL);
        let n = timeout.as_nanos().div_ceil(interval.as_nanos());
        Self {
            interval,
            max_attempts: n.clamp(1, u32::MAX as u128) as u32,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from_timeout(DEFAULT_READY_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Probe until the port is listening. Writes one `.` per attempt to `progress` and
/// returns the number of attempts used.
pub fn wait_until_listening(
    probe: &mut dyn Probe,
    policy: &PollPolicy,
    progress: &mut dyn Write,
) -> Result<u32> {
    let what = probe.describe();
    let max = policy.max_attempts.max(1);
    for attempt in 1..=max {
        let _ = write!(progress, ".");
        let _ = progress.flush();
        let listening = match probe.is_listening() {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(attempt, error = %e, "probe failed; treating as not listening");
                false
            }
        };
        if listening {
            let _ = writeln!(progress);
            tracing::info!(target_port = %what, attempt, "ready");
            return Ok(attempt);
        }
        if attempt < max && !policy.interval.is_zero() {
            std::thread::sleep(policy.interval);
        }
    }
    let _ = writeln!(progress);
    Err(LaraboxError::ReadinessTimeout {
        what,
        attempts: max,
    })
}

/// True when `listing` (output of `ss -ltn` or `netstat -ltn`) has a LISTEN socket on `port`.
pub fn port_in_listing(listing: &str, port: u16) -> bool {
    let wanted = port.to_string();
    listing.lines().any(|line| {
        if !line.contains("LISTEN") {
            return false;
        }
        // Both tools put the local address in the fourth column.
        line.split_whitespace()
            .nth(3)
            .and_then(|local| local.rsplit(':').next())
            .map(|p| p == wanted)
            .unwrap_or(false)
    })
}

/// Checks the listening set inside a container.
pub struct ContainerPortProbe<'a> {
    proxy: &'a ContainerProxy<'a>,
    port: u16,
}

impl<'a> ContainerPortProbe<'a> {
    pub fn new(proxy: &'a ContainerProxy<'a>, port: u16) -> Self {
        Self { proxy, port }
    }
}

impl Probe for ContainerPortProbe<'_> {
    fn describe(&self) -> String {
        format!("port {} in container '{}'", self.port, self.proxy.container())
    }

    fn is_listening(&mut self) -> Result<bool> {
        let out = self.proxy.capture(None, ["sh", "-c", LISTEN_SCRIPT])?;
        Ok(port_in_listing(&out.stdout, self.port))
    }
}

/// Checks a port on the host with a plain TCP connect.
pub struct HostPortProbe {
    host: String,
    port: u16,
    connect_timeout: Duration,
}

impl HostPortProbe {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: Duration::from_millis(300),
        }
    }
}

impl Probe for HostPortProbe {
    fn describe(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn is_listening(&mut self) -> Result<bool> {
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port).to_socket_addrs()?.collect();
        Ok(addrs
            .iter()
            .any(|a| TcpStream::connect_timeout(a, self.connect_timeout).is_ok()))
    }
}
