use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use subrecon_common::report::PortOutcome;
use thiserror::Error;

/// The probe could not be attempted at all (e.g. no socket available).
///
/// Says nothing about the remote port. The engine retries the pair once, a
/// second failure degrades only that task.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("local socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("prober panicked: {0}")]
    Panicked(String),
}

/// Strategy for checking whether a transport-layer port accepts connections.
///
/// Every probe is independent. Probing the same `(ip, port)` twice may yield
/// different outcomes (packet loss, rate limiting, services restarting); the
/// engine probes each pair once per run and keeps that answer.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Returns `Open`, `Closed`, or `Filtered` once `probe_timeout` has elapsed
    /// without any answer.
    async fn probe(
        &self,
        ip: IpAddr,
        port: u16,
        probe_timeout: Duration,
    ) -> Result<PortOutcome, ProbeError>;
}
