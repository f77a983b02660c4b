use std::io::{self, ErrorKind};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use subrecon_common::report::PortOutcome;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::scanner::prober::{Probe, ProbeError};

/// Full TCP handshake prober (connect scan). Needs no privileges.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

#[async_trait]
impl Probe for TcpProber {
    async fn probe(
        &self,
        ip: IpAddr,
        port: u16,
        probe_timeout: Duration,
    ) -> Result<PortOutcome, ProbeError> {
        let socket_addr: SocketAddr = SocketAddr::new(ip, port);

        match timeout(probe_timeout, TcpStream::connect(socket_addr)).await {
            Ok(Ok(_stream)) => Ok(PortOutcome::Open),
            Ok(Err(e)) => classify_connect_error(e),
            Err(_elapsed) => Ok(PortOutcome::Filtered),
        }
    }
}

fn classify_connect_error(e: io::Error) -> Result<PortOutcome, ProbeError> {
    match e.kind() {
        ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset => Ok(PortOutcome::Closed),
        // Silently dropped, or an ICMP unreachable on the way: nobody answered for the port.
        ErrorKind::TimedOut | ErrorKind::HostUnreachable | ErrorKind::NetworkUnreachable => {
            Ok(PortOutcome::Filtered)
        }
        _ => Err(ProbeError::Io(e)),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
