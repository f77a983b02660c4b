//! # Report Model
//!
//! The serializable result tree of a run and the run statistics that travel
//! next to it.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use serde::Serialize;

/// Classification of a single TCP probe.
///
/// Decided once per probe and never revised within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortOutcome {
    Open,
    Closed,
    Filtered,
}

impl fmt::Display for PortOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortOutcome::Open => "open",
            PortOutcome::Closed => "closed",
            PortOutcome::Filtered => "filtered",
        };
        f.write_str(s)
    }
}

/// One probed `(address, port)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub ip: IpAddr,
    pub port: u16,
    pub outcome: PortOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressEntry {
    pub ip: IpAddr,
    /// Present only when port probing was enabled for the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<u16>>,
}

/// A node of the report tree.
///
/// The root node carries `subdomains` (possibly empty). Subdomain nodes never
/// do, the tree is exactly one level deep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub name: String,
    pub addresses: Vec<AddressEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomains: Option<Vec<ScanReport>>,
}

impl ScanReport {
    /// The root node followed by every subdomain node.
    pub fn iter_names(&self) -> impl Iterator<Item = &ScanReport> {
        std::iter::once(self).chain(self.subdomains.iter().flatten())
    }

    pub fn find(&self, name: &str) -> Option<&ScanReport> {
        self.iter_names().find(|node| node.name == name)
    }
}

/// Counters describing how a run went. Never part of the JSON tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub names: usize,
    pub resolved: usize,
    pub not_found: usize,
    pub timed_out: usize,
    pub transient_failures: usize,
    pub addresses: usize,
    pub open: usize,
    pub closed: usize,
    pub filtered: usize,
    pub probe_errors: usize,
    pub skipped: usize,
    pub deadline_hit: bool,
    pub elapsed: Duration,
}

impl ScanStats {
    pub fn probes(&self) -> usize {
        self.open + self.closed + self.filtered + self.probe_errors
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
