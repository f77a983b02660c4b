//! # Report Assembly
//!
//! Reduces the unordered results of a run into the canonical [`ScanReport`]
//! tree. All ordering happens here, never at scheduling time, so the same
//! outcomes always produce the same tree no matter which task finished first:
//!
//! * names in enumeration order (root, then wordlist order)
//! * addresses ascending (numeric, IPv4 before IPv6)
//! * ports ascending

use std::collections::{BTreeSet, HashMap};
use std::net::IpAddr;

use subrecon_common::config::{PortVisibility, RunConfig};
use subrecon_common::report::{AddressEntry, PortOutcome, ProbeResult, ScanReport, ScanStats};

use crate::scanner::resolver::ResolveOutcome;

/// Everything the result funnel delivered during a run.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    /// `(name index, outcome)`, index into `RunConfig::targets`.
    pub resolutions: Vec<(usize, ResolveOutcome)>,
    pub probes: Vec<ProbeResult>,
    pub probe_errors: usize,
    pub skipped: usize,
    pub deadline_hit: bool,
}

pub fn assemble(cfg: &RunConfig, collected: &Collected) -> (ScanReport, ScanStats) {
    let names = cfg.targets.names();
    let resolutions: HashMap<usize, &ResolveOutcome> = collected
        .resolutions
        .iter()
        .map(|(idx, outcome)| (*idx, outcome))
        .collect();
    let ports_by_ip: HashMap<IpAddr, BTreeSet<u16>> =
        group_visible_ports(&collected.probes, cfg.visibility);

    let node = |idx: usize| -> ScanReport {
        let addresses: &[IpAddr] = resolutions
            .get(&idx)
            .map(|outcome| outcome.addresses())
            .unwrap_or_default();
        ScanReport {
            name: names[idx].to_string(),
            addresses: address_entries(addresses, &ports_by_ip, cfg.probing_enabled()),
            subdomains: None,
        }
    };

    let mut root: ScanReport = node(0);
    root.subdomains = Some((1..names.len()).map(node).collect());

    let stats: ScanStats = tally(&root, collected, names.len());
    (root, stats)
}

fn group_visible_ports(
    probes: &[ProbeResult],
    visibility: PortVisibility,
) -> HashMap<IpAddr, BTreeSet<u16>> {
    let mut grouped: HashMap<IpAddr, BTreeSet<u16>> = HashMap::new();
    for probe in probes.iter().filter(|p| is_visible(p.outcome, visibility)) {
        grouped.entry(probe.ip).or_default().insert(probe.port);
    }
    grouped
}

fn is_visible(outcome: PortOutcome, visibility: PortVisibility) -> bool {
    match outcome {
        PortOutcome::Open => true,
        PortOutcome::Filtered => visibility.filtered,
        PortOutcome::Closed => visibility.closed,
    }
}

fn address_entries(
    addresses: &[IpAddr],
    ports_by_ip: &HashMap<IpAddr, BTreeSet<u16>>,
    probing: bool,
) -> Vec<AddressEntry> {
    let sorted: BTreeSet<IpAddr> = addresses.iter().copied().collect();
    sorted
        .into_iter()
        .map(|ip| AddressEntry {
            ip,
            ports: probing.then(|| {
                ports_by_ip
                    .get(&ip)
                    .map(|ports| ports.iter().copied().collect())
                    .unwrap_or_default()
            }),
        })
        .collect()
}

fn tally(root: &ScanReport, collected: &Collected, names: usize) -> ScanStats {
    let mut stats = ScanStats {
        names,
        probe_errors: collected.probe_errors,
        skipped: collected.skipped,
        deadline_hit: collected.deadline_hit,
        addresses: root.iter_names().map(|node| node.addresses.len()).sum(),
        ..ScanStats::default()
    };

    for (_, outcome) in &collected.resolutions {
        match outcome {
            ResolveOutcome::Resolved(_) => stats.resolved += 1,
            ResolveOutcome::NotFound => stats.not_found += 1,
            ResolveOutcome::Timeout => stats.timed_out += 1,
            ResolveOutcome::TransientError(_) => stats.transient_failures += 1,
        }
    }

    for probe in &collected.probes {
        match probe.outcome {
            PortOutcome::Open => stats.open += 1,
            PortOutcome::Closed => stats.closed += 1,
            PortOutcome::Filtered => stats.filtered += 1,
        }
    }

    stats
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
