#![cfg(test)]
use std::time::Duration;

use subrecon_common::config::{PortVisibility, RunConfig};
use subrecon_common::network::ports::PortSpec;
use subrecon_common::report::{AddressEntry, ScanReport};
use subrecon_core::network::tcp::TcpProber;
use subrecon_core::scanner::resolver::LookupError;
use subrecon_core::scanner::{ScanOutput, Scanner};

use crate::utils::{LOCALHOST, ScriptedLookup, closed_port, open_port};

fn config(ports: &[u16], visibility: PortVisibility) -> RunConfig {
    RunConfig::builder("example.com")
        .subdomains(["www", "mail", "dev", "legacy"])
        .ports(Some(PortSpec::new(ports.iter().copied()).unwrap()))
        .concurrency(4)
        .resolve_timeout(Duration::from_millis(500))
        .probe_timeout(Duration::from_millis(500))
        .visibility(visibility)
        .build()
        .unwrap()
}

fn lookup() -> ScriptedLookup {
    ScriptedLookup::default()
        .answer("www.example.com", Ok(vec![LOCALHOST]))
        .answer("mail.example.com", Ok(vec![LOCALHOST]))
        .answer("dev.example.com", Err(LookupError::Transient("SERVFAIL".into())))
        .answer("legacy.example.com", Err(LookupError::Timeout))
}

fn addresses<'a>(report: &'a ScanReport, name: &str) -> &'a [AddressEntry] {
    &report
        .find(name)
        .unwrap_or_else(|| panic!("{name} missing from report"))
        .addresses
}

/// Open port on a real loopback listener is reported, the refused one is not.
#[tokio::test]
async fn scan_loopback_open_and_closed() {
    let (_listener, open) = open_port().await;
    let closed: u16 = closed_port().await;

    let scanner = Scanner::new(config(&[open, closed], PortVisibility::default()), lookup(), TcpProber);
    let ScanOutput { report, stats } = scanner.run().await;

    for name in ["www.example.com", "mail.example.com"] {
        let entries = addresses(&report, name);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ip, LOCALHOST);
        assert_eq!(entries[0].ports, Some(vec![open]));
    }

    // Listed under both names, probed once.
    assert_eq!(stats.addresses, 2);
    assert_eq!(stats.open, 1);
    assert_eq!(stats.closed, 1);
    assert_eq!(stats.probes(), 2);
}

/// Failed names stay in the tree with no addresses and never block the others.
#[tokio::test]
async fn failed_names_are_isolated() {
    let (_listener, open) = open_port().await;

    let scanner = Scanner::new(config(&[open], PortVisibility::default()), lookup(), TcpProber);
    let ScanOutput { report, stats } = scanner.run().await;

    let names: Vec<&str> = report.iter_names().map(|n| n.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "example.com",
            "www.example.com",
            "mail.example.com",
            "dev.example.com",
            "legacy.example.com"
        ]
    );

    for name in ["example.com", "dev.example.com", "legacy.example.com"] {
        assert!(addresses(&report, name).is_empty(), "{name} should have no addresses");
    }
    assert_eq!(addresses(&report, "www.example.com")[0].ports, Some(vec![open]));

    assert_eq!(stats.names, 5);
    assert_eq!(stats.resolved, 2);
    assert_eq!(stats.not_found, 1);
    assert_eq!(stats.timed_out, 1);
    assert_eq!(stats.transient_failures, 1);
    assert!(!stats.deadline_hit);
}

#[tokio::test]
async fn closed_ports_listed_when_requested() {
    let (_listener, open) = open_port().await;
    let closed: u16 = closed_port().await;

    let visibility = PortVisibility { filtered: false, closed: true };
    let scanner = Scanner::new(config(&[open, closed], visibility), lookup(), TcpProber);
    let ScanOutput { report, .. } = scanner.run().await;

    let mut expected: Vec<u16> = vec![open, closed];
    expected.sort_unstable();
    assert_eq!(addresses(&report, "www.example.com")[0].ports, Some(expected));
}

#[tokio::test]
async fn report_serializes_as_name_tree() {
    let (_listener, open) = open_port().await;

    let scanner = Scanner::new(config(&[open], PortVisibility::default()), lookup(), TcpProber);
    let ScanOutput { report, .. } = scanner.run().await;
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();

    assert_eq!(json["name"], "example.com");
    assert_eq!(json["addresses"], serde_json::json!([]));
    assert_eq!(json["subdomains"].as_array().unwrap().len(), 4);
    assert_eq!(
        json["subdomains"][0],
        serde_json::json!({
            "name": "www.example.com",
            "addresses": [{ "ip": "127.0.0.1", "ports": [open] }]
        })
    );
    assert!(json["subdomains"][0].get("subdomains").is_none());
}
