use std::sync::Arc;

use anyhow::{self, Context};
use colored::*;
use tracing::{debug, info, warn};

use crate::commands::{ScanArgs, TargetArgs};
use crate::terminal::{colors, format, print, progress};
use crate::{input, output, sprint};
use subrecon_common::config::{RunConfig, RunConfigBuilder};
use subrecon_common::report::{ScanReport, ScanStats};
use subrecon_core::scanner::{self, ScanOutput};

type Detail = (String, ColoredString);

pub async fn scan(args: ScanArgs, quiet: bool) -> anyhow::Result<()> {
    let subdomains: Vec<String> = input::read_wordlist(&args.target.subdomains_file)?;
    let cfg: RunConfig = build_config(args.to_builder(subdomains))?;
    run(cfg, &args.target, quiet).await
}

pub async fn resolve(args: TargetArgs, quiet: bool) -> anyhow::Result<()> {
    let subdomains: Vec<String> = input::read_wordlist(&args.subdomains_file)?;
    let cfg: RunConfig = build_config(args.to_builder(subdomains))?;
    run(cfg, &args, quiet).await
}

fn build_config(builder: RunConfigBuilder) -> anyhow::Result<RunConfig> {
    let cfg: RunConfig = builder.build().context("Invalid scan configuration")?;
    debug!(
        "Configuration: {} names, concurrency {}, resolve timeout {:?}, probe timeout {:?}, deadline {:?}",
        cfg.targets.len(),
        cfg.concurrency,
        cfg.resolve_timeout,
        cfg.probe_timeout,
        cfg.deadline,
    );
    if cfg.targets.len() == 1 {
        warn!("Wordlist yielded no subdomains, only {} will be checked", cfg.targets.root());
    }
    Ok(cfg)
}

async fn run(cfg: RunConfig, args: &TargetArgs, quiet: bool) -> anyhow::Result<()> {
    print::header(if cfg.probing_enabled() { "starting scanner" } else { "starting resolver" });

    progress::start(quiet);
    let result = scanner::perform_scan(cfg, Some(Arc::new(progress::report_scan_progress))).await;
    progress::finish();

    let ScanOutput { report, stats } = result?;
    scan_ends(&report, &stats);
    output::write_report(&report, &args.output_file, args.pretty)
}

fn scan_ends(report: &ScanReport, stats: &ScanStats) {
    if stats.resolved == 0 {
        print::header("ZERO NAMES RESOLVED");
        print::no_results();
        return;
    }

    print::header("Subdomain Scan");
    print_names(report);
    print_summary(stats);
}

fn print_names(report: &ScanReport) {
    let resolved: Vec<&ScanReport> = report
        .iter_names()
        .filter(|entry| !entry.addresses.is_empty())
        .collect();

    for (idx, entry) in resolved.iter().enumerate() {
        print::tree_head(idx, &entry.name);
        let details: Vec<Detail> = format::addresses_to_detail(&entry.addresses);
        print::as_tree_one_level(details);
        if idx + 1 != resolved.len() {
            sprint!();
        }
    }
}

fn print_summary(stats: &ScanStats) {
    let found: ColoredString = format!("{} subdomains", stats.resolved).bold().green();
    let total_time: ColoredString = format!("{:.2}s", stats.elapsed.as_secs_f64()).bold().yellow();
    let output: ColoredString =
        format!("Found {found} in {total_time}").color(colors::TEXT_DEFAULT);

    print::fat_separator();
    print::centerln(&output.to_string());

    info!(
        "{} names, {} resolved, {} not found, {} timed out, {} failed",
        stats.names, stats.resolved, stats.not_found, stats.timed_out, stats.transient_failures
    );
    if stats.probes() > 0 {
        info!(
            "{} addresses, {} open, {} closed, {} filtered, {} probe errors",
            stats.addresses, stats.open, stats.closed, stats.filtered, stats.probe_errors
        );
    }
    if stats.deadline_hit {
        warn!("Deadline reached, {} tasks were skipped", stats.skipped);
    }
}
