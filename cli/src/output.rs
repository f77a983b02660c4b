use std::fs;
use std::io::Write;

use anyhow::Context;
use subrecon_common::report::ScanReport;
use tracing::info;

pub const STDOUT: &str = "-";

pub fn render(report: &ScanReport, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };
    json.context("Couldn't serialize report")
}

/// Writes the JSON report to `destination`, or stdout for `-`.
pub fn write_report(report: &ScanReport, destination: &str, pretty: bool) -> anyhow::Result<()> {
    let json: String = render(report, pretty)?;

    if destination == STDOUT {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{json}").context("Could not write report to stdout")?;
        return Ok(());
    }

    fs::write(destination, json.as_bytes())
        .with_context(|| format!("Could not write output to {destination}"))?;
    info!("Wrote output to {destination}");
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
