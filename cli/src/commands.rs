pub mod scan;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use subrecon_common::config::{
    DEFAULT_CONCURRENCY, DEFAULT_PROBE_TIMEOUT, DEFAULT_RESOLVE_TIMEOUT, IpStrategy,
    PortVisibility, RunConfig, RunConfigBuilder,
};
use subrecon_common::network::ports::PortSpec;

#[derive(Parser)]
#[command(name = "subrecon", version)]
#[command(about = "Subdomain resolution and TCP port exposure scanner.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the target and its subdomains, then probe TCP ports on every address
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// Resolve the target and its subdomains only
    #[command(alias = "r")]
    Resolve(TargetArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Target domain
    #[arg(short, long)]
    pub target: String,

    /// Subdomain wordlist, one label per line
    #[arg(short, long, default_value = "./dns.txt")]
    pub subdomains_file: PathBuf,

    /// Where to write the JSON report ("-" for stdout)
    #[arg(short, long, default_value = "./port-scanner.json")]
    pub output_file: String,

    /// Number of concurrent workers, shared by resolution and probing
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// DNS server to query (e.g. 8.8.8.8:53), system configuration when omitted
    #[arg(short, long)]
    pub dns_resolver: Option<SocketAddr>,

    /// Per-name resolution timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_RESOLVE_TIMEOUT.as_millis() as u64)]
    pub resolve_timeout: u64,

    /// Overall run deadline in seconds; unfinished work is skipped after it
    #[arg(long)]
    pub deadline: Option<u64>,

    /// Query A records only
    #[arg(long)]
    pub ipv4_only: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Ports to probe (e.g. 22,80,443,8000-8100)
    #[arg(short, long)]
    pub ports: PortSpec,

    /// Per-port connect timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT.as_millis() as u64)]
    pub probe_timeout: u64,

    /// Also list ports that never answered
    #[arg(long)]
    pub show_filtered: bool,

    /// Also list ports that refused the connection
    #[arg(long)]
    pub show_closed: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl TargetArgs {
    /// Everything but the port settings.
    pub fn to_builder(&self, subdomains: Vec<String>) -> RunConfigBuilder {
        let ip_strategy = if self.ipv4_only {
            IpStrategy::Ipv4Only
        } else {
            IpStrategy::Ipv4AndIpv6
        };

        RunConfig::builder(self.target.clone())
            .subdomains(subdomains)
            .concurrency(self.concurrency)
            .resolve_timeout(Duration::from_millis(self.resolve_timeout))
            .deadline(self.deadline.map(Duration::from_secs))
            .dns_server(self.dns_resolver)
            .ip_strategy(ip_strategy)
    }
}

impl ScanArgs {
    pub fn to_builder(&self, subdomains: Vec<String>) -> RunConfigBuilder {
        self.target
            .to_builder(subdomains)
            .ports(Some(self.ports.clone()))
            .probe_timeout(Duration::from_millis(self.probe_timeout))
            .visibility(PortVisibility {
                filtered: self.show_filtered,
                closed: self.show_closed,
            })
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
