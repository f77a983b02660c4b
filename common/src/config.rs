use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::network::ports::PortSpec;
use crate::network::target::TargetSet;

pub const DEFAULT_CONCURRENCY: usize = 64;
/// Upper bound for the worker pool, and so for open sockets at any instant.
pub const MAX_CONCURRENCY: usize = 4_096;
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_millis(1_000);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(1_000);

/// Which probe outcomes are rendered into a report's port lists.
///
/// Open ports are always rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortVisibility {
    pub filtered: bool,
    pub closed: bool,
}

/// Record types queried for every name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IpStrategy {
    /// A records only.
    Ipv4Only,
    /// A and AAAA records.
    #[default]
    Ipv4AndIpv6,
}

/// Read-only parameters of a single run.
///
/// Built once through [`RunConfig::builder`] and shared (behind an `Arc`)
/// with every task. Nothing mutates it after `build()`.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub targets: TargetSet,
    /// `None` means DNS-only mode.
    pub ports: Option<PortSpec>,
    pub concurrency: usize,
    pub resolve_timeout: Duration,
    pub probe_timeout: Duration,
    /// Overall run deadline. On expiry no new work is scheduled.
    pub deadline: Option<Duration>,
    pub visibility: PortVisibility,
    /// Custom UDP nameserver. Uses the system configuration when unset.
    pub dns_server: Option<SocketAddr>,
    pub ip_strategy: IpStrategy,
}

impl RunConfig {
    pub fn builder(target: impl Into<String>) -> RunConfigBuilder {
        RunConfigBuilder::new(target.into())
    }

    pub fn probing_enabled(&self) -> bool {
        self.ports.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct RunConfigBuilder {
    target: String,
    subdomains: Vec<String>,
    ports: Option<PortSpec>,
    concurrency: usize,
    resolve_timeout: Duration,
    probe_timeout: Duration,
    deadline: Option<Duration>,
    visibility: PortVisibility,
    dns_server: Option<SocketAddr>,
    ip_strategy: IpStrategy,
}

impl RunConfigBuilder {
    fn new(target: String) -> Self {
        Self {
            target,
            subdomains: Vec::new(),
            ports: None,
            concurrency: DEFAULT_CONCURRENCY,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            deadline: None,
            visibility: PortVisibility::default(),
            dns_server: None,
            ip_strategy: IpStrategy::default(),
        }
    }

    pub fn subdomains<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn ports(mut self, ports: Option<PortSpec>) -> Self {
        self.ports = ports;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn visibility(mut self, visibility: PortVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn dns_server(mut self, server: Option<SocketAddr>) -> Self {
        self.dns_server = server;
        self
    }

    pub fn ip_strategy(mut self, strategy: IpStrategy) -> Self {
        self.ip_strategy = strategy;
        self
    }

    /// Validates every parameter. Errors here are the only fatal errors of a run.
    pub fn build(self) -> Result<RunConfig, ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::ConcurrencyTooHigh {
                requested: self.concurrency,
                max: MAX_CONCURRENCY,
            });
        }
        if self.resolve_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("resolve timeout"));
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("probe timeout"));
        }
        if self.deadline.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::ZeroDuration("run deadline"));
        }

        let targets: TargetSet = TargetSet::build(&self.target, &self.subdomains)?;

        Ok(RunConfig {
            targets,
            ports: self.ports,
            concurrency: self.concurrency,
            resolve_timeout: self.resolve_timeout,
            probe_timeout: self.probe_timeout,
            deadline: self.deadline,
            visibility: self.visibility,
            dns_server: self.dns_server,
            ip_strategy: self.ip_strategy,
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
