use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use hickory_resolver::config::{LookupIpStrategy, NameServerConfig, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::proto::{ProtoError, ProtoErrorKind};
use hickory_resolver::ResolveError;
use subrecon_common::config::{IpStrategy, RunConfig};
use subrecon_common::network::target::Name;

use crate::scanner::resolver::{Lookup, LookupError};

/// [`Lookup`] backed by an asynchronous hickory resolver.
pub struct HickoryLookup {
    resolver: TokioResolver,
}

impl HickoryLookup {
    /// Builds a resolver for the run.
    ///
    /// Uses `cfg.dns_server` when set, the system configuration otherwise.
    /// Hickory's own retries are disabled: retry policy belongs to the engine.
    pub fn new(cfg: &RunConfig) -> anyhow::Result<Self> {
        let mut builder = match cfg.dns_server {
            Some(server) => TokioResolver::builder_with_config(
                single_server_config(server),
                TokioConnectionProvider::default(),
            ),
            None => TokioResolver::builder(TokioConnectionProvider::default())
                .context("Failed to read system DNS configuration")?,
        };

        let opts = builder.options_mut();
        opts.timeout = cfg.resolve_timeout;
        opts.attempts = 1;
        opts.ip_strategy = match cfg.ip_strategy {
            IpStrategy::Ipv4Only => LookupIpStrategy::Ipv4Only,
            IpStrategy::Ipv4AndIpv6 => LookupIpStrategy::Ipv4AndIpv6,
        };

        Ok(Self {
            resolver: builder.build(),
        })
    }
}

#[async_trait]
impl Lookup for HickoryLookup {
    async fn lookup(&self, name: &Name) -> Result<Vec<IpAddr>, LookupError> {
        // Fully qualified, so search domains never apply.
        let fqdn: String = format!("{name}.");
        match self.resolver.lookup_ip(fqdn).await {
            Ok(lookup) => Ok(lookup.iter().collect()),
            Err(e) => Err(classify_resolve_error(&e)),
        }
    }
}

fn single_server_config(server: SocketAddr) -> ResolverConfig {
    let mut config = ResolverConfig::new();
    config.add_name_server(NameServerConfig::new(server, Protocol::Udp));
    config
}

fn classify_resolve_error(e: &ResolveError) -> LookupError {
    if e.is_nx_domain() || e.is_no_records_found() {
        return LookupError::NotFound;
    }
    match e.proto().map(ProtoError::kind) {
        Some(ProtoErrorKind::Timeout) => LookupError::Timeout,
        _ => LookupError::Transient(e.to_string()),
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
