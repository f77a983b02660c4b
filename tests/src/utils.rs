use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};

use async_trait::async_trait;
use subrecon_common::network::target::Name;
use subrecon_core::scanner::resolver::{Lookup, LookupError};
use tokio::net::TcpListener;

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// DNS double answering from a fixed table. Unlisted names are NXDOMAIN.
#[derive(Default)]
pub struct ScriptedLookup {
    answers: HashMap<String, Result<Vec<IpAddr>, LookupError>>,
}

impl ScriptedLookup {
    pub fn answer(mut self, name: &str, answer: Result<Vec<IpAddr>, LookupError>) -> Self {
        self.answers.insert(name.to_string(), answer);
        self
    }
}

#[async_trait]
impl Lookup for ScriptedLookup {
    async fn lookup(&self, name: &Name) -> Result<Vec<IpAddr>, LookupError> {
        self.answers
            .get(name.as_str())
            .cloned()
            .unwrap_or(Err(LookupError::NotFound))
    }
}

/// A listening loopback port. Keep the listener alive for the port to stay open.
pub async fn open_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// A loopback port nothing listens on any more.
pub async fn closed_port() -> u16 {
    let (listener, port) = open_port().await;
    drop(listener);
    port
}
