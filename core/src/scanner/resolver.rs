use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use subrecon_common::network::target::Name;
use tokio::time::timeout;
use tracing::debug;

/// Failure reported by a lookup backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// NXDOMAIN, or the name exists without A/AAAA records.
    NotFound,
    /// The backend gave up waiting for an answer.
    Timeout,
    /// Anything else the resolution infrastructure reports.
    Transient(String),
}

/// A DNS backend able to turn one name into addresses.
///
/// Implementations only perform the lookup. Timeouts, retries and
/// deduplication are applied on top by [`resolve`].
#[async_trait]
pub trait Lookup: Send + Sync {
    async fn lookup(&self, name: &Name) -> Result<Vec<IpAddr>, LookupError>;
}

/// Classified result of resolving one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Unique addresses in the order they were discovered. Never empty.
    Resolved(Vec<IpAddr>),
    NotFound,
    Timeout,
    /// Still failing after the retry.
    TransientError(String),
}

impl ResolveOutcome {
    pub fn addresses(&self) -> &[IpAddr] {
        match self {
            ResolveOutcome::Resolved(ips) => ips,
            _ => &[],
        }
    }
}

impl fmt::Display for ResolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveOutcome::Resolved(ips) => write!(f, "{} address(es)", ips.len()),
            ResolveOutcome::NotFound => f.write_str("not found"),
            ResolveOutcome::Timeout => f.write_str("timed out"),
            ResolveOutcome::TransientError(reason) => write!(f, "error: {reason}"),
        }
    }
}

/// Resolves `name` within `resolve_timeout`.
///
/// A transient failure is retried exactly once with the same timeout.
/// Never fails, every problem ends up as a [`ResolveOutcome`] variant.
pub async fn resolve<L>(lookup: &L, name: &Name, resolve_timeout: Duration) -> ResolveOutcome
where
    L: Lookup + ?Sized,
{
    match attempt(lookup, name, resolve_timeout).await {
        ResolveOutcome::TransientError(reason) => {
            debug!("Retrying {name} after transient failure: {reason}");
            attempt(lookup, name, resolve_timeout).await
        }
        outcome => outcome,
    }
}

async fn attempt<L>(lookup: &L, name: &Name, resolve_timeout: Duration) -> ResolveOutcome
where
    L: Lookup + ?Sized,
{
    match timeout(resolve_timeout, lookup.lookup(name)).await {
        Ok(Ok(ips)) => {
            let unique: Vec<IpAddr> = dedup_in_order(ips);
            if unique.is_empty() {
                ResolveOutcome::NotFound
            } else {
                ResolveOutcome::Resolved(unique)
            }
        }
        Ok(Err(LookupError::NotFound)) => ResolveOutcome::NotFound,
        Ok(Err(LookupError::Timeout)) | Err(_) => ResolveOutcome::Timeout,
        Ok(Err(LookupError::Transient(reason))) => ResolveOutcome::TransientError(reason),
    }
}

fn dedup_in_order(ips: Vec<IpAddr>) -> Vec<IpAddr> {
    let mut seen: HashSet<IpAddr> = HashSet::with_capacity(ips.len());
    ips.into_iter().filter(|ip| seen.insert(*ip)).collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays scripted answers, one per call; the last one repeats.
    struct Scripted {
        answers: Mutex<Vec<Result<Vec<IpAddr>, LookupError>>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(answers: Vec<Result<Vec<IpAddr>, LookupError>>) -> Self {
            Self {
                answers: Mutex::new(answers),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Lookup for Scripted {
        async fn lookup(&self, _name: &Name) -> Result<Vec<IpAddr>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut answers = self.answers.lock().unwrap();
            if answers.len() > 1 {
                answers.remove(0)
            } else {
                answers[0].clone()
            }
        }
    }

    struct Hanging;

    #[async_trait]
    impl Lookup for Hanging {
        async fn lookup(&self, _name: &Name) -> Result<Vec<IpAddr>, LookupError> {
            std::future::pending().await
        }
    }

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    fn name() -> Name {
        Name::new("www.example.com").unwrap()
    }

    const TIMEOUT: Duration = Duration::from_millis(500);

    #[tokio::test]
    async fn duplicates_are_removed_in_discovery_order() {
        let lookup = Scripted::new(vec![Ok(vec![ip(3), ip(1), ip(3), ip(2), ip(1)])]);
        let outcome = resolve(&lookup, &name(), TIMEOUT).await;
        assert_eq!(outcome, ResolveOutcome::Resolved(vec![ip(3), ip(1), ip(2)]));
    }

    #[tokio::test]
    async fn empty_answer_is_not_found() {
        let lookup = Scripted::new(vec![Ok(vec![])]);
        assert_eq!(resolve(&lookup, &name(), TIMEOUT).await, ResolveOutcome::NotFound);

        let lookup = Scripted::new(vec![Err(LookupError::NotFound)]);
        assert_eq!(resolve(&lookup, &name(), TIMEOUT).await, ResolveOutcome::NotFound);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_failure_is_retried_once() {
        let lookup = Scripted::new(vec![
            Err(LookupError::Transient("servfail".into())),
            Ok(vec![ip(7)]),
        ]);
        let outcome = resolve(&lookup, &name(), TIMEOUT).await;
        assert_eq!(outcome, ResolveOutcome::Resolved(vec![ip(7)]));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn persistent_transient_failure_gives_up_after_retry() {
        let lookup = Scripted::new(vec![Err(LookupError::Transient("refused".into()))]);
        let outcome = resolve(&lookup, &name(), TIMEOUT).await;
        assert_eq!(outcome, ResolveOutcome::TransientError("refused".into()));
        assert!(outcome.addresses().is_empty());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn backend_timeout_is_not_retried() {
        let lookup = Scripted::new(vec![Err(LookupError::Timeout)]);
        assert_eq!(resolve(&lookup, &name(), TIMEOUT).await, ResolveOutcome::Timeout);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_backend_times_out_after_configured_duration() {
        let started = tokio::time::Instant::now();
        let outcome = resolve(&Hanging, &name(), TIMEOUT).await;
        assert_eq!(outcome, ResolveOutcome::Timeout);
        let elapsed = started.elapsed();
        assert!(elapsed >= TIMEOUT && elapsed < TIMEOUT + Duration::from_millis(5));
    }
}
