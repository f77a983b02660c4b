//! The central **coordinator** of a run.
//!
//! Resolution and port probing are scheduled on one fixed pool of workers that
//! drain one shared ready queue. Both kinds of work are ordinary items of that
//! queue, so the pool size is a single global ceiling: a long wordlist cannot
//! starve probing and a wide port list cannot starve resolution.
//!
//! **Architectural Note:**
//! Workers never schedule work themselves. Every task reports exactly one
//! [`TaskResult`] through a bounded MPSC funnel, and the single collector on
//! the other end owns all fan-out bookkeeping (outstanding count, addresses
//! already scheduled, deadline state). When the outstanding count reaches zero
//! the queue is closed and the workers drain out.
//!
//! The DNS backend and the prober are injected through the [`Lookup`] and
//! [`Probe`] traits; [`perform_scan`] wires the production ones.

use std::any::Any;
use std::collections::HashSet;
use std::net::IpAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_channel::{Receiver, Sender};
use futures::FutureExt;
use subrecon_common::config::RunConfig;
use subrecon_common::report::{PortOutcome, ProbeResult, ScanReport, ScanStats};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info, trace, warn};

use crate::network::dns::HickoryLookup;
use crate::network::tcp::TcpProber;
use crate::report::{self, Collected};

pub mod prober;
pub mod resolver;

use prober::{Probe, ProbeError};
use resolver::{Lookup, ResolveOutcome};

/// Snapshot handed to the progress callback after every finished task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub scheduled: usize,
}

pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub report: ScanReport,
    pub stats: ScanStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Resolve { idx: usize },
    Probe { ip: IpAddr, port: u16 },
}

#[derive(Debug)]
enum TaskResult {
    Resolved { idx: usize, outcome: ResolveOutcome },
    Probed { ip: IpAddr, port: u16, outcome: Result<PortOutcome, ProbeError> },
    /// Dequeued after the run deadline, never executed.
    Skipped(Task),
}

/// Executes a full resolution and port scan with the production backends.
///
/// Only fails when the DNS backend cannot be set up. Everything after that is
/// recorded in the report.
pub async fn perform_scan(
    cfg: RunConfig,
    on_progress: Option<ProgressCallback>,
) -> anyhow::Result<ScanOutput> {
    let lookup: HickoryLookup = HickoryLookup::new(&cfg)?;
    let mut scanner = Scanner::new(cfg, lookup, TcpProber);
    if let Some(callback) = on_progress {
        scanner = scanner.with_progress(callback);
    }
    Ok(scanner.run().await)
}

/// The scan coordinator.
pub struct Scanner<L, P> {
    cfg: Arc<RunConfig>,
    lookup: Arc<L>,
    prober: Arc<P>,
    on_progress: Option<ProgressCallback>,
}

impl<L, P> Scanner<L, P>
where
    L: Lookup + 'static,
    P: Probe + 'static,
{
    pub fn new(cfg: RunConfig, lookup: L, prober: P) -> Self {
        Self {
            cfg: Arc::new(cfg),
            lookup: Arc::new(lookup),
            prober: Arc::new(prober),
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Runs to completion (or to the deadline) and assembles the report.
    pub async fn run(&self) -> ScanOutput {
        let started: Instant = Instant::now();
        let names: usize = self.cfg.targets.len();
        info!(
            "Scanning {names} names with {} workers ({})",
            self.cfg.concurrency,
            match &self.cfg.ports {
                Some(ports) => format!("{} ports per address", ports.len()),
                None => "DNS only".to_string(),
            }
        );

        let (task_tx, task_rx) = async_channel::unbounded::<Task>();
        let (result_tx, result_rx) = mpsc::channel::<TaskResult>(self.cfg.concurrency);
        let draining: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));

        let workers: Vec<JoinHandle<()>> = (0..self.cfg.concurrency)
            .map(|_| {
                tokio::spawn(worker(
                    task_rx.clone(),
                    result_tx.clone(),
                    self.lookup.clone(),
                    self.prober.clone(),
                    self.cfg.clone(),
                    draining.clone(),
                ))
            })
            .collect();
        drop(result_tx);
        drop(task_rx);

        let collected: Collected = self.collect(&task_tx, result_rx, &draining).await;

        task_tx.close();
        for handle in workers {
            if let Err(e) = handle.await {
                error!("Scan worker terminated abnormally: {e}");
            }
        }

        let (report, mut stats) = report::assemble(&self.cfg, &collected);
        stats.elapsed = started.elapsed();
        ScanOutput { report, stats }
    }

    /// The single consumer of the result funnel.
    async fn collect(
        &self,
        task_tx: &Sender<Task>,
        mut result_rx: mpsc::Receiver<TaskResult>,
        draining: &AtomicBool,
    ) -> Collected {
        let mut collected = Collected::default();
        let mut scheduled_ips: HashSet<IpAddr> = HashSet::new();
        let mut outstanding: usize = 0;
        let mut completed: usize = 0;
        let mut scheduled: usize = 0;

        for idx in 0..self.cfg.targets.len() {
            if task_tx.try_send(Task::Resolve { idx }).is_ok() {
                outstanding += 1;
                scheduled += 1;
            }
        }

        let deadline: Option<Instant> = self.cfg.deadline.map(|d| Instant::now() + d);

        while outstanding > 0 {
            tokio::select! {
                result = result_rx.recv() => {
                    let Some(result) = result else {
                        error!("Result funnel closed with {outstanding} tasks outstanding");
                        break;
                    };
                    outstanding -= 1;
                    completed += 1;

                    let new_tasks: Vec<Task> = self.record(result, &mut collected, &mut scheduled_ips);
                    if !collected.deadline_hit {
                        for task in new_tasks {
                            if task_tx.try_send(task).is_ok() {
                                outstanding += 1;
                                scheduled += 1;
                            }
                        }
                    }

                    if let Some(callback) = &self.on_progress {
                        callback(Progress { completed, scheduled });
                    }
                }
                _ = wait_for(deadline), if !collected.deadline_hit => {
                    warn!("Run deadline reached, finishing in-flight tasks only");
                    collected.deadline_hit = true;
                    draining.store(true, Ordering::Release);
                }
            }
        }

        collected
    }

    /// Stores one result and returns the follow-up tasks it fans out to.
    fn record(
        &self,
        result: TaskResult,
        collected: &mut Collected,
        scheduled_ips: &mut HashSet<IpAddr>,
    ) -> Vec<Task> {
        match result {
            TaskResult::Resolved { idx, outcome } => {
                debug!("{}: {outcome}", self.cfg.targets.names()[idx]);

                let mut follow_up: Vec<Task> = Vec::new();
                if let Some(ports) = &self.cfg.ports {
                    for ip in outcome.addresses() {
                        if scheduled_ips.insert(*ip) {
                            follow_up.extend(ports.iter().map(|port| Task::Probe { ip: *ip, port }));
                        }
                    }
                }
                collected.resolutions.push((idx, outcome));
                follow_up
            }
            TaskResult::Probed { ip, port, outcome } => {
                match outcome {
                    Ok(outcome) => {
                        trace!("{ip}:{port} {outcome}");
                        collected.probes.push(ProbeResult { ip, port, outcome });
                    }
                    Err(e) => {
                        warn!("Probe of {ip}:{port} failed: {e}");
                        collected.probe_errors += 1;
                    }
                }
                Vec::new()
            }
            TaskResult::Skipped(task) => {
                trace!("Skipped {task:?} after deadline");
                collected.skipped += 1;
                Vec::new()
            }
        }
    }
}

async fn worker<L, P>(
    queue: Receiver<Task>,
    results: mpsc::Sender<TaskResult>,
    lookup: Arc<L>,
    prober: Arc<P>,
    cfg: Arc<RunConfig>,
    draining: Arc<AtomicBool>,
) where
    L: Lookup + ?Sized,
    P: Probe + ?Sized,
{
    while let Ok(task) = queue.recv().await {
        let result: TaskResult = if draining.load(Ordering::Acquire) {
            TaskResult::Skipped(task)
        } else {
            // Every dequeued task reports exactly one result, panics included.
            AssertUnwindSafe(execute(task, lookup.as_ref(), prober.as_ref(), &cfg))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| panicked(task, payload))
        };

        if results.send(result).await.is_err() {
            break;
        }
    }
}

async fn execute<L, P>(task: Task, lookup: &L, prober: &P, cfg: &RunConfig) -> TaskResult
where
    L: Lookup + ?Sized,
    P: Probe + ?Sized,
{
    match task {
        Task::Resolve { idx } => {
            let name = &cfg.targets.names()[idx];
            let outcome = resolver::resolve(lookup, name, cfg.resolve_timeout).await;
            TaskResult::Resolved { idx, outcome }
        }
        Task::Probe { ip, port } => {
            let outcome = match prober.probe(ip, port, cfg.probe_timeout).await {
                Err(e) => {
                    debug!("Retrying {ip}:{port} after probe error: {e}");
                    prober.probe(ip, port, cfg.probe_timeout).await
                }
                outcome => outcome,
            };
            TaskResult::Probed { ip, port, outcome }
        }
    }
}

/// Turns a panic inside a backend into the failed result of that task.
fn panicked(task: Task, payload: Box<dyn Any + Send>) -> TaskResult {
    let reason: String = payload
        .downcast_ref::<&str>()
        .map(|msg| msg.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    error!("{task:?} panicked: {reason}");

    match task {
        Task::Resolve { idx } => TaskResult::Resolved {
            idx,
            outcome: ResolveOutcome::TransientError(format!("lookup panicked: {reason}")),
        },
        Task::Probe { ip, port } => TaskResult::Probed {
            ip,
            port,
            outcome: Err(ProbeError::Panicked(reason)),
        },
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
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
