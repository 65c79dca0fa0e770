// src/core/scanner/mod.rs

// Public interface of the `scanner` module: the pipeline orchestrator plus
// the individual stages it drives.
pub mod content_scanner;
pub mod dns_scanner;
pub mod http_scanner;
pub mod takeover_scanner;
pub mod target_scanner;

use crate::config::ScanConfig;
use crate::core::models::{Document, ProbeOutcome, ScanReport};
use crate::core::storage::{DocumentStore, StoreError};
use self::dns_scanner::UpstreamResolver;
use self::http_scanner::{Prober, build_client};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Default number of concurrent fetch workers.
pub const DEFAULT_WORKERS: usize = 100;

/// Runs a bounded pool of fetch-and-extract workers over a candidate set.
pub struct ScanPipeline {
    prober: Arc<Prober>,
    workers: usize,
}

impl ScanPipeline {
    /// # Arguments
    /// * `prober` - The worker logic shared by every task.
    /// * `workers` - Upper bound on concurrent fetches; zero is treated as one.
    pub fn new(prober: Prober, workers: usize) -> Self {
        Self {
            prober: Arc::new(prober),
            workers: workers.max(1),
        }
    }

    /// Wires the HTTP client and upstream CNAME resolver described by `config`.
    pub fn from_config(config: &ScanConfig) -> reqwest::Result<Self> {
        let client = build_client(config.http_timeout(), &config.user_agent)?;
        let resolver = UpstreamResolver::new(config.dns_upstream, config.dns_timeout());
        Ok(Self::new(Prober::new(client, Arc::new(resolver)), config.workers))
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Probes every candidate and returns once all of them have finished.
    ///
    /// `min(workers, candidates)` tasks are spawned on a `JoinSet`. They pull
    /// candidates from a shared job queue and push one outcome per candidate,
    /// kept or dropped, into a bounded result channel owned by this call.
    /// The call returns after the channel has closed, i.e. after every worker
    /// has drained the queue and exited, and after every task is joined.
    ///
    /// Result order follows completion, not input order.
    ///
    /// # Arguments
    /// * `candidates` - The expanded target set. Each document is moved into
    ///   exactly one worker.
    ///
    /// # Returns
    /// A `ScanReport` with the kept documents and the dropped targets.
    pub async fn run(&self, candidates: Vec<Document>) -> ScanReport {
        let total = candidates.len();
        if total == 0 {
            debug!("No candidates, nothing to scan.");
            return ScanReport::default();
        }

        let pool = self.workers.min(total);
        info!(candidates = total, workers = pool, "Starting scan pipeline.");

        // The job queue holds the whole batch up front, so filling it never waits.
        let (job_tx, job_rx) = mpsc::channel::<Document>(total);
        for candidate in candidates {
            if job_tx.send(candidate).await.is_err() {
                // Unreachable while `job_rx` is alive in this scope.
                error!("Job queue closed before dispatch finished.");
                break;
            }
        }
        drop(job_tx);
        let job_rx = Arc::new(Mutex::new(job_rx));

        let (result_tx, mut result_rx) = mpsc::channel::<ProbeOutcome>(pool);
        let mut tasks = JoinSet::new();
        for worker_id in 0..pool {
            let jobs = Arc::clone(&job_rx);
            let results = result_tx.clone();
            let prober = Arc::clone(&self.prober);
            tasks.spawn(async move {
                let mut handled = 0usize;
                loop {
                    // Hold the lock only while taking the next job.
                    let next = { jobs.lock().await.recv().await };
                    let Some(candidate) = next else { break };
                    let outcome = prober.probe(candidate).await;
                    handled += 1;
                    if results.send(outcome).await.is_err() {
                        break;
                    }
                }
                debug!(worker_id, handled, "Worker finished.");
            });
        }
        // Only the workers hold senders now; the channel closes when the last exits.
        drop(result_tx);

        let mut report = ScanReport {
            candidates: total,
            ..Default::default()
        };
        while let Some(outcome) = result_rx.recv().await {
            match outcome {
                ProbeOutcome::Kept(doc) => report.documents.push(*doc),
                ProbeOutcome::Dropped(dropped) => {
                    debug!(url = %dropped.url, reason = %dropped.reason, "Candidate dropped.");
                    report.dropped.push(dropped);
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Scan worker task failed.");
            }
        }

        if report.finished() != total {
            warn!(
                candidates = total,
                finished = report.finished(),
                "Some candidates did not report an outcome."
            );
        }
        info!(
            candidates = total,
            kept = report.documents.len(),
            dropped = report.dropped.len(),
            "Scan pipeline finished."
        );
        report
    }

    /// Runs the pipeline and persists every kept document with one
    /// `insert_many`.
    ///
    /// Storage failures are returned as-is; nothing is retried.
    pub async fn scan_and_store<S>(&self, candidates: Vec<Document>, store: &S) -> Result<ScanReport, StoreError>
    where
        S: DocumentStore + ?Sized,
    {
        let report = self.run(candidates).await;
        if !report.documents.is_empty() {
            store.insert_many(report.documents.clone()).await?;
            info!(stored = report.documents.len(), "Scan results persisted.");
        }
        Ok(report)
    }
}
