//! # Pagination Manager
//!
//! Runs pagination off the owner's context and keeps the page cache.
//!
//! ```text
//! request() ──► queue (newest wins) ──► spawn_blocking worker
//!                                            │
//!                  cache ◄── accept ◄── mpsc outcome
//! ```
//!
//! One job runs at a time. A new request cancels the running job and
//! replaces whatever was queued, so only the most recent request is
//! guaranteed to produce a result. Outcomes of older runs are dropped. The
//! cache is only touched when an outcome is accepted, on the owner's side of
//! the channel.

use crate::delegate::PaginationDelegate;
use crate::error::ManagerError;
use scriptform_pagination::{Cancelled, Pagination, PaginationSettings, Paginator};
use scriptform_parser::Screenplay;
use scriptform_styles::Styles;
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

/// Identifies one pagination request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An accepted pagination result
#[derive(Debug, Clone)]
pub struct Delivery {
    pub run: RunId,
    pub pagination: Arc<Pagination>,
}

#[derive(Debug)]
struct Request {
    run: RunId,
    screenplay: Arc<Screenplay>,
}

#[derive(Debug)]
struct RunningJob {
    run: RunId,
    cancel: CancellationToken,
}

enum JobResult {
    Finished(Pagination),
    Cancelled,
    Failed(ManagerError),
}

struct JobOutcome {
    run: RunId,
    result: JobResult,
}

pub struct PaginationManager<D: PaginationDelegate> {
    delegate: D,
    styles: Arc<Styles>,
    runtime: Handle,
    cache: Option<Arc<Pagination>>,
    next_run: u64,
    latest: Option<RunId>,
    running: Option<RunningJob>,
    queued: Option<Request>,
    /// Earliest changed line not yet reflected in the cache
    dirty_from: Option<usize>,
    outcomes_tx: mpsc::UnboundedSender<JobOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<JobOutcome>,
}

impl<D: PaginationDelegate> PaginationManager<D> {
    /// Create a manager bound to the current tokio runtime
    pub fn new(delegate: D, styles: Arc<Styles>) -> Result<Self, ManagerError> {
        let runtime = Handle::try_current()?;
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Ok(Self {
            delegate,
            styles,
            runtime,
            cache: None,
            next_run: 0,
            latest: None,
            running: None,
            queued: None,
            dirty_from: None,
            outcomes_tx,
            outcomes_rx,
        })
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    /// Last accepted pagination
    pub fn pagination(&self) -> Option<Arc<Pagination>> {
        self.cache.clone()
    }

    /// A job is running or waiting
    pub fn is_busy(&self) -> bool {
        self.running.is_some() || self.queued.is_some()
    }

    /// Replace the styles used for later runs.
    ///
    /// The cache stays until the next accepted run, which paginates from
    /// scratch because its styles differ.
    pub fn set_styles(&mut self, styles: Arc<Styles>) {
        self.styles = styles;
    }

    /// Drop the cache so the next run paginates from scratch
    pub fn invalidate(&mut self) {
        self.cache = None;
        self.dirty_from = None;
    }

    /// Ask for a pagination of `screenplay` after a change at line `change_at`
    #[instrument(skip(self, screenplay), fields(lines = screenplay.lines.len()))]
    pub fn request(&mut self, screenplay: Arc<Screenplay>, change_at: usize) -> RunId {
        self.next_run += 1;
        let run = RunId(self.next_run);
        self.latest = Some(run);
        self.dirty_from = Some(self.dirty_from.map_or(change_at, |line| line.min(change_at)));

        if let Some(replaced) = self.queued.replace(Request { run, screenplay }) {
            debug!(replaced = %replaced.run, by = %run, "Replaced queued pagination request");
        }
        if let Some(job) = &self.running {
            debug!(cancelled = %job.run, "Cancelling running pagination");
            job.cancel.cancel();
        } else if self.delegate.pagination_settings().live_pagination {
            self.start_queued();
        }
        run
    }

    /// Wait for the next accepted result.
    ///
    /// Returns `None` once nothing is running.
    pub async fn next_delivery(&mut self) -> Option<Delivery> {
        while self.running.is_some() {
            let outcome = self.outcomes_rx.recv().await?;
            if let Some(delivery) = self.accept(outcome) {
                return Some(delivery);
            }
        }
        None
    }

    /// Accept outcomes that already arrived without waiting
    pub fn poll(&mut self) -> Option<Delivery> {
        let mut delivered = None;
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            if let Some(delivery) = self.accept(outcome) {
                delivered = Some(delivery);
            }
        }
        delivered
    }

    /// Run everything requested so far to completion, export-only requests
    /// included, and return the resulting pagination
    pub async fn settle(&mut self) -> Option<Arc<Pagination>> {
        while self.is_busy() {
            if self.running.is_none() {
                self.start_queued();
            }
            self.next_delivery().await;
        }
        self.cache.clone()
    }

    fn start_queued(&mut self) {
        let Some(request) = self.queued.take() else {
            return;
        };

        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();
        let settings = self.delegate.pagination_settings();
        let styles = Arc::clone(&self.styles);
        let cache = self.cache.clone();
        let change_at = self.dirty_from.unwrap_or(0);
        let run = request.run;
        debug!(%run, change_at, incremental = cache.is_some(), "Starting pagination");

        let worker = self.runtime.spawn_blocking(move || {
            let is_cancelled = move || worker_cancel.is_cancelled();
            paginate_job(&request.screenplay, &styles, &settings, cache.as_deref(), change_at, &is_cancelled)
        });

        let outcomes = self.outcomes_tx.clone();
        self.runtime.spawn(async move {
            let result = match worker.await {
                Ok(Ok(pagination)) => JobResult::Finished(pagination),
                Ok(Err(Cancelled)) => JobResult::Cancelled,
                Err(join_error) => JobResult::Failed(ManagerError::from(join_error)),
            };
            // The manager may be gone; nobody is waiting then
            let _ = outcomes.send(JobOutcome { run, result });
        });

        self.running = Some(RunningJob { run, cancel });
    }

    fn accept(&mut self, outcome: JobOutcome) -> Option<Delivery> {
        if self.running.as_ref().is_some_and(|job| job.run == outcome.run) {
            self.running = None;
        }

        let delivery = match outcome.result {
            JobResult::Finished(pagination) if Some(outcome.run) == self.latest => {
                let pagination = Arc::new(pagination);
                self.cache = Some(Arc::clone(&pagination));
                self.dirty_from = None;
                info!(run = %outcome.run, pages = pagination.page_count(), "Pagination finished");
                self.delegate.pagination_finished(&pagination);
                Some(Delivery { run: outcome.run, pagination })
            }
            JobResult::Finished(_) => {
                debug!(run = %outcome.run, "Dropping stale pagination");
                None
            }
            JobResult::Cancelled => {
                debug!(run = %outcome.run, "Pagination cancelled");
                None
            }
            JobResult::Failed(failure) => {
                error!(run = %outcome.run, error = %failure, "Pagination failed");
                self.delegate.pagination_failed(&failure);
                None
            }
        };

        if self.running.is_none() && self.delegate.pagination_settings().live_pagination {
            self.start_queued();
        }
        delivery
    }
}

fn paginate_job(
    screenplay: &Screenplay,
    styles: &Styles,
    settings: &PaginationSettings,
    cache: Option<&Pagination>,
    change_at: usize,
    cancel: &dyn scriptform_pagination::CancelToken,
) -> Result<Pagination, Cancelled> {
    let paginator = Paginator::new(styles, settings);
    match cache {
        Some(cache) => paginator.paginate_incremental(screenplay, cache, change_at, cancel),
        None => paginator.paginate(screenplay, cancel),
    }
}
