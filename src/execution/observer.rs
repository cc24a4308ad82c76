use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Events emitted by the engine while validating records.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { run_id: u64, records: usize },
    ChunkStarted { run_id: u64, start_record: usize, record_count: usize },
    ChunkFinished { run_id: u64, cell_errors: usize },
    RunFinished { metrics: ExecutionMetricsSnapshot },
}

pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Forwards execution events to `tracing` at trace/debug level.
#[derive(Debug, Default)]
pub struct TracingExecutionObserver;

impl ExecutionObserver for TracingExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::RunFinished { metrics } => {
                tracing::debug!(%metrics, "parallel validation finished")
            }
            other => tracing::trace!(event = ?other, "parallel validation"),
        }
    }
}

/// Engine-wide run bookkeeping.
///
/// Each run counts into its own [`RunCounters`], so runs sharing one engine never mix their
/// numbers. This handle only hands out run ids and keeps the snapshot of the last finished run.
pub struct ExecutionMetrics {
    runs_started: AtomicU64,
    runs_in_flight: AtomicUsize,
    last_run: Mutex<Option<ExecutionMetricsSnapshot>>,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            runs_started: AtomicU64::new(0),
            runs_in_flight: AtomicUsize::new(0),
            last_run: Mutex::new(None),
        }
    }

    pub(crate) fn start_run(&self) -> RunCounters {
        let run_id = self.runs_started.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.runs_in_flight.fetch_add(1, Ordering::SeqCst);
        RunCounters::new(run_id)
    }

    pub(crate) fn finish_run(&self, run: &RunCounters) -> ExecutionMetricsSnapshot {
        let snapshot = run.snapshot();
        let _ = self.runs_in_flight.fetch_sub(1, Ordering::SeqCst);
        *self.last_run.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        snapshot
    }

    /// Number of runs started on this engine.
    pub fn runs_started(&self) -> u64 {
        self.runs_started.load(Ordering::SeqCst)
    }

    /// Runs currently validating.
    pub fn runs_in_flight(&self) -> usize {
        self.runs_in_flight.load(Ordering::SeqCst)
    }

    /// Snapshot of the most recently finished run, if any.
    pub fn last_run(&self) -> Option<ExecutionMetricsSnapshot> {
        self.last_run.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExecutionMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionMetrics")
            .field("runs_started", &self.runs_started())
            .field("runs_in_flight", &self.runs_in_flight())
            .field("last_run", &self.last_run())
            .finish()
    }
}

/// Counters owned by a single run.
pub(crate) struct RunCounters {
    run_id: u64,
    started_at: Instant,
    records_validated: AtomicU64,
    cell_errors: AtomicU64,
    chunks_started: AtomicU64,
    chunks_finished: AtomicU64,
    active_chunks: AtomicUsize,
    max_active_chunks: AtomicUsize,
}

impl RunCounters {
    fn new(run_id: u64) -> Self {
        Self {
            run_id,
            started_at: Instant::now(),
            records_validated: AtomicU64::new(0),
            cell_errors: AtomicU64::new(0),
            chunks_started: AtomicU64::new(0),
            chunks_finished: AtomicU64::new(0),
            active_chunks: AtomicUsize::new(0),
            max_active_chunks: AtomicUsize::new(0),
        }
    }

    pub(crate) fn run_id(&self) -> u64 {
        self.run_id
    }

    pub(crate) fn record_validated(&self, cell_errors: usize) {
        let _ = self.records_validated.fetch_add(1, Ordering::Relaxed);
        let _ = self.cell_errors.fetch_add(cell_errors as u64, Ordering::Relaxed);
    }

    pub(crate) fn chunk_started(&self) {
        let _ = self.chunks_started.fetch_add(1, Ordering::Relaxed);
        let active = self.active_chunks.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.max_active_chunks.fetch_max(active, Ordering::SeqCst);
    }

    pub(crate) fn chunk_finished(&self) {
        let _ = self.chunks_finished.fetch_add(1, Ordering::Relaxed);
        let _ = self.active_chunks.fetch_sub(1, Ordering::SeqCst);
    }

    fn snapshot(&self) -> ExecutionMetricsSnapshot {
        ExecutionMetricsSnapshot {
            run_id: self.run_id,
            elapsed: self.started_at.elapsed(),
            records_validated: self.records_validated.load(Ordering::SeqCst),
            cell_errors: self.cell_errors.load(Ordering::SeqCst),
            chunks_started: self.chunks_started.load(Ordering::SeqCst),
            chunks_finished: self.chunks_finished.load(Ordering::SeqCst),
            max_active_chunks: self.max_active_chunks.load(Ordering::SeqCst),
        }
    }
}

/// Totals of one finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Duration,
    pub records_validated: u64,
    pub cell_errors: u64,
    pub chunks_started: u64,
    pub chunks_finished: u64,
    pub max_active_chunks: usize,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run {}: {} records, {} cell errors, {}/{} chunks (max {} concurrent) in {:?}",
            self.run_id,
            self.records_validated,
            self.cell_errors,
            self.chunks_finished,
            self.chunks_started,
            self.max_active_chunks,
            self.elapsed
        )
    }
}
