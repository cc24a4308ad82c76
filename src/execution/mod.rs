//! Parallel record validation.
//!
//! Rule chains only read their own cell, so records can be validated independently. The
//! [`ExecutionEngine`] splits records into chunks, validates the chunks on a rayon pool, and
//! concatenates the per-chunk errors in chunk order, which yields exactly the sequential
//! row-major, declared-field ordering.

mod observer;

use std::fmt;
use std::sync::Arc;

use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::error::{ConfigError, ConfigResult};
use crate::schema::Schema;
use crate::types::Record;
use crate::validation::{CellError, validate_record};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, TracingExecutionObserver,
};

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of records per chunk.
    pub chunk_size: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self {
            num_threads: Some(n),
            chunk_size: 1_024,
        }
    }
}

/// Validates records on a dedicated thread pool.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl fmt::Debug for ExecutionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("opts", &self.opts)
            .field("threads", &self.pool.current_num_threads())
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// Fails if `chunk_size == 0`, `num_threads == Some(0)`, or the pool cannot be built.
    pub fn new(opts: ExecutionOptions) -> ConfigResult<Self> {
        if opts.chunk_size == 0 {
            return Err(ConfigError::InvalidExecution {
                message: "chunk_size must be > 0".to_string(),
            });
        }
        if opts.num_threads == Some(0) {
            return Err(ConfigError::InvalidExecution {
                message: "num_threads must be > 0 when set".to_string(),
            });
        }

        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1));

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("sheet-validate-{i}"))
            .build()?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run bookkeeping shared by every call on this engine.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.opts
    }

    /// Validate `records` against `schema` in parallel chunks.
    ///
    /// The result is identical to [`crate::validation::validate_records`].
    pub fn validate_records(&self, schema: &Schema, records: &[Record]) -> Vec<CellError> {
        self.validate_records_with_metrics(schema, records).0
    }

    /// Like [`validate_records`](Self::validate_records), also returning this run's own totals.
    ///
    /// Concurrent calls on one engine each get their own snapshot.
    pub fn validate_records_with_metrics(
        &self,
        schema: &Schema,
        records: &[Record],
    ) -> (Vec<CellError>, ExecutionMetricsSnapshot) {
        self.pool.install(|| self.validate_records_impl(schema, records))
    }

    fn validate_records_impl(&self, schema: &Schema, records: &[Record]) -> (Vec<CellError>, ExecutionMetricsSnapshot) {
        let run = self.metrics.start_run();
        let run_id = run.run_id();
        self.emit(ExecutionEvent::RunStarted {
            run_id,
            records: records.len(),
        });

        let per_chunk: Vec<Vec<CellError>> = records
            .par_chunks(self.opts.chunk_size)
            .enumerate()
            .map(|(chunk_idx, chunk)| {
                run.chunk_started();
                self.emit(ExecutionEvent::ChunkStarted {
                    run_id,
                    start_record: chunk_idx * self.opts.chunk_size,
                    record_count: chunk.len(),
                });

                let mut out = Vec::new();
                for record in chunk {
                    let mut errors = validate_record(schema, record);
                    run.record_validated(errors.len());
                    out.append(&mut errors);
                }

                self.emit(ExecutionEvent::ChunkFinished {
                    run_id,
                    cell_errors: out.len(),
                });
                run.chunk_finished();
                out
            })
            .collect();

        let cells = per_chunk.into_iter().flatten().collect::<Vec<_>>();

        let metrics = self.metrics.finish_run(&run);
        self.emit(ExecutionEvent::RunFinished {
            metrics: metrics.clone(),
        });

        (cells, metrics)
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExecutionEngine, ExecutionOptions};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::ConfigError;
    use crate::execution::{ExecutionEvent, ExecutionObserver, TracingExecutionObserver};
    use crate::rules::{RangeConfig, Rule, RuleChain, RuleConfig};
    use crate::schema::Schema;
    use crate::types::{Record, Value};
    use crate::validation::validate_records;

    fn schema() -> Schema {
        Schema::new(vec![
            RuleChain::new(
                "quantity",
                2,
                vec![
                    Rule::required(RuleConfig::default()),
                    Rule::number(RuleConfig::default()),
                    Rule::number_range(RangeConfig::new(1.0, 99999.0)).unwrap(),
                ],
            )
            .unwrap(),
        ])
        .unwrap()
    }

    // Every third record is invalid.
    fn records_of_n(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                let mut r = Record::new(i + 2);
                let v = if i % 3 == 0 { Value::Number(0.0) } else { Value::Number(i as f64) };
                r.insert("quantity", v);
                r
            })
            .collect()
    }

    #[test]
    fn parallel_output_matches_sequential_order() {
        let records = records_of_n(500);
        let engine = ExecutionEngine::new(ExecutionOptions {
            num_threads: Some(4),
            chunk_size: 7,
        })
        .unwrap();

        let parallel = engine.validate_records(&schema(), &records);
        let sequential = validate_records(&schema(), &records);
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.len(), 167);
        assert!(parallel.windows(2).all(|w| w[0].cell.row() < w[1].cell.row()));
    }

    struct ChunkCounter {
        finished: AtomicUsize,
    }

    impl ExecutionObserver for ChunkCounter {
        fn on_event(&self, event: &ExecutionEvent) {
            if let ExecutionEvent::ChunkFinished { .. } = event {
                let _ = self.finished.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn metrics_and_events_are_reported() {
        let records = records_of_n(100);
        let counter = Arc::new(ChunkCounter {
            finished: AtomicUsize::new(0),
        });
        let obs: Arc<dyn ExecutionObserver> = counter.clone();
        let engine = ExecutionEngine::new(ExecutionOptions {
            num_threads: Some(2),
            chunk_size: 10,
        })
        .unwrap()
        .with_observer(obs);
        let metrics = engine.metrics();

        let (cells, snap) = engine.validate_records_with_metrics(&schema(), &records);

        assert_eq!(metrics.last_run(), Some(snap.clone()));
        assert_eq!(metrics.runs_started(), 1);
        assert_eq!(metrics.runs_in_flight(), 0);
        assert_eq!(snap.run_id, 1);
        assert_eq!(snap.records_validated, 100);
        assert_eq!(snap.cell_errors, cells.len() as u64);
        assert_eq!(snap.chunks_started, 10);
        assert_eq!(snap.chunks_finished, 10);
        assert!(snap.max_active_chunks >= 1);
        assert_eq!(counter.finished.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn concurrent_runs_keep_their_own_totals() {
        let engine = ExecutionEngine::new(ExecutionOptions {
            num_threads: Some(4),
            chunk_size: 5,
        })
        .unwrap();
        let small = records_of_n(30);
        let large = records_of_n(600);

        let (a, b) = std::thread::scope(|s| {
            let a = s.spawn(|| engine.validate_records_with_metrics(&schema(), &small));
            let b = s.spawn(|| engine.validate_records_with_metrics(&schema(), &large));
            (a.join().unwrap(), b.join().unwrap())
        });

        assert_eq!(a.1.records_validated, 30);
        assert_eq!(a.1.cell_errors, a.0.len() as u64);
        assert_eq!(a.1.chunks_finished, 6);
        assert_eq!(b.1.records_validated, 600);
        assert_eq!(b.1.cell_errors, b.0.len() as u64);
        assert_eq!(b.1.chunks_finished, 120);
        assert_ne!(a.1.run_id, b.1.run_id);
        assert_eq!(engine.metrics().runs_started(), 2);
        assert_eq!(engine.metrics().runs_in_flight(), 0);
    }

    #[test]
    fn tracing_observer_does_not_change_results() {
        let records = records_of_n(20);
        let engine = ExecutionEngine::new(ExecutionOptions {
            num_threads: Some(2),
            chunk_size: 3,
        })
        .unwrap()
        .with_observer(Arc::new(TracingExecutionObserver));
        assert_eq!(
            engine.validate_records(&schema(), &records),
            validate_records(&schema(), &records)
        );
    }

    #[test]
    fn empty_input_is_fine() {
        let engine = ExecutionEngine::new(ExecutionOptions::default()).unwrap();
        assert!(engine.validate_records(&schema(), &[]).is_empty());
    }

    #[test]
    fn invalid_options_are_rejected() {
        let err = ExecutionEngine::new(ExecutionOptions {
            num_threads: Some(1),
            chunk_size: 0,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidExecution { .. }));

        assert!(ExecutionEngine::new(ExecutionOptions {
            num_threads: Some(0),
            chunk_size: 10,
        })
        .is_err());
    }
}
