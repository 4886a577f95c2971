//! Bounded parallel execution for scan work
//!
//! A crossbeam-based worker pool with a shared wall-clock deadline. The
//! producer stops dispatching once the deadline passes and workers refuse to
//! start units received after it; units already running complete and
//! contribute their results.

use anyhow::Result;
use crossbeam::channel::{Receiver, Sender, bounded};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

/// Configuration for parallel processing
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Maximum number of worker threads (0 = auto-detect)
    pub max_threads: usize,
    /// Percentage of CPU cores to use (1-100)
    pub thread_percentage: u8,
    /// Channel buffer size multiplier (buffer = workers * multiplier)
    pub channel_buffer_multiplier: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_threads: 0,
            thread_percentage: 75,
            channel_buffer_multiplier: 2,
        }
    }
}

/// Outcome of a deadline-bounded parallel run
#[derive(Debug)]
pub struct PoolOutcome<R> {
    /// Results of completed units, in dispatch order.
    pub results: Vec<R>,
    /// Units never started because the deadline passed first.
    pub skipped: usize,
    /// True when the deadline cut the run short.
    pub timed_out: bool,
}

/// Calculate the worker count for a given amount of work
pub fn calculate_optimal_workers(config: &ParallelConfig, work_count: usize) -> usize {
    let cpu_cores = num_cpus::get();
    let max_by_percentage =
        std::cmp::max(1, (cpu_cores * config.thread_percentage as usize) / 100);

    let max_workers = if config.max_threads > 0 {
        std::cmp::min(config.max_threads, max_by_percentage)
    } else {
        max_by_percentage
    };

    // Don't create more workers than work items
    std::cmp::min(max_workers, work_count.max(1))
}

/// Process work items in parallel until done or until the deadline passes.
///
/// The deadline is a single monotonic `Instant` visible to the producer and
/// every worker. Once it passes, no new unit is dispatched or started;
/// in-flight units finish and their results are kept.
pub fn process_until<T, R, F>(
    work_items: Vec<T>,
    deadline: Option<Instant>,
    config: &ParallelConfig,
    worker_fn: F,
) -> Result<PoolOutcome<R>>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Send + Sync,
{
    let work_count = work_items.len();
    if work_count == 0 {
        return Ok(PoolOutcome {
            results: Vec::new(),
            skipped: 0,
            timed_out: false,
        });
    }

    let workers = calculate_optimal_workers(config, work_count);
    let expired = move || deadline.is_some_and(|d| Instant::now() >= d);

    let (work_tx, work_rx): (Sender<(usize, T)>, Receiver<(usize, T)>) =
        bounded(workers * config.channel_buffer_multiplier);
    let (result_tx, result_rx): (Sender<(usize, R)>, Receiver<(usize, R)>) =
        bounded(workers * config.channel_buffer_multiplier * 2);

    let skipped = AtomicUsize::new(0);
    let timed_out = AtomicBool::new(false);

    let indexed_results = crossbeam::thread::scope(|s| {
        let worker_fn = &worker_fn;
        let skipped = &skipped;
        let timed_out = &timed_out;

        for _ in 0..workers {
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();

            s.spawn(move |_| {
                while let Ok((index, item)) = work_rx.recv() {
                    // Queued units are not "in flight": a unit received after
                    // expiry is skipped, not started.
                    if expired() {
                        skipped.fetch_add(1, Ordering::Relaxed);
                        timed_out.store(true, Ordering::Relaxed);
                        continue;
                    }

                    let result = worker_fn(item);
                    if result_tx.send((index, result)).is_err() {
                        break; // Receiver dropped
                    }
                }
            });
        }

        // Producer: feed work to the pool, gated on the deadline.
        let producer_tx = work_tx.clone();
        s.spawn(move |_| {
            for (index, item) in work_items.into_iter().enumerate() {
                if expired() {
                    skipped.fetch_add(1, Ordering::Relaxed);
                    timed_out.store(true, Ordering::Relaxed);
                    continue;
                }
                if producer_tx.send((index, item)).is_err() {
                    break; // Workers dropped
                }
            }
        });

        // Drop the original senders so receivers know when work is done
        drop(work_tx);
        drop(result_tx);

        let mut results = Vec::with_capacity(work_count);
        while let Ok(result) = result_rx.recv() {
            results.push(result);
        }
        results
    })
    .map_err(|_| anyhow::anyhow!("Thread panic occurred during parallel processing"))?;

    let mut sorted_results = indexed_results;
    sorted_results.sort_by_key(|(index, _)| *index);

    Ok(PoolOutcome {
        results: sorted_results.into_iter().map(|(_, r)| r).collect(),
        skipped: skipped.load(Ordering::Relaxed),
        timed_out: timed_out.load(Ordering::Relaxed),
    })
}
