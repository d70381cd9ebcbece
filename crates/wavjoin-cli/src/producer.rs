//! Bounded, order-preserving payload production.
//!
//! Each task is tagged with its submission index. Results are sent back as
//! they complete and placed into a fixed-size slot array by index, so the
//! returned vector is always in submission order no matter which worker
//! finished first.

use anyhow::{anyhow, Context, Result};
use std::sync::mpsc;

/// Default number of worker threads.
pub const DEFAULT_MAX_WORKERS: usize = 5;

/// Upper bound on worker threads.
pub const MAX_WORKERS_LIMIT: usize = 16;

/// Clamps a requested worker count to `1..=MAX_WORKERS_LIMIT`.
pub fn clamp_workers(requested: usize) -> usize {
    requested.clamp(1, MAX_WORKERS_LIMIT)
}

/// Runs `produce(index)` for every index in `0..count` on a pool of at most
/// `max_workers` threads and returns the results in index order.
pub fn produce_ordered<T, F>(count: usize, max_workers: usize, produce: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    if count == 0 {
        return Ok(Vec::new());
    }

    let workers = clamp_workers(max_workers).min(count);
    log::debug!("producing {} items on {} workers", count, workers);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("wavjoin-worker-{}", i))
        .build()
        .context("Failed to create worker pool")?;

    let (tx, rx) = mpsc::channel::<(usize, T)>();
    let produce = &produce;
    pool.scope(move |scope| {
        for index in 0..count {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let _ = tx.send((index, produce(index)));
            });
        }
    });

    let mut slots: Vec<Option<T>> = (0..count).map(|_| None).collect();
    for (index, value) in rx {
        slots[index] = Some(value);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or_else(|| anyhow!("no result for item {}", index)))
        .collect()
}
