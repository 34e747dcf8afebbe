//! Fixed-size worker pool with an explicit, per-call lifecycle
//!
//! A [`WorkerPool`] is created for one parallel call, receives a batch of
//! independent work items through [`WorkerPool::submit`], and hands back a
//! [`PendingBatch`] whose [`PendingBatch::join`] is the only blocking point.
//! Results come back in submission order regardless of which worker finished
//! first.

use crate::error::{Error, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use tracing::{debug, trace};

/// Slices handed out per worker; more than one keeps workers busy when
/// slices take uneven time.
const SLICES_PER_WORKER: usize = 4;

type SliceOutcome<R> = (usize, std::result::Result<Vec<R>, String>);

pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Start a pool of `workers` threads.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::InvalidWorkerCount);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("bdp-worker-{index}"))
            .build()?;

        debug!("Started worker pool with {} threads", workers);
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Scatter `items` over the pool and return without waiting.
    ///
    /// Items are cut into contiguous slices; each slice runs as one task and
    /// reports back with its slice index so [`PendingBatch::join`] can restore
    /// the original order.
    pub fn submit<T, R, F>(&self, items: Vec<T>, f: F) -> PendingBatch<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let total = items.len();
        let slice_len = slice_len(total, self.workers);
        let f = Arc::new(f);
        let (tx, rx) = mpsc::channel::<SliceOutcome<R>>();

        let mut slices = 0;
        let mut items = items.into_iter().peekable();
        while items.peek().is_some() {
            let slice: Vec<T> = items.by_ref().take(slice_len).collect();
            let index = slices;
            let f = Arc::clone(&f);
            let tx = tx.clone();

            self.pool.spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    slice.into_iter().map(|item| f(item)).collect::<Vec<R>>()
                }))
                .map_err(panic_message);
                // The receiver is gone only if the batch was dropped unjoined.
                let _ = tx.send((index, outcome));
            });

            slices += 1;
        }

        trace!(
            "Submitted {} items as {} slices of up to {}",
            total,
            slices,
            slice_len
        );

        PendingBatch { rx, slices, total }
    }

    /// Submit `items` and block until every result is available.
    pub fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        self.submit(items, f).join()
    }

    /// Release the pool's threads.
    pub fn shutdown(self) {
        debug!("Shutting down worker pool with {} threads", self.workers);
        drop(self.pool);
    }
}

/// Handle to work submitted to a [`WorkerPool`].
#[must_use = "a batch does nothing useful unless joined"]
pub struct PendingBatch<R> {
    rx: mpsc::Receiver<SliceOutcome<R>>,
    slices: usize,
    total: usize,
}

impl<R> PendingBatch<R> {
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Wait for every slice and return results in submission order.
    ///
    /// A panic in any slice fails the whole batch.
    pub fn join(self) -> Result<Vec<R>> {
        let mut parts: Vec<Option<Vec<R>>> = (0..self.slices).map(|_| None).collect();

        for _ in 0..self.slices {
            let (index, outcome) = self.rx.recv().map_err(|_| {
                Error::WorkerPanicked("worker exited without reporting a result".to_string())
            })?;
            parts[index] = Some(outcome.map_err(Error::WorkerPanicked)?);
        }

        let mut results = Vec::with_capacity(self.total);
        for part in parts.into_iter().flatten() {
            results.extend(part);
        }
        Ok(results)
    }
}

fn slice_len(total: usize, workers: usize) -> usize {
    total.div_ceil(workers * SLICES_PER_WORKER).max(1)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(Error::InvalidWorkerCount)));
    }

    #[test]
    fn test_map_preserves_submission_order() {
        let pool = WorkerPool::new(4).unwrap();
        // Early items sleep longest so they finish last.
        let results = pool
            .map((0..32u64).collect(), |n| {
                thread::sleep(Duration::from_millis(32 - n));
                n * 10
            })
            .unwrap();
        assert_eq!(results, (0..32u64).map(|n| n * 10).collect::<Vec<_>>());
        pool.shutdown();
    }

    #[test]
    fn test_empty_batch() {
        let pool = WorkerPool::new(2).unwrap();
        let batch = pool.submit(Vec::<u8>::new(), |b| b);
        assert!(batch.is_empty());
        assert!(batch.join().unwrap().is_empty());
    }

    #[test]
    fn test_more_workers_than_items() {
        let pool = WorkerPool::new(8).unwrap();
        let results = pool.map(vec!["a", "b"], |s| s.to_uppercase()).unwrap();
        assert_eq!(results, vec!["A", "B"]);
    }

    #[test]
    fn test_panic_fails_the_batch() {
        let pool = WorkerPool::new(2).unwrap();
        let err = pool
            .map((0..10).collect(), |n: i32| {
                if n == 7 {
                    panic!("bad item {n}");
                }
                n
            })
            .unwrap_err();
        match err {
            Error::WorkerPanicked(message) => assert!(message.contains("bad item 7")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_slice_len() {
        assert_eq!(slice_len(0, 4), 1);
        assert_eq!(slice_len(1, 4), 1);
        assert_eq!(slice_len(100, 4), 7);
        assert_eq!(slice_len(16, 4), 1);
    }
}
