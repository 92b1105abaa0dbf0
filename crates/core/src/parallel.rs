//! Bounded worker pool shared by training, encoding and decoding.
//!
//! Every fan-out call blocks until all tasks have finished and returns results
//! in input order.

use crate::error::{Result, TokenizerError};
use rayon::prelude::*;
use std::sync::Arc;

/// Thread count meaning "use every hardware thread".
pub const ALL_THREADS: i32 = -1;

/// A dedicated rayon pool with a fixed number of workers.
#[derive(Clone)]
pub struct WorkerPool {
    pool: Arc<rayon::ThreadPool>,
}

impl WorkerPool {
    /// Build a pool with `threads` workers; `0` means all hardware threads.
    pub fn new(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("subtok-worker-{}", i))
            .build()
            .map_err(|e| TokenizerError::ThreadPool(e.to_string()))?;
        log::debug!("Started worker pool with {} threads", pool.current_num_threads());
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Build a pool from a user-facing thread count.
    ///
    /// `-1` selects all hardware threads and any value `>= 1` is used as is.
    pub fn from_thread_count(count: i32) -> Result<Self> {
        Self::new(resolve_thread_count(count)?)
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Apply `f` to every item, results in input order.
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        self.pool.install(|| items.par_iter().map(&f).collect())
    }

    /// Apply `f` to every item with mutable access, results in input order.
    pub fn map_mut<T, R, F>(&self, items: &mut [T], f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(&mut T) -> R + Sync + Send,
    {
        self.pool.install(|| items.par_iter_mut().map(&f).collect())
    }

    /// Fallible [`map`](Self::map). Any error fails the whole batch.
    pub fn try_map<T, R, F>(&self, items: &[T], f: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> Result<R> + Sync + Send,
    {
        self.pool.install(|| items.par_iter().map(&f).collect())
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads())
            .finish()
    }
}

/// Map a user-facing thread count to a rayon thread count (`0` = all).
pub fn resolve_thread_count(count: i32) -> Result<usize> {
    match count {
        ALL_THREADS => Ok(0),
        n if n >= 1 => Ok(n as usize),
        n => Err(TokenizerError::InvalidConfig(format!(
            "thread count must be -1 or at least 1, got {}",
            n
        ))),
    }
}
