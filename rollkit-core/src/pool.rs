//! Bounded-concurrency job runner.
//!
//! [`TaskPool`] runs one asynchronous job per input item while keeping at
//! most `max_concurrency` jobs in flight. Dispatch is slot-gated: the job
//! function for an item is only invoked once a slot in the pool is free, so
//! the number of live jobs (and the external processes they spawn) never
//! exceeds the limit. Results come back in input order no matter which job
//! settles first.
//!
//! The first job to fail ends the run. Items that were not dispatched yet
//! are never started, and successful results gathered so far are dropped.
//! Jobs that are still running when the failure is observed are handled
//! according to [`SiblingPolicy`].

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::trace;

use crate::error::{Error, Result};

/// What happens to jobs that are still running when a sibling fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiblingPolicy {
    /// Running siblings finish in the background; their results are ignored.
    #[default]
    Detach,
    /// Running siblings are cancelled.
    Abort,
}

/// Runs jobs with a ceiling on how many are in flight at once.
#[derive(Debug, Clone)]
pub struct TaskPool {
    max_concurrency: NonZeroUsize,
    sibling_policy: SiblingPolicy,
}

impl TaskPool {
    pub fn new(max_concurrency: NonZeroUsize) -> Self {
        Self {
            max_concurrency,
            sibling_policy: SiblingPolicy::default(),
        }
    }

    /// Creates a pool from a plain integer limit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConcurrency`] when `max_concurrency` is zero.
    pub fn with_limit(max_concurrency: usize) -> Result<Self> {
        NonZeroUsize::new(max_concurrency)
            .map(Self::new)
            .ok_or(Error::InvalidConcurrency(max_concurrency))
    }

    /// Creates a pool sized to the number of logical CPUs.
    pub fn with_available_parallelism() -> Self {
        let cpus = NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN);
        Self::new(cpus)
    }

    pub fn with_sibling_policy(mut self, policy: SiblingPolicy) -> Self {
        self.sibling_policy = policy;
        self
    }

    #[inline]
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency.get()
    }

    #[inline]
    pub fn sibling_policy(&self) -> SiblingPolicy {
        self.sibling_policy
    }

    /// Runs `job` once per item and returns the results in input order.
    ///
    /// `job` receives the item and the full item list. It is called on the
    /// runner's task when the item is dispatched; the future it returns is
    /// spawned onto the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the error of the first job to fail, or [`Error::JobPanicked`]
    /// if a job panicked.
    pub async fn run<I, T, F, Fut>(&self, items: Vec<I>, mut job: F) -> Result<Vec<T>>
    where
        I: Clone + Send + Sync + 'static,
        T: Send + 'static,
        F: FnMut(I, Arc<[I]>) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let all: Arc<[I]> = Arc::from(items);
        let total = all.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let limit = self.max_concurrency.get();
        let mut results: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();
        let mut in_flight: JoinSet<(usize, Result<T>)> = JoinSet::new();

        for index in 0..total {
            if in_flight.len() >= limit {
                trace!(index, in_flight = in_flight.len(), "pool saturated, waiting for a slot");
                self.settle_next(&mut in_flight, &mut results).await?;
            }

            let future = job(all[index].clone(), Arc::clone(&all));
            in_flight.spawn(async move { (index, future.await) });
            trace!(index, in_flight = in_flight.len(), "dispatched job");
        }

        while !in_flight.is_empty() {
            self.settle_next(&mut in_flight, &mut results).await?;
        }

        Ok(results.into_iter().flatten().collect())
    }

    async fn settle_next<T: Send + 'static>(
        &self,
        in_flight: &mut JoinSet<(usize, Result<T>)>,
        results: &mut [Option<T>],
    ) -> Result<()> {
        let settled = match in_flight.join_next().await {
            Some(settled) => settled,
            None => return Ok(()),
        };

        match settled {
            Ok((index, Ok(value))) => {
                trace!(index, "job settled");
                results[index] = Some(value);
                Ok(())
            }
            Ok((index, Err(error))) => {
                trace!(index, "job failed");
                self.release_siblings(in_flight);
                Err(error)
            }
            Err(join_error) => {
                self.release_siblings(in_flight);
                Err(Error::JobPanicked(join_error.to_string()))
            }
        }
    }

    fn release_siblings<T: Send + 'static>(&self, in_flight: &mut JoinSet<(usize, Result<T>)>) {
        match self.sibling_policy {
            SiblingPolicy::Detach => in_flight.detach_all(),
            SiblingPolicy::Abort => in_flight.abort_all(),
        }
    }
}
