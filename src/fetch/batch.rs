//! Fixed-size batch scheduling
//!
//! Tasks are split into consecutive batches of `concurrency` up front. A batch
//! is dispatched as a unit and fully awaited before the next one starts, so a
//! single slow task holds back the following batch even when its peers have
//! finished. Batches are not refilled as tasks complete.

use futures::future::join_all;
use std::future::Future;
use tracing::trace;

/// Results of a scheduled run, in task order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRun<T> {
    pub outputs: Vec<T>,
    pub batches: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct BatchScheduler {
    concurrency: usize,
}

impl BatchScheduler {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Number of batches `task_count` tasks are split into.
    pub fn batch_count(&self, task_count: usize) -> usize {
        task_count.div_ceil(self.concurrency)
    }

    /// Run batches in order, stopping after the first batch that contains an
    /// error. The whole batch still completes before the error is returned.
    pub async fn try_run<F, T, E>(&self, tasks: Vec<F>) -> Result<BatchRun<T>, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let mut outputs = Vec::with_capacity(tasks.len());
        let mut batches = 0;
        let mut tasks = tasks.into_iter();

        loop {
            let batch: Vec<F> = tasks.by_ref().take(self.concurrency).collect();
            if batch.is_empty() {
                break;
            }
            batches += 1;
            trace!("Dispatching batch {} ({} tasks)", batches, batch.len());
            for result in join_all(batch).await {
                outputs.push(result?);
            }
        }

        Ok(BatchRun { outputs, batches })
    }
}
