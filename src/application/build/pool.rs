//! A bounded-concurrency pool for independent, fallible build tasks.
//!
//! Tasks never depend on each other and never share mutable state, so the
//! pool needs no locking: each task's outcome is produced exactly once, by
//! the worker that executed it, and the full outcome list is returned
//! synchronously from [`Pool::run`].

use std::num::NonZeroUsize;

use futures::{StreamExt, future::BoxFuture, stream};

use super::TaskError;

/// A unit of work wrapping a zero-argument fallible operation, labelled with
/// the unit it renders so failures can be reported meaningfully.
pub struct Task {
    label: String,
    job: BoxFuture<'static, Result<(), TaskError>>,
}

impl Task {
    pub fn new<F>(label: impl Into<String>, job: F) -> Self
    where
        F: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            label: label.into(),
            job: Box::pin(job),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// The terminal result of one task.
pub struct TaskOutcome {
    pub label: String,
    pub result: Result<(), TaskError>,
}

/// All task outcomes from one pool run, in completion order.
pub struct TaskResults {
    outcomes: Vec<TaskOutcome>,
}

impl TaskResults {
    pub fn has_errors(&self) -> bool {
        self.outcomes.iter().any(|outcome| outcome.result.is_err())
    }

    pub fn errors(&self) -> impl Iterator<Item = (&str, &TaskError)> {
        self.outcomes.iter().filter_map(|outcome| {
            outcome
                .result
                .as_ref()
                .err()
                .map(|err| (outcome.label.as_str(), err))
        })
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Executes a fixed list of tasks with at most `concurrency` in flight.
pub struct Pool {
    tasks: Vec<Task>,
    concurrency: NonZeroUsize,
}

impl Pool {
    pub fn new(tasks: Vec<Task>, concurrency: NonZeroUsize) -> Self {
        Self { tasks, concurrency }
    }

    /// Drive every task to completion and return the collected outcomes.
    ///
    /// A task's failure never cancels its siblings; all submitted tasks run
    /// exactly once regardless of earlier errors, and this returns only
    /// after the last one finishes.
    pub async fn run(self) -> TaskResults {
        let concurrency = self.concurrency.get();
        let outcomes = stream::iter(self.tasks)
            .map(|task| async move {
                let Task { label, job } = task;
                let result = job.await;
                TaskOutcome { label, result }
            })
            .buffer_unordered(concurrency)
            .collect::<Vec<_>>()
            .await;

        TaskResults { outcomes }
    }
}
