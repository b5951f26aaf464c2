//! Task management for the tracker's long-lived tasks.
//!
//! The tracker never calls `tokio::spawn` directly: it hands its scheduler, controller and workers
//! to a [`TaskSpawner`], and stops them through the [`shutdown`] signal pair.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

use futures_util::{future::BoxFuture, FutureExt};
use std::{any::Any, fmt, panic::AssertUnwindSafe};
use tokio::task::JoinHandle;
use tracing::error;

pub mod shutdown;

/// Spawns the tracker's tasks.
///
/// ```
/// # async fn t() {
/// use txwatch_tasks::{TaskSpawner, TokioTaskExecutor};
///
/// let executor = TokioTaskExecutor::default();
/// let task = executor.spawn_critical_task("scheduler", Box::pin(async {}));
/// task.await.unwrap();
/// # }
/// ```
pub trait TaskSpawner: Send + Sync + fmt::Debug {
    /// Spawns a task that must keep running for the tracker to make progress. A panic is
    /// reported as a [`PanickedTaskError`] under `name`.
    fn spawn_critical_task(&self, name: &'static str, fut: BoxFuture<'static, ()>)
        -> JoinHandle<()>;
}

/// Spawns onto the ambient tokio runtime.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct TokioTaskExecutor;

impl TaskSpawner for TokioTaskExecutor {
    fn spawn_critical_task(
        &self,
        name: &'static str,
        fut: BoxFuture<'static, ()>,
    ) -> JoinHandle<()> {
        tokio::task::spawn(AssertUnwindSafe(fut).catch_unwind().map(move |res| {
            if let Err(payload) = res {
                let err = PanickedTaskError::from_payload(name, payload.as_ref());
                error!(target: "tasks", task = name, %err, "critical task panicked");
            }
        }))
    }
}

/// A critical task panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanickedTaskError {
    task_name: &'static str,
    message: Option<String>,
}

impl PanickedTaskError {
    /// Extracts the message of a `panic!` payload, if it has one.
    fn from_payload(task_name: &'static str, payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| message.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned());
        Self { task_name, message }
    }

    /// Name the task was spawned with.
    pub fn task_name(&self) -> &'static str {
        self.task_name
    }

    /// The panic message.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for PanickedTaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task {} panicked", self.task_name)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for PanickedTaskError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn runs_critical_task() {
        let executor: Box<dyn TaskSpawner> = Box::new(TokioTaskExecutor::default());
        let (tx, rx) = tokio::sync::oneshot::channel();
        executor.spawn_critical_task(
            "scheduler",
            Box::pin(async move {
                let _ = tx.send(42);
            }),
        );
        assert_eq!(rx.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn critical_panic_is_caught() {
        let executor = TokioTaskExecutor::default();
        let handle =
            executor.spawn_critical_task("worker", Box::pin(async { panic!("worker gave up") }));
        tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
    }

    #[test]
    fn panic_payloads() {
        let err = PanickedTaskError::from_payload("worker", &"boom");
        assert_eq!(err.to_string(), "task worker panicked: boom");
        assert_eq!(err.message(), Some("boom"));

        let err = PanickedTaskError::from_payload("worker", &format!("code {}", 7));
        assert_eq!(err.to_string(), "task worker panicked: code 7");

        let err = PanickedTaskError::from_payload("controller", &7u8);
        assert_eq!(err.to_string(), "task controller panicked");
        assert_eq!(err.task_name(), "controller");
        assert_eq!(err.message(), None);
    }
}
