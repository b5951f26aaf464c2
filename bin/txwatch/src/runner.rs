//! Entrypoint for running commands.

use std::{future::Future, pin::pin, sync::mpsc, time::Duration};
use tokio::runtime::Runtime;
use tracing::{debug, trace};

/// Runs a command future on a multi-threaded tokio runtime.
#[derive(Debug)]
pub(crate) struct CliRunner {
    runtime: Runtime,
}

impl CliRunner {
    /// Creates a runner on a new multi-threaded runtime with I/O and time drivers enabled.
    pub(crate) fn try_default_runtime() -> Result<Self, std::io::Error> {
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
        Ok(Self { runtime })
    }

    /// Runs `fut` to completion.
    pub(crate) fn run_to_completion<F>(self, fut: F) -> eyre::Result<()>
    where
        F: Future<Output = eyre::Result<()>>,
    {
        let res = self.runtime.block_on(fut);
        shutdown_runtime(self.runtime);
        res
    }

    /// Runs `fut` until it resolves or the process receives `SIGINT` or `SIGTERM`.
    ///
    /// The future is dropped on a signal, which tears down everything it owns.
    pub(crate) fn run_until_ctrl_c<F>(self, fut: F) -> eyre::Result<()>
    where
        F: Future<Output = eyre::Result<()>>,
    {
        let res = self.runtime.block_on(run_until_ctrl_c(fut));
        shutdown_runtime(self.runtime);
        res
    }
}

/// Dropping the runtime blocks until its pools are shut down, so it is dropped on a separate
/// thread and given up to 5 seconds.
fn shutdown_runtime(runtime: Runtime) {
    let (tx, rx) = mpsc::channel();
    let spawned = std::thread::Builder::new().name("tokio-runtime-shutdown".to_string()).spawn(
        move || {
            drop(runtime);
            let _ = tx.send(());
        },
    );
    if let Err(err) = spawned {
        debug!(target: "txwatch::cli", %err, "failed to spawn runtime shutdown thread");
        return
    }
    if let Err(err) = rx.recv_timeout(Duration::from_secs(5)) {
        debug!(target: "txwatch::cli", %err, "tokio runtime shutdown timed out");
    }
}

async fn run_until_ctrl_c<F>(fut: F) -> eyre::Result<()>
where
    F: Future<Output = eyre::Result<()>>,
{
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut stream = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        let sigterm = stream.recv();
        let sigterm = pin!(sigterm);
        let ctrl_c = pin!(ctrl_c);
        let fut = pin!(fut);

        tokio::select! {
            _ = ctrl_c => {
                trace!(target: "txwatch::cli", "Received ctrl-c");
            },
            _ = sigterm => {
                trace!(target: "txwatch::cli", "Received SIGTERM");
            },
            res = fut => res?,
        }
    }

    #[cfg(not(unix))]
    {
        let ctrl_c = pin!(ctrl_c);
        let fut = pin!(fut);

        tokio::select! {
            _ = ctrl_c => {
                trace!(target: "txwatch::cli", "Received ctrl-c");
            },
            res = fut => res?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_with_command_result() {
        let runner = CliRunner::try_default_runtime().unwrap();
        runner.run_until_ctrl_c(async { Ok(()) }).unwrap();

        let runner = CliRunner::try_default_runtime().unwrap();
        let err = runner.run_to_completion(async { Err(eyre::eyre!("boom")) }).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
