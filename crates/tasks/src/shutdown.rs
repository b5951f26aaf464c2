//! One-shot cancellation shared by many tasks.

use tokio::sync::watch;

/// Observes a [`Signal`]. Clones observe the same signal.
#[derive(Debug, Clone)]
pub struct Shutdown(watch::Receiver<bool>);

impl Shutdown {
    /// Resolves once the signal is fired or dropped, and immediately on every later call.
    ///
    /// Cancel safe, so it can be raced in every iteration of a `select!` loop.
    pub async fn wait(&mut self) {
        let _ = self.0.wait_for(|fired| *fired).await;
    }
}

/// Fires the paired [`Shutdown`]s, either through [`Signal::fire`] or on drop.
#[derive(Debug)]
pub struct Signal(watch::Sender<bool>);

impl Signal {
    /// Fires the signal.
    pub fn fire(self) {
        self.0.send_replace(true);
    }
}

/// Creates a signal and its first observer.
pub fn signal() -> (Signal, Shutdown) {
    let (sender, receiver) = watch::channel(false);
    (Signal(sender), Shutdown(receiver))
}
