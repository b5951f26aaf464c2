use crate::{Tracer, TracerHandle};
use tracing_subscriber::EnvFilter;

/// Subscriber for tests: filtered by `RUST_LOG`, output captured per test by the harness.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct TestTracer;

impl Tracer for TestTracer {
    fn init(self) -> eyre::Result<TracerHandle> {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .map_err(|err| eyre::eyre!("failed to install the test subscriber: {err}"))?;
        Ok(TracerHandle::default())
    }
}
