//! Logging setup for txwatch processes.
//!
//! Library crates only emit [`tracing`] events. A binary installs the global subscriber once
//! through [`TxwatchTracer`]: a stdout layer in the chosen [`LogFormat`] and, optionally, daily
//! rotated JSON files described by [`FileInfo`]. Tests call [`init_test_tracing`].
//!
//! Every layer starts from `RUST_LOG`, falls back to a default directive for unlisted targets and
//! adds the extra comma separated directives it was given.
//!
//! ```no_run
//! use txwatch_tracing::{FileInfo, LayerInfo, LogFormat, Tracer, TxwatchTracer};
//!
//! fn main() -> eyre::Result<()> {
//!     let _handle = TxwatchTracer::new()
//!         .with_stdout(LayerInfo::new(LogFormat::Terminal, "tracker::scheduler=debug"))
//!         .with_file(FileInfo::new("/var/log/txwatch", "txwatch.log"))
//!         .init()?;
//!     Ok(())
//! }
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use tracing;
pub use tracing_subscriber;

pub use formatter::LogFormat;
pub use layers::FileInfo;
pub use test_tracer::TestTracer;

mod formatter;
mod layers;
mod test_tracer;

use crate::layers::{env_filter, BoxedLayer};
use eyre::WrapErr;
use std::io::IsTerminal;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

/// Directive applied to stdout events of targets without an explicit filter.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Format and filters of the stdout layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    format: LogFormat,
    default_directive: String,
    filters: String,
    ansi: bool,
}

impl LayerInfo {
    /// Logs in `format`, keeping [`DEFAULT_DIRECTIVE`] plus the comma separated `filters`, e.g.
    /// `tracker::worker=trace,chain::rpc=debug`.
    ///
    /// Colors are enabled when stdout is a terminal.
    pub fn new(format: LogFormat, filters: impl Into<String>) -> Self {
        Self {
            format,
            default_directive: DEFAULT_DIRECTIVE.to_string(),
            filters: filters.into(),
            ansi: std::io::stdout().is_terminal(),
        }
    }

    /// Replaces the directive for unlisted targets.
    pub fn with_default_directive(mut self, directive: impl Into<String>) -> Self {
        self.default_directive = directive.into();
        self
    }

    /// Forces colors on or off. Only terminal output is ever colored.
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    fn layer(&self) -> eyre::Result<BoxedLayer<Registry>> {
        let filter = env_filter(&self.default_directive, &self.filters)?;
        Ok(self.format.layer(filter, self.ansi, None))
    }
}

impl Default for LayerInfo {
    fn default() -> Self {
        Self::new(LogFormat::Terminal, "")
    }
}

/// Keeps the file writer alive. Events logged after it is dropped are not written to disk.
#[derive(Debug, Default)]
pub struct TracerHandle {
    /// Flushes the file layer on drop.
    pub file_guard: Option<WorkerGuard>,
}

/// Installs a global subscriber.
pub trait Tracer {
    /// Installs the subscriber. Fails if one is already installed.
    fn init(self) -> eyre::Result<TracerHandle>;
}

/// Subscriber of the txwatch binary.
#[derive(Debug, Clone, Default)]
pub struct TxwatchTracer {
    stdout: LayerInfo,
    file: Option<FileInfo>,
}

impl TxwatchTracer {
    /// Terminal output at [`DEFAULT_DIRECTIVE`], no files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stdout layer.
    pub fn with_stdout(mut self, stdout: LayerInfo) -> Self {
        self.stdout = stdout;
        self
    }

    /// Additionally writes JSON log files.
    pub fn with_file(mut self, file: FileInfo) -> Self {
        self.file = Some(file);
        self
    }
}

impl Tracer for TxwatchTracer {
    fn init(self) -> eyre::Result<TracerHandle> {
        let mut layers = vec![self.stdout.layer()?];
        let mut handle = TracerHandle::default();
        if let Some(file) = &self.file {
            let (layer, guard) = file.layer()?;
            layers.push(layer);
            handle.file_guard = Some(guard);
        }

        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .wrap_err("failed to install the tracing subscriber")?;
        Ok(handle)
    }
}

/// Installs [`TestTracer`] unless a subscriber is already installed.
pub fn init_test_tracing() {
    let _ = TestTracer::default().init();
}
