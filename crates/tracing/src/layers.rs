use crate::formatter::LogFormat;
use eyre::WrapErr;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// A boxed tracing [Layer].
pub(crate) type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Directive applied to file events of targets without an explicit filter.
const FILE_DEFAULT_DIRECTIVE: &str = "debug";

/// Daily rotated JSON log files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    dir: PathBuf,
    file_name: String,
    filters: String,
}

impl FileInfo {
    /// Writes `dir/file_name.<date>`, keeping `debug` and above.
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self { dir: dir.into(), file_name: file_name.into(), filters: String::new() }
    }

    /// Adds comma separated filter directives.
    pub fn with_filters(mut self, filters: impl Into<String>) -> Self {
        self.filters = filters.into();
        self
    }

    /// Creates the directory and a non-blocking writer whose guard must outlive the layer.
    pub(crate) fn layer(&self) -> eyre::Result<(BoxedLayer<Registry>, WorkerGuard)> {
        std::fs::create_dir_all(&self.dir)
            .wrap_err_with(|| format!("failed to create log directory {}", self.dir.display()))?;
        let appender = tracing_appender::rolling::daily(&self.dir, &self.file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let filter = env_filter(FILE_DEFAULT_DIRECTIVE, &self.filters)?;
        Ok((LogFormat::Json.layer(filter, false, Some(writer)), guard))
    }
}

/// `RUST_LOG` with a fallback directive, plus comma separated extra directives.
pub(crate) fn env_filter(default_directive: &str, directives: &str) -> eyre::Result<EnvFilter> {
    let filter = EnvFilter::builder()
        .with_default_directive(default_directive.parse()?)
        .from_env_lossy();

    directives
        .split(',')
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .try_fold(filter, |filter, directive| Ok(filter.add_directive(directive.parse()?)))
}
