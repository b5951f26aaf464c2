use crate::layers::BoxedLayer;
use clap::ValueEnum;
use std::fmt;
use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter, Layer, Registry};

/// Output format of a log layer.
#[derive(Debug, Copy, Clone, ValueEnum, Eq, PartialEq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// `key=value` pairs.
    #[value(name = "logfmt")]
    LogFmt,
    /// Human readable.
    Terminal,
}

impl LogFormat {
    /// Builds a layer that writes to `writer`, or to stdout.
    ///
    /// Targets are printed only if `filter` lets through events below INFO.
    pub(crate) fn layer(
        self,
        filter: EnvFilter,
        ansi: bool,
        writer: Option<NonBlocking>,
    ) -> BoxedLayer<Registry> {
        let with_target = filter.max_level_hint().map_or(true, |max| max > tracing::Level::INFO);
        let make_writer = match writer {
            Some(writer) => BoxMakeWriter::new(writer),
            None => BoxMakeWriter::new(std::io::stdout),
        };

        match self {
            Self::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(make_writer)
                .with_target(true)
                .with_filter(filter)
                .boxed(),
            Self::LogFmt => tracing_logfmt::layer().with_filter(filter).boxed(),
            Self::Terminal => tracing_subscriber::fmt::layer()
                .with_writer(make_writer)
                .with_ansi(ansi)
                .with_target(with_target)
                .with_filter(filter)
                .boxed(),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => Ok(()),
        }
    }
}
