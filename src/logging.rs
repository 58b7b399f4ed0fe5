//! Log subscriber setup.
//!
//! Two `fmt` layers share one registry, each with its own filter and writer:
//!
//! - application log: `RUST_LOG` directives, everything except the `access` target
//! - access log: only the `access` target
//!
//! Each writes to stdout or appends to a file. ANSI colours are used only on
//! stdout.

use crate::api::middleware::access_log::ACCESS_TARGET;
use crate::config::Config;
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::sync::Arc;
use tracing_subscriber::filter::{self, FilterExt};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Clone)]
enum Sink {
    Stdout,
    File { path: String, file: Arc<File> },
}

impl Sink {
    fn open(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Stdout);
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file '{}'", path))?;

        Ok(Self::File {
            path: path.to_string(),
            file: Arc::new(file),
        })
    }

    fn writer(&self) -> BoxMakeWriter {
        match self {
            Self::Stdout => BoxMakeWriter::new(std::io::stdout),
            Self::File { file, .. } => BoxMakeWriter::new(file.clone()),
        }
    }

    fn is_stdout(&self) -> bool {
        matches!(self, Self::Stdout)
    }

    fn same_path(&self, other: Option<&str>) -> bool {
        matches!((self, other), (Self::File { path, .. }, Some(other)) if path == other)
    }
}

fn fmt_layer(sink: &Sink, json: bool) -> BoxedLayer {
    let layer = fmt::layer()
        .with_writer(sink.writer())
        .with_ansi(sink.is_stdout());

    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if a log file cannot be opened, `RUST_LOG` does not
/// parse, or a subscriber is already installed.
pub fn init(config: &Config) -> Result<()> {
    let json = config.log_format == "json";

    let app_sink = Sink::open(config.log_file.as_deref())?;
    let access_sink = if app_sink.same_path(config.access_log_file.as_deref()) {
        app_sink.clone()
    } else {
        Sink::open(config.access_log_file.as_deref())?
    };

    let env_filter = EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("Invalid RUST_LOG '{}'", config.log_level))?;

    let app_layer = fmt_layer(&app_sink, json)
        .with_filter(env_filter.and(filter::filter_fn(|meta| meta.target() != ACCESS_TARGET)))
        .boxed();

    let access_layer = fmt_layer(&access_sink, json)
        .with_filter(filter::filter_fn(|meta| meta.target() == ACCESS_TARGET))
        .boxed();

    Registry::default()
        .with(vec![app_layer, access_layer])
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(())
}
