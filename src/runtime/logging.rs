use std::sync::Mutex;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use super::rotating::RotatingFile;
use crate::config::{LogFormat, LoggingSettings};

type Base = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Base> + Send + Sync + 'static>;

fn fmt_layer<W>(writer: W, ansi: bool, format: LogFormat) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
    match format {
        LogFormat::Full => layer.boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured level. Depending on `mode`, events go
/// to stdout, to a size-rotated log file without ANSI colours, to both, or
/// nowhere.
pub fn init(settings: &LoggingSettings) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if settings.mode.to_console() {
        layers.push(fmt_layer(std::io::stdout, true, settings.format));
    }
    if settings.mode.to_file() {
        let file = RotatingFile::open(
            settings.file_path(),
            settings.max_file_size.saturating_mul(1024),
            settings.backup_count,
        )?;
        layers.push(fmt_layer(Mutex::new(file), false, settings.format));
    }
    if layers.is_empty() {
        return Ok(());
    }

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init();
    Ok(())
}
