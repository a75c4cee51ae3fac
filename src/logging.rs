use crate::error::Error;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber: bare status lines on stdout and, when
/// `log_file` is given, the same events in that file (truncated first).
///
/// The file is written through an unbuffered `File`, so every line reaches
/// the OS before the next event is processed.
pub fn init(log_file: Option<&Path>) -> Result<(), Error> {
    let file = match log_file {
        Some(path) => Some(File::create(path).map_err(|source| Error::LogFile {
            path: path.to_path_buf(),
            source,
        })?),
        None => None,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer()
        .without_time()
        .with_target(false)
        .with_level(false)
        .with_writer(std::io::stdout);
    let file_layer = file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
    Ok(())
}
