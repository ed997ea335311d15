use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static LOG_GUARD: OnceCell<Mutex<WorkerGuard>> = OnceCell::new();

/// Initialise logging to stderr and, when `log_file` is set, to that file.
///
/// With `debug` off the level is forced to `info` regardless of `RUST_LOG`.
/// With `debug` on, `RUST_LOG` may override the default `debug` level.
/// Calling this again after a subscriber is installed does nothing.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let level = if debug { "debug" } else { "info" };
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let mut guard = None;
    let file_layer = log_file.and_then(|path| {
        let file_name = path.file_name()?.to_owned();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (writer, worker) = tracing_appender::non_blocking(appender);
        guard = Some(worker);
        Some(fmt::layer().with_ansi(false).with_writer(writer))
    });

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .is_ok();

    if let (true, Some(worker)) = (installed, guard) {
        let _ = LOG_GUARD.set(Mutex::new(worker));
    }
}
