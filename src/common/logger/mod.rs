//! Tracing setup: coloured console output plus an optional capped log file.

use std::{fs, path::Path, sync::OnceLock};

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub mod formatter;
pub mod writer;

pub use formatter::EventFormatter;
pub use writer::{LineCappedWriter, strip_ansi_escapes};

use crate::configs::LoggingConfig;

/// Directives appended to every filter; reqwest's connection pool is noisy.
const QUIET_DEPENDENCIES: &str = "hyper_util=warn,reqwest=warn";

pub(crate) static LOG_FILE: OnceLock<LineCappedWriter> = OnceLock::new();

#[macro_export]
macro_rules! log_print {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        std::print!("{}", msg);
        $crate::common::logger::mirror_to_file(&msg);
    }};
}

#[macro_export]
macro_rules! log_println {
    () => {{
        std::println!();
        $crate::common::logger::mirror_to_file("\n");
    }};
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        std::println!("{}", msg);
        $crate::common::logger::mirror_to_file(&format!("{}\n", msg));
    }};
}

/// Copies console output that bypasses tracing into the log file, if any.
pub fn mirror_to_file(msg: &str) {
    if let Some(writer) = LOG_FILE.get() {
        writer.append(&strip_ansi_escapes(msg));
    }
}

/// Builds the filter string: `level`, then the quiet dependency
/// directives, then user `filters`.
pub fn filter_directives(config: Option<&LoggingConfig>) -> String {
    let level = config
        .and_then(|l| l.level.as_deref())
        .unwrap_or("info");
    let extra = config
        .and_then(|l| l.filters.as_deref())
        .map(str::trim)
        .unwrap_or("");

    if extra.is_empty() {
        format!("{level},{QUIET_DEPENDENCIES}")
    } else {
        format!("{level},{QUIET_DEPENDENCIES},{extra}")
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the config.
pub fn init(config: Option<&LoggingConfig>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let stdout_layer = fmt::layer()
        .event_format(EventFormatter::new(true))
        .with_ansi(true);

    let file_layer = config.and_then(|l| l.file.as_ref()).map(|file| {
        if let Some(parent) = Path::new(&file.path).parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Failed to create log directory {}: {}", parent.display(), e);
            }
        }

        let writer = LineCappedWriter::new(&file.path, file.max_lines);
        let _ = LOG_FILE.set(writer.clone());
        fmt::layer()
            .with_writer(writer)
            .event_format(EventFormatter::new(false))
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(filter_directives(None), "info,hyper_util=warn,reqwest=warn");
    }

    #[test]
    fn test_configured_directives() {
        let config = LoggingConfig {
            level: Some("debug".into()),
            filters: Some(" jukelink::audio=trace ".into()),
            file: None,
        };
        assert_eq!(
            filter_directives(Some(&config)),
            "debug,hyper_util=warn,reqwest=warn,jukelink::audio=trace"
        );
    }
}
