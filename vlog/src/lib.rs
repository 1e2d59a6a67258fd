#![deny(unused_crate_dependencies)]

//! Logging setup shared by the deployer crates.
//!
//! The macros behave like `tracing::info`, `tracing::warn` and friends. `warn!` and
//! `error!` also record the file, line and column of the call site.
//!
//! All output goes to `stderr` so that `stdout` carries only the results a command
//! prints on purpose. The format is `plain` or `json` and is picked by the
//! `MISC_LOG_FORMAT` env variable; filtering follows `RUST_LOG`.
//!
//! Errors are reported to Sentry if `MISC_SENTRY_URL` holds a valid DSN
//! <https://docs.sentry.io/platforms/rust/>

use std::{borrow::Cow, str::FromStr};

use sentry::{types::Dsn, ClientInitGuard};
use std::backtrace::Backtrace;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use chrono as __chrono;
pub use sentry as __sentry;
pub use tracing as __tracing;
pub use tracing::{debug, info, trace};

const LOG_FORMAT: &str = "MISC_LOG_FORMAT";
const SENTRY_URL: &str = "MISC_SENTRY_URL";

/// Log a warning together with the location it was emitted from.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::__tracing::warn!(
            file = file!(),
            line = line!(),
            column = column!(),
            $($arg)*
        )
    };
}

/// Log an error together with the location it was emitted from.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::__tracing::error!(
            file = file!(),
            line = line!(),
            column = column!(),
            $($arg)*
        )
    };
}

fn get_sentry_url() -> Option<Dsn> {
    if let Ok(sentry_url) = std::env::var(SENTRY_URL) {
        if let Ok(sentry_url) = Dsn::from_str(sentry_url.as_str()) {
            return Some(sentry_url);
        }
    }
    None
}

/// Supported log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable lines.
    Plain,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(format!("{LOG_FORMAT} has an unexpected value {other}")),
        }
    }
}

/// Initialize logging with tracing and set up log format.
///
/// `environment` is attached to Sentry events, usually the name of the network
/// being deployed to. Returns a sentry client guard if `MISC_SENTRY_URL` is set,
/// see <https://docs.sentry.io/platforms/rust/#configure>
///
/// An unknown `MISC_LOG_FORMAT` falls back to `plain` and is reported once the
/// subscriber is up.
#[must_use]
pub fn init(environment: Option<&str>) -> Option<ClientInitGuard> {
    let requested = std::env::var(LOG_FORMAT).unwrap_or_else(|_| "plain".to_string());
    let parsed = requested.parse::<LogFormat>();

    match parsed.clone().unwrap_or(LogFormat::Plain) {
        LogFormat::Plain => {
            tracing_subscriber::registry()
                .with(fmt::Layer::default().with_writer(std::io::stderr))
                .with(tracing_subscriber::EnvFilter::from_default_env())
                .init();
        }
        LogFormat::Json => {
            let timer = tracing_subscriber::fmt::time::UtcTime::rfc_3339();
            // must be set before sentry hook for sentry to function
            install_pretty_panic_hook();

            tracing_subscriber::registry()
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_file(true)
                        .with_line_number(true)
                        .with_timer(timer)
                        .json(),
                )
                .with(tracing_subscriber::EnvFilter::from_default_env())
                .init();
        }
    };

    if let Err(e) = parsed {
        warn!("{e}, using plain logs");
    }

    get_sentry_url().map(|sentry_url| {
        let options = sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: environment.map(|env| Cow::Owned(env.to_string())),
            attach_stacktrace: true,
            ..Default::default()
        };

        sentry::init((sentry_url, options))
    })
}

/// Format panics like tracing::error
fn install_pretty_panic_hook() {
    // This hook does not chain to the previous one, otherwise every panic is logged twice.
    std::panic::set_hook(Box::new(move |panic_info| {
        let backtrace = Backtrace::capture();
        let timestamp = chrono::Utc::now();
        let panic_message = if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.as_str()
        } else if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s
        } else {
            "Panic occurred without additional info"
        };

        let panic_location = panic_info
            .location()
            .map(|val| val.to_string())
            .unwrap_or_else(|| "Unknown location".to_owned());

        eprintln!(
            "{}",
            serde_json::json!({
                "timestamp": timestamp.format("%Y-%m-%dT%H:%M:%S%.fZ").to_string(),
                "level": "CRITICAL",
                "fields": {
                    "message": panic_message,
                    "location": panic_location,
                    "backtrace": backtrace.to_string(),
                }
            })
        );
    }));
}

#[cfg(test)]
mod tests {
    use super::LogFormat;

    #[test]
    fn reexported_macros_expand() {
        crate::trace!("trace {}", 1);
        crate::debug!("debug {}", 2);
        crate::info!("info {}", 3);
        crate::warn!("warn {}", 4);
        crate::error!("error {}", 5);
    }

    #[test]
    fn parses_log_formats() {
        assert_eq!("plain".parse::<LogFormat>(), Ok(LogFormat::Plain));
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert!("yaml".parse::<LogFormat>().unwrap_err().contains("yaml"));
    }
}
