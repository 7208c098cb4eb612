use std::env;
use std::io::{self, IsTerminal};
use std::str::FromStr;

use color_eyre::eyre::{eyre, Report, Result};
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,ngx_upstreams=debug";
const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

/// How log lines are rendered on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line output with span fields, for terminals.
    Pretty,
    /// One line per event, for log collectors.
    Compact,
}

impl LogFormat {
    /// Reads `LOG_FORMAT`. When unset, terminals get [`LogFormat::Pretty`]
    /// and everything else [`LogFormat::Compact`].
    pub fn from_env() -> Result<Self> {
        match env::var(LOG_FORMAT_VAR) {
            Ok(value) => value.parse(),
            Err(_) if io::stderr().is_terminal() => Ok(LogFormat::Pretty),
            Err(_) => Ok(LogFormat::Compact),
        }
    }
}

impl FromStr for LogFormat {
    type Err = Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(eyre!("unknown log format {other:?}, expected pretty or compact")),
        }
    }
}

/// Installs the global subscriber and the `color-eyre` report handler.
///
/// Verbosity comes from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn init_tracing(format: LogFormat) -> Result<()> {
    color_eyre::install()?;

    let filter_layer: EnvFilter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    // Compact lines drop the module target; the upstream span names the context.
    let (pretty_layer, compact_layer) = match format {
        LogFormat::Pretty => (Some(fmt::layer().pretty().with_writer(io::stderr)), None),
        LogFormat::Compact => (
            None,
            Some(fmt::layer().compact().with_target(false).with_writer(io::stderr)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(pretty_layer)
        .with(compact_layer)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_is_parsed_case_insensitively() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!(" Compact\n".parse::<LogFormat>().unwrap(), LogFormat::Compact);
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = "json".parse::<LogFormat>().unwrap_err();
        assert!(err.to_string().contains("json"));
    }
}
