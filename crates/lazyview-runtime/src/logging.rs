#![forbid(unsafe_code)]

//! Subscriber setup for hosts that do not install their own.
//!
//! `LAZYVIEW_LOG` takes an `EnvFilter` directive (default `info`).
//! `LAZYVIEW_LOG_FORMAT=json` switches to one JSON object per line.

use tracing_subscriber::EnvFilter;

/// Filter directive variable.
pub const ENV_LOG: &str = "LAZYVIEW_LOG";
/// Output format variable (`text` or `json`).
pub const ENV_LOG_FORMAT: &str = "LAZYVIEW_LOG_FORMAT";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Newline-delimited JSON.
    Json,
}

impl LogFormat {
    /// Read the format through a custom environment lookup.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match get_env(ENV_LOG_FORMAT) {
            Some(value) if value.trim().eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Install a global subscriber configured from the environment.
///
/// Fails if a global subscriber is already set.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("info"));
    match LogFormat::from_env_with(|key| std::env::var(key).ok()) {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_text() {
        assert_eq!(LogFormat::from_env_with(|_| None), LogFormat::Text);
        assert_eq!(
            LogFormat::from_env_with(|_| Some("yaml".into())),
            LogFormat::Text
        );
    }

    #[test]
    fn json_format_is_case_insensitive() {
        assert_eq!(
            LogFormat::from_env_with(|_| Some(" JSON ".into())),
            LogFormat::Json
        );
    }
}
