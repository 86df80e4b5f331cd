/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 30/7/24
******************************************************************************/
use std::env;
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

const DEFAULT_LOG_LEVEL: &str = "info";

/// Builds the filter from a `LOGLEVEL` value. Accepts a plain level in any
/// case (`DEBUG`, `warn`) or full directives such as
/// `assistant_client=debug,reqwest=warn`. Anything unparsable means `info`.
fn log_filter(raw: Option<&str>) -> EnvFilter {
    let directives = raw
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Installs the global `tracing` subscriber once per process, filtered by
/// the `LOGLEVEL` environment variable. Safe to call from every test.
pub fn setup_logger() {
    INIT.call_once(|| {
        let level = env::var("LOGLEVEL").ok();
        let subscriber = fmt()
            .with_env_filter(log_filter(level.as_deref()))
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!("Log filter set from LOGLEVEL={:?}", level);
        }
    });
}

#[cfg(test)]
mod tests_setup_logger {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_log_filter_levels() {
        assert_eq!(log_filter(Some("DEBUG")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(Some("warn")).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(Some("  ")).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_log_filter_directives() {
        let filter = log_filter(Some("assistant_client=trace,reqwest=warn"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_setup_logger_is_idempotent() {
        setup_logger();
        setup_logger();
        tracing::info!("logger ready");
        assert!(INIT.is_completed());
    }
}
