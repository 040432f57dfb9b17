//! Logging for ecectl operations
//!
//! Diagnostics go to stderr so stdout only carries command results.
//!
//! Level priority:
//! 1. `RUST_LOG` (full filter syntax)
//! 2. `-v` / `-q`
//! 3. `log.level` from the settings file
//! 4. `info`

use tracing_subscriber::EnvFilter;

/// Pick the effective level from the flags and the configured default
pub fn level(verbose: bool, quiet: bool, configured: &str) -> String {
    if verbose {
        "debug".to_string()
    } else if quiet {
        "warn".to_string()
    } else if configured.trim().is_empty() {
        "info".to_string()
    } else {
        configured.trim().to_lowercase()
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        assert_eq!(level(true, false, "warn"), "debug");
        assert_eq!(level(false, true, "debug"), "warn");
    }

    #[test]
    fn test_config_level_used_without_flags() {
        assert_eq!(level(false, false, "TRACE"), "trace");
        assert_eq!(level(false, false, ""), "info");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init("info");
        init("debug");
    }
}
