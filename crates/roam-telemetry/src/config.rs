//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name reported at startup
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error, or full directives)
    pub log_level: String,

    /// Whether to write logs to stdout at all
    pub console_output: bool,

    /// Whether to emit JSON lines
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "roam-sync".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ROAM_SERVICE_NAME`: Service name (default: roam-sync)
    /// - `ROAM_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `ROAM_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `ROAM_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            service_name: lookup("ROAM_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("ROAM_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: lookup("ROAM_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),

            json_logs: lookup("ROAM_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),
        }
    }

    /// Quiet configuration for tests and examples.
    pub fn for_tests() -> Self {
        Self {
            log_level: "warn".to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::from_lookup(lookup(&[]));
        assert_eq!(config, TelemetryConfig::default());
        assert_eq!(config.service_name, "roam-sync");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_roam_log_level_wins_over_rust_log() {
        let config = TelemetryConfig::from_lookup(lookup(&[
            ("ROAM_LOG_LEVEL", "debug"),
            ("RUST_LOG", "trace"),
        ]));
        assert_eq!(config.log_level, "debug");

        let config = TelemetryConfig::from_lookup(lookup(&[("RUST_LOG", "roam_sync=trace")]));
        assert_eq!(config.log_level, "roam_sync=trace");
    }

    #[test]
    fn test_boolean_flags() {
        let config = TelemetryConfig::from_lookup(lookup(&[
            ("ROAM_CONSOLE_OUTPUT", "0"),
            ("ROAM_JSON_LOGS", "TRUE"),
        ]));
        assert!(!config.console_output);
        assert!(config.json_logs);

        let config = TelemetryConfig::from_lookup(lookup(&[("ROAM_JSON_LOGS", "yes")]));
        assert!(!config.json_logs);
    }
}
