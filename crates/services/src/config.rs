use std::env;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_CHECKPOINT_TOLERANCE: f64 = 1.0;

const VAR_BASE_URL: &str = "TUTOR_API_BASE_URL";
const VAR_TIMEOUT: &str = "TUTOR_REQUEST_TIMEOUT_SECS";
const VAR_FRAME_DELAY: &str = "TUTOR_DEFAULT_FRAME_DELAY_MS";
const VAR_TOLERANCE: &str = "TUTOR_CHECKPOINT_TOLERANCE";

/// Runtime settings for the tutor session and its HTTP client.
#[derive(Clone, Debug, PartialEq)]
pub struct TutorConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub default_frame_delay: Duration,
    pub checkpoint_tolerance: f64,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            default_frame_delay: DEFAULT_FRAME_DELAY,
            checkpoint_tolerance: DEFAULT_CHECKPOINT_TOLERANCE,
        }
    }
}

impl TutorConfig {
    /// Read settings from `TUTOR_*` environment variables, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a variable is set but cannot be used.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a variable is set but cannot be used.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = read(VAR_BASE_URL) {
            config.base_url = url.trim().to_owned();
        }
        if let Some(raw) = read(VAR_TIMEOUT) {
            let secs: u64 = parse(VAR_TIMEOUT, &raw, "expected whole seconds")?;
            if secs == 0 {
                return Err(invalid(VAR_TIMEOUT, &raw, "must be greater than zero"));
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = read(VAR_FRAME_DELAY) {
            let millis: u64 = parse(VAR_FRAME_DELAY, &raw, "expected whole milliseconds")?;
            config.default_frame_delay = Duration::from_millis(millis);
        }
        if let Some(raw) = read(VAR_TOLERANCE) {
            let tolerance: f64 = parse(VAR_TOLERANCE, &raw, "expected a number")?;
            if !tolerance.is_finite() || tolerance <= 0.0 {
                return Err(invalid(VAR_TOLERANCE, &raw, "must be finite and positive"));
            }
            config.checkpoint_tolerance = tolerance;
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn parse<T: std::str::FromStr>(
    var: &'static str,
    raw: &str,
    reason: &'static str,
) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| invalid(var, raw, reason))
}

fn invalid(var: &'static str, raw: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        var,
        value: raw.to_owned(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = TutorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, TutorConfig::default());
        assert_eq!(config.base_url, "http://localhost:5000");
    }

    #[test]
    fn reads_every_variable() {
        let config = TutorConfig::from_lookup(lookup(&[
            ("TUTOR_API_BASE_URL", "http://tutor.internal:8080/"),
            ("TUTOR_REQUEST_TIMEOUT_SECS", "30"),
            ("TUTOR_DEFAULT_FRAME_DELAY_MS", "250"),
            ("TUTOR_CHECKPOINT_TOLERANCE", "0.5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://tutor.internal:8080/");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.default_frame_delay, Duration::from_millis(250));
        assert_eq!(config.checkpoint_tolerance, 0.5);
    }

    #[test]
    fn rejects_unusable_values() {
        let err = TutorConfig::from_lookup(lookup(&[("TUTOR_CHECKPOINT_TOLERANCE", "-1")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                var: "TUTOR_CHECKPOINT_TOLERANCE",
                ..
            }
        ));

        assert!(
            TutorConfig::from_lookup(lookup(&[("TUTOR_CHECKPOINT_TOLERANCE", "NaN")])).is_err()
        );
        assert!(TutorConfig::from_lookup(lookup(&[("TUTOR_REQUEST_TIMEOUT_SECS", "0")])).is_err());
        assert!(
            TutorConfig::from_lookup(lookup(&[("TUTOR_DEFAULT_FRAME_DELAY_MS", "soon")])).is_err()
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config =
            TutorConfig::from_lookup(lookup(&[("TUTOR_API_BASE_URL", "  ")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
