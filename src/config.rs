use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::common::durations;
use crate::error::{Result, ToastError};

/// What makes two requests in the same window duplicates of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Same text, whoever sent it.
    Content,
    /// Same text from the same origin.
    ContentAndOrigin,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self::Content
    }
}

/// Tunables for a [`crate::Toaster`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToasterConfig {
    /// Length of one dedup window
    pub window_ms: u64,
    /// Duration used by `show` and `show_at`
    pub default_duration_ms: u64,
    /// Longer requests are clamped to this
    pub max_duration_ms: u64,
    pub dedup_policy: DedupPolicy,
    /// Buffer size of the lifecycle event channel
    pub event_capacity: usize,
}

impl Default for ToasterConfig {
    fn default() -> Self {
        Self {
            window_ms: 500,
            default_duration_ms: durations::DEFAULT.as_millis() as u64,
            max_duration_ms: durations::MAX.as_millis() as u64,
            dedup_policy: DedupPolicy::default(),
            event_capacity: 256,
        }
    }
}

impl ToasterConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ToastError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `RUSTOAST_WINDOW_MS`, `RUSTOAST_DEFAULT_DURATION_MS`,
    /// `RUSTOAST_MAX_DURATION_MS`, `RUSTOAST_DEDUP_POLICY` and
    /// `RUSTOAST_EVENT_CAPACITY`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = env_var("RUSTOAST_WINDOW_MS") {
            config.window_ms = parse_number("RUSTOAST_WINDOW_MS", &value)?;
        }
        if let Some(value) = env_var("RUSTOAST_DEFAULT_DURATION_MS") {
            config.default_duration_ms = parse_number("RUSTOAST_DEFAULT_DURATION_MS", &value)?;
        }
        if let Some(value) = env_var("RUSTOAST_MAX_DURATION_MS") {
            config.max_duration_ms = parse_number("RUSTOAST_MAX_DURATION_MS", &value)?;
        }
        if let Some(value) = env_var("RUSTOAST_EVENT_CAPACITY") {
            config.event_capacity = parse_number("RUSTOAST_EVENT_CAPACITY", &value)?;
        }
        if let Some(value) = env_var("RUSTOAST_DEDUP_POLICY") {
            config.dedup_policy = match value.as_str() {
                "content" => DedupPolicy::Content,
                "content_and_origin" => DedupPolicy::ContentAndOrigin,
                other => {
                    return Err(ToastError::ConfigError(format!(
                        "RUSTOAST_DEDUP_POLICY: unknown policy '{}'",
                        other
                    )))
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_ms == 0 {
            return Err(ToastError::ConfigError("window_ms must be positive".to_string()));
        }
        if self.default_duration_ms == 0 || self.max_duration_ms == 0 {
            return Err(ToastError::ConfigError("durations must be positive".to_string()));
        }
        if self.default_duration_ms > self.max_duration_ms {
            return Err(ToastError::ConfigError(format!(
                "default duration {}ms exceeds maximum {}ms",
                self.default_duration_ms, self.max_duration_ms
            )));
        }
        if self.event_capacity == 0 {
            return Err(ToastError::ConfigError("event_capacity must be positive".to_string()));
        }
        Ok(())
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn default_duration(&self) -> Duration {
        Duration::from_millis(self.default_duration_ms)
    }

    pub fn max_duration(&self) -> Duration {
        Duration::from_millis(self.max_duration_ms)
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ToastError::ConfigError(format!("{}: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToasterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window(), Duration::from_millis(500));
        assert_eq!(config.default_duration(), durations::VERY_SHORT);
        assert_eq!(config.max_duration(), durations::EXTRA_LONG);
        assert_eq!(config.dedup_policy, DedupPolicy::Content);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ToasterConfig::from_json(r#"{"window_ms": 250, "dedup_policy": "content_and_origin"}"#)
            .expect("valid config");
        assert_eq!(config.window_ms, 250);
        assert_eq!(config.dedup_policy, DedupPolicy::ContentAndOrigin);
        assert_eq!(config.max_duration_ms, 4500);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            ToasterConfig::from_json(r#"{"window_ms": 0}"#),
            Err(ToastError::ConfigError(_))
        ));
        assert!(matches!(
            ToasterConfig::from_json(r#"{"default_duration_ms": 6000}"#),
            Err(ToastError::ConfigError(_))
        ));
        assert!(matches!(
            ToasterConfig::from_json("not json"),
            Err(ToastError::ConfigError(_))
        ));
    }

    // The only test touching RUSTOAST_* variables, so parallel tests cannot race on them
    #[test]
    fn test_from_env() {
        const KEYS: [&str; 5] = [
            "RUSTOAST_WINDOW_MS",
            "RUSTOAST_DEFAULT_DURATION_MS",
            "RUSTOAST_MAX_DURATION_MS",
            "RUSTOAST_EVENT_CAPACITY",
            "RUSTOAST_DEDUP_POLICY",
        ];

        std::env::set_var("RUSTOAST_WINDOW_MS", "250");
        std::env::set_var("RUSTOAST_DEFAULT_DURATION_MS", " 2000 ");
        std::env::set_var("RUSTOAST_MAX_DURATION_MS", "3000");
        std::env::set_var("RUSTOAST_EVENT_CAPACITY", "8");
        std::env::set_var("RUSTOAST_DEDUP_POLICY", "content_and_origin");
        let config = ToasterConfig::from_env();

        std::env::set_var("RUSTOAST_DEDUP_POLICY", "by_colour");
        let bad_policy = ToasterConfig::from_env();
        std::env::set_var("RUSTOAST_DEDUP_POLICY", "");
        std::env::set_var("RUSTOAST_WINDOW_MS", "soon");
        let bad_number = ToasterConfig::from_env();
        std::env::set_var("RUSTOAST_WINDOW_MS", "250");
        std::env::set_var("RUSTOAST_MAX_DURATION_MS", "1000");
        let default_above_max = ToasterConfig::from_env();

        for key in KEYS {
            std::env::remove_var(key);
        }
        let unset = ToasterConfig::from_env();

        let config = config.expect("valid env config");
        assert_eq!(config.window(), Duration::from_millis(250));
        assert_eq!(config.default_duration(), durations::SHORT);
        assert_eq!(config.max_duration_ms, 3000);
        assert_eq!(config.event_capacity, 8);
        assert_eq!(config.dedup_policy, DedupPolicy::ContentAndOrigin);

        assert!(matches!(bad_policy, Err(ToastError::ConfigError(_))));
        assert!(matches!(bad_number, Err(ToastError::ConfigError(_))));
        assert!(matches!(default_above_max, Err(ToastError::ConfigError(_))));
        assert_eq!(unset.expect("defaults"), ToasterConfig::default());
    }
}
