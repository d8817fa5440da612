use serde::{Deserialize, Serialize};

/// Options controlling how grading requests are sent to the remote assessor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchOptions {
    /// Maximum number of grading requests issued together as one batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// How many times a single unit may be re-sent after a transient
    /// (transport or malformed-response) failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GradingConfig {
    #[serde(default)]
    pub dispatch: DispatchOptions,
}

impl GradingConfig {
    /// Clamp values that cannot be dispatched with (a batch must hold at least one request).
    pub fn sanitize(mut self) -> Self {
        if self.dispatch.batch_size == 0 {
            self.dispatch.batch_size = 1;
        }
        self
    }

    pub fn default_config() -> Self {
        GradingConfig {
            dispatch: DispatchOptions::default(),
        }
    }

    /// Parse a config from JSON, filling absent fields with their defaults.
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let cfg: GradingConfig =
            serde_json::from_str(raw).map_err(|_| "Invalid config JSON format".to_string())?;
        Ok(cfg.sanitize())
    }
}

//Default Functions

fn default_batch_size() -> usize {
    32
}

fn default_max_retries() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let cfg = GradingConfig::default_config();
        assert_eq!(cfg.dispatch.batch_size, 32);
        assert_eq!(cfg.dispatch.max_retries, 1);
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let cfg = GradingConfig::from_json(r#"{"dispatch": {"batch_size": 5}}"#).unwrap();
        assert_eq!(cfg.dispatch.batch_size, 5);
        // absent field takes its serde default
        assert_eq!(cfg.dispatch.max_retries, 1);
    }

    #[test]
    fn test_from_json_empty_object() {
        let cfg = GradingConfig::from_json("{}").unwrap();
        assert_eq!(cfg.dispatch.batch_size, 32);
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let err = GradingConfig::from_json("not json").unwrap_err();
        assert_eq!(err, "Invalid config JSON format");
    }

    #[test]
    fn test_sanitize_clamps_zero_batch_size() {
        let cfg = GradingConfig::from_json(r#"{"dispatch": {"batch_size": 0}}"#).unwrap();
        assert_eq!(cfg.dispatch.batch_size, 1);
    }
}
