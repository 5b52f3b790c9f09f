//! Serializable run configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a run, applied as a single option via
/// [`with_config`](super::with_config).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Abort when a transition name repeats within the run.
    pub cyclic_check: bool,
    /// Log every transition through `tracing`.
    pub log_stages: bool,
    /// Maximum number of transitions a run may execute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<usize>,
}

impl RunConfig {
    /// Creates a config with everything switched off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables cyclic checking.
    #[must_use]
    pub fn with_cyclic_check(mut self, enabled: bool) -> Self {
        self.cyclic_check = enabled;
        self
    }

    /// Enables or disables stage logging.
    #[must_use]
    pub fn with_stage_logging(mut self, enabled: bool) -> Self {
        self.log_stages = enabled;
        self
    }

    /// Sets the step budget.
    #[must_use]
    pub fn with_max_steps(mut self, limit: usize) -> Self {
        self.max_steps = Some(limit);
        self
    }

    /// Parses a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Checks the config for values that could never run.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_steps == Some(0) {
            anyhow::bail!("max_steps must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert!(!config.cyclic_check);
        assert!(!config.log_stages);
        assert!(config.max_steps.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = RunConfig::new()
            .with_cyclic_check(true)
            .with_stage_logging(true)
            .with_max_steps(100);
        assert!(config.cyclic_check);
        assert!(config.log_stages);
        assert_eq!(config.max_steps, Some(100));
    }

    #[test]
    fn test_from_json_with_missing_fields() {
        let config = RunConfig::from_json(r#"{"cyclic_check": true}"#).unwrap();
        assert!(config.cyclic_check);
        assert!(!config.log_stages);
        assert!(config.max_steps.is_none());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = RunConfig::new().with_max_steps(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serialization_skips_unset_budget() {
        let json = serde_json::to_value(RunConfig::new()).unwrap();
        assert!(json.get("max_steps").is_none());
    }
}
