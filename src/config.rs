use serde::{Deserialize, Serialize};
use std::path::Path;

/// Runtime configuration for the classifier host. The probabilistic
/// knowledge itself lives in the knowledge-base artifact, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Posterior at or above this value is classified as spam.
    #[serde(default = "default_spam_threshold")]
    pub spam_threshold: f64,
    /// Optional path to a YAML knowledge base; the built-in canonical table
    /// is used when unset.
    #[serde(default)]
    pub knowledge_base: Option<String>,
}

fn default_spam_threshold() -> f64 {
    0.55
}

impl Default for Config {
    fn default() -> Self {
        Config {
            spam_threshold: default_spam_threshold(),
            knowledge_base: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from `path` when it exists, otherwise fall back to defaults;
    /// the `SPAM_THRESHOLD` environment variable overrides either source.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let mut config = if Path::new(path).exists() {
            Config::from_file(path)?
        } else {
            log::warn!("config file {path} not found, using defaults");
            Config::default()
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Ok(raw) = std::env::var("SPAM_THRESHOLD") {
            self.spam_threshold = raw
                .parse::<f64>()
                .map_err(|e| anyhow::anyhow!("invalid SPAM_THRESHOLD {raw:?}: {e}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.spam_threshold > 0.0 && self.spam_threshold < 1.0) {
            anyhow::bail!(
                "spam_threshold must be in (0,1), got {}",
                self.spam_threshold
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_is_055() {
        let config = Config::default();
        assert_eq!(config.spam_threshold, 0.55);
        assert!(config.knowledge_base.is_none());
    }

    #[test]
    fn yaml_round_trip() {
        let config = Config {
            spam_threshold: 0.7,
            knowledge_base: Some("/etc/spamlens-kb.yaml".to_string()),
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.spam_threshold, 0.7);
        assert_eq!(back.knowledge_base.as_deref(), Some("/etc/spamlens-kb.yaml"));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.spam_threshold, 0.55);
    }

    #[test]
    fn validate_rejects_out_of_range_threshold() {
        let mut config = Config::default();
        config.spam_threshold = 1.0;
        assert!(config.validate().is_err());
        config.spam_threshold = 0.0;
        assert!(config.validate().is_err());
    }

    // Single test so the env var is never touched concurrently.
    #[test]
    fn env_override_applies_and_rejects_garbage() {
        std::env::set_var("SPAM_THRESHOLD", "0.8");
        let mut config = Config::default();
        config.apply_env().unwrap();
        assert_eq!(config.spam_threshold, 0.8);

        std::env::set_var("SPAM_THRESHOLD", "very-spammy");
        assert!(config.apply_env().is_err());
        std::env::remove_var("SPAM_THRESHOLD");
    }
}
