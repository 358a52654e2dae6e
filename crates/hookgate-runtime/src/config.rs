use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Explicit pipeline settings, passed in at construction.
/// Environment toggles are folded in once by the caller via [`PipelineConfig::apply_env`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Master switch: if false, every operation is allowed without consulting hooks
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Surface hook errors on stderr and log at debug level
    #[serde(default)]
    pub verbose: bool,

    /// Hook families to skip, e.g. ["style"]
    #[serde(default)]
    pub disabled_families: Vec<String>,

    /// Timeout for hooks that do not declare one
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    /// Maximum hook processes running at once inside a batch
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Append a JSON line per run to this file
    #[serde(default)]
    pub metrics_path: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_max_concurrent() -> usize {
    16
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            verbose: false,
            disabled_families: vec![],
            default_timeout_ms: default_timeout_ms(),
            max_concurrent: default_max_concurrent(),
            metrics_path: None,
        }
    }
}

impl PipelineConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Fold operator toggles into the config:
    /// `HOOKGATE_BYPASS`, `HOOKGATE_DISABLE_FAMILIES` (comma list), `HOOKGATE_VERBOSE`.
    pub fn apply_env<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                "HOOKGATE_BYPASS" if is_truthy(value) => self.enabled = false,
                "HOOKGATE_VERBOSE" if is_truthy(value) => self.verbose = true,
                "HOOKGATE_DISABLE_FAMILIES" => {
                    for family in value.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                        if !self.disabled_families.iter().any(|d| d == family) {
                            self.disabled_families.push(family.to_string());
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert!(config.enabled);
        assert_eq!(config.default_timeout(), Duration::from_secs(3));
        assert!(config.metrics_path.is_none());
    }

    #[test]
    fn test_bypass_toggle() {
        let mut config = PipelineConfig::default();
        config.apply_env([("HOOKGATE_BYPASS", "0")]);
        assert!(config.enabled);
        config.apply_env([("HOOKGATE_BYPASS", "TRUE")]);
        assert!(!config.enabled);
    }

    #[test]
    fn test_family_toggle_appends_without_duplicates() {
        let mut config = PipelineConfig {
            disabled_families: vec!["style".into()],
            ..Default::default()
        };
        config.apply_env([
            ("HOOKGATE_DISABLE_FAMILIES", "style, docs,,"),
            ("HOOKGATE_VERBOSE", "yes"),
            ("PATH", "/usr/bin"),
        ]);
        assert_eq!(config.disabled_families, vec!["style", "docs"]);
        assert!(config.verbose);
    }
}
