use anyhow::{Context, Result};
use hookgate_runtime::{CommandHook, HookDescriptor, HookPhase, HookRegistry, PipelineConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_CONFIG_FILE: &str = "hookgate.toml";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub hooks: HooksConfig,
}

/// Hook descriptors grouped by lifecycle phase, in execution-tie-break order
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HooksConfig {
    #[serde(default)]
    pub pre: Vec<HookDescriptor>,

    #[serde(default)]
    pub post: Vec<HookDescriptor>,
}

impl HooksConfig {
    pub fn for_phase(&self, phase: HookPhase) -> &[HookDescriptor] {
        match phase {
            HookPhase::PreToolUse => &self.pre,
            HookPhase::PostToolUse => &self.post,
        }
    }
}

/// Load config from file, ./hookgate.toml, or defaults (in that order)
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !local.exists() {
                return Ok(Config::default());
            }
            local
        }
    };

    let content =
        fs::read_to_string(&path).context(format!("Failed to read config file: {:?}", path))?;
    let mut config: Config = toml::from_str(&content).context("Failed to parse TOML config")?;

    if let Some(raw) = config.pipeline.metrics_path.take() {
        config.pipeline.metrics_path = Some(expand_path(&raw.to_string_lossy())?);
    }

    Ok(config)
}

/// Build a registry of process-backed hooks for both phases
pub fn build_registry(config: &Config) -> Result<HookRegistry> {
    let registry = HookRegistry::new();
    for phase in [HookPhase::PreToolUse, HookPhase::PostToolUse] {
        for descriptor in config.hooks.for_phase(phase) {
            let mut descriptor = descriptor.clone();
            // Only `~` is expanded; `$VAR` belongs to the shell running the hook
            descriptor.command = shellexpand::tilde(&descriptor.command).into_owned();
            registry.register(phase, Arc::new(CommandHook::new(descriptor)))?;
        }
    }
    Ok(registry)
}

fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw).context(format!("Failed to expand path: {}", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
