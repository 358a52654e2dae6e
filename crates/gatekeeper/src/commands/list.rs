use crate::config::{build_registry, load_config};
use anyhow::Result;
use hookgate_runtime::{classify, HookPhase};
use std::path::Path;

/// Print the priority batches configured for each phase
pub fn execute(phase: Option<HookPhase>, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?;
    config.pipeline.apply_env(std::env::vars());
    let registry = build_registry(&config)?;
    let disabled = &config.pipeline.disabled_families;

    if !config.pipeline.enabled {
        println!("Pipeline disabled: every operation is allowed");
    }

    let phases = match phase {
        Some(phase) => vec![phase],
        None => vec![HookPhase::PreToolUse, HookPhase::PostToolUse],
    };

    for phase in phases {
        println!("{}:", phase);
        let batches = classify(&registry.hooks(phase));
        if batches.is_empty() {
            println!("  (no hooks)");
            continue;
        }
        for batch in batches {
            println!("  [{}]", batch.priority);
            for hook in &batch.hooks {
                let d = hook.descriptor();
                let matcher = if d.matcher.is_empty() { "*" } else { d.matcher.as_str() };
                let timeout_ms = d.timeout_ms.unwrap_or(config.pipeline.default_timeout_ms);
                let state = if d.in_family(disabled) { " (disabled)" } else { "" };
                println!(
                    "    {} matcher={} family={} timeout={}ms{}",
                    d.name,
                    matcher,
                    d.family.as_deref().unwrap_or("-"),
                    timeout_ms,
                    state
                );
            }
        }
    }

    Ok(())
}
