use anyhow::Result;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# Hookgate Configuration

[pipeline]
enabled = true
verbose = false
disabled_families = []
default_timeout_ms = 3000
max_concurrent = 16
# metrics_path = "~/.hookgate/runs.jsonl"

# Hooks receive {"tool_name": ..., "tool_input": {...}} on stdin.
# Exit 0 to allow, exit 2 with a message on stderr to block.
# Batches run critical -> high -> medium -> low; a block stops later batches.

# [[hooks.pre]]
# name = "env-guard"
# command = "~/.hookgate/hooks/env-guard.sh"
# matcher = "Write|Edit|MultiEdit"
# priority = "critical"
# family = "security"
# timeout_ms = 2000

# [[hooks.post]]
# name = "formatter"
# command = "~/.hookgate/hooks/format.sh"
# matcher = "Write|Edit"
# priority = "low"
# family = "style"
"#;

/// Initialize a new config file
pub fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config already exists at {:?}", path);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG)?;
    println!("Created config at {:?}", path);
    Ok(())
}
