use crate::cli::OutputFormat;
use crate::config::{build_registry, load_config};
use anyhow::Result;
use hookgate_runtime::{ExitProtocol, HookPhase, HookPipeline, HookRegistry};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::warn;

/// Run the hook pipeline on stdin and return the process exit code.
/// Never fails: configuration problems allow the operation.
pub async fn execute(
    phase: HookPhase,
    format: OutputFormat,
    config_path: Option<&Path>,
    verbose: bool,
) -> i32 {
    let mut raw = String::new();
    if let Err(e) = tokio::io::stdin().read_to_string(&mut raw).await {
        warn!(error = %e, "Failed to read hook input from stdin");
        raw.clear();
    }

    let pipeline = match build_pipeline(config_path, verbose) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            warn!(error = %format!("{:#}", e), "Hook configuration unusable, allowing operation");
            if verbose {
                eprintln!("hookgate: {:#}", e);
            }
            return emit(&ExitProtocol::Allow, format);
        }
    };

    let decision = pipeline.process(phase, &raw).await;
    emit(&decision, format)
}

fn build_pipeline(config_path: Option<&Path>, verbose: bool) -> Result<HookPipeline> {
    let mut config = load_config(config_path)?;
    config.pipeline.apply_env(std::env::vars());
    if verbose {
        config.pipeline.verbose = true;
    }

    // Bypass must not even touch hook registration
    let registry = if config.pipeline.enabled {
        build_registry(&config)?
    } else {
        HookRegistry::new()
    };

    Ok(HookPipeline::new(config.pipeline, Arc::new(registry)))
}

/// Write the decision in the requested protocol and return the exit code
pub fn emit(decision: &ExitProtocol, format: OutputFormat) -> i32 {
    match format {
        OutputFormat::Exit => {
            if let Some(message) = decision.stderr_message() {
                eprintln!("{}", message);
            }
            decision.exit_code()
        }
        OutputFormat::Json => {
            match serde_json::to_string(&decision.to_json()) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!(error = %e, "Failed to serialize decision"),
            }
            if let ExitProtocol::Warn { .. } = decision {
                if let Some(message) = decision.stderr_message() {
                    eprintln!("{}", message);
                }
            }
            0
        }
    }
}
