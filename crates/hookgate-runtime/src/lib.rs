pub mod config;
pub mod executor;
pub mod hooks;
pub mod metrics;
pub mod pipeline;
pub mod report;

pub use config::PipelineConfig;
pub use executor::{
    EmergencyExecutor, ExecutionStrategy, FallbackChain, ParallelExecutor, SequentialExecutor,
};
pub use hooks::{
    classify, normalize, AggregatedResult, CommandHook, ExecutionBatch, ExecutionTier, Hook,
    HookDescriptor, HookInvoker, HookOutcome, HookPhase, HookRegistry, HookStatus, HookVerdict,
    OperationPayload, Priority,
};
pub use metrics::{MetricsRecorder, RunRecord};
pub use pipeline::HookPipeline;
pub use report::{ExitProtocol, Reporter};

/// Initialize structured JSON logging on stderr (stdout carries hook output).
///
/// stderr doubles as the block channel, so nothing is logged unless verbose.
/// `RUST_LOG` takes precedence over the verbose flag.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "off" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
