use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::executor::FallbackChain;
use crate::hooks::{normalize, AggregatedResult, HookPhase, HookRegistry, OperationPayload};
use crate::metrics::{MetricsRecorder, RunRecord};
use crate::report::{ExitProtocol, Reporter};

/// Entry point for one orchestrator call:
/// bypass check, input normalization, tiered execution, reporting.
///
/// `process` never fails; the orchestrator only ever sees allow or block.
pub struct HookPipeline {
    config: PipelineConfig,
    registry: Arc<HookRegistry>,
    chain: FallbackChain,
    reporter: Reporter,
    metrics: Option<MetricsRecorder>,
}

impl HookPipeline {
    pub fn new(config: PipelineConfig, registry: Arc<HookRegistry>) -> Self {
        let chain = FallbackChain::standard(config.default_timeout(), config.max_concurrent);
        let metrics = config.metrics_path.clone().map(MetricsRecorder::new);

        Self {
            reporter: Reporter::new(config.verbose),
            config,
            registry,
            chain,
            metrics,
        }
    }

    /// Replace the execution tiers
    pub fn with_chain(mut self, chain: FallbackChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Handle raw stdin from the orchestrator
    pub async fn process(&self, phase: HookPhase, raw_input: &str) -> ExitProtocol {
        if !self.config.enabled {
            debug!(phase = %phase, "Hook pipeline bypassed");
            return ExitProtocol::Allow;
        }

        let payload = normalize(raw_input);
        self.process_payload(phase, payload).await
    }

    /// Handle an already normalized payload
    pub async fn process_payload(
        &self,
        phase: HookPhase,
        payload: OperationPayload,
    ) -> ExitProtocol {
        if !self.config.enabled {
            return ExitProtocol::Allow;
        }
        if payload.is_empty() {
            debug!(phase = %phase, "Empty payload, nothing to validate");
            return ExitProtocol::Allow;
        }

        let result = self.evaluate(phase, &payload).await;
        let decision = self.reporter.report(&result);

        info!(
            phase = %phase,
            tool = %payload.tool_name,
            file = %payload.file_path,
            tier = %result.tier,
            hooks = result.total_hooks,
            blocked = decision.is_blocked(),
            "Hook pipeline finished"
        );

        if let Some(metrics) = &self.metrics {
            let record = RunRecord::new(phase, &payload, &result, &decision);
            if let Err(e) = metrics.record(&record).await {
                warn!(error = %e, path = ?metrics.path(), "Failed to record run metrics");
            }
        }

        decision
    }

    /// Run the hooks selected for `payload` and return the raw aggregate
    pub async fn evaluate(&self, phase: HookPhase, payload: &OperationPayload) -> AggregatedResult {
        let hooks = self.registry.select(
            phase,
            &payload.tool_name,
            &self.config.disabled_families,
        );
        debug!(phase = %phase, hooks = hooks.len(), "Selected hooks");
        self.chain.execute(&hooks, Arc::new(payload.clone())).await
    }
}
