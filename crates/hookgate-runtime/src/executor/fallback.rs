use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use futures::FutureExt;
use tracing::{error, info, warn};

use super::{EmergencyExecutor, ExecutionStrategy, ParallelExecutor, SequentialExecutor};
use crate::hooks::{AggregatedResult, Hook, HookInvoker, OperationPayload};

/// Tiered execution: tries strategies in order, escalating only when a
/// strategy itself fails (returns `Err` or panics). Blocks and hook errors
/// are normal results and never escalate.
///
/// When every tier fails the operation is allowed unconditionally.
pub struct FallbackChain {
    tiers: Vec<Arc<dyn ExecutionStrategy>>,
}

impl FallbackChain {
    pub fn new(tiers: Vec<Arc<dyn ExecutionStrategy>>) -> Self {
        Self { tiers }
    }

    /// Parallel, then sequential, then emergency
    pub fn standard(default_timeout: Duration, max_concurrent: usize) -> Self {
        let invoker = HookInvoker::new(default_timeout);
        Self::new(vec![
            Arc::new(ParallelExecutor::new(invoker.clone()).with_max_concurrent(max_concurrent)),
            Arc::new(SequentialExecutor::new(invoker)),
            Arc::new(EmergencyExecutor::new(default_timeout)),
        ])
    }

    pub async fn execute(
        &self,
        hooks: &[Arc<dyn Hook>],
        payload: Arc<OperationPayload>,
    ) -> AggregatedResult {
        for (index, strategy) in self.tiers.iter().enumerate() {
            let tier = strategy.tier();
            let attempt = AssertUnwindSafe(strategy.run(hooks, payload.clone()))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(anyhow!("{} executor panicked", tier)));

            match attempt {
                Ok(mut result) => {
                    result.tier = tier;
                    if index > 0 {
                        info!(tier = %tier, "Hook run succeeded after fallback");
                    }
                    return result;
                }
                Err(e) => {
                    warn!(tier = %tier, error = %e, "Hook execution tier failed");
                }
            }
        }

        error!(
            hooks = hooks.len(),
            "All hook execution tiers failed, allowing operation"
        );
        AggregatedResult::fail_open()
    }
}
