use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use super::ExecutionStrategy;
use crate::hooks::{classify, AggregatedResult, ExecutionTier, Hook, HookInvoker, OperationPayload};

/// Runs every hook one at a time in priority order, stopping at the first block.
/// Same short-circuit semantics as the parallel executor, without concurrency.
pub struct SequentialExecutor {
    invoker: HookInvoker,
}

impl SequentialExecutor {
    pub fn new(invoker: HookInvoker) -> Self {
        Self { invoker }
    }
}

#[async_trait]
impl ExecutionStrategy for SequentialExecutor {
    fn tier(&self) -> ExecutionTier {
        ExecutionTier::Sequential
    }

    async fn run(
        &self,
        hooks: &[Arc<dyn Hook>],
        payload: Arc<OperationPayload>,
    ) -> Result<AggregatedResult> {
        let started = Instant::now();
        let mut result = AggregatedResult::new(ExecutionTier::Sequential);

        'batches: for batch in classify(hooks) {
            result.batches_run += 1;
            for hook in &batch.hooks {
                let outcome = self.invoker.invoke(hook.clone(), payload.clone()).await;
                debug!(hook = %outcome.hook, status = ?outcome.status, "Sequential hook finished");
                result.merge(outcome);

                if result.is_blocked() {
                    info!(hook = hook.name(), "Block found, stopping sequential run");
                    break 'batches;
                }
            }
        }

        result.finalize(started.elapsed());
        Ok(result)
    }
}
