use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use super::ExecutionStrategy;
use crate::hooks::{
    classify, AggregatedResult, ExecutionTier, Hook, HookInvoker, HookOutcome, OperationPayload,
};

pub const DEFAULT_MAX_CONCURRENT: usize = 16;

/// Runs priority batches one after another, hooks inside a batch concurrently.
///
/// Each batch is a fan-out/fan-in barrier. Once a merged batch contains a
/// block, no later batch is started.
pub struct ParallelExecutor {
    invoker: HookInvoker,
    semaphore: Arc<Semaphore>,
}

impl ParallelExecutor {
    pub fn new(invoker: HookInvoker) -> Self {
        Self {
            invoker,
            semaphore: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT)),
        }
    }

    /// Cap the number of hook processes alive at once
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.semaphore = Arc::new(Semaphore::new(max.max(1)));
        self
    }

    async fn invoke_limited(
        &self,
        hook: Arc<dyn Hook>,
        payload: Arc<OperationPayload>,
    ) -> Result<HookOutcome> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .context("Hook concurrency limiter closed")?;
        Ok(self.invoker.invoke(hook, payload).await)
    }
}

#[async_trait]
impl ExecutionStrategy for ParallelExecutor {
    fn tier(&self) -> ExecutionTier {
        ExecutionTier::Parallel
    }

    async fn run(
        &self,
        hooks: &[Arc<dyn Hook>],
        payload: Arc<OperationPayload>,
    ) -> Result<AggregatedResult> {
        let started = Instant::now();
        let mut result = AggregatedResult::new(ExecutionTier::Parallel);

        for batch in classify(hooks) {
            debug!(priority = %batch.priority, hooks = ?batch.names(), "Running hook batch");

            // join_all keeps declaration order, which the block tie-break relies on
            let outcomes = join_all(
                batch
                    .hooks
                    .iter()
                    .map(|hook| self.invoke_limited(hook.clone(), payload.clone())),
            )
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

            result.merge_batch(outcomes);

            if result.is_blocked() {
                info!(
                    priority = %batch.priority,
                    blocked_by = result.first_block().map(|o| o.hook.as_str()).unwrap_or_default(),
                    "Block found, skipping lower-priority batches"
                );
                break;
            }
        }

        result.finalize(started.elapsed());
        debug!(
            total_hooks = result.total_hooks,
            batches = result.batches_run,
            wall_ms = result.wall_time.as_millis() as u64,
            efficiency = result.parallel_efficiency,
            "Parallel run complete"
        );
        Ok(result)
    }
}
