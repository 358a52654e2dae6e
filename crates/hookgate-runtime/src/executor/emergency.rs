use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use futures::FutureExt;
use tracing::warn;

use super::ExecutionStrategy;
use crate::hooks::{
    AggregatedResult, ExecutionTier, Hook, HookOutcome, HookStatus, HookVerdict, OperationPayload,
};

/// Last-resort executor, reached only after the parallel and sequential tiers
/// both failed.
///
/// Calls each hook inline (no task spawning, no concurrency limiter) in
/// priority order under its timeout and swallows anything that goes wrong.
pub struct EmergencyExecutor {
    default_timeout: Duration,
}

impl EmergencyExecutor {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }
}

#[async_trait]
impl ExecutionStrategy for EmergencyExecutor {
    fn tier(&self) -> ExecutionTier {
        ExecutionTier::Emergency
    }

    async fn run(
        &self,
        hooks: &[Arc<dyn Hook>],
        payload: Arc<OperationPayload>,
    ) -> Result<AggregatedResult> {
        let mut ordered: Vec<_> = hooks.to_vec();
        ordered.sort_by_key(|h| h.descriptor().effective_priority());

        let mut result = AggregatedResult::new(ExecutionTier::Emergency);
        for hook in ordered {
            let descriptor = hook.descriptor();
            let timeout = descriptor.timeout_or(self.default_timeout);
            let started = Instant::now();

            let call = AssertUnwindSafe(hook.check(&payload)).catch_unwind();
            let status = match tokio::time::timeout(timeout, call).await {
                Ok(Ok(Ok(HookVerdict::Block(message)))) => HookStatus::Blocked { message },
                Ok(Ok(Ok(HookVerdict::Allow))) => HookStatus::Allowed,
                Ok(_) => {
                    warn!(hook = hook.name(), "Emergency executor skipped failing hook");
                    HookStatus::Errored {
                        error: format!("hook '{}' failed in emergency mode", hook.name()),
                        raw_stderr: None,
                        timed_out: false,
                    }
                }
                Err(_) => {
                    warn!(
                        hook = hook.name(),
                        timeout_ms = timeout.as_millis() as u64,
                        "Emergency executor abandoned slow hook"
                    );
                    HookStatus::Errored {
                        error: format!(
                            "hook '{}' timed out after {}ms",
                            hook.name(),
                            timeout.as_millis()
                        ),
                        raw_stderr: None,
                        timed_out: true,
                    }
                }
            };

            result.merge(HookOutcome {
                hook: descriptor.name.clone(),
                priority: descriptor.effective_priority(),
                family: descriptor.family.clone(),
                status,
                elapsed: started.elapsed(),
            });

            if result.is_blocked() {
                break;
            }
        }

        Ok(result)
    }
}
