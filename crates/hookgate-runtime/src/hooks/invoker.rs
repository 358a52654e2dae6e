use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use super::hook::{Hook, HookVerdict};
use super::outcome::{HookOutcome, HookStatus};
use super::payload::OperationPayload;
use super::protocol::ProcessFailure;

pub const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_millis(3000);

/// Runs one hook in its own task under a hard wall-clock timeout.
///
/// Every failure mode (error, panic, timeout) becomes an `Errored` outcome.
/// A timed out hook never produces a block.
#[derive(Debug, Clone)]
pub struct HookInvoker {
    default_timeout: Duration,
}

impl HookInvoker {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    pub fn timeout_for(&self, hook: &dyn Hook) -> Duration {
        hook.descriptor().timeout_or(self.default_timeout)
    }

    pub async fn invoke(&self, hook: Arc<dyn Hook>, payload: Arc<OperationPayload>) -> HookOutcome {
        let timeout = self.timeout_for(hook.as_ref());
        let started = Instant::now();

        let task_hook = hook.clone();
        let mut handle = tokio::spawn(async move { task_hook.check(&payload).await });

        let status = match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(Ok(HookVerdict::Allow))) => HookStatus::Allowed,
            Ok(Ok(Ok(HookVerdict::Block(message)))) => {
                debug!(hook = hook.name(), message = %message, "Hook blocked operation");
                HookStatus::Blocked { message }
            }
            Ok(Ok(Err(e))) => {
                debug!(hook = hook.name(), error = %e, "Hook failed");
                HookStatus::Errored {
                    error: format!("{:#}", e),
                    raw_stderr: e.downcast_ref::<ProcessFailure>().map(|f| f.stderr.clone()),
                    timed_out: false,
                }
            }
            Ok(Err(join_error)) => {
                let error = if join_error.is_panic() {
                    format!("hook '{}' panicked", hook.name())
                } else {
                    format!("hook '{}' was cancelled", hook.name())
                };
                debug!(hook = hook.name(), error = %error, "Hook task aborted");
                HookStatus::Errored {
                    error,
                    raw_stderr: None,
                    timed_out: false,
                }
            }
            Err(_) => {
                // Abandon the hook; dropping its future kills any child process
                handle.abort();
                debug!(
                    hook = hook.name(),
                    timeout_ms = timeout.as_millis() as u64,
                    "Hook timed out"
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

        let descriptor = hook.descriptor();
        HookOutcome {
            hook: descriptor.name.clone(),
            priority: descriptor.effective_priority(),
            family: descriptor.family.clone(),
            status,
            elapsed: started.elapsed(),
        }
    }
}

impl Default for HookInvoker {
    fn default() -> Self {
        Self::new(DEFAULT_HOOK_TIMEOUT)
    }
}
