use anyhow::Result;
use async_trait::async_trait;

use super::descriptor::HookDescriptor;
use super::payload::OperationPayload;

/// Decision reached by a hook that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookVerdict {
    Allow,
    /// Reject the operation; the message is surfaced verbatim
    Block(String),
}

/// A validator invoked around a file operation.
///
/// Implementations only decide. Timeouts, panics, and errors are
/// contained by the invoker, so `check` can simply propagate with `?`.
#[async_trait]
pub trait Hook: Send + Sync {
    fn descriptor(&self) -> &HookDescriptor;

    /// Hook name for logging
    fn name(&self) -> &str {
        &self.descriptor().name
    }

    async fn check(&self, payload: &OperationPayload) -> Result<HookVerdict>;
}
