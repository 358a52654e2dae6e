//! Execution strategies for a hook set and the fallback chain that layers them.

pub mod emergency;
pub mod fallback;
pub mod parallel;
pub mod sequential;

pub use emergency::EmergencyExecutor;
pub use fallback::FallbackChain;
pub use parallel::ParallelExecutor;
pub use sequential::SequentialExecutor;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::hooks::{AggregatedResult, ExecutionTier, Hook, OperationPayload};

/// One way of running a hook set to a decision.
///
/// Returning `Err` means the strategy itself broke (not that a hook failed
/// or blocked); the fallback chain then escalates to the next tier.
#[async_trait]
pub trait ExecutionStrategy: Send + Sync {
    fn tier(&self) -> ExecutionTier;

    async fn run(
        &self,
        hooks: &[Arc<dyn Hook>],
        payload: Arc<OperationPayload>,
    ) -> Result<AggregatedResult>;
}
