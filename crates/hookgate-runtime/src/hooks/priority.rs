use std::sync::Arc;

use super::descriptor::Priority;
use super::hook::Hook;

/// Hooks sharing one priority tier, run concurrently together
#[derive(Clone)]
pub struct ExecutionBatch {
    pub priority: Priority,
    pub hooks: Vec<Arc<dyn Hook>>,
}

impl ExecutionBatch {
    pub fn names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// Group hooks into batches ordered critical -> high -> medium -> low.
/// Configuration order is preserved inside each batch; empty tiers are omitted.
pub fn classify(hooks: &[Arc<dyn Hook>]) -> Vec<ExecutionBatch> {
    Priority::ORDER
        .iter()
        .filter_map(|&priority| {
            let members: Vec<_> = hooks
                .iter()
                .filter(|h| h.descriptor().effective_priority() == priority)
                .cloned()
                .collect();
            (!members.is_empty()).then_some(ExecutionBatch {
                priority,
                hooks: members,
            })
        })
        .collect()
}
