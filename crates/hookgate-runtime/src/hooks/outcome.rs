use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::descriptor::Priority;

/// What a single hook invocation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookStatus {
    Allowed,
    Blocked {
        message: String,
    },
    Errored {
        error: String,
        raw_stderr: Option<String>,
        timed_out: bool,
    },
}

/// Result of running one hook, discarded after the run is reported
#[derive(Debug, Clone)]
pub struct HookOutcome {
    pub hook: String,
    pub priority: Priority,
    pub family: Option<String>,
    pub status: HookStatus,
    pub elapsed: Duration,
}

impl HookOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self.status, HookStatus::Blocked { .. })
    }

    pub fn is_errored(&self) -> bool {
        matches!(self.status, HookStatus::Errored { .. })
    }

    pub fn block_message(&self) -> Option<&str> {
        match &self.status {
            HookStatus::Blocked { message } => Some(message),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            HookStatus::Errored { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Which fallback tier produced a result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionTier {
    #[default]
    Parallel,
    Sequential,
    Emergency,
    /// Every tier failed; the operation is allowed unconditionally
    FailOpen,
}

impl fmt::Display for ExecutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionTier::Parallel => "parallel",
            ExecutionTier::Sequential => "sequential",
            ExecutionTier::Emergency => "emergency",
            ExecutionTier::FailOpen => "fail_open",
        };
        f.write_str(name)
    }
}

/// Merge of every outcome from the batches executed so far.
///
/// Outcomes are appended in batch order, then declaration order within a
/// batch, so `blocks[0]` is always the first sufficient reason to block.
#[derive(Debug, Clone, Default)]
pub struct AggregatedResult {
    pub successful: Vec<HookOutcome>,
    pub blocks: Vec<HookOutcome>,
    pub errors: Vec<HookOutcome>,
    pub total_hooks: usize,
    pub batches_run: usize,
    pub wall_time: Duration,
    /// Wall-clock time over the sum of individual hook durations (diagnostic only)
    pub parallel_efficiency: f64,
    pub tier: ExecutionTier,
}

impl AggregatedResult {
    pub fn new(tier: ExecutionTier) -> Self {
        Self {
            tier,
            parallel_efficiency: 1.0,
            ..Default::default()
        }
    }

    /// Result used when no tier could run at all
    pub fn fail_open() -> Self {
        Self::new(ExecutionTier::FailOpen)
    }

    pub fn merge(&mut self, outcome: HookOutcome) {
        self.total_hooks += 1;
        match outcome.status {
            HookStatus::Allowed => self.successful.push(outcome),
            HookStatus::Blocked { .. } => self.blocks.push(outcome),
            HookStatus::Errored { .. } => self.errors.push(outcome),
        }
    }

    pub fn merge_batch(&mut self, outcomes: impl IntoIterator<Item = HookOutcome>) {
        for outcome in outcomes {
            self.merge(outcome);
        }
        self.batches_run += 1;
    }

    pub fn is_blocked(&self) -> bool {
        !self.blocks.is_empty()
    }

    pub fn first_block(&self) -> Option<&HookOutcome> {
        self.blocks.first()
    }

    pub fn hook_time(&self) -> Duration {
        self.successful
            .iter()
            .chain(&self.blocks)
            .chain(&self.errors)
            .map(|o| o.elapsed)
            .sum()
    }

    /// Record total wall time and derive `parallel_efficiency`
    pub fn finalize(&mut self, wall_time: Duration) {
        self.wall_time = wall_time;
        let hook_time = self.hook_time();
        self.parallel_efficiency = if hook_time.is_zero() {
            1.0
        } else {
            wall_time.as_secs_f64() / hook_time.as_secs_f64()
        };
    }
}
