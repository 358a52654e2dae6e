pub mod command;
pub mod descriptor;
pub mod hook;
pub mod invoker;
pub mod outcome;
pub mod payload;
pub mod priority;
pub mod protocol;
pub mod registry;

pub use command::CommandHook;
pub use descriptor::{HookDescriptor, HookPhase, Priority};
pub use hook::{Hook, HookVerdict};
pub use invoker::{HookInvoker, DEFAULT_HOOK_TIMEOUT};
pub use outcome::{AggregatedResult, ExecutionTier, HookOutcome, HookStatus};
pub use payload::{normalize, EditOperation, OperationPayload};
pub use priority::{classify, ExecutionBatch};
pub use protocol::{LegacyResponse, LegacyStatus, ProcessFailure, BLOCK_EXIT_CODE};
pub use registry::HookRegistry;
