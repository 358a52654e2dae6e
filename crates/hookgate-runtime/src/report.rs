//! Translates an aggregated run into the decision the orchestrator consumes.

use crate::hooks::{AggregatedResult, LegacyResponse, LegacyStatus, BLOCK_EXIT_CODE};

/// Final decision for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitProtocol {
    /// Operation proceeds silently
    Allow,
    /// Operation proceeds; hook errors are surfaced for the operator
    Warn { details: Vec<String> },
    /// Operation is rejected with the blocking hook's message
    Block { hook: String, message: String },
}

impl ExitProtocol {
    pub fn is_blocked(&self) -> bool {
        matches!(self, ExitProtocol::Block { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            ExitProtocol::Block { .. } => BLOCK_EXIT_CODE,
            _ => 0,
        }
    }

    /// Text for the error stream, if any
    pub fn stderr_message(&self) -> Option<String> {
        match self {
            ExitProtocol::Allow => None,
            ExitProtocol::Warn { details } => Some(
                details
                    .iter()
                    .map(|d| format!("hook warning: {}", d))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            ExitProtocol::Block { message, .. } => Some(message.clone()),
        }
    }

    /// Legacy JSON-on-stdout rendering of the same decision
    pub fn to_json(&self) -> LegacyResponse {
        match self {
            ExitProtocol::Block { message, .. } => LegacyResponse::blocked(message.clone()),
            _ => LegacyResponse::ok(),
        }
    }

    /// Read a decision expressed in the legacy JSON form
    pub fn from_legacy(response: &LegacyResponse, source: &str) -> Self {
        match response.status {
            LegacyStatus::Ok => ExitProtocol::Allow,
            LegacyStatus::Blocked => ExitProtocol::Block {
                hook: source.to_string(),
                message: response
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("Blocked by hook '{}'", source)),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reporter {
    verbose: bool,
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// The first block wins: earliest priority batch, then earliest declared hook.
    /// Errors only surface in verbose mode and never block.
    pub fn report(&self, result: &AggregatedResult) -> ExitProtocol {
        if let Some(block) = result.first_block() {
            return ExitProtocol::Block {
                hook: block.hook.clone(),
                message: block.block_message().unwrap_or_default().to_string(),
            };
        }

        if self.verbose && !result.errors.is_empty() {
            let details = result
                .errors
                .iter()
                .map(|o| format!("{}: {}", o.hook, o.error_message().unwrap_or_default()))
                .collect();
            return ExitProtocol::Warn { details };
        }

        ExitProtocol::Allow
    }
}
