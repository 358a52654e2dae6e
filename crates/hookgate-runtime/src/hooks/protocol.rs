//! Wire formats hook processes use to report a decision.
//!
//! Two conventions coexist: exit status 2 with the reason on stderr, and a
//! legacy JSON object on stdout (`{"status":"ok"|"blocked","message":...}`)
//! with exit status 0. Both decode into [`HookVerdict`].

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::hook::HookVerdict;

/// Exit status meaning "block this operation"
pub const BLOCK_EXIT_CODE: i32 = 2;

/// Hook process ended in a way that is neither allow nor block
#[derive(Debug, Clone)]
pub struct ProcessFailure {
    /// `None` when killed by a signal
    pub status: Option<i32>,
    pub stderr: String,
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "hook exited with status {}", code)?,
            None => write!(f, "hook terminated by signal")?,
        }
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            write!(f, ": {}", stderr)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProcessFailure {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyStatus {
    Ok,
    Blocked,
}

/// Legacy JSON-on-stdout response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyResponse {
    pub status: LegacyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LegacyResponse {
    pub fn ok() -> Self {
        Self {
            status: LegacyStatus::Ok,
            message: None,
        }
    }

    pub fn blocked(message: impl Into<String>) -> Self {
        Self {
            status: LegacyStatus::Blocked,
            message: Some(message.into()),
        }
    }

    /// Parse the last non-empty stdout line as a legacy response
    pub fn parse(stdout: &str) -> Option<Self> {
        let line = stdout.lines().rev().find(|l| !l.trim().is_empty())?;
        serde_json::from_str(line.trim()).ok()
    }
}

/// Decode a finished hook process into a verdict.
pub fn decode_output(
    hook_name: &str,
    status: Option<i32>,
    stdout: &str,
    stderr: &str,
) -> Result<HookVerdict> {
    match status {
        Some(0) => match LegacyResponse::parse(stdout) {
            Some(LegacyResponse {
                status: LegacyStatus::Blocked,
                message,
            }) => Ok(HookVerdict::Block(
                message.unwrap_or_else(|| default_block_message(hook_name)),
            )),
            _ => Ok(HookVerdict::Allow),
        },
        Some(BLOCK_EXIT_CODE) => {
            let message = [stderr, stdout]
                .into_iter()
                .map(str::trim)
                .find(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| default_block_message(hook_name));
            Ok(HookVerdict::Block(message))
        }
        status => Err(ProcessFailure {
            status,
            stderr: stderr.to_string(),
        }
        .into()),
    }
}

fn default_block_message(hook_name: &str) -> String {
    format!("Blocked by hook '{}'", hook_name)
}
