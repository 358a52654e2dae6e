use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Priority tier used to order execution batches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Batch execution order
    pub const ORDER: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle phase a hook is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookPhase {
    /// Before the file operation runs (may block it)
    PreToolUse,
    /// After the file operation completed
    PostToolUse,
}

impl HookPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookPhase::PreToolUse => "PreToolUse",
            HookPhase::PostToolUse => "PostToolUse",
        }
    }
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static configuration of one hook. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookDescriptor {
    pub name: String,

    /// Shell command line used to invoke the hook process
    #[serde(default)]
    pub command: String,

    /// Regex over the tool name, e.g. "Write|Edit|MultiEdit". Empty or "*" matches all.
    #[serde(default)]
    pub matcher: String,

    /// Declared tier; undeclared hooks run with the medium batch
    #[serde(default)]
    pub priority: Option<Priority>,

    /// Logical grouping tag, used by family toggles
    #[serde(default)]
    pub family: Option<String>,

    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl HookDescriptor {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            matcher: String::new(),
            priority: None,
            family: None,
            timeout_ms: None,
        }
    }

    pub fn with_matcher(mut self, matcher: impl Into<String>) -> Self {
        self.matcher = matcher.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn effective_priority(&self) -> Priority {
        self.priority.unwrap_or_default()
    }

    /// Declared timeout, or `default` when the hook does not set one
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout_ms.map(Duration::from_millis).unwrap_or(default)
    }

    pub fn in_family(&self, families: &[String]) -> bool {
        self.family
            .as_deref()
            .map(|f| families.iter().any(|d| d == f))
            .unwrap_or(false)
    }

    /// Compile the matcher anchored on the whole tool name.
    /// Returns `None` for wildcard matchers.
    pub fn compile_matcher(&self) -> Result<Option<Regex>> {
        let pattern = self.matcher.trim();
        if pattern.is_empty() || pattern == "*" {
            return Ok(None);
        }
        let regex = Regex::new(&format!("^(?:{})$", pattern)).with_context(|| {
            format!("Invalid matcher '{}' for hook '{}'", pattern, self.name)
        })?;
        Ok(Some(regex))
    }
}
