use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use regex::Regex;
use tracing::debug;

use super::descriptor::HookPhase;
use super::hook::Hook;

struct RegisteredHook {
    hook: Arc<dyn Hook>,
    /// `None` matches every tool
    matcher: Option<Regex>,
}

impl RegisteredHook {
    fn matches_tool(&self, tool_name: &str) -> bool {
        // Flattened test payloads carry no tool name and reach every hook
        if tool_name.is_empty() {
            return true;
        }
        self.matcher
            .as_ref()
            .map(|re| re.is_match(tool_name))
            .unwrap_or(true)
    }
}

/// Registry for hooks, organized by lifecycle phase in configuration order
pub struct HookRegistry {
    hooks: DashMap<HookPhase, Vec<RegisteredHook>>,
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry").finish_non_exhaustive()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            hooks: DashMap::new(),
        }
    }

    /// Register a hook for a phase. Fails if its matcher is not a valid regex.
    pub fn register(&self, phase: HookPhase, hook: Arc<dyn Hook>) -> Result<()> {
        let matcher = hook.descriptor().compile_matcher()?;
        debug!(hook = hook.name(), phase = %phase, "Registered hook");
        self.hooks
            .entry(phase)
            .or_default()
            .push(RegisteredHook { hook, matcher });
        Ok(())
    }

    /// Hooks that apply to `tool_name` in `phase`, skipping disabled families
    pub fn select(
        &self,
        phase: HookPhase,
        tool_name: &str,
        disabled_families: &[String],
    ) -> Vec<Arc<dyn Hook>> {
        self.hooks
            .get(&phase)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.matches_tool(tool_name))
                    .filter(|e| !e.hook.descriptor().in_family(disabled_families))
                    .map(|e| e.hook.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every hook registered for `phase`, in configuration order
    pub fn hooks(&self, phase: HookPhase) -> Vec<Arc<dyn Hook>> {
        self.hooks
            .get(&phase)
            .map(|entries| entries.iter().map(|e| e.hook.clone()).collect())
            .unwrap_or_default()
    }

    /// Check if any hooks are registered for a phase
    pub fn has_hooks(&self, phase: HookPhase) -> bool {
        self.hooks.get(&phase).map(|h| !h.is_empty()).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.hooks.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
