//! Append-only JSON-lines log of pipeline runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::hooks::{AggregatedResult, ExecutionTier, HookPhase, OperationPayload};
use crate::report::ExitProtocol;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub phase: HookPhase,
    pub tool_name: String,
    pub file_path: String,
    pub decision: String,
    pub tier: ExecutionTier,
    pub total_hooks: usize,
    pub blocked_by: Option<String>,
    pub errors: Vec<String>,
    pub wall_ms: u64,
    pub parallel_efficiency: f64,
}

impl RunRecord {
    pub fn new(
        phase: HookPhase,
        payload: &OperationPayload,
        result: &AggregatedResult,
        decision: &ExitProtocol,
    ) -> Self {
        let decision = match decision {
            ExitProtocol::Allow => "allow",
            ExitProtocol::Warn { .. } => "warn",
            ExitProtocol::Block { .. } => "block",
        };
        Self {
            run_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            phase,
            tool_name: payload.tool_name.clone(),
            file_path: payload.file_path.clone(),
            decision: decision.to_string(),
            tier: result.tier,
            total_hooks: result.total_hooks,
            blocked_by: result.first_block().map(|o| o.hook.clone()),
            errors: result.errors.iter().map(|o| o.hook.clone()).collect(),
            wall_ms: result.wall_time.as_millis() as u64,
            parallel_efficiency: result.parallel_efficiency,
        }
    }
}

pub struct MetricsRecorder {
    path: PathBuf,
}

impl MetricsRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn record(&self, record: &RunRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create metrics directory: {:?}", parent))?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .context(format!("Failed to open metrics file: {:?}", self.path))?;
        file.write_all(line.as_bytes())
            .await
            .context("Failed to append run record")?;
        file.flush().await?;
        Ok(())
    }
}
