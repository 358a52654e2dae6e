//! Normalizes the orchestrator's stdin JSON into one canonical payload.
//!
//! Two input shapes are accepted: the native envelope
//! `{ "tool_name": ..., "tool_input": { ... } }` and a flattened test shape
//! exposing `file_path`, `content`, etc. at the top level.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

/// One replacement inside a MultiEdit operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOperation {
    #[serde(default)]
    pub old_string: String,
    #[serde(default)]
    pub new_string: String,
    #[serde(default)]
    pub replace_all: bool,
}

/// Canonical description of the pending file operation.
/// Built once per invocation and shared read-only by every hook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationPayload {
    pub tool_name: String,
    pub file_path: String,
    pub content: Option<String>,
    pub old_string: Option<String>,
    pub new_string: Option<String>,
    pub edits: Vec<EditOperation>,
}

impl OperationPayload {
    /// Nothing to validate
    pub fn is_empty(&self) -> bool {
        self.tool_name.is_empty()
            && self.file_path.is_empty()
            && self.content.is_none()
            && self.old_string.is_none()
            && self.new_string.is_none()
            && self.edits.is_empty()
    }

    /// Render back into the native envelope handed to hook processes on stdin
    pub fn to_envelope(&self) -> Value {
        let mut input = Map::new();
        input.insert("file_path".into(), json!(self.file_path));
        if let Some(content) = &self.content {
            input.insert("content".into(), json!(content));
        }
        if let Some(old) = &self.old_string {
            input.insert("old_string".into(), json!(old));
        }
        if let Some(new) = &self.new_string {
            input.insert("new_string".into(), json!(new));
        }
        if !self.edits.is_empty() {
            input.insert("edits".into(), json!(self.edits));
        }
        json!({
            "tool_name": self.tool_name,
            "tool_input": Value::Object(input),
        })
    }

    /// All text this operation would write (content, new strings, edit targets)
    pub fn new_text(&self) -> Vec<&str> {
        let mut texts = Vec::new();
        if let Some(content) = &self.content {
            texts.push(content.as_str());
        }
        if let Some(new) = &self.new_string {
            texts.push(new.as_str());
        }
        texts.extend(self.edits.iter().map(|e| e.new_string.as_str()));
        texts
    }
}

/// Parse raw stdin. Never fails: malformed input yields an empty payload.
pub fn normalize(raw: &str) -> OperationPayload {
    if raw.trim().is_empty() {
        return OperationPayload::default();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => normalize_value(&value),
        Err(e) => {
            debug!(error = %e, "Hook input is not valid JSON, treating as empty payload");
            OperationPayload::default()
        }
    }
}

pub fn normalize_value(value: &Value) -> OperationPayload {
    let Some(envelope) = value.as_object() else {
        return OperationPayload::default();
    };

    let tool_name = string_field(envelope, "tool_name").unwrap_or_default();

    // Native envelope wraps the operation; the flat shape exposes it directly
    let input = match envelope.get("tool_input") {
        Some(Value::Object(input)) => input,
        Some(_) => {
            return OperationPayload {
                tool_name,
                ..Default::default()
            }
        }
        None => envelope,
    };

    let edits = input
        .get("edits")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<EditOperation>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    OperationPayload {
        tool_name,
        file_path: string_field(input, "file_path").unwrap_or_default(),
        content: string_field(input, "content"),
        old_string: string_field(input, "old_string"),
        new_string: string_field(input, "new_string"),
        edits,
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}
