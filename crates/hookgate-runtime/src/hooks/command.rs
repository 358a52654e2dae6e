use std::process::Stdio;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::descriptor::HookDescriptor;
use super::hook::{Hook, HookVerdict};
use super::payload::OperationPayload;
use super::protocol::decode_output;

/// Hook backed by an external process.
///
/// The command line runs under `sh -c` with the payload envelope on stdin.
/// The child is killed when the invocation future is dropped, so an
/// abandoned (timed out) hook does not outlive the run.
pub struct CommandHook {
    descriptor: HookDescriptor,
}

impl CommandHook {
    pub fn new(descriptor: HookDescriptor) -> Self {
        Self { descriptor }
    }
}

#[async_trait]
impl Hook for CommandHook {
    fn descriptor(&self) -> &HookDescriptor {
        &self.descriptor
    }

    async fn check(&self, payload: &OperationPayload) -> Result<HookVerdict> {
        let command = self.descriptor.command.trim();
        if command.is_empty() {
            bail!("Hook '{}' has an empty command", self.descriptor.name);
        }

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .env("HOOKGATE_HOOK_NAME", &self.descriptor.name)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn hook '{}'", self.descriptor.name))?;

        let input = serde_json::to_vec(&payload.to_envelope())?;
        if let Some(mut stdin) = child.stdin.take() {
            // Hooks that never read stdin close the pipe early
            if let Err(e) = stdin.write_all(&input).await {
                debug!(hook = %self.descriptor.name, error = %e, "Hook did not consume stdin");
            }
        }

        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("Failed to wait for hook '{}'", self.descriptor.name))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        debug!(
            hook = %self.descriptor.name,
            status = ?output.status.code(),
            "Hook process exited"
        );

        decode_output(&self.descriptor.name, output.status.code(), &stdout, &stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::payload::normalize;
    use crate::hooks::protocol::ProcessFailure;

    fn payload() -> OperationPayload {
        normalize(r#"{"tool_name":"Write","tool_input":{"file_path":".env","content":"A=1"}}"#)
    }

    fn hook(command: &str) -> CommandHook {
        CommandHook::new(HookDescriptor::new("test", command))
    }

    #[tokio::test]
    async fn test_exit_zero_allows() {
        let verdict = hook("true").check(&payload()).await.unwrap();
        assert_eq!(verdict, HookVerdict::Allow);
    }

    #[tokio::test]
    async fn test_exit_two_blocks_with_stderr() {
        let verdict = hook("echo 'env files protected' >&2; exit 2")
            .check(&payload())
            .await
            .unwrap();
        assert_eq!(verdict, HookVerdict::Block("env files protected".into()));
    }

    #[tokio::test]
    async fn test_payload_is_piped_to_stdin() {
        let verdict = hook(r#"grep -q '"file_path":".env"' && { echo seen >&2; exit 2; }; exit 0"#)
            .check(&payload())
            .await
            .unwrap();
        assert_eq!(verdict, HookVerdict::Block("seen".into()));
    }

    #[tokio::test]
    async fn test_legacy_json_stdout() {
        let verdict = hook(r#"echo '{"status":"blocked","message":"legacy says no"}'"#)
            .check(&payload())
            .await
            .unwrap();
        assert_eq!(verdict, HookVerdict::Block("legacy says no".into()));
    }

    #[tokio::test]
    async fn test_crash_is_error_with_stderr() {
        let err = hook("echo boom >&2; exit 7")
            .check(&payload())
            .await
            .unwrap_err();
        let failure = err.downcast_ref::<ProcessFailure>().unwrap();
        assert_eq!(failure.status, Some(7));
        assert_eq!(failure.stderr.trim(), "boom");
    }

    #[tokio::test]
    async fn test_empty_command_rejected() {
        let err = hook("  ").check(&payload()).await.unwrap_err();
        assert!(err.to_string().contains("empty command"));
    }
}
