use anyhow::{bail, Result};
use async_trait::async_trait;
use hookgate_runtime::{
    AggregatedResult, CommandHook, EmergencyExecutor, ExecutionStrategy, ExecutionTier,
    ExitProtocol, FallbackChain, Hook, HookDescriptor, HookInvoker, HookPhase, HookPipeline,
    HookRegistry, HookVerdict, OperationPayload, ParallelExecutor, PipelineConfig, Priority,
    RunRecord, SequentialExecutor,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-process validator with an execution counter
struct ScenarioHook {
    descriptor: HookDescriptor,
    calls: Arc<AtomicUsize>,
    rule: fn(&OperationPayload) -> HookVerdict,
}

#[async_trait]
impl Hook for ScenarioHook {
    fn descriptor(&self) -> &HookDescriptor {
        &self.descriptor
    }

    async fn check(&self, payload: &OperationPayload) -> Result<HookVerdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((self.rule)(payload))
    }
}

fn always_allow(_: &OperationPayload) -> HookVerdict {
    HookVerdict::Allow
}

fn env_guard(payload: &OperationPayload) -> HookVerdict {
    if payload.file_path.ends_with(".env") {
        HookVerdict::Block("env files protected".into())
    } else {
        HookVerdict::Allow
    }
}

struct Scenario {
    registry: Arc<HookRegistry>,
    counters: Vec<Arc<AtomicUsize>>,
}

impl Scenario {
    fn calls(&self) -> Vec<usize> {
        self.counters.iter().map(|c| c.load(Ordering::SeqCst)).collect()
    }

    fn total_calls(&self) -> usize {
        self.calls().iter().sum()
    }
}

/// critical always-allow, high .env guard, low always-allow
fn scenario() -> Scenario {
    let registry = Arc::new(HookRegistry::new());
    let mut counters = Vec::new();
    let specs: [(&str, Priority, fn(&OperationPayload) -> HookVerdict); 3] = [
        ("infra", Priority::Critical, always_allow),
        ("env-guard", Priority::High, env_guard),
        ("cosmetic", Priority::Low, always_allow),
    ];
    for (name, priority, rule) in specs {
        let calls = Arc::new(AtomicUsize::new(0));
        counters.push(calls.clone());
        registry
            .register(
                HookPhase::PreToolUse,
                Arc::new(ScenarioHook {
                    descriptor: HookDescriptor::new(name, "")
                        .with_priority(priority)
                        .with_matcher("Write|Edit|MultiEdit"),
                    calls,
                    rule,
                }),
            )
            .unwrap();
    }
    Scenario { registry, counters }
}

fn write_input(path: &str) -> String {
    json!({
        "tool_name": "Write",
        "tool_input": {"file_path": path, "content": "SECRET=1"}
    })
    .to_string()
}

#[tokio::test]
async fn test_env_file_is_blocked_before_low_priority_runs() {
    let scenario = scenario();
    let pipeline = HookPipeline::new(PipelineConfig::default(), scenario.registry.clone());

    let decision = pipeline
        .process(HookPhase::PreToolUse, &write_input(".env"))
        .await;

    assert_eq!(
        decision,
        ExitProtocol::Block {
            hook: "env-guard".into(),
            message: "env files protected".into()
        }
    );
    assert_eq!(decision.exit_code(), 2);
    assert_eq!(scenario.calls(), vec![1, 1, 0]);
}

#[tokio::test]
async fn test_regular_file_runs_every_batch() {
    let scenario = scenario();
    let pipeline = HookPipeline::new(PipelineConfig::default(), scenario.registry.clone());

    let decision = pipeline
        .process(HookPhase::PreToolUse, &write_input("foo.ts"))
        .await;

    assert_eq!(decision, ExitProtocol::Allow);
    assert_eq!(scenario.total_calls(), 3);
}

#[tokio::test]
async fn test_flat_test_payload_is_accepted() {
    let scenario = scenario();
    let pipeline = HookPipeline::new(PipelineConfig::default(), scenario.registry.clone());

    let decision = pipeline
        .process(HookPhase::PreToolUse, r#"{"file_path": "config/.env"}"#)
        .await;

    assert!(decision.is_blocked());
}

#[tokio::test]
async fn test_malformed_input_allows_without_running_hooks() {
    let scenario = scenario();
    let pipeline = HookPipeline::new(PipelineConfig::default(), scenario.registry.clone());

    for raw in ["", "not json", "{\"tool_input\": 3}", "null"] {
        let decision = pipeline.process(HookPhase::PreToolUse, raw).await;
        assert_eq!(decision, ExitProtocol::Allow, "input {:?}", raw);
    }
    assert_eq!(scenario.total_calls(), 0);
}

#[tokio::test]
async fn test_bypass_skips_registry() {
    let scenario = scenario();
    let mut config = PipelineConfig::default();
    config.apply_env([("HOOKGATE_BYPASS", "1")]);
    let pipeline = HookPipeline::new(config, scenario.registry.clone());

    let decision = pipeline
        .process(HookPhase::PreToolUse, &write_input(".env"))
        .await;

    assert_eq!(decision, ExitProtocol::Allow);
    assert_eq!(scenario.total_calls(), 0);
}

#[tokio::test]
async fn test_matcher_excludes_other_tools() {
    let scenario = scenario();
    let pipeline = HookPipeline::new(PipelineConfig::default(), scenario.registry.clone());

    let raw = json!({"tool_name": "Read", "tool_input": {"file_path": ".env"}}).to_string();
    let decision = pipeline.process(HookPhase::PreToolUse, &raw).await;

    assert_eq!(decision, ExitProtocol::Allow);
    assert_eq!(scenario.total_calls(), 0);
}

#[tokio::test]
async fn test_parallel_and_sequential_agree_on_allow() {
    let scenario = scenario();
    let hooks = scenario.registry.hooks(HookPhase::PreToolUse);
    let payload = Arc::new(OperationPayload {
        tool_name: "Edit".into(),
        file_path: "src/lib.rs".into(),
        ..Default::default()
    });

    let parallel = ParallelExecutor::new(HookInvoker::default())
        .run(&hooks, payload.clone())
        .await
        .unwrap();
    let sequential = SequentialExecutor::new(HookInvoker::default())
        .run(&hooks, payload)
        .await
        .unwrap();

    assert!(!parallel.is_blocked());
    assert!(!sequential.is_blocked());
    assert_eq!(parallel.total_hooks, sequential.total_hooks);
}

#[tokio::test]
async fn test_same_batch_double_block_reports_first_declared() {
    let registry = Arc::new(HookRegistry::new());
    registry
        .register(
            HookPhase::PreToolUse,
            Arc::new(CommandHook::new(
                HookDescriptor::new("slow-first", "sleep 0.3; echo 'first declared' >&2; exit 2")
                    .with_priority(Priority::High),
            )),
        )
        .unwrap();
    registry
        .register(
            HookPhase::PreToolUse,
            Arc::new(CommandHook::new(
                HookDescriptor::new("fast-second", "echo 'second declared' >&2; exit 2")
                    .with_priority(Priority::High),
            )),
        )
        .unwrap();

    let pipeline = HookPipeline::new(PipelineConfig::default(), registry);
    let decision = pipeline
        .process(HookPhase::PreToolUse, &write_input("a.ts"))
        .await;

    assert_eq!(decision.stderr_message().as_deref(), Some("first declared"));
}

#[tokio::test]
async fn test_slow_blocking_process_never_blocks() {
    let registry = Arc::new(HookRegistry::new());
    registry
        .register(
            HookPhase::PreToolUse,
            Arc::new(CommandHook::new(
                HookDescriptor::new("slow-blocker", "sleep 3; echo 'too slow' >&2; exit 2")
                    .with_priority(Priority::Critical)
                    .with_timeout_ms(150),
            )),
        )
        .unwrap();
    registry
        .register(
            HookPhase::PreToolUse,
            Arc::new(CommandHook::new(HookDescriptor::new("ok", "exit 0"))),
        )
        .unwrap();

    let config = PipelineConfig {
        verbose: true,
        ..Default::default()
    };
    let pipeline = HookPipeline::new(config, registry);
    let decision = pipeline
        .process(HookPhase::PreToolUse, &write_input(".env"))
        .await;

    assert!(!decision.is_blocked());
    assert_eq!(decision.exit_code(), 0);
    assert!(decision.stderr_message().unwrap().contains("timed out"));
}

struct ThrowingStrategy(ExecutionTier);

#[async_trait]
impl ExecutionStrategy for ThrowingStrategy {
    fn tier(&self) -> ExecutionTier {
        self.0
    }

    async fn run(
        &self,
        _hooks: &[Arc<dyn Hook>],
        _payload: Arc<OperationPayload>,
    ) -> Result<AggregatedResult> {
        bail!("process spawning unavailable")
    }
}

#[tokio::test]
async fn test_broken_parallel_path_still_blocks_via_sequential() {
    let scenario = scenario();
    let chain = FallbackChain::new(vec![
        Arc::new(ThrowingStrategy(ExecutionTier::Parallel)),
        Arc::new(SequentialExecutor::new(HookInvoker::default())),
        Arc::new(EmergencyExecutor::new(Duration::from_secs(1))),
    ]);
    let pipeline =
        HookPipeline::new(PipelineConfig::default(), scenario.registry.clone()).with_chain(chain);

    let decision = pipeline
        .process(HookPhase::PreToolUse, &write_input(".env"))
        .await;

    assert!(decision.is_blocked());
    assert_eq!(scenario.calls(), vec![1, 1, 0]);
}

#[tokio::test]
async fn test_every_tier_broken_allows() {
    let scenario = scenario();
    let chain = FallbackChain::new(vec![
        Arc::new(ThrowingStrategy(ExecutionTier::Parallel)),
        Arc::new(ThrowingStrategy(ExecutionTier::Sequential)),
        Arc::new(ThrowingStrategy(ExecutionTier::Emergency)),
    ]);
    let pipeline =
        HookPipeline::new(PipelineConfig::default(), scenario.registry.clone()).with_chain(chain);

    let decision = pipeline
        .process(HookPhase::PreToolUse, &write_input(".env"))
        .await;

    assert_eq!(decision, ExitProtocol::Allow);
}

#[tokio::test]
async fn test_run_metrics_are_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let metrics_path = dir.path().join("runs.jsonl");
    let scenario = scenario();
    let config = PipelineConfig {
        metrics_path: Some(metrics_path.clone()),
        ..Default::default()
    };
    let pipeline = HookPipeline::new(config, scenario.registry.clone());

    pipeline
        .process(HookPhase::PreToolUse, &write_input(".env"))
        .await;

    let content = std::fs::read_to_string(&metrics_path).unwrap();
    let record: RunRecord = serde_json::from_str(content.trim()).unwrap();
    assert_eq!(record.decision, "block");
    assert_eq!(record.blocked_by.as_deref(), Some("env-guard"));
    assert_eq!(record.total_hooks, 2);
    assert_eq!(record.tier, ExecutionTier::Parallel);
}
