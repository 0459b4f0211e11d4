//! planex CLI：读取命令行任务文本，执行 规划 -> 逐步执行 -> 总结，事件以 JSON 行输出

use std::sync::Arc;

use anyhow::Result;

use planex::agent::LlmToolAgent;
use planex::config::load_config;
use planex::executor::StepExecutor;
use planex::llm::{LlmClient, MockLlmClient, OpenAiClient};
use planex::tools::{
    discover_with_timeout, merge_capabilities, ClockTool, EchoTool, ManifestProvider,
    ToolRegistry,
};
use planex::{observability, PlanMachine, PlanRequest};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init();
    let config = load_config(None)?;

    let user_task: String = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if user_task.is_empty() {
        eprintln!("用法: planex <任务描述>");
        std::process::exit(2);
    }

    let llm: Arc<dyn LlmClient> = match config.llm.provider.as_str() {
        "mock" => Arc::new(MockLlmClient::default()),
        _ => {
            let api_key = std::env::var(&config.llm.api_key_env).ok();
            Arc::new(OpenAiClient::new(
                config.llm.base_url.as_deref(),
                &config.llm.model,
                api_key.as_deref(),
            ))
        }
    };

    let mut registry = ToolRegistry::new();
    registry.register(ClockTool);
    registry.register(EchoTool);
    let mut capabilities = registry.capabilities();

    // 配置了清单文件时启动前做一次远端能力发现，失败只降级不阻断
    if let Some(ref manifest) = config.agent.capability_manifest {
        let discovered = discover_with_timeout(
            &ManifestProvider::new(manifest),
            std::time::Duration::from_secs(config.agent.discovery_timeout_secs),
        )
        .await;
        capabilities = merge_capabilities(capabilities, discovered);
    }

    let agent = Arc::new(LlmToolAgent::new(llm.clone()));
    let executor = StepExecutor::new(agent, config.agent.step_timeout_secs);
    let machine = PlanMachine::new(llm, executor, capabilities);

    let (mut rx, handle) = machine.stream(PlanRequest {
        user_task,
        user_id: "cli".to_string(),
    });

    while let Some(event) = rx.recv().await {
        println!("{}", serde_json::to_string(&event)?);
    }

    let state = handle.await?;
    if !state.error.is_empty() {
        eprintln!("执行失败: {}", state.error);
        std::process::exit(1);
    }
    Ok(())
}
