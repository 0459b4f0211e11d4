//! 步骤执行器
//!
//! 把单个计划步骤拼成执行指令（目标 + 预期结果 + 可用工具清单），交给工具代理执行；
//! 直接/后台两种调用风格统一成一次等待，整个调用受单步超时约束。
//! 代理的任何失败（报错、join 失败、超时）都被吸收为 StepResult{failed}，
//! 是否因此终止整个计划由状态机决定，这里从不上抛。

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::agent::{AgentInvocation, ToolAgent};
use crate::core::{PhaseTimer, PlanStep, StepResult, StepStatus};
use crate::normalize;
use crate::prompts;
use crate::tools::{render_capabilities, Capability};

/// 步骤执行器：对每次步骤执行施加超时，并把结果归一化为展示文本
pub struct StepExecutor {
    agent: Arc<dyn ToolAgent>,
    step_timeout: Duration,
}

impl StepExecutor {
    pub fn new(agent: Arc<dyn ToolAgent>, step_timeout_secs: u64) -> Self {
        Self {
            agent,
            step_timeout: Duration::from_secs(step_timeout_secs),
        }
    }

    /// 执行一个计划步骤；失败一律落入 StepResult{failed}，不向上抛错
    pub async fn execute(&self, step: &PlanStep, capabilities: &[Capability]) -> StepResult {
        let timer = PhaseTimer::start(format!("step_{}", step.step));
        let instruction = prompts::execution_prompt(
            &step.description,
            &step.expected_result,
            &render_capabilities(capabilities),
        );

        let raw = self.invoke_with_timeout(&instruction, capabilities).await;
        let (_, timing) = timer.stop();

        let (status, execution_result) = match raw {
            Ok(value) => (StepStatus::Completed, normalize::normalize(&value)),
            Err(reason) => (StepStatus::Failed, reason),
        };

        let audit = serde_json::json!({
            "event": "step_audit",
            "step": step.step,
            "ok": status == StepStatus::Completed,
            "duration_secs": timing.duration_secs,
        });
        tracing::info!(audit = %audit.to_string(), "step");

        StepResult {
            step: step.step,
            execution_result,
            status,
            timing,
        }
    }

    /// 统一两种调用风格；整个调用（含后台任务）共用同一个单步期限
    async fn invoke_with_timeout(
        &self,
        instruction: &str,
        capabilities: &[Capability],
    ) -> Result<Value, String> {
        let timeout_err = || format!("Step timed out after {:?}", self.step_timeout);
        let started = std::time::Instant::now();

        let invocation = tokio::time::timeout(
            self.step_timeout,
            self.agent.invoke(instruction, capabilities),
        )
        .await
        .map_err(|_| timeout_err())??;

        match invocation {
            AgentInvocation::Direct(value) => Ok(value),
            AgentInvocation::Deferred(handle) => {
                let remaining = self.step_timeout.saturating_sub(started.elapsed());
                let abort = handle.abort_handle();
                match tokio::time::timeout(remaining, handle).await {
                    Ok(joined) => joined
                        .map_err(|e| format!("Agent task failed: {}", e))?,
                    Err(_) => {
                        // 期限已过，后台任务不能继续占用运行时
                        abort.abort();
                        Err(timeout_err())
                    }
                }
            }
        }
    }
}
