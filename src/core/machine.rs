//! 计划执行状态机
//!
//! 阶段序列：analyze_and_plan -> check_and_execute（逐步循环）-> summary_response。
//! 规划与总结走补全协作方（文本经抢救式解析），每个步骤交给 StepExecutor；
//! 每次状态推进都产生进度事件，经 pending_events 队列按序外发。
//! 任一阶段失败落入 Failed 终态：规划失败记录固定诊断文本，步骤失败采用
//! fail-fast（后续步骤可能依赖前序副作用，不再继续），总结失败同样终止。

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::core::{PhaseTimer, PlanError, PlanState, PlanStatus, PlanStep, ProgressEvent};
use crate::executor::StepExecutor;
use crate::llm::LlmClient;
use crate::parser;
use crate::prompts;
use crate::tools::Capability;

/// 规划失败时写入 error 的固定诊断文本
pub const PLANNING_FAILED_DIAGNOSTIC: &str = "Failed to generate a valid execution plan";

/// 一次任务执行请求
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub user_task: String,
    pub user_id: String,
}

/// 规划 prompt 要求的纯 JSON 计划结构
#[derive(Debug, Deserialize)]
struct PlanDocument {
    #[serde(default)]
    task_analysis: String,
    #[serde(default)]
    execution_plans: Vec<PlanStep>,
}

/// 计划执行状态机：每个外部请求新建一台，独占其 PlanState，任务结束即弃
pub struct PlanMachine {
    llm: Arc<dyn LlmClient>,
    executor: StepExecutor,
    capabilities: Vec<Capability>,
    event_tx: Option<UnboundedSender<ProgressEvent>>,
}

impl PlanMachine {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        executor: StepExecutor,
        capabilities: Vec<Capability>,
    ) -> Self {
        Self {
            llm,
            executor,
            capabilities,
            event_tx: None,
        }
    }

    /// 设置进度事件通道
    pub fn with_event_tx(mut self, tx: UnboundedSender<ProgressEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// 流式执行：返回 (事件接收端, 终态 PlanState 的句柄)；
    /// 事件序列以 completed 事件收尾，或在 Failed 后直接结束
    pub fn stream(
        mut self,
        request: PlanRequest,
    ) -> (UnboundedReceiver<ProgressEvent>, JoinHandle<PlanState>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.event_tx = Some(tx);
        let handle = tokio::spawn(async move { self.run(request).await });
        (rx, handle)
    }

    /// 驱动完整阶段序列直至终态
    pub async fn run(&self, request: PlanRequest) -> PlanState {
        let mut state = PlanState::new(request.user_task, request.user_id);
        tracing::info!(
            request_id = %state.request_id,
            user_id = %state.user_id,
            "plan execution started"
        );

        self.analyze_and_plan(&mut state).await;
        if state.status != PlanStatus::Failed {
            self.check_and_execute(&mut state).await;
        }
        if state.status != PlanStatus::Failed {
            self.summary_response(&mut state).await;
        }

        tracing::info!(
            request_id = %state.request_id,
            status = ?state.status,
            steps = state.step_results.len(),
            "plan execution finished"
        );
        state
    }

    /// 规划阶段：补全 -> 抢救式解析 -> 结构校验；失败写入固定诊断并终止
    async fn analyze_and_plan(&self, state: &mut PlanState) {
        state.status = PlanStatus::Planning;
        let timer = PhaseTimer::start("planning");
        let generated = self.generate_plan(&state.user_task).await;
        let (name, timing) = timer.stop();
        state.timing_info.record(&name, &timing);

        let document = match generated {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!(request_id = %state.request_id, error = %e, "planning failed");
                state.fail(PLANNING_FAILED_DIAGNOSTIC);
                return;
            }
        };

        state.task_analysis = document.task_analysis;
        state.execution_plans = document.execution_plans;
        // 序号缺失时按出现顺序补齐（1 起）
        for (i, step) in state.execution_plans.iter_mut().enumerate() {
            if step.step == 0 {
                step.step = i + 1;
            }
        }

        let data = serde_json::json!({
            "task_analysis": state.task_analysis,
            "execution_plans": state.execution_plans,
        });
        self.emit(
            state,
            ProgressEvent::new(
                "plan",
                format!("执行计划已生成，共 {} 步", state.execution_plans.len()),
                data,
                "analyze_and_plan",
            ),
        );
    }

    /// 计划生成：补全文本经抢救式解析后做结构校验（非空、description 非空）
    async fn generate_plan(&self, user_task: &str) -> Result<PlanDocument, PlanError> {
        let prompt = prompts::planning_prompt(user_task);
        let text = self
            .llm
            .complete(&prompt)
            .await
            .map_err(PlanError::LlmError)?;

        let value = parser::json_match(&text);
        let document: PlanDocument = serde_json::from_value(value)
            .map_err(|e| PlanError::JsonParseError(e.to_string()))?;

        if document.execution_plans.is_empty() {
            return Err(PlanError::InvalidPlan("execution_plans is empty".to_string()));
        }
        if document
            .execution_plans
            .iter()
            .any(|s| s.description.trim().is_empty())
        {
            return Err(PlanError::InvalidPlan(
                "step description is blank".to_string(),
            ));
        }
        Ok(document)
    }

    /// 执行阶段：严格顺序逐步执行；每步恰好追加一个 StepResult、发出一条事件；
    /// 步骤失败即终止（fail-fast）
    async fn check_and_execute(&self, state: &mut PlanState) {
        state.status = PlanStatus::Executing;

        while state.current_step < state.execution_plans.len() {
            let step = state.execution_plans[state.current_step].clone();
            let result = self.executor.execute(&step, &self.capabilities).await;
            let failed = result.is_failed();

            let message = if failed {
                format!("第 {} 步执行失败", result.step)
            } else {
                format!("第 {} 步执行完成", result.step)
            };
            let data = serde_json::to_value(&result).unwrap_or_else(|_| serde_json::json!({}));

            state.step_results.push(result);
            state.current_step += 1;
            debug_assert_eq!(state.step_results.len(), state.current_step);

            self.emit(
                state,
                ProgressEvent::new("step_result", message, data, "check_and_execute"),
            );

            if failed {
                let reason = state
                    .step_results
                    .last()
                    .map(|r| r.execution_result.clone())
                    .unwrap_or_default();
                state.fail(format!("Step {} failed: {}", state.current_step, reason));
                return;
            }
        }
    }

    /// 总结阶段：补全成功进入 Completed 并发出终态事件，失败落入 Failed
    async fn summary_response(&self, state: &mut PlanState) {
        state.status = PlanStatus::Summarizing;
        let timer = PhaseTimer::start("summary");

        let plan_text = serde_json::to_string(&state.execution_plans).unwrap_or_default();
        let results_text = serde_json::to_string(&state.step_results).unwrap_or_default();
        let prompt = prompts::summary_prompt(
            &state.user_task,
            &state.task_analysis,
            &plan_text,
            &results_text,
        );
        let completion = self.llm.complete(&prompt).await;
        let (name, timing) = timer.stop();
        state.timing_info.record(&name, &timing);

        let response = match completion.map_err(PlanError::SummaryFailed) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(request_id = %state.request_id, error = %e, "summary completion failed");
                state.fail(e.to_string());
                return;
            }
        };

        // 总耗时只计规划与总结两个阶段，单步耗时保留在各自的 StepResult 中
        let total = state.timing_info.total_of(&["planning", "summary"]);
        state.status = PlanStatus::Completed;

        let data = serde_json::json!({
            "response": response,
            "timing_info": state.timing_info.to_value(),
            "total_duration": total,
            "step_results": state.step_results,
            "execution_plan": state.execution_plans,
        });
        self.emit(
            state,
            ProgressEvent::new("completed", "任务执行完成", data, "summary_response"),
        );
    }

    /// 事件先入 pending 队列，再按序外发（保证发出顺序与产生顺序一致）
    fn emit(&self, state: &mut PlanState, event: ProgressEvent) {
        state.pending_events.push(event);
        if let Some(tx) = &self.event_tx {
            for event in state.drain_events() {
                let _ = tx.send(event);
            }
        }
    }
}
