//! 状态定义：PlanState 与计划/步骤/事件结构
//!
//! 一次任务执行对应一个 PlanState，由状态机独占持有，任务结束（Completed / Failed）即丢弃，
//! 不跨任务持久化。execution_plans 在规划成功后固定不变；step_results 只追加。

use serde::{Deserialize, Serialize};

use crate::core::TimingInfo;

/// 执行阶段。除任意状态可落入 Failed 外单调推进，Completed / Failed 为终态
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Initialized,
    Planning,
    Executing,
    Summarizing,
    Completed,
    Failed,
}

impl PlanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlanStatus::Completed | PlanStatus::Failed)
    }
}

/// 计划中的单个步骤（解析后不可变）
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanStep {
    /// 从 1 开始的序号
    #[serde(default)]
    pub step: usize,
    pub description: String,
    #[serde(default)]
    pub expected_result: String,
    /// 是否需要用户确认（由规划 prompt 约束，解析器只检查字段存在性）
    #[serde(default)]
    pub requires_confirmation: bool,
    /// 需要确认时的原因说明，否则为空
    #[serde(default)]
    pub uncertainty_reason: String,
}

/// 步骤执行状态
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Failed,
}

/// 单步执行结果：每步恰好创建一次，创建后不再修改
#[derive(Clone, Debug, Serialize)]
pub struct StepResult {
    pub step: usize,
    /// 归一化后的展示文本
    pub execution_result: String,
    pub status: StepStatus,
    pub timing: crate::core::PhaseTiming,
}

impl StepResult {
    pub fn is_failed(&self) -> bool {
        self.status == StepStatus::Failed
    }
}

/// 进度事件：由状态机或事件适配器产生，被调用方消费一次，内部不保留
#[derive(Clone, Debug, Serialize)]
pub struct ProgressEvent {
    /// 阶段或步骤标识（如 "plan" / "step_result" / "completed" / "interrupt"）
    pub step: String,
    /// 人类可读消息
    pub message: String,
    /// 结构化负载
    pub data: serde_json::Value,
    /// 来源组件名（如 "analyze_and_plan" / "check_and_execute"）
    pub node: String,
}

impl ProgressEvent {
    pub fn new(
        step: impl Into<String>,
        message: impl Into<String>,
        data: serde_json::Value,
        node: impl Into<String>,
    ) -> Self {
        Self {
            step: step.into(),
            message: message.into(),
            data,
            node: node.into(),
        }
    }
}

/// 一次任务执行的完整状态
#[derive(Debug, Serialize)]
pub struct PlanState {
    pub status: PlanStatus,
    /// 请求标识（日志关联用）
    pub request_id: String,
    pub user_id: String,
    /// 原始任务文本（不可变输入）
    pub user_task: String,
    /// 规划阶段产出的任务分析
    pub task_analysis: String,
    /// 规划成功后固定的执行计划
    pub execution_plans: Vec<PlanStep>,
    /// 不变式：0 <= current_step <= execution_plans.len()，每成功一步 +1
    pub current_step: usize,
    /// 不变式：状态非 Failed 时 step_results.len() == current_step
    pub step_results: Vec<StepResult>,
    pub timing_info: TimingInfo,
    /// 自上次 drain 以来产生的进度事件
    #[serde(skip)]
    pub pending_events: Vec<ProgressEvent>,
    /// 仅在进入 Failed 时设置
    pub error: String,
}

impl PlanState {
    pub fn new(user_task: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            status: PlanStatus::Initialized,
            request_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            user_task: user_task.into(),
            task_analysis: String::new(),
            execution_plans: Vec::new(),
            current_step: 0,
            step_results: Vec::new(),
            timing_info: TimingInfo::new(),
            pending_events: Vec::new(),
            error: String::new(),
        }
    }

    /// 置为 Failed 并记录错误（终态，只允许设置一次错误文本）
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = PlanStatus::Failed;
        if self.error.is_empty() {
            self.error = error.into();
        }
    }

    /// 取走并清空待发送事件（队列顺序）
    pub fn drain_events(&mut self) -> Vec<ProgressEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_keeps_first_error() {
        let mut state = PlanState::new("task", "u1");
        state.fail("first");
        state.fail("second");
        assert_eq!(state.status, PlanStatus::Failed);
        assert_eq!(state.error, "first");
    }

    #[test]
    fn test_drain_events_clears_queue() {
        let mut state = PlanState::new("task", "u1");
        state.pending_events.push(ProgressEvent::new(
            "plan",
            "ok",
            serde_json::json!({}),
            "analyze_and_plan",
        ));
        let drained = state.drain_events();
        assert_eq!(drained.len(), 1);
        assert!(state.pending_events.is_empty());
    }

    #[test]
    fn test_plan_step_deserialize_defaults() {
        let step: PlanStep =
            serde_json::from_str(r#"{"step": 1, "description": "读取当前时间"}"#).unwrap();
        assert_eq!(step.step, 1);
        assert!(!step.requires_confirmation);
        assert!(step.uncertainty_reason.is_empty());
        assert!(step.expected_result.is_empty());
    }
}
