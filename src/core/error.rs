//! 错误类型
//!
//! 规划与总结阶段的内部错误用 PlanError 表达，由状态机吸收为 Failed 终态；
//! 步骤内部的失败不走错误传播，而是被 StepExecutor 吸收为 StepResult{failed}。

use thiserror::Error;

/// 计划生成与总结过程中可能出现的错误
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    /// 计划缺失或结构不合法（无步骤、缺 description 等）
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Summary failed: {0}")]
    SummaryFailed(String),
}
