//! Planex - 任务规划执行引擎
//!
//! 模块划分：
//! - **agent**: 工具代理协作方契约（直接/后台两种调用风格）与单发式实现
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 状态定义、计划执行状态机、阶段计时、错误类型
//! - **events**: 执行引擎 trace 事件到进度事件的适配（含中断提前终止）
//! - **executor**: 步骤执行器（指令拼装、超时、结果归一化）
//! - **llm**: 补全服务抽象与实现（OpenAI 兼容 / Mock）
//! - **normalize**: 异构执行结果归一化为展示文本
//! - **parser**: LLM 输出的抢救式 JSON 提取
//! - **prompts**: 规划 / 执行 / 总结 prompt 模板
//! - **tools**: 工具注册表、能力描述与远端能力发现

pub mod agent;
pub mod config;
pub mod core;
pub mod events;
pub mod executor;
pub mod llm;
pub mod normalize;
pub mod observability;
pub mod parser;
pub mod prompts;
pub mod tools;

pub use crate::core::{PlanMachine, PlanRequest, PlanState, PlanStatus, ProgressEvent};
