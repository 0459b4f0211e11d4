//! 工具代理协作方
//!
//! 状态机不关心代理内部如何选择与调用工具，只依赖 ToolAgent 契约：
//! 给定执行指令与能力清单，返回一次调用（直接结果或可中断的后台任务句柄）。
//! StepExecutor 负责把两种调用风格桥接成统一的同步等待。

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::events::TraceEvent;
use crate::llm::LlmClient;
use crate::tools::Capability;

/// 一次代理调用：直接返回结果，或交回后台任务句柄（可中断风格）
pub enum AgentInvocation {
    /// 直接返回原始结果
    Direct(Value),
    /// 后台执行，句柄等待结果
    Deferred(JoinHandle<Result<Value, String>>),
}

/// 工具调用服务 trait：指令 + 能力清单 -> 一次调用
#[async_trait]
pub trait ToolAgent: Send + Sync {
    async fn invoke(
        &self,
        instruction: &str,
        capabilities: &[Capability],
    ) -> Result<AgentInvocation, String>;
}

/// 单发式代理：把执行指令原样交给一次补全调用
///
/// 没有外部代理引擎时让二进制可以端到端跑通；可选 trace_tx 用于向事件适配器
/// 推送阶段开始/结束。
pub struct LlmToolAgent {
    llm: Arc<dyn LlmClient>,
    trace_tx: Option<UnboundedSender<TraceEvent>>,
}

impl LlmToolAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            trace_tx: None,
        }
    }

    /// 设置 trace 事件通道
    pub fn with_trace_tx(mut self, tx: UnboundedSender<TraceEvent>) -> Self {
        self.trace_tx = Some(tx);
        self
    }

    fn trace(&self, event: TraceEvent) {
        if let Some(tx) = &self.trace_tx {
            let _ = tx.send(event);
        }
    }
}

#[async_trait]
impl ToolAgent for LlmToolAgent {
    /// 指令文本已由 StepExecutor 拼好工具清单，这里不再重复附加
    async fn invoke(
        &self,
        instruction: &str,
        _capabilities: &[Capability],
    ) -> Result<AgentInvocation, String> {
        self.trace(TraceEvent::AgentStart {
            name: "llm_tool_agent".to_string(),
        });
        let result = self.llm.complete(instruction).await;
        self.trace(TraceEvent::AgentEnd {
            name: "llm_tool_agent".to_string(),
        });
        result.map(|text| AgentInvocation::Direct(Value::String(text)))
    }
}
