//! 事件流适配
//!
//! 把执行引擎的五类 trace 事件按到达顺序映射为对外的 ProgressEvent：
//! 阶段开始/结束、工具开始/结束、携带排队进度的状态增量，以及一个特殊的
//! interrupt 信号——收到后发出终止事件并立刻停止消费（提前终止）。
//! 单消费者、保序；消费间可因背压挂起，但发出顺序不变。

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::core::ProgressEvent;

/// 适配器产生的事件在 ProgressEvent.node 中的标识
const ADAPTER_NODE: &str = "event_adapter";

/// 执行引擎的 trace 事件
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    /// 阶段（子代理）开始
    AgentStart { name: String },
    /// 阶段（子代理）结束
    AgentEnd { name: String },
    /// 工具调用开始
    ToolStart { name: String },
    /// 工具调用结束
    ToolEnd { name: String },
    /// 状态增量：携带自上次以来排队的进度条目
    StateDelta { queued: Vec<ProgressEvent> },
    /// 中断信号：需要用户确认，流提前终止
    Interrupt { payload: Value },
}

/// 事件流适配器：逐条映射 trace 事件；handle 返回 false 表示流已终止
pub struct EventStreamAdapter {
    tx: UnboundedSender<ProgressEvent>,
    terminated: bool,
}

impl EventStreamAdapter {
    pub fn new(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self {
            tx,
            terminated: false,
        }
    }

    /// 处理一条 trace 事件；遇到 Interrupt 发出终止事件后返回 false，不再接收后续事件
    pub fn handle(&mut self, event: TraceEvent) -> bool {
        if self.terminated {
            return false;
        }
        match event {
            TraceEvent::AgentStart { name } => {
                self.emit(ProgressEvent::new(
                    "agent_start",
                    format!("开始执行 {}", name),
                    Value::Null,
                    ADAPTER_NODE,
                ));
            }
            TraceEvent::AgentEnd { name } => {
                self.emit(ProgressEvent::new(
                    "agent_complete",
                    format!("完成执行 {}", name),
                    Value::Null,
                    ADAPTER_NODE,
                ));
            }
            TraceEvent::ToolStart { name } => {
                self.emit(ProgressEvent::new(
                    "tool_start",
                    format!("正在使用工具 {}", name),
                    Value::Null,
                    ADAPTER_NODE,
                ));
            }
            TraceEvent::ToolEnd { name } => {
                self.emit(ProgressEvent::new(
                    "tool_complete",
                    format!("工具 {} 调用完成", name),
                    Value::Null,
                    ADAPTER_NODE,
                ));
            }
            TraceEvent::StateDelta { queued } => {
                // 排队条目各自成为一条事件，保持队列顺序
                for entry in queued {
                    self.emit(entry);
                }
            }
            TraceEvent::Interrupt { payload } => {
                self.emit(ProgressEvent::new(
                    "interrupt",
                    "需要用户确认",
                    payload,
                    ADAPTER_NODE,
                ));
                self.terminated = true;
                return false;
            }
        }
        true
    }

    /// 流是否已因中断终止
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    fn emit(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }

    /// 持续消费 trace 事件直到通道关闭或收到 Interrupt
    pub async fn pump(mut self, mut rx: UnboundedReceiver<TraceEvent>) {
        while let Some(event) = rx.recv().await {
            if !self.handle(event) {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn collect(rx: &mut UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[test]
    fn test_maps_phases_and_tools_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut adapter = EventStreamAdapter::new(tx);
        assert!(adapter.handle(TraceEvent::AgentStart {
            name: "check_and_execute".into()
        }));
        assert!(adapter.handle(TraceEvent::ToolStart {
            name: "clock".into()
        }));
        assert!(adapter.handle(TraceEvent::ToolEnd {
            name: "clock".into()
        }));
        assert!(adapter.handle(TraceEvent::AgentEnd {
            name: "check_and_execute".into()
        }));

        let events = collect(&mut rx);
        let steps: Vec<&str> = events.iter().map(|e| e.step.as_str()).collect();
        assert_eq!(
            steps,
            vec!["agent_start", "tool_start", "tool_complete", "agent_complete"]
        );
        assert!(events[1].message.contains("clock"));
    }

    #[test]
    fn test_state_delta_expands_queue_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut adapter = EventStreamAdapter::new(tx);
        let queued = vec![
            ProgressEvent::new("step_result", "第 1 步完成", json!({"step":1}), "check_and_execute"),
            ProgressEvent::new("step_result", "第 2 步完成", json!({"step":2}), "check_and_execute"),
        ];
        assert!(adapter.handle(TraceEvent::StateDelta { queued }));

        let events = collect(&mut rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data["step"], 1);
        assert_eq!(events[1].data["step"], 2);
    }

    #[test]
    fn test_interrupt_terminates_stream() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut adapter = EventStreamAdapter::new(tx);
        assert!(!adapter.handle(TraceEvent::Interrupt {
            payload: json!({"step": 2, "reason": "删除操作需确认"})
        }));
        // 终止后继续投递的事件被丢弃
        assert!(!adapter.handle(TraceEvent::ToolStart {
            name: "clock".into()
        }));
        assert!(adapter.is_terminated());

        let events = collect(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].step, "interrupt");
        assert_eq!(events[0].message, "需要用户确认");
        assert_eq!(events[0].data["reason"], "删除操作需确认");
    }

    #[tokio::test]
    async fn test_pump_stops_on_interrupt() {
        let (trace_tx, trace_rx) = mpsc::unbounded_channel();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let adapter = EventStreamAdapter::new(tx);

        trace_tx
            .send(TraceEvent::AgentStart {
                name: "analyze_and_plan".into(),
            })
            .unwrap();
        trace_tx
            .send(TraceEvent::Interrupt {
                payload: json!({}),
            })
            .unwrap();
        trace_tx
            .send(TraceEvent::AgentEnd {
                name: "analyze_and_plan".into(),
            })
            .unwrap();
        drop(trace_tx);

        adapter.pump(trace_rx).await;

        let events = collect(&mut rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events.last().unwrap().step, "interrupt");
    }
}
