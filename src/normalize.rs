//! 执行结果归一化
//!
//! 工具代理返回的结果形态不一（纯文本 / messages 列表 / output 字段 / 任意 JSON），
//! 在调用边界一次性分类为封闭的 AgentOutcome 变体，归一化为单一展示字符串。
//! 任何内部失败都退化为原始输入的字符串形式，从不报错。

use serde_json::Value;

use crate::parser;

/// 空结果的固定提示文本
pub const NO_RESULT: &str = "No result returned.";

/// 工具代理结果的封闭分类（在调用边界产生，消除下游的形状嗅探）
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    /// 纯文本结果
    Text(String),
    /// 含 messages 序列的会话式结果
    MessageList(Vec<Value>),
    /// 含 output 字段的结构化结果
    OutputField(Value),
    /// 其他任意 JSON
    Raw(Value),
}

/// 在工具调用边界对原始 JSON 结果分类
pub fn classify(raw: &Value) -> AgentOutcome {
    match raw {
        Value::String(s) => AgentOutcome::Text(s.clone()),
        Value::Object(map) => {
            if let Some(Value::Array(messages)) = map.get("messages") {
                AgentOutcome::MessageList(messages.clone())
            } else if let Some(output) = map.get("output") {
                AgentOutcome::OutputField(output.clone())
            } else {
                AgentOutcome::Raw(raw.clone())
            }
        }
        _ => AgentOutcome::Raw(raw.clone()),
    }
}

/// 将原始结果归一化为展示文本；空输入返回固定提示
pub fn normalize(raw: &Value) -> String {
    if raw.is_null() {
        return NO_RESULT.to_string();
    }
    let text = normalize_outcome(classify(raw));
    if text.trim().is_empty() {
        NO_RESULT.to_string()
    } else {
        text
    }
}

fn normalize_outcome(outcome: AgentOutcome) -> String {
    match outcome {
        AgentOutcome::Text(s) => {
            // 字符串可能本身是结构化结果（嵌套 JSON），能提取则按结构重新归一化；
            // 提取结果仍是字符串时直接采用，避免无限递归
            match parser::extract_direct(&s) {
                Some(Value::String(inner)) => inner,
                Some(v) => normalize_outcome(classify(&v)),
                None => s,
            }
        }
        AgentOutcome::MessageList(messages) => {
            // 从尾部找最近一条 assistant / AI 消息；找不到则用最后一条
            let assistant = messages.iter().rev().find(|m| is_assistant(m));
            match assistant.or_else(|| messages.last()) {
                Some(m) => message_content(m),
                None => String::new(),
            }
        }
        AgentOutcome::OutputField(v) => value_to_text(&v),
        AgentOutcome::Raw(v) => value_to_text(&v),
    }
}

fn is_assistant(message: &Value) -> bool {
    for key in ["role", "type"] {
        if let Some(tag) = message.get(key).and_then(|v| v.as_str()) {
            let tag = tag.to_ascii_lowercase();
            if tag == "assistant" || tag == "ai" || tag == "aimessage" {
                return true;
            }
        }
    }
    false
}

fn message_content(message: &Value) -> String {
    match message.get("content") {
        Some(content) => value_to_text(content),
        None => value_to_text(message),
    }
}

fn value_to_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
