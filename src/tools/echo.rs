//! 回显工具（联调用）

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::Tool;

/// Echo 工具：原样返回输入文本，用于打通注册表到执行链路的本地联调
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "回显输入文本（联调用）。Args: {\"text\": \"要回显的内容\"}"
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let text = args
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("(空)");
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_returns_text() {
        let out = EchoTool
            .execute(serde_json::json!({"text": "你好"}))
            .await
            .unwrap();
        assert_eq!(out, "你好");
    }

    #[tokio::test]
    async fn test_missing_text_falls_back() {
        let out = EchoTool.execute(serde_json::json!({})).await.unwrap();
        assert_eq!(out, "(空)");
    }
}
