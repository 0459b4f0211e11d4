//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按调用顺序依次弹出预置回复（脚本式），超出脚本后回显 prompt 前缀；
//! 便于在无网络环境跑通 规划 -> 执行 -> 总结 全流程。

use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::LlmClient;

/// Mock 客户端：预置一串回复，依序返回
#[derive(Debug, Default)]
pub struct MockLlmClient {
    responses: Mutex<Vec<String>>,
}

impl MockLlmClient {
    /// responses 按调用顺序返回（第一次 complete 得到第一条）
    pub fn scripted(responses: Vec<String>) -> Self {
        let mut rev = responses;
        rev.reverse();
        Self {
            responses: Mutex::new(rev),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, String> {
        if let Some(next) = self.responses.lock().map_err(|e| e.to_string())?.pop() {
            return Ok(next);
        }
        let preview: String = prompt.chars().take(60).collect();
        Ok(format!("Echo from Mock: {}", preview))
    }
}
