//! LLM 客户端抽象
//!
//! 规划与总结共用同一个补全接口：complete(prompt) -> text。
//! 不保证输出为纯 JSON，调用方需经抢救式解析处理。

use async_trait::async_trait;

/// 补全服务 trait：单 prompt 进、文本出
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, String>;
}
