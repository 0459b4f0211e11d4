//! LLM 客户端抽象与实现（OpenAI 兼容 / Mock）

mod mock;
mod openai;
mod traits;

pub use mock::MockLlmClient;
pub use openai::OpenAiClient;
pub use traits::LlmClient;
