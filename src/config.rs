//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `PLANEX__*` 覆盖（双下划线表示嵌套，
//! 如 `PLANEX__LLM__MODEL=glm-4`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSection,
    pub agent: AgentSection,
}

/// [llm] 段：后端与模型选择
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：openai 兼容端点 / mock（无 API Key 时的本地联调）
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    /// API Key 所在环境变量名
    pub api_key_env: String,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "glm-4".to_string(),
            base_url: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// [agent] 段：单步超时与能力发现超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// 单步执行超时（秒）；不做自动重试，超时按失败步骤处理
    pub step_timeout_secs: u64,
    /// 启动时远端能力发现（listing）超时（秒）；只约束这次前置调用
    pub discovery_timeout_secs: u64,
    /// 远端能力清单文件路径（JSON）；不配置则跳过发现
    pub capability_manifest: Option<PathBuf>,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            step_timeout_secs: 120,
            discovery_timeout_secs: 10,
            capability_manifest: None,
        }
    }
}

/// 从 config 目录加载配置，环境变量 PLANEX__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 PLANEX__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("PLANEX")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
