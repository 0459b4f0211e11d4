//! 远端能力发现
//!
//! 启动时一次性列出远端服务（如 MCP）提供的能力，listing 调用受配置超时约束——
//! 超时只作用于这次前置发现，不作用于单步执行。失败或超时都退化为空清单并记日志，
//! 不阻断启动。

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::tools::Capability;

/// 能力提供方：本地注册表之外的能力来源（远端服务等）
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    /// 提供方名称（日志用）
    fn name(&self) -> &str;

    /// 列出当前可用能力
    async fn list(&self) -> Result<Vec<Capability>, String>;
}

/// 在超时内向提供方拉取能力清单；失败或超时返回空清单
pub async fn discover_with_timeout(
    provider: &dyn CapabilityProvider,
    timeout: Duration,
) -> Vec<Capability> {
    match tokio::time::timeout(timeout, provider.list()).await {
        Ok(Ok(caps)) => {
            tracing::info!(
                provider = provider.name(),
                count = caps.len(),
                "capability discovery finished"
            );
            caps
        }
        Ok(Err(e)) => {
            tracing::error!(provider = provider.name(), error = %e, "capability discovery failed");
            Vec::new()
        }
        Err(_) => {
            tracing::error!(provider = provider.name(), "capability discovery timed out");
            Vec::new()
        }
    }
}

/// 能力清单文件的顶层结构
#[derive(Debug, Deserialize)]
struct CapabilityManifest {
    #[serde(default)]
    capabilities: Vec<Capability>,
}

/// 清单文件提供方：从 JSON 清单读取远端服务声明的能力
///
/// 清单格式：`{"capabilities": [{"name": "...", "description": "..."}]}`。
pub struct ManifestProvider {
    path: PathBuf,
}

impl ManifestProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CapabilityProvider for ManifestProvider {
    fn name(&self) -> &str {
        "manifest"
    }

    async fn list(&self) -> Result<Vec<Capability>, String> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| format!("read {}: {}", self.path.display(), e))?;
        let manifest: CapabilityManifest = serde_json::from_slice(&bytes)
            .map_err(|e| format!("parse {}: {}", self.path.display(), e))?;
        Ok(manifest.capabilities)
    }
}

/// 合并本地与发现到的能力；同名时本地优先
pub fn merge_capabilities(
    local: Vec<Capability>,
    discovered: Vec<Capability>,
) -> Vec<Capability> {
    let mut merged = local;
    for cap in discovered {
        if !merged.iter().any(|c| c.name == cap.name) {
            merged.push(cap);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowProvider;

    #[async_trait]
    impl CapabilityProvider for SlowProvider {
        fn name(&self) -> &str {
            "slow"
        }

        async fn list(&self) -> Result<Vec<Capability>, String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![Capability::new("late", "never arrives")])
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl CapabilityProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn list(&self) -> Result<Vec<Capability>, String> {
            Err("connection refused".to_string())
        }
    }

    #[tokio::test]
    async fn test_timeout_degrades_to_empty() {
        let caps = discover_with_timeout(&SlowProvider, Duration::from_millis(20)).await;
        assert!(caps.is_empty());
    }

    #[tokio::test]
    async fn test_failure_degrades_to_empty() {
        let caps = discover_with_timeout(&FailingProvider, Duration::from_secs(1)).await;
        assert!(caps.is_empty());
    }

    #[tokio::test]
    async fn test_manifest_provider_lists_declared_capabilities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capabilities.json");
        std::fs::write(
            &path,
            r#"{"capabilities": [{"name": "weather", "description": "查询天气"}]}"#,
        )
        .unwrap();

        let caps = discover_with_timeout(&ManifestProvider::new(&path), Duration::from_secs(1)).await;
        assert_eq!(caps, vec![Capability::new("weather", "查询天气")]);
    }

    #[tokio::test]
    async fn test_missing_manifest_degrades_to_empty() {
        let caps = discover_with_timeout(
            &ManifestProvider::new("/no/such/manifest.json"),
            Duration::from_secs(1),
        )
        .await;
        assert!(caps.is_empty());
    }

    #[test]
    fn test_merge_prefers_local_on_name_clash() {
        let local = vec![Capability::new("clock", "本地时钟")];
        let discovered = vec![
            Capability::new("clock", "远端时钟"),
            Capability::new("weather", "查询天气"),
        ];
        let merged = merge_capabilities(local, discovered);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].description, "本地时钟");
        assert_eq!(merged[1].name, "weather");
    }
}
