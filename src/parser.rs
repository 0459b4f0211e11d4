//! 计划文本的抢救式 JSON 提取
//!
//! LLM 不保证输出纯 JSON（可能夹杂说明文字、markdown 围栏或噪音），按固定顺序尝试：
//! 整串直接解析 -> 贪婪 `{...}` 片段 -> 单层平衡片段逐个尝试 -> 两层嵌套片段逐个尝试，
//! 首个成功者即为结果；全部失败时返回空对象并记录原文前缀，绝不向调用方抛错。

use serde_json::Value;

/// 贪婪匹配第一个 `{...}` 片段（`.` 跨行）
const GREEDY_OBJECT: &str = r"(?s)\{.*\}";
/// 单层平衡的 `{...}` 片段
const SHALLOW_OBJECT: &str = r"\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}";
/// 两层嵌套的 `{...}` 片段
const NESTED_OBJECT: &str = r"\{[^{}]*(?:\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}[^{}]*)*\}";

/// 错误日志中保留的原文前缀长度
const DIAGNOSTIC_PREFIX_CHARS: usize = 200;

/// 从杂乱文本中提取 JSON；失败时返回空对象，从不报错
pub fn json_match(content: &str) -> Value {
    if content.is_empty() {
        return Value::Object(serde_json::Map::new());
    }

    // 1. 正确性优先：整串就是合法 JSON 时原样返回
    if let Ok(v) = serde_json::from_str::<Value>(content) {
        return v;
    }

    // 2. 贪婪取第一个 { 到最后一个 } 的片段
    if let Ok(re) = regex::Regex::new(GREEDY_OBJECT) {
        if let Some(m) = re.find(content) {
            if let Ok(v) = serde_json::from_str::<Value>(m.as_str()) {
                return v;
            }
        }
    }

    // 3/4. 平衡片段逐个尝试，首个可解析的胜出
    for pattern in [SHALLOW_OBJECT, NESTED_OBJECT] {
        if let Ok(re) = regex::Regex::new(pattern) {
            for m in re.find_iter(content) {
                if let Ok(v) = serde_json::from_str::<Value>(m.as_str()) {
                    return v;
                }
            }
        }
    }

    let prefix: String = content.chars().take(DIAGNOSTIC_PREFIX_CHARS).collect();
    tracing::error!("JSON parsing failed, original content: {}...", prefix);
    Value::Object(serde_json::Map::new())
}

/// 仅用前两条规则（整串解析 / 贪婪片段）提取 JSON；供归一化器判断字符串结果是否自带结构
pub fn extract_direct(content: &str) -> Option<Value> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        return Some(v);
    }
    let re = regex::Regex::new(GREEDY_OBJECT).ok()?;
    let m = re.find(trimmed)?;
    serde_json::from_str::<Value>(m.as_str()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_json_is_idempotent() {
        assert_eq!(json_match(r#"{"a":1}"#), json!({"a":1}));
    }

    #[test]
    fn test_extracts_from_noise() {
        assert_eq!(json_match(r#"noise {"a":1} noise"#), json!({"a":1}));
    }

    #[test]
    fn test_markdown_fenced_json() {
        let content = "以下是计划：\n```json\n{\"task_analysis\":\"x\",\"execution_plans\":[]}\n```";
        assert_eq!(
            json_match(content),
            json!({"task_analysis":"x","execution_plans":[]})
        );
    }

    #[test]
    fn test_garbage_returns_empty_object_never_panics() {
        assert_eq!(json_match("not json at all"), json!({}));
        assert_eq!(json_match(""), json!({}));
        assert_eq!(json_match("{broken"), json!({}));
    }

    #[test]
    fn test_greedy_failure_falls_back_to_balanced_scan() {
        // 贪婪片段 {bad} ... {"a":1} 整体不可解析，单层扫描能救回 {"a":1}
        let content = "{bad} and then {\"a\":1} tail";
        assert_eq!(json_match(content), json!({"a":1}));
    }

    #[test]
    fn test_nested_two_levels() {
        let content = "前缀 {\"outer\":{\"inner\":{\"k\":1}}} 后缀";
        assert_eq!(json_match(content), json!({"outer":{"inner":{"k":1}}}));
    }

    #[test]
    fn test_extract_direct_only_shallow_rules() {
        assert_eq!(extract_direct(r#"{"a":1}"#), Some(json!({"a":1})));
        assert_eq!(
            extract_direct(r#"text {"out":"z"} text"#),
            Some(json!({"out":"z"}))
        );
        assert_eq!(extract_direct("plain text"), None);
    }
}
