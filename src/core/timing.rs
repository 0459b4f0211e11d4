//! 阶段计时
//!
//! PhaseTimer::start(name) 返回句柄，stop 得到 PhaseTiming（秒，保留两位小数 + RFC3339 时间戳）；
//! TimingInfo 以 `<name>_duration` / `<name>_timestamp` 键累积，只追加不覆盖语义由调用方保证。

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;

/// 单个阶段的计时结果
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PhaseTiming {
    /// 持续时间（秒，两位小数）
    pub duration_secs: f64,
    /// 结束时刻（RFC3339）
    pub timestamp: String,
}

/// 计时句柄：start 时记录 Instant，stop 时产出 PhaseTiming
pub struct PhaseTimer {
    name: String,
    started: Instant,
}

impl PhaseTimer {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started: Instant::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 结束计时，返回 (阶段名, 计时结果)
    pub fn stop(self) -> (String, PhaseTiming) {
        let secs = self.started.elapsed().as_secs_f64();
        let timing = PhaseTiming {
            duration_secs: round2(secs),
            timestamp: Utc::now().to_rfc3339(),
        };
        (self.name, timing)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// 各阶段计时汇总：键为 `<name>_duration`（f64 秒）与 `<name>_timestamp`（RFC3339 字符串）
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimingInfo(BTreeMap<String, serde_json::Value>);

impl TimingInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个阶段的耗时与结束时间
    pub fn record(&mut self, name: &str, timing: &PhaseTiming) {
        self.0.insert(
            format!("{}_duration", name),
            serde_json::json!(timing.duration_secs),
        );
        self.0.insert(
            format!("{}_timestamp", name),
            serde_json::json!(timing.timestamp),
        );
    }

    /// 读取某阶段耗时（秒）
    pub fn duration_of(&self, name: &str) -> Option<f64> {
        self.0
            .get(&format!("{}_duration", name))
            .and_then(|v| v.as_f64())
    }

    /// 累加若干阶段的耗时（缺失的阶段按 0 计）
    pub fn total_of(&self, names: &[&str]) -> f64 {
        round2(
            names
                .iter()
                .map(|n| self.duration_of(n).unwrap_or(0.0))
                .sum(),
        )
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(&self.0).unwrap_or_else(|_| serde_json::json!({}))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_two_decimals() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(0.005), 0.01);
    }

    #[test]
    fn test_record_and_total() {
        let mut info = TimingInfo::new();
        info.record(
            "planning",
            &PhaseTiming {
                duration_secs: 1.25,
                timestamp: "2025-01-01T00:00:00+00:00".to_string(),
            },
        );
        info.record(
            "summary",
            &PhaseTiming {
                duration_secs: 0.5,
                timestamp: "2025-01-01T00:00:02+00:00".to_string(),
            },
        );
        assert_eq!(info.duration_of("planning"), Some(1.25));
        assert_eq!(info.total_of(&["planning", "summary"]), 1.75);
        // 未记录的阶段按 0 计
        assert_eq!(info.total_of(&["planning", "missing"]), 1.25);
    }

    #[test]
    fn test_timer_produces_timestamp() {
        let timer = PhaseTimer::start("planning");
        let (name, timing) = timer.stop();
        assert_eq!(name, "planning");
        assert!(timing.duration_secs >= 0.0);
        assert!(timing.timestamp.contains('T'));
    }
}
