//! 时间工具：查询当前时间与日期偏移计算

use async_trait::async_trait;
use chrono::{Duration, Local};
use serde_json::Value;

use crate::tools::Tool;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Clock 工具：返回当前本地时间，或按 days/hours/minutes 偏移后的时间
pub struct ClockTool;

#[async_trait]
impl Tool for ClockTool {
    fn name(&self) -> &str {
        "clock"
    }

    fn description(&self) -> &str {
        "查询当前本地时间，或计算偏移后的时间。Args: {\"days\": 0, \"hours\": 0, \"minutes\": 0}"
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let days = args.get("days").and_then(|v| v.as_i64()).unwrap_or(0);
        let hours = args.get("hours").and_then(|v| v.as_i64()).unwrap_or(0);
        let minutes = args.get("minutes").and_then(|v| v.as_i64()).unwrap_or(0);

        let offset = Duration::days(days) + Duration::hours(hours) + Duration::minutes(minutes);
        let when = Local::now() + offset;
        Ok(when.format(TIME_FORMAT).to_string())
    }
}
