//! Prompt 模板：任务规划 / 步骤执行 / 总结回复
//!
//! 规划模板严格要求输出纯 JSON（字段与类型固定），需要确认的步骤必须给出
//! uncertainty_reason——该规则由 prompt 约束，解析侧只做结构校验。

/// 生成任务规划 prompt：要求 LLM 只输出满足固定 schema 的单一 JSON
pub fn planning_prompt(user_task: &str) -> String {
    format!(
        r#"# 角色：你是一个专业且谨慎的任务规划助手。根据用户输入的任务描述: {user_task}，输出一个结构化、可执行的计划。严格要求：
1) 输出必须是单一有效 JSON 文本（不允许任何额外的自然语言、注释或包裹格式）。
2) JSON 结构必须且只能包含下列字段（类型严格匹配）：
{{
  "task_analysis": string,               // 任务的简要分析（最多 200 字）
  "execution_plans": [                   // 至少包含 1 个步骤
    {{
      "step": int,                      // 从 1 开始的整数
      "description": string,            // 可直接执行的操作说明（具体、明确）
      "expected_result": string,        // 此步骤完成后的可验证输出
      "requires_confirmation": bool,    // 是否需要用户确认
      "uncertainty_reason": string      // 若需要确认，简要说明原因；否则空字符串
    }}
  ]
}}

# 生成规则（必须遵守）：
- 至少生成 1 个 execution_plans 条目；步骤要具体、可验证（避免模糊表述如“处理相关问题”）。
- 若步骤依赖外部信息（路径、账号、时间窗口、权限、目标资源等），将 requires_confirmation 设为 true，并在 uncertainty_reason 中说明所需信息或风险。
- 对于危险或不可逆操作（删除、修改生产数据、权限变更等），强制 requires_confirmation = true 并在 uncertainty_reason 中写明风险点。
- task_analysis 要指出关键假设与需要额外信息的项（如果有），并简要说明分解依据。
- 严格只输出 JSON，禁止任何前后缀、多余换行、代码块或自然语言说明。

# 示例（仅参考格式，最终输出不得包含示例文字）：
输入: "现在几点了？"
输出:
{{
  "task_analysis": "用户询问当前时间，任务为简单查询，无需额外信息。",
  "execution_plans": [
    {{
      "step": 1,
      "description": "读取系统当前时间并按本地时区格式化返回",
      "expected_result": "返回当前本地时间字符串（例如：2025-12-02 09:30）",
      "requires_confirmation": false,
      "uncertainty_reason": ""
    }}
  ]
}}

现在，请基于: {user_task} 生成一个满足上述结构与规则的 JSON 计划（务必只输出纯 JSON）。"#
    )
}

/// 生成单步执行指令：任务目标 + 预期结果 + 可用工具清单
pub fn execution_prompt(description: &str, expected_result: &str, tools: &str) -> String {
    format!(
        r#"你是一个智能执行器，需要完成用户给定的任务。

任务目标：{description}
预期结果：{expected_result}

你可以使用以下工具：
{tools}

请按照以下步骤执行：
1. 分析任务需求
2. 选择合适的工具
3. 执行工具并获取结果
4. 基于结果提供最终答案

重要提示：
- 优先使用最合适的工具来完成任务
- 请专注于完成当前步骤，避免过度复杂的推理
- 如果遇到错误，请尝试不同的方法
- 如果无法完成任务，请明确说明原因
- 避免重复调用相同的工具，如果第一次调用失败，请尝试其他方法或直接给出答案
- 限制工具调用次数，最多调用 3-5 次工具
- 如果任务简单，优先直接回答而不是调用工具

请开始执行任务。"#
    )
}

/// 生成总结 prompt：回顾执行过程并输出自然语言回复（禁止结构化标记）
pub fn summary_prompt(
    user_task: &str,
    task_analysis: &str,
    execution_plan: &str,
    step_results: &str,
) -> String {
    format!(
        r#"# 角色
你是一个智能总结助手，需要根据任务执行过程和结果生成一个综合性的总结回复。

# 任务信息
原始任务：{user_task}
任务分析：{task_analysis}

# 执行计划
{execution_plan}

# 执行结果
{step_results}

# 总结要求
1. 回顾整个任务的执行过程
2. 总结每个步骤的关键成果
3. 整合所有执行结果，形成完整的答案
4. 确保回复逻辑清晰、内容完整
5. 突出重要的发现或结果

# 输出格式
请生成一个自然、流畅的总结回复，直接回答用户的问题，不要包含JSON格式或其他结构化标记。

总结回复："#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planning_prompt_embeds_task() {
        let p = planning_prompt("现在几点了？");
        assert!(p.contains("现在几点了？"));
        assert!(p.contains("execution_plans"));
        assert!(p.contains("uncertainty_reason"));
    }

    #[test]
    fn test_execution_prompt_lists_tools() {
        let p = execution_prompt("读取时间", "返回当前时间", "- clock: 查询当前时间");
        assert!(p.contains("读取时间"));
        assert!(p.contains("- clock"));
    }

    #[test]
    fn test_summary_prompt_sections() {
        let p = summary_prompt("任务", "分析", "计划", "结果");
        assert!(p.contains("原始任务：任务"));
        assert!(p.contains("结果"));
    }
}
