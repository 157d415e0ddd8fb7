// Prompt constants for remote résumé parsing.
// Reuses the cross-cutting rules from llm_client::prompts.

use indexmap::IndexMap;

use crate::llm_client::prompts::EXTRACTION_RULES;
use crate::resume::ai_adapter::REMOTE_SECTION_FIELDS;

/// System prompt for résumé parsing.
pub const RESUME_PARSE_SYSTEM: &str =
    "你是一个专业的简历解析助手，请严格按照指定的JSON格式输出简历信息。";

/// Builds the user prompt: the expected section/field structure, the
/// extraction rules, then the résumé text itself.
pub fn build_parse_prompt(txt: &str) -> String {
    let structure: IndexMap<&str, &[&str]> = REMOTE_SECTION_FIELDS.iter().copied().collect();
    let structure = serde_json::to_string_pretty(&structure).unwrap_or_default();

    format!(
        "请将以下简历内容解析为结构化的JSON格式。要求：\n\
         1. 严格按照以下字段结构输出，未提及的字段填写null：\n\
         {structure}\n\n\
         {EXTRACTION_RULES}\n\n\
         简历内容如下：\n\
         {txt}"
    )
}
