// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Parsing rules appended to every extraction prompt.
pub const EXTRACTION_RULES: &str = "\
2. 解析规则：
- 准确识别文本中明确提到的信息
- 不要推测或填充未明确提到的信息
- 保持原文的表述，不要改写或总结
- 对于列表项，保持原文的序号或符号
- 处理中英文混排的情况，分别存储中英文内容

3. 输出要求：
- 必须是合法的JSON格式
- 使用UTF-8编码
- 保持原文的换行格式
- 对特殊字符进行转义";
