//! Markdown codec: `ResumeStore` <-> the résumé markdown template.
//!
//! Document shape:
//!
//! ```text
//! # 个人简历
//!
//! ---
//!
//! ## 基本信息 / Basic Information
//!
//! ### 姓名 / Name
//! **中文**: 张三
//! **English**: Zhang San
//! ```
//!
//! Only the Chinese half of a bilingual header or content block is kept.

use crate::fill::normalize::normalize;
use crate::models::{FieldValue, ResumeRecord, ResumeStore, Section};
use crate::taxonomy::{
    is_multi_entry_section, layout_fields, REMARKS_FIELD, REMARKS_SECTION, SECTION_LAYOUT,
};

const DOCUMENT_TITLE: &str = "# 个人简历";
const SECTION_PREFIX: &str = "## ";
const FIELD_PREFIX: &str = "### ";
const RECORD_SEPARATOR: &str = "---";
const ENGLISH_MARKER: &str = "**English**:";
const CHINESE_MARKERS: &[&str] = &["**中文**:", "中文:"];
const REMARKS_JOINER: &str = "；";

/// Text of a `##`/`###` header up to the first `/`. A header with nothing
/// before the `/` keeps its whole text.
fn header_title(rest: &str) -> &str {
    match rest.split('/').next().map(str::trim) {
        Some(title) if !title.is_empty() => title,
        _ => rest.trim(),
    }
}

fn is_block_boundary(trimmed: &str) -> bool {
    trimmed.starts_with(SECTION_PREFIX)
        || trimmed.starts_with(FIELD_PREFIX)
        || trimmed.starts_with(RECORD_SEPARATOR)
}

/// Drops a trailing `**English**:` segment and a leading `**中文**:` / `中文:` marker.
pub fn chinese_content(block: &str) -> &str {
    let mut text = match block.find(ENGLISH_MARKER) {
        Some(pos) => &block[..pos],
        None => block,
    }
    .trim();

    for marker in CHINESE_MARKERS {
        if let Some(rest) = text.strip_prefix(marker) {
            text = rest.trim_start();
        }
    }
    text.trim()
}

fn current_record<'a>(store: &'a mut ResumeStore, title: &str) -> Option<&'a mut ResumeRecord> {
    match store.section_mut(title)? {
        Section::Entries(entries) => entries.last_mut(),
        Section::Single(record) => Some(record),
    }
}

/// Parses a résumé markdown document. Permissive: unrecognised lines are
/// skipped and never fail the parse.
pub fn parse_markdown(content: &str) -> ResumeStore {
    let mut store = ResumeStore::new();
    let content = content.replace('\r', "");
    let lines: Vec<&str> = content.split('\n').collect();
    let mut section: Option<String> = None;

    let mut i = 0;
    while i < lines.len() {
        let trimmed = lines[i].trim();

        if let Some(rest) = trimmed.strip_prefix(SECTION_PREFIX) {
            let title = header_title(rest).to_string();
            let fresh = if is_multi_entry_section(&title) {
                Section::Entries(vec![ResumeRecord::new()])
            } else {
                Section::Single(ResumeRecord::new())
            };
            store.insert_section(title.clone(), fresh);
            section = Some(title);
            i += 1;
        } else if trimmed.starts_with(RECORD_SEPARATOR) {
            if let Some(Section::Entries(entries)) =
                section.as_deref().and_then(|t| store.section_mut(t))
            {
                entries.push(ResumeRecord::new());
            }
            i += 1;
        } else if let Some(rest) = trimmed.strip_prefix(FIELD_PREFIX) {
            let field = header_title(rest).to_string();
            let end = lines[i + 1..]
                .iter()
                .position(|line| is_block_boundary(line.trim()))
                .map_or(lines.len(), |offset| i + 1 + offset);
            let block = lines[i + 1..end].join("\n");
            let value = chinese_content(&block);

            if !value.is_empty() {
                if let Some(record) = section
                    .as_deref()
                    .and_then(|title| current_record(&mut store, title))
                {
                    record.insert(field, FieldValue::from(value));
                }
            }
            i = end;
        } else {
            i += 1;
        }
    }

    for (_, section) in store.sections_mut() {
        if let Section::Entries(entries) = section {
            entries.retain(|record| !record.is_empty());
        }
    }
    store
}

fn field_text(field: &str, value: Option<&FieldValue>) -> String {
    value
        .map(|v| normalize(field, v).trim().to_string())
        .unwrap_or_default()
}

fn push_field(parts: &mut Vec<String>, field: &str, value: &str) {
    parts.push(format!("\n{FIELD_PREFIX}{field}\n{value}"));
}

fn push_record(parts: &mut Vec<String>, layout: &[&str], record: &ResumeRecord, skip: &[&str]) {
    for field in layout {
        push_field(parts, field, &field_text(field, record.get(*field)));
    }
    for (field, value) in record {
        if field.trim().is_empty()
            || layout.contains(&field.as_str())
            || skip.contains(&field.as_str())
        {
            continue;
        }
        push_field(parts, field, &field_text(field, Some(value)));
    }
}

fn push_section(parts: &mut Vec<String>, title: &str, section: Option<&Section>, skip: &[&str]) {
    let layout = layout_fields(title);
    let empty = ResumeRecord::new();
    let records: &[ResumeRecord] = match section {
        Some(section) if !section.records().is_empty() => section.records(),
        _ => std::slice::from_ref(&empty),
    };

    parts.push(format!("\n{RECORD_SEPARATOR}\n"));
    parts.push(format!("{SECTION_PREFIX}{title}"));
    for (index, record) in records.iter().enumerate() {
        if index > 0 {
            parts.push(format!("\n{RECORD_SEPARATOR}"));
        }
        push_record(parts, layout, record, skip);
    }
}

/// Serializes `store` into the template. Every layout field is written, filled
/// or not; fields and sections outside the layout follow their section or the
/// layout. `remarks` are appended to the closing 备注 field.
pub fn to_markdown(store: &ResumeStore, remarks: &[String]) -> String {
    let mut parts = vec![DOCUMENT_TITLE.to_string()];

    for (title, _) in SECTION_LAYOUT.iter().filter(|(t, _)| *t != REMARKS_SECTION) {
        push_section(&mut parts, title, store.section(title), &[]);
    }

    for (title, section) in store.sections() {
        let in_layout = SECTION_LAYOUT.iter().any(|(t, _)| *t == title);
        if !in_layout && !title.trim().is_empty() {
            push_section(&mut parts, title, Some(section), &[]);
        }
    }

    let remarks_section = store.section(REMARKS_SECTION);
    push_section(&mut parts, REMARKS_SECTION, remarks_section, &[REMARKS_FIELD]);

    let existing = remarks_section
        .and_then(|s| s.records().first())
        .map(|record| field_text(REMARKS_FIELD, record.get(REMARKS_FIELD)))
        .unwrap_or_default();
    let combined = std::iter::once(existing.as_str())
        .chain(remarks.iter().map(|r| r.trim()))
        .filter(|r| !r.is_empty())
        .collect::<Vec<_>>()
        .join(REMARKS_JOINER);
    push_field(&mut parts, REMARKS_FIELD, &combined);

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text<'a>(store: &'a ResumeStore, section: &str, index: usize, field: &str) -> Option<&'a str> {
        store
            .section(section)?
            .records()
            .get(index)?
            .get(field)
            .and_then(|value| match value {
                FieldValue::Text(s) => Some(s.as_str()),
                _ => None,
            })
    }

    #[test]
    fn test_bilingual_field_keeps_chinese_only() {
        let store = parse_markdown(
            "## 基本信息 / Basic Information\n### 姓名 / Name\n**中文**: 张三\n**English**: Zhang San\n",
        );
        let expected: ResumeStore =
            serde_json::from_str(r#"{"基本信息": {"姓名": "张三"}}"#).unwrap();
        assert_eq!(store, expected);
    }

    #[test]
    fn test_multi_entry_section_splits_on_separator() {
        let md = "## 项目经历\n### 项目名称\n简历助手\n---\n### 项目名称\n表单引擎\n";
        let store = parse_markdown(md);
        let section = store.section("项目经历").unwrap();

        assert!(section.is_entries());
        assert_eq!(section.records().len(), 2);
        assert_eq!(text(&store, "项目经历", 0, "项目名称"), Some("简历助手"));
        assert_eq!(text(&store, "项目经历", 1, "项目名称"), Some("表单引擎"));
    }

    #[test]
    fn test_separator_outside_multi_entry_is_noop() {
        let md = "## 基本信息\n### 姓名\n张三\n---\n### 民族\n汉族\n";
        let store = parse_markdown(md);
        assert_eq!(text(&store, "基本信息", 0, "姓名"), Some("张三"));
        assert_eq!(text(&store, "基本信息", 0, "民族"), Some("汉族"));
    }

    #[test]
    fn test_fields_before_any_section_are_dropped() {
        let store = parse_markdown("# 标题\n### 姓名\n张三\n## 基本信息\n### 性别\n男\n");
        assert_eq!(store.len(), 1);
        assert_eq!(text(&store, "基本信息", 0, "姓名"), None);
        assert_eq!(text(&store, "基本信息", 0, "性别"), Some("男"));
    }

    #[test]
    fn test_empty_content_not_stored() {
        let store = parse_markdown("## 基本信息\n### 姓名\n**中文**: \n**English**: Zhang\n### 性别\n\n");
        assert!(store.section("基本信息").unwrap().records()[0].is_empty());
    }

    #[test]
    fn test_multi_line_content_and_crlf() {
        let md = "## 个人特质\r\n### 自我评价\r\n中文: 认真负责\r\n善于沟通\r\n";
        let store = parse_markdown(md);
        assert_eq!(text(&store, "个人特质", 0, "自我评价"), Some("认真负责\n善于沟通"));
    }

    #[test]
    fn test_section_separators_do_not_create_phantom_records() {
        let md = "## 获奖情况\n### 获奖名称\n奖学金\n\n---\n\n## 紧急联系人\n### 关系\n父子\n";
        let store = parse_markdown(md);
        assert_eq!(store.section("获奖情况").unwrap().records().len(), 1);
    }

    #[test]
    fn test_serializer_writes_full_layout() {
        let store = parse_markdown("## 基本信息\n### 姓名\n张三\n");
        let md = to_markdown(&store, &[]);

        assert!(md.starts_with("# 个人简历\n\n---\n\n## 基本信息\n\n### 姓名\n张三\n\n### 性别\n"));
        assert!(md.contains("## 紧急联系人"));
        let last_section = md.rfind("## ").map(|i| &md[i..]).unwrap();
        assert!(last_section.starts_with("## 其他信息"));
        assert!(md.trim_end().ends_with("### 备注"));
    }

    #[test]
    fn test_serializer_keeps_unknown_fields_and_sections() {
        let md = "## 基本信息\n### 微信号\nzs\n## 作品集\n### 链接\nhttps://example.com\n";
        let out = to_markdown(&parse_markdown(md), &[]);
        let wechat = out.find("### 微信号").unwrap();
        assert!(wechat < out.find("## 教育背景").unwrap());
        let portfolio = out.find("## 作品集").unwrap();
        assert!(portfolio > out.find("## 紧急联系人").unwrap());
        assert!(portfolio < out.find("## 其他信息").unwrap());
    }

    #[test]
    fn test_remarks_are_aggregated() {
        let store = parse_markdown("## 其他信息\n### 备注\n可随时到岗\n");
        let md = to_markdown(&store, &["熟悉 Rust".to_string(), "  ".to_string()]);
        assert!(md.ends_with("### 备注\n可随时到岗；熟悉 Rust"));
        assert_eq!(md.matches("### 备注").count(), 1);
    }

    #[test]
    fn test_round_trip_is_stable() {
        let original = "\
## 基本信息 / Basic Information
### 姓名 / Name
**中文**: 张三
**English**: Zhang San
### 手机号码
13800138000
### 微信号
zs_wx

## 项目经历
### 项目名称
简历助手
### 项目描述
浏览器插件
多行描述
---
### 项目名称
表单引擎

## 获奖情况

## 作品集
### 链接
https://example.com

## 其他信息
### 备注
可随时到岗
";
        let first = parse_markdown(&to_markdown(&parse_markdown(original), &[]));
        let second = parse_markdown(&to_markdown(&first, &[]));

        assert_eq!(first, second);
        assert_eq!(text(&first, "基本信息", 0, "姓名"), Some("张三"));
        assert_eq!(text(&first, "基本信息", 0, "微信号"), Some("zs_wx"));
        assert_eq!(text(&first, "项目经历", 0, "项目描述"), Some("浏览器插件\n多行描述"));
        assert_eq!(text(&first, "项目经历", 1, "项目名称"), Some("表单引擎"));
        assert_eq!(text(&first, "作品集", 0, "链接"), Some("https://example.com"));
        assert_eq!(text(&first, "其他信息", 0, "备注"), Some("可随时到岗"));
        assert!(first.section("获奖情况").unwrap().records().is_empty());
    }

    #[test]
    fn test_header_without_chinese_half_keeps_whole_title() {
        let md = "## 基本信息\n### 姓名\n张三\n### / Nickname\n小三\n## / Misc\n### 备用\n无\n";
        let store = parse_markdown(md);
        assert_eq!(text(&store, "基本信息", 0, "/ Nickname"), Some("小三"));
        assert_eq!(text(&store, "/ Misc", 0, "备用"), Some("无"));
        assert!(store.section("").is_none());

        let reparsed = parse_markdown(&to_markdown(&store, &[]));
        assert_eq!(text(&reparsed, "基本信息", 0, "姓名"), Some("张三"));
        assert_eq!(text(&reparsed, "基本信息", 0, "/ Nickname"), Some("小三"));
        assert_eq!(text(&reparsed, "/ Misc", 0, "备用"), Some("无"));
        assert!(reparsed
            .sections()
            .all(|(_, section)| section.records().iter().all(|r| !r.contains_key(""))));
    }

    #[test]
    fn test_serializer_skips_blank_names() {
        let store: ResumeStore =
            serde_json::from_str(r#"{"基本信息": {"姓名": "张三", "": "孤值"}, "": {"x": "y"}}"#)
                .unwrap();
        let md = to_markdown(&store, &[]);
        assert!(!md.contains("孤值"));
        assert!(!md.lines().any(|line| line.trim() == "###" || line.trim() == "##"));
    }
}
