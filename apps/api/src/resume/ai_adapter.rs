//! Converts the remote parser's JSON into the résumé store and markdown template.

use serde_json::Value;

use crate::models::{FieldValue, ResumeRecord, ResumeStore, Section};
use crate::resume::markdown::to_markdown;
use crate::taxonomy::is_multi_entry_section;

/// Section → field structure the remote parser is asked to fill, in output order.
pub const REMOTE_SECTION_FIELDS: &[(&str, &[&str])] = &[
    (
        "基本信息",
        &[
            "姓名", "性别", "出生日期", "政治面貌", "民族", "身份证号", "手机号码", "邮箱地址",
            "现居地址", "籍贯",
        ],
    ),
    (
        "教育背景",
        &["最高学历", "毕业院校", "专业", "毕业时间", "学位", "GPA", "主修课程", "学习成绩"],
    ),
    ("工作经历", &["公司名称", "工作时间", "职位名称", "工作内容", "工作业绩"]),
    ("实习经历", &["实习公司", "实习职位", "实习时间", "实习内容", "实习收获"]),
    ("项目经历", &["项目名称", "项目时间", "项目描述", "项目职责", "项目成果"]),
    ("校园经历", &["组织名称", "担任职务", "任职时间", "工作内容", "主要成就"]),
    ("技能特长", &["专业技能", "语言能力", "计算机技能", "其他技能"]),
    ("证书资质", &["证书名称", "获得时间", "证书编号", "发证机构"]),
    ("获奖情况", &["奖项名称", "获奖时间", "获奖级别", "颁发单位"]),
    ("自我评价", &["性格特点", "能力特长", "个人优势"]),
    ("职业规划", &["短期目标", "长期目标", "发展方向"]),
];

const OVERFLOW_JOINER: &str = "；";

/// Display text of a scalar (or list of scalars). Null, empty and the literal
/// string "null" yield `None`.
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(scalar_text)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(_) => return None,
    };
    if text.is_empty() || text == "null" {
        None
    } else {
        Some(text)
    }
}

fn object_record(object: &serde_json::Map<String, Value>) -> ResumeRecord {
    object
        .iter()
        .filter_map(|(key, value)| Some((key.trim().to_string(), scalar_text(value)?)))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, text)| (key, FieldValue::from(text)))
        .collect()
}

/// Aligns scalar items to `fields` by position. Items past the end of the
/// field list are appended to the last field.
fn positional_record(items: &[Value], fields: &[&str]) -> ResumeRecord {
    let mut record = ResumeRecord::new();
    let Some(last) = fields.last() else {
        return record;
    };

    for (index, item) in items.iter().enumerate() {
        let Some(text) = scalar_text(item) else {
            continue;
        };
        let field = fields.get(index).unwrap_or(last);
        if let Some(FieldValue::Text(existing)) = record.get_mut(*field) {
            existing.push_str(OVERFLOW_JOINER);
            existing.push_str(&text);
            continue;
        }
        record.insert(field.to_string(), FieldValue::from(text));
    }
    record
}

/// Folds several records into one, joining repeated fields line by line.
fn merge_records(records: Vec<ResumeRecord>) -> ResumeRecord {
    let mut merged = ResumeRecord::new();
    for record in records {
        for (key, value) in record {
            if let Some(existing) = merged.get_mut(&key) {
                if let (FieldValue::Text(existing), FieldValue::Text(text)) = (existing, &value) {
                    existing.push('\n');
                    existing.push_str(text);
                }
                continue;
            }
            merged.insert(key, value);
        }
    }
    merged
}

fn section_records(value: &Value, fields: &[&str]) -> Vec<ResumeRecord> {
    let records = match value {
        Value::Object(object) => vec![object_record(object)],
        Value::Array(items) if items.iter().any(Value::is_object) => items
            .iter()
            .filter_map(Value::as_object)
            .map(object_record)
            .collect(),
        Value::Array(items) => vec![positional_record(items, fields)],
        scalar => vec![positional_record(std::slice::from_ref(scalar), fields)],
    };
    records.into_iter().filter(|r| !r.is_empty()).collect()
}

/// Builds a store from the remote parser's JSON. Unknown top-level keys are
/// ignored; sections with no usable content are left out.
pub fn ai_result_to_store(result: &Value) -> ResumeStore {
    let mut store = ResumeStore::new();

    for (title, fields) in REMOTE_SECTION_FIELDS {
        let Some(value) = result.get(*title) else {
            continue;
        };
        let records = section_records(value, fields);
        if records.is_empty() {
            continue;
        }
        let section = if is_multi_entry_section(title) {
            Section::Entries(records)
        } else {
            Section::Single(merge_records(records))
        };
        store.insert_section(*title, section);
    }
    store
}

/// Markdown template for the remote parser's JSON, ready for the codec.
pub fn ai_result_to_markdown(result: &Value) -> String {
    to_markdown(&ai_result_to_store(result), &[])
}
