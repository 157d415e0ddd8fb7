//! Best-effort plain-text résumé parser.
//!
//! Splits text into sections by heading keywords, pulls `key: value` pairs and
//! recognisable values (email, mobile, ID number) out line by line, and keeps
//! everything else as free-form remarks.

use std::collections::HashMap;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use crate::models::{FieldValue, ResumeRecord, ResumeStore, Section};
use crate::resume::markdown;
use crate::taxonomy::{is_multi_entry_section, section_for_field, REMARKS_SECTION};

const SECTION_HEADINGS: &[(&str, &[&str])] = &[
    ("基本信息", &["基本信息", "Personal Info", "个人信息", "联系方式", "Contact"]),
    ("教育背景", &["教育背景", "Education", "教育经历", "学历"]),
    ("工作经历", &["工作经历", "Work Experience", "工作经验", "职业经历"]),
    ("实习经历", &["实习经历", "Internship", "实习经验"]),
    ("项目经历", &["项目经历", "Project Experience", "项目", "项目经验"]),
    ("校园经历", &["校园经历", "Campus Experience", "学生工作", "社团经历"]),
    ("技能特长", &["技能", "技能特长", "Skills", "专长", "能力"]),
    ("证书资质", &["证书", "证书资质", "Certifications", "资格证书"]),
    ("获奖情况", &["获奖", "获奖情况", "Awards", "荣誉"]),
    ("兴趣爱好", &["兴趣", "兴趣爱好", "Hobbies"]),
    ("自我评价", &["自我评价", "自我描述", "Self-Evaluation", "自我介绍"]),
    ("职业规划", &["职业规划", "Career Goals", "目标"]),
    ("其他信息", &["其他信息", "Additional Information", "备注", "Others"]),
];

/// Written keys (Chinese and English) → template field. Later entries win.
const FIELD_KEYWORDS: &[(&str, &[&str])] = &[
    ("姓名", &["姓名", "名字", "Name"]),
    ("性别", &["性别", "Gender"]),
    ("出生日期", &["出生日期", "生日", "Date of Birth", "Birthday"]),
    ("政治面貌", &["政治面貌", "政治身份", "Political Status"]),
    ("民族", &["民族", "Ethnicity"]),
    ("身份证号", &["身份证号", "身份证", "ID Number"]),
    ("手机号码", &["手机", "手机号码", "电话", "联系电话", "Phone", "Mobile"]),
    ("邮箱地址", &["邮箱", "电子邮件", "Email"]),
    ("现居地址", &["现居地址", "住址", "地址", "Current Address", "Address"]),
    ("籍贯", &["籍贯", "籍贯地", "Place of Origin"]),
    ("最高学历", &["学历", "最高学历", "Education"]),
    ("毕业院校", &["毕业院校", "学校", "University", "School"]),
    ("专业", &["专业", "Major"]),
    ("毕业时间", &["毕业时间", "毕业年份", "Graduation Date"]),
    ("学位", &["学位", "Degree"]),
    ("GPA", &["GPA"]),
    ("当前职位", &["当前职位", "职位", "Position", "Current Position"]),
    ("工作年限", &["工作年限", "工作经验", "Years of Experience"]),
    ("期望薪资", &["期望薪资", "薪资", "Expected Salary"]),
    ("期望工作地点", &["期望工作地点", "工作地点", "Preferred Location"]),
    ("期望职位", &["期望职位", "Expected Position"]),
    ("专业技能", &["专业技能", "技能", "Skills"]),
    ("语言能力", &["语言能力", "语言", "Language Skills"]),
    ("计算机技能", &["计算机技能", "计算机", "Computer Skills"]),
    ("证书资质", &["证书资质", "证书", "Certifications"]),
    ("兴趣爱好", &["兴趣爱好", "爱好", "Hobbies"]),
    ("性格特点", &["性格特点", "性格", "Personality Traits"]),
    ("自我评价", &["自我评价", "自我描述", "Self-Evaluation"]),
    ("职业规划", &["职业规划", "Career Goals"]),
    ("项目名称", &["项目名称", "项目", "Project Name"]),
    ("项目描述", &["项目描述", "Project Description"]),
    ("项目职责", &["项目职责", "Project Responsibilities"]),
    ("项目成果", &["项目成果", "Project Achievements"]),
    ("实习公司", &["实习公司", "实习单位", "Internship Company"]),
    ("实习职位", &["实习职位", "实习岗位", "Internship Position"]),
    ("实习时间", &["实习时间", "实习期间", "Internship Period"]),
    ("实习内容", &["实习内容", "Internship Content"]),
    ("实习收获", &["实习收获", "Internship Gains"]),
    ("获奖名称", &["获奖名称", "奖项", "Award Name"]),
    ("获奖时间", &["获奖时间", "Award Date"]),
    ("获奖级别", &["获奖级别", "Award Level"]),
    ("联系人姓名", &["联系人姓名", "紧急联系人", "Contact Name"]),
    ("关系", &["关系", "Relationship"]),
    ("联系电话", &["联系电话", "Contact Phone"]),
    ("是否接受出差", &["是否接受出差", "出差", "Willing to Travel"]),
    ("是否接受加班", &["是否接受加班", "加班", "Willing to Overtime"]),
    ("入职时间", &["入职时间", "到岗时间", "Available Start Date"]),
    ("备注", &["备注", "其他", "Remarks"]),
];

const DESCRIPTION_BUCKET: &str = "描述";
const RELATED_BUCKET: &str = "相关内容";
const LIST_BUCKET: &str = "列表";
const CERTIFICATE_NUMBER: &str = "证书编号";
const ENGLISH_NAME: &str = "姓名_en";

const MAX_CERTIFICATE_LINE_CHARS: usize = 30;
const MIN_DESCRIPTION_CHARS: usize = 8;

static KEYWORD_TO_FIELD: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (field, keywords) in FIELD_KEYWORDS {
        for keyword in *keywords {
            map.insert(*keyword, *field);
        }
    }
    map
});

static HEADING_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[【#\s\[\]/]").expect("invalid heading noise regex"));
static KEY_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\x{4e00}-\x{9fa5}A-Za-z\s]+)[：:]\s*(.+)$").expect("invalid key value regex")
});
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_.-]+@[A-Za-z0-9_.-]+").expect("invalid email regex"));
static MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"1[3-9][0-9]{9}").expect("invalid mobile regex"));
static ID_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[1-9][0-9]{5}(?:19|20)[0-9]{2}(?:0[1-9]|1[0-2])(?:[0-2][1-9]|10|20|30|31)[0-9]{3}[0-9Xx]")
        .expect("invalid id number regex")
});
static ENGLISH_NAME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Name\s*[:：]?\s*([A-Za-z\s]+)$").expect("invalid english name regex")
});
static LONG_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{8,}").expect("invalid digits regex"));
static RELATED_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)课程|成绩|技能|证书|奖|项目|实习|经历|经验|Internship|Project|Award|Skill|Certificate")
        .expect("invalid related content regex")
});
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*•·0-9]+[.、\s]").expect("invalid list item regex"));

/// Output of a plain-text parse: template fields plus lines that fit nowhere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TxtParse {
    pub fields: IndexMap<String, String>,
    pub unknown: Vec<String>,
}

impl TxtParse {
    /// Places each field in the layout section that lists it; anything else
    /// lands in the remarks section.
    pub fn into_store(self) -> ResumeStore {
        let mut grouped: IndexMap<&'static str, ResumeRecord> = IndexMap::new();
        for (field, value) in self.fields {
            let section = section_for_field(&field).unwrap_or(REMARKS_SECTION);
            grouped
                .entry(section)
                .or_default()
                .insert(field, FieldValue::from(value));
        }

        let mut store = ResumeStore::new();
        for (title, record) in grouped {
            let section = if is_multi_entry_section(title) {
                Section::Entries(vec![record])
            } else {
                Section::Single(record)
            };
            store.insert_section(title, section);
        }
        store
    }

    /// Template markdown with unplaced content aggregated into 备注.
    pub fn to_markdown(mut self) -> String {
        let remarks = std::mem::take(&mut self.unknown);
        markdown::to_markdown(&self.into_store(), &remarks)
    }
}

struct TextSection<'a> {
    title: &'static str,
    lines: Vec<&'a str>,
}

fn heading_for(line: &str) -> Option<&'static str> {
    let stripped = HEADING_NOISE.replace_all(line, "");
    SECTION_HEADINGS
        .iter()
        .find(|(_, keys)| keys.iter().any(|k| stripped.starts_with(k)))
        .map(|(title, _)| *title)
}

fn split_sections(txt: &str) -> Vec<TextSection<'_>> {
    let mut sections = Vec::new();
    let mut current = TextSection {
        title: REMARKS_SECTION,
        lines: Vec::new(),
    };

    for line in txt.lines() {
        if let Some(title) = heading_for(line) {
            if !current.lines.is_empty() {
                sections.push(current);
            }
            current = TextSection {
                title,
                lines: Vec::new(),
            };
        }
        current.lines.push(line);
    }
    if !current.lines.is_empty() {
        sections.push(current);
    }
    sections
}

fn append(fields: &mut IndexMap<String, String>, key: &str, value: &str, joiner: &str) {
    match fields.get_mut(key) {
        Some(existing) => {
            existing.push_str(joiner);
            existing.push_str(value);
        }
        None => {
            fields.insert(key.to_string(), value.to_string());
        }
    }
}

fn extract_fields(section: &TextSection<'_>) -> IndexMap<String, String> {
    let mut fields = IndexMap::new();

    for line in &section.lines {
        let trimmed = line.trim();

        if let Some(caps) = KEY_VALUE.captures(line) {
            let key = caps[1].trim();
            let value = caps[2].trim();
            let field = KEYWORD_TO_FIELD.get(key).copied().unwrap_or(key);
            append(&mut fields, field, value, "；");
            continue;
        }
        if let Some(m) = EMAIL.find(line) {
            fields.insert("邮箱地址".to_string(), m.as_str().to_string());
            continue;
        }
        if let Some(m) = MOBILE.find(line) {
            fields.insert("手机号码".to_string(), m.as_str().to_string());
            continue;
        }
        if let Some(m) = ID_NUMBER.find(line) {
            fields.insert("身份证号".to_string(), m.as_str().to_string());
            continue;
        }
        if let Some(caps) = ENGLISH_NAME_LINE.captures(line) {
            fields.insert(ENGLISH_NAME.to_string(), caps[1].trim().to_string());
            continue;
        }
        if LONG_DIGITS.is_match(line) && line.chars().count() < MAX_CERTIFICATE_LINE_CHARS {
            append(&mut fields, CERTIFICATE_NUMBER, trimmed, "；");
            continue;
        }
        if RELATED_CONTENT.is_match(line) {
            append(&mut fields, RELATED_BUCKET, trimmed, "\n");
            continue;
        }
        if LIST_ITEM.is_match(line) {
            append(&mut fields, LIST_BUCKET, trimmed, "\n");
            continue;
        }
        if line.chars().count() > MIN_DESCRIPTION_CHARS {
            append(&mut fields, DESCRIPTION_BUCKET, trimmed, "\n");
        }
    }
    fields
}

/// Parses free-form résumé text.
pub fn parse_txt(txt: &str) -> TxtParse {
    let mut fields: IndexMap<String, String> = IndexMap::new();
    for section in split_sections(txt) {
        debug!("Text section {}: {} lines", section.title, section.lines.len());
        for (key, value) in extract_fields(&section) {
            append(&mut fields, &key, &value, "\n");
        }
    }

    let unknown = [DESCRIPTION_BUCKET, RELATED_BUCKET, LIST_BUCKET]
        .into_iter()
        .filter_map(|bucket| fields.shift_remove(bucket))
        .collect();

    TxtParse { fields, unknown }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::markdown::parse_markdown;

    const SAMPLE: &str = "\
【基本信息】
姓名：张三
性别: 男
Email: zhang@example.com
联系我 13800138000
身份证 110101200003070011
English Name Zhang San

教育背景
毕业院校：浙江大学
专业：计算机科学与技术

自我评价
热爱技术，善于沟通，能够快速学习新知识
- 认真
1. 负责
";

    #[test]
    fn test_key_value_lines_map_to_template_fields() {
        let parsed = parse_txt(SAMPLE);
        assert_eq!(parsed.fields["姓名"], "张三");
        assert_eq!(parsed.fields["性别"], "男");
        assert_eq!(parsed.fields["邮箱地址"], "zhang@example.com");
        assert_eq!(parsed.fields["毕业院校"], "浙江大学");
        assert_eq!(parsed.fields["专业"], "计算机科学与技术");
    }

    #[test]
    fn test_bare_values_are_recognised() {
        let parsed = parse_txt(SAMPLE);
        assert_eq!(parsed.fields["手机号码"], "13800138000");
        assert_eq!(parsed.fields["身份证号"], "110101200003070011");
        assert_eq!(parsed.fields[ENGLISH_NAME], "Zhang San");
    }

    #[test]
    fn test_leftovers_become_remarks() {
        let parsed = parse_txt(SAMPLE);
        assert!(!parsed.fields.contains_key(DESCRIPTION_BUCKET));
        assert!(!parsed.fields.contains_key(LIST_BUCKET));
        assert_eq!(
            parsed.unknown,
            ["热爱技术，善于沟通，能够快速学习新知识", "- 认真\n1. 负责"]
        );
    }

    #[test]
    fn test_repeated_keys_are_joined() {
        let parsed = parse_txt("电话：13800138000\n电话：010-12345678\n");
        assert_eq!(parsed.fields["手机号码"], "13800138000；010-12345678");

        // Headings start a new section; values merge across sections by line.
        let parsed = parse_txt("技能：Rust\n技能：Go\n");
        assert_eq!(parsed.fields["专业技能"], "Rust\nGo");
    }

    #[test]
    fn test_store_placement() {
        let store = parse_txt("姓名：张三\n项目名称：简历助手\n微信：zs\n").into_store();
        assert!(matches!(store.section("基本信息"), Some(Section::Single(_))));
        assert!(store.section("项目经历").unwrap().is_entries());
        assert_eq!(
            store.value_by_field("微信"),
            Some(&FieldValue::from("zs"))
        );
        assert!(store.section(REMARKS_SECTION).is_some());
    }

    #[test]
    fn test_markdown_output_parses_back() {
        let md = parse_txt(SAMPLE).to_markdown();
        let store = parse_markdown(&md);
        assert_eq!(store.value_by_field("姓名"), Some(&FieldValue::from("张三")));
        assert_eq!(
            store.value_by_field("备注"),
            Some(&FieldValue::from(
                "热爱技术，善于沟通，能够快速学习新知识；- 认真\n1. 负责"
            ))
        );
    }
}
