//! Field taxonomy. Canonical résumé field names, their keyword aliases, and the
//! fixed section layout used when writing markdown.
//!
//! The reverse alias table is built once at startup and shared read-only
//! (`Arc<FieldTaxonomy>` in `AppState`).

use std::collections::HashMap;

/// Canonical field → aliases (synonyms, pinyin, abbreviations).
///
/// Declaration order matters: when an alias appears under more than one field,
/// the later declaration owns it.
const FIELD_ALIASES: &[(&str, &[&str])] = &[
    // Basic info
    ("姓名", &["姓名", "名字", "xingming"]),
    ("性别", &["性别", "男", "女"]),
    ("出生日期", &["出生日期", "出生", "生日", "shengri"]),
    ("政治面貌", &["政治面貌", "政治身份"]),
    ("民族", &["民族", "minzu"]),
    (
        "身份证号",
        &[
            "身份证号",
            "身份证号码",
            "身份证",
            "证件号",
            "证件号码",
            "第二代身份证",
            "shenfenzheng",
            "shenfenzhenghao",
            "sfz",
        ],
    ),
    (
        "手机号码",
        &["手机号码", "手机", "电话", "联系电话", "shouji", "dianhua", "tel"],
    ),
    (
        "邮箱地址",
        &["邮箱地址", "电子邮件", "邮箱", "youxiang", "email"],
    ),
    (
        "现居地址",
        &[
            "现居地址",
            "当前地址",
            "居住地址",
            "现住址",
            "常住地址",
            "联系地址",
            "通讯地址",
            "家庭住址",
            "家庭地址",
            "住址",
            "详细地址",
            "所在地址",
            "地址",
        ],
    ),
    ("籍贯", &["籍贯", "籍贯地"]),
    ("所在城市", &["所在城市", "城市"]),
    ("身高", &["身高", "shengao", "height"]),
    ("体重", &["体重", "tizhong", "weight"]),
    ("国籍", &["国籍", "国家", "guoji"]),
    ("家庭住址", &["家庭住址", "家庭地址", "住址"]),
    ("出生地", &["出生地", "出生地点", "籍贯地", "birthplace"]),
    ("户口所在地", &["户口所在地", "户口", "户籍", "hukou"]),
    // Education
    ("教育背景", &["教育背景", "教育经历"]),
    ("最高学历", &["最高学历", "学历层次", "学历"]),
    ("毕业院校", &["毕业院校", "学校名称", "学校", "院校"]),
    ("专业", &["专业", "专业名称"]),
    ("毕业时间", &["毕业时间", "结束日期", "毕业年份", "结束时间"]),
    ("学位", &["学位"]),
    ("GPA", &["GPA", "绩点"]),
    ("第一学历", &["第一学历"]),
    ("本科毕业院校", &["本科毕业院校"]),
    ("本科专业", &["本科专业"]),
    ("本科毕业时间", &["本科毕业时间"]),
    ("本科学位", &["本科学位"]),
    ("本科GPA", &["本科GPA"]),
    // Work
    ("工作经历", &["工作经历", "工作经验"]),
    ("工作年限", &["工作年限", "工作年数"]),
    ("期望职位", &["期望职位"]),
    ("期望工作地点", &["期望工作地点", "期望城市", "期望地点"]),
    ("期望薪资", &["期望薪资", "薪资期望"]),
    // Skills & personal
    ("专业技能", &["专业技能", "技能"]),
    ("语言能力", &["语言能力", "语言"]),
    ("计算机技能", &["计算机技能", "计算机"]),
    ("证书资质", &["证书资质", "证书"]),
    ("兴趣爱好", &["兴趣爱好", "爱好"]),
    ("性格特点", &["性格特点"]),
    ("自我评价", &["自我评价", "自我描述"]),
    ("职业规划", &["职业规划"]),
    // Experience sections
    ("项目经历", &["项目经历"]),
    ("实习经历", &["实习经历"]),
    ("校园经历", &["校园经历"]),
    ("获奖情况", &["获奖情况"]),
];

/// Sections stored as an ordered list of records rather than a single record.
pub const MULTI_ENTRY_SECTIONS: &[&str] = &["项目经历", "校园经历", "获奖情况"];

/// Section that closes every generated document and carries the remarks field.
pub const REMARKS_SECTION: &str = "其他信息";
pub const REMARKS_FIELD: &str = "备注";

/// Fixed section → field layout written by the markdown serializer.
/// `REMARKS_SECTION` is always emitted last, followed by `REMARKS_FIELD`.
pub const SECTION_LAYOUT: &[(&str, &[&str])] = &[
    (
        "基本信息",
        &[
            "姓名",
            "性别",
            "出生日期",
            "政治面貌",
            "民族",
            "身份证号",
            "手机号码",
            "邮箱地址",
            "现居地址",
            "籍贯",
            "所在城市",
            "身高",
            "体重",
            "国籍",
            "家庭住址",
            "出生地",
            "户口所在地",
        ],
    ),
    (
        "教育背景",
        &[
            "最高学历",
            "毕业院校",
            "专业",
            "毕业时间",
            "学位",
            "GPA",
            "第一学历",
            "本科毕业院校",
            "本科专业",
            "本科毕业时间",
            "本科学位",
            "本科GPA",
        ],
    ),
    (
        "工作经历",
        &["当前职位", "工作年限", "期望薪资", "期望工作地点", "期望职位"],
    ),
    (
        "技能特长",
        &["专业技能", "技能证书", "语言能力", "计算机技能", "证书资质"],
    ),
    (
        "个人特质",
        &["兴趣爱好", "特长", "性格特点", "自我评价", "自我描述", "职业规划"],
    ),
    ("项目经历", &["项目名称", "项目描述", "项目职责", "项目成果"]),
    (
        "实习经历",
        &["实习公司", "实习职位", "实习时间", "实习内容", "实习收获"],
    ),
    (
        "校园经历",
        &["组织名称", "担任职务", "任职时间", "工作内容", "主要成就"],
    ),
    ("获奖情况", &["获奖名称", "获奖时间", "获奖级别"]),
    ("紧急联系人", &["联系人姓名", "关系", "联系电话"]),
    (REMARKS_SECTION, &["是否接受出差", "是否接受加班", "入职时间"]),
];

pub fn is_multi_entry_section(title: &str) -> bool {
    MULTI_ENTRY_SECTIONS.contains(&title)
}

/// Fields the serializer writes for `section`, or an empty slice for unknown sections.
pub fn layout_fields(section: &str) -> &'static [&'static str] {
    SECTION_LAYOUT
        .iter()
        .find(|(title, _)| *title == section)
        .map(|(_, fields)| *fields)
        .unwrap_or(&[])
}

/// The layout section that lists `field`, if any.
pub fn section_for_field(field: &str) -> Option<&'static str> {
    SECTION_LAYOUT
        .iter()
        .find(|(_, fields)| fields.contains(&field))
        .map(|(title, _)| *title)
}

/// One canonical field and its aliases, as declared.
#[derive(Debug, Clone, Copy)]
pub struct CanonicalField {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

/// Canonical field table with an immutable lowercase reverse index.
#[derive(Debug, Clone)]
pub struct FieldTaxonomy {
    fields: Vec<CanonicalField>,
    exact: HashMap<String, &'static str>,
    /// (lowercased alias, canonical) in first-declaration order.
    pairs: Vec<(String, &'static str)>,
}

impl FieldTaxonomy {
    pub fn standard() -> Self {
        Self::from_table(FIELD_ALIASES)
    }

    pub fn from_table(table: &'static [(&'static str, &'static [&'static str])]) -> Self {
        let fields: Vec<CanonicalField> = table
            .iter()
            .map(|&(name, aliases)| CanonicalField { name, aliases })
            .collect();

        let mut exact: HashMap<String, &'static str> = HashMap::new();
        let mut pairs: Vec<(String, &'static str)> = Vec::new();
        let mut pair_index: HashMap<String, usize> = HashMap::new();

        for field in &fields {
            for alias in field.aliases {
                let key = alias.to_lowercase();
                exact.insert(key.clone(), field.name);
                match pair_index.get(&key) {
                    Some(&idx) => pairs[idx].1 = field.name,
                    None => {
                        pair_index.insert(key.clone(), pairs.len());
                        pairs.push((key, field.name));
                    }
                }
            }
        }

        Self {
            fields,
            exact,
            pairs,
        }
    }

    pub fn fields(&self) -> &[CanonicalField] {
        &self.fields
    }

    /// Exact, case-insensitive alias lookup.
    pub fn canonical_for(&self, alias: &str) -> Option<&'static str> {
        self.exact.get(&alias.trim().to_lowercase()).copied()
    }

    /// Every (lowercased alias, canonical) pair, in declaration order.
    pub fn alias_pairs(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.pairs.iter().map(|(alias, canonical)| (alias.as_str(), *canonical))
    }

    /// Whether `alias` maps to a single canonical field across the whole table.
    #[cfg(test)]
    pub fn is_unambiguous(&self, alias: &str) -> bool {
        let key = alias.to_lowercase();
        self.fields
            .iter()
            .filter(|f| f.aliases.iter().any(|a| a.to_lowercase() == key))
            .count()
            == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_lookup_is_case_insensitive() {
        let taxonomy = FieldTaxonomy::standard();
        assert_eq!(taxonomy.canonical_for("EMAIL"), Some("邮箱地址"));
        assert_eq!(taxonomy.canonical_for("gpa"), Some("GPA"));
        assert_eq!(taxonomy.canonical_for(" 手机 "), Some("手机号码"));
        assert_eq!(taxonomy.canonical_for("unknown"), None);
    }

    #[test]
    fn test_shared_alias_belongs_to_later_declaration() {
        let taxonomy = FieldTaxonomy::standard();
        assert_eq!(taxonomy.canonical_for("住址"), Some("家庭住址"));
        assert_eq!(taxonomy.canonical_for("籍贯地"), Some("出生地"));
        assert!(!taxonomy.is_unambiguous("住址"));
        assert!(taxonomy.is_unambiguous("地址"));
    }

    #[test]
    fn test_every_alias_maps_to_exactly_one_field() {
        let taxonomy = FieldTaxonomy::standard();
        let mut seen = std::collections::HashSet::new();
        for (alias, canonical) in taxonomy.alias_pairs() {
            assert!(seen.insert(alias.to_string()), "duplicate pair for {alias}");
            assert_eq!(taxonomy.canonical_for(alias), Some(canonical));
        }
    }

    #[test]
    fn test_layout_lookups() {
        assert_eq!(section_for_field("邮箱地址"), Some("基本信息"));
        assert_eq!(section_for_field("项目名称"), Some("项目经历"));
        assert_eq!(section_for_field("不存在"), None);
        assert!(layout_fields("不存在").is_empty());
        assert!(is_multi_entry_section("获奖情况"));
        assert!(!is_multi_entry_section("基本信息"));
    }

    #[test]
    fn test_remarks_section_is_last_in_layout() {
        assert_eq!(SECTION_LAYOUT.last().map(|(t, _)| *t), Some(REMARKS_SECTION));
        assert!(!layout_fields(REMARKS_SECTION).contains(&REMARKS_FIELD));
    }
}
