use std::borrow::Cow;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single stored résumé value.
///
/// Markdown parsing only ever produces `Text`. The other shapes arrive through
/// JSON uploads or remote parsing and are stringified by the normalizer.
/// A JSON string that is a `YYYY-MM-DD` date becomes `Date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Date(NaiveDate),
    Text(String),
    List(Vec<FieldValue>),
    Object(IndexMap<String, FieldValue>),
}

impl FieldValue {
    /// Whether the value carries anything worth filling. Empty text, `null`,
    /// `false` and zero count as absent; lists and objects always count.
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Date(_) | FieldValue::List(_) | FieldValue::Object(_) => true,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// One record: field name → value, in document order.
pub type ResumeRecord = IndexMap<String, FieldValue>;

/// A section holds either one record or, for multi-entry sections, an ordered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section {
    Entries(Vec<ResumeRecord>),
    Single(ResumeRecord),
}

impl Section {
    pub fn records(&self) -> &[ResumeRecord] {
        match self {
            Section::Entries(entries) => entries,
            Section::Single(record) => std::slice::from_ref(record),
        }
    }

    pub fn is_entries(&self) -> bool {
        matches!(self, Section::Entries(_))
    }
}

/// Parsed résumé content keyed by section title.
///
/// Read-only during a fill pass. Replaced wholesale on every markdown parse or
/// upload; never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeStore {
    sections: IndexMap<String, Section>,
}

impl ResumeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.get(title)
    }

    pub fn section_mut(&mut self, title: &str) -> Option<&mut Section> {
        self.sections.get_mut(title)
    }

    /// Inserts or replaces a section. A replaced section keeps its position.
    pub fn insert_section(&mut self, title: impl Into<String>, section: Section) {
        self.sections.insert(title.into(), section);
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn sections_mut(&mut self) -> impl Iterator<Item = (&str, &mut Section)> {
        self.sections.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Every record in store order, multi-entry sections flattened.
    pub fn records(&self) -> impl Iterator<Item = &ResumeRecord> {
        self.sections.values().flat_map(|s| s.records().iter())
    }

    /// First present value stored under `field`, searching every section.
    pub fn value_by_field(&self, field: &str) -> Option<&FieldValue> {
        if field.is_empty() {
            return None;
        }
        self.records()
            .filter_map(|record| record.get(field))
            .find(|v| v.is_present())
    }

    /// Renders every record of a list section as one block of text.
    ///
    /// Each record becomes `field:\nvalue` pairs separated by blank lines;
    /// records are separated by `---`. `_en` fields and empty values are left out.
    pub fn section_digest(&self, title: &str) -> Option<String> {
        let Some(Section::Entries(entries)) = self.sections.get(title) else {
            return None;
        };

        let blocks: Vec<String> = entries
            .iter()
            .map(|entry| {
                entry
                    .iter()
                    .filter(|(key, value)| !key.ends_with("_en") && value.is_present())
                    .map(|(key, value)| {
                        let key = key.split('/').next().unwrap_or("").trim();
                        format!("{key}:\n{}", display_text(value))
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n")
            })
            .filter(|block| !block.is_empty())
            .collect();

        if blocks.is_empty() {
            None
        } else {
            Some(blocks.join("\n\n---\n\n"))
        }
    }
}

fn display_text(value: &FieldValue) -> Cow<'_, str> {
    match value {
        FieldValue::Text(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(crate::fill::normalize::safe_string(other)),
    }
}
