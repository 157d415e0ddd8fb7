//! Field identifier extractor.
//!
//! Finds candidate form controls in a snapshot document and gathers every bit
//! of nearby text that might name them into a `FormFieldDescriptor`.

use crate::dom::document::{Document, NodeId};

const TEXT_INPUT_TYPES: &[&str] = &["text", "email", "tel", "number"];

/// Input types never considered, even when they carry a label-like attribute.
const NON_TEXT_INPUT_TYPES: &[&str] = &[
    "hidden", "password", "checkbox", "radio", "file", "submit", "button", "reset", "image",
];

const LABEL_CONTAINER_TAGS: &[&str] = &["label", "span", "div", "p", "strong", "b"];

/// Ancestor levels walked when collecting extra labels.
const MAX_CONTEXT_DEPTH: usize = 4;
/// Container text at or above this many characters is ignored as an extra label.
const MAX_EXTRA_LABEL_CHARS: usize = 20;

/// One candidate control, valid for a single scan of `doc`.
#[derive(Debug, Clone)]
pub struct FormFieldDescriptor<'doc> {
    pub node: NodeId,
    pub tag_name: &'doc str,
    pub input_type: &'doc str,
    pub name: &'doc str,
    pub id: &'doc str,
    pub placeholder: &'doc str,
    pub class_name: &'doc str,
    pub aria_label: &'doc str,
    pub data_label: &'doc str,
    pub autocomplete: &'doc str,
    pub current_value: &'doc str,
    pub label: String,
    pub context_text: String,
    pub extra_labels: Vec<String>,
    /// Lowercased, space-joined text used for matching.
    pub identifiers: String,
}

impl FormFieldDescriptor<'_> {
    /// Human-readable name for reports and notifications.
    pub fn display_name(&self) -> &str {
        [self.label.as_str(), self.placeholder, self.name]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or("未知字段")
    }
}

/// Every candidate control in document order.
pub fn find_form_fields(doc: &Document) -> Vec<FormFieldDescriptor<'_>> {
    doc.elements()
        .into_iter()
        .filter(|&id| is_candidate(doc, id))
        .filter_map(|id| describe(doc, id))
        .collect()
}

fn is_candidate(doc: &Document, id: NodeId) -> bool {
    let Some(element) = doc.element(id) else {
        return false;
    };
    let has_label_attr = ["aria-label", "data-label"]
        .iter()
        .any(|a| element.attr(a).is_some());

    match element.tag_name.as_str() {
        "textarea" | "select" => true,
        "input" => {
            let input_type = element.input_type.as_str();
            if TEXT_INPUT_TYPES.contains(&input_type) {
                true
            } else if NON_TEXT_INPUT_TYPES.contains(&input_type) {
                false
            } else {
                has_label_attr || element.attr("autocomplete").is_some()
            }
        }
        _ => matches!(element.attr("role"), Some("combobox" | "listbox")) && has_label_attr,
    }
}

/// Builds the descriptor for one control.
pub fn describe(doc: &Document, id: NodeId) -> Option<FormFieldDescriptor<'_>> {
    let element = doc.element(id)?;
    let label = resolve_label(doc, id);
    let context_text = doc
        .parent(id)
        .map(|p| doc.text_content(p).trim().to_string())
        .unwrap_or_default();
    let extra_labels = collect_extra_labels(doc, id);

    let mut descriptor = FormFieldDescriptor {
        node: id,
        tag_name: &element.tag_name,
        input_type: &element.input_type,
        name: element.attr_or_empty("name"),
        id: element.attr_or_empty("id"),
        placeholder: element.attr_or_empty("placeholder"),
        class_name: element.attr_or_empty("class"),
        aria_label: element.attr_or_empty("aria-label"),
        data_label: element.attr_or_empty("data-label"),
        autocomplete: element.attr_or_empty("autocomplete"),
        current_value: &element.value,
        label,
        context_text,
        extra_labels,
        identifiers: String::new(),
    };
    descriptor.identifiers = build_identifiers(&descriptor);
    Some(descriptor)
}

fn build_identifiers(field: &FormFieldDescriptor<'_>) -> String {
    let parts = [
        field.name,
        field.id,
        field.placeholder,
        field.label.as_str(),
        field.class_name,
        field.context_text.as_str(),
        field.aria_label,
        field.data_label,
        field.autocomplete,
    ];
    parts
        .into_iter()
        .chain(field.extra_labels.iter().map(String::as_str))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// First label found by: `aria-labelledby`, `label[for]`, enclosing label,
/// preceding sibling label, label inside the closest `div`.
fn resolve_label(doc: &Document, id: NodeId) -> String {
    let label_text = |node: NodeId| doc.text_content(node).trim().to_string();

    if let Some(ids) = doc.attr(id, "aria-labelledby") {
        let text = ids
            .split_whitespace()
            .filter_map(|ref_id| doc.by_id(ref_id))
            .map(label_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !text.is_empty() {
            return text;
        }
    }

    if let Some(node) = doc.attr(id, "id").and_then(|v| doc.label_for(v)) {
        return label_text(node);
    }

    if let Some(node) = doc.closest(id, "label") {
        return label_text(node);
    }

    let sibling_label = doc
        .previous_element_siblings(id)
        .into_iter()
        .find(|&s| doc.tag_name(s) == Some("label"))
        .map(label_text)
        .filter(|t| !t.is_empty());
    if let Some(text) = sibling_label {
        return text;
    }

    doc.closest(id, "div")
        .and_then(|div| doc.find_descendant(div, "label"))
        .map(label_text)
        .unwrap_or_default()
}

/// Text nodes and short label-like containers around the control, walking up
/// to `MAX_CONTEXT_DEPTH` ancestors.
fn collect_extra_labels(doc: &Document, id: NodeId) -> Vec<String> {
    let mut labels = Vec::new();
    let mut cursor = doc.parent(id);
    let mut depth = 0;

    while let Some(ancestor) = cursor {
        if depth >= MAX_CONTEXT_DEPTH {
            break;
        }
        for &child in doc.children(ancestor) {
            if child == id {
                continue;
            }
            if let Some(text) = doc.text(child) {
                let text = text.trim();
                if !text.is_empty() {
                    labels.push(text.to_string());
                }
            } else if doc
                .tag_name(child)
                .is_some_and(|tag| LABEL_CONTAINER_TAGS.contains(&tag))
            {
                let text = doc.text_content(child);
                let text = text.trim();
                let len = text.chars().count();
                if len > 0 && len < MAX_EXTRA_LABEL_CHARS {
                    labels.push(text.to_string());
                }
            }
        }
        cursor = doc.parent(ancestor);
        depth += 1;
    }
    labels
}
