//! Writes applied to a snapshot document, mirrored as `WriteAction`s the
//! extension replays on the live page.

use serde::{Deserialize, Serialize};

use crate::dom::document::{Document, NodeId};
use crate::fill::normalize::safe_string;
use crate::models::FieldValue;

/// Delay between opening a custom dropdown and clicking its option.
pub const LISTBOX_OPTION_DELAY_MS: u64 = 200;

pub const MARK_ATTR: &str = "data-autofill";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WriteAction {
    /// Set `value`, then dispatch the listed events (bubbling).
    SetValue {
        value: String,
        events: Vec<String>,
    },
    /// Select the `<option>` whose value is `value`, then dispatch `change`.
    SelectOption { value: String },
    /// Click the widget, wait `delay_ms`, then click the option at `option_path`.
    ChooseListboxOption {
        option_path: Vec<usize>,
        delay_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMark {
    Success,
    Fail,
}

impl FillMark {
    fn as_str(self) -> &'static str {
        match self {
            FillMark::Success => "success",
            FillMark::Fail => "fail",
        }
    }
}

/// Writes `value` into the control at `id` the way its kind requires.
///
/// Returns `None` when nothing could be written (no matching option, no open
/// listbox, or not a writable control).
pub fn write_value(doc: &mut Document, id: NodeId, value: &FieldValue) -> Option<WriteAction> {
    let text = safe_string(value);
    let element = doc.element(id)?;
    let is_dropdown = matches!(element.attr("role"), Some("combobox" | "listbox"));

    match element.tag_name.clone().as_str() {
        "input" | "textarea" => write_text(doc, id, &text),
        "select" => choose_option(doc, id, &text),
        _ if is_dropdown => choose_listbox_option(doc, id, &text),
        _ => None,
    }
}

pub fn write_text(doc: &mut Document, id: NodeId, value: &str) -> Option<WriteAction> {
    let element = doc.element_mut(id)?;
    element.value = value.to_string();
    element.events.extend(["input", "change"]);
    Some(WriteAction::SetValue {
        value: value.to_string(),
        events: vec!["input".to_string(), "change".to_string()],
    })
}

/// Picks the first `<option>` whose text or value contains `value`
/// (case-insensitive), falling back to gender keywords for 男/女.
pub fn choose_option(doc: &mut Document, id: NodeId, value: &str) -> Option<WriteAction> {
    let needle = value.to_lowercase();
    let options: Vec<(String, String)> = doc
        .descendants(id)
        .into_iter()
        .filter(|&o| doc.tag_name(o) == Some("option"))
        .map(|o| {
            let text = doc.text_content(o).trim().to_string();
            let option_value = doc.attr(o, "value").map(str::to_string).unwrap_or_else(|| text.clone());
            (text, option_value)
        })
        .collect();

    let matched = options
        .iter()
        .find(|(text, v)| text.to_lowercase().contains(&needle) || v.to_lowercase().contains(&needle))
        .or_else(|| {
            let (zh, en) = gender_keywords(value)?;
            options
                .iter()
                .find(|(text, v)| text.contains(zh) || v.contains(en))
        })?;

    let chosen = matched.1.clone();
    let element = doc.element_mut(id)?;
    element.value = chosen.clone();
    element.events.push("change");
    Some(WriteAction::SelectOption { value: chosen })
}

/// Opens a custom dropdown and picks the first option in the page's listbox
/// whose text contains `value`.
pub fn choose_listbox_option(doc: &mut Document, id: NodeId, value: &str) -> Option<WriteAction> {
    doc.element_mut(id)?.events.push("click");

    let listbox = doc
        .elements()
        .into_iter()
        .find(|&e| doc.attr(e, "role") == Some("listbox"))?;
    let options: Vec<(NodeId, String)> = doc
        .descendants(listbox)
        .into_iter()
        .filter(|&o| doc.attr(o, "role") == Some("option"))
        .map(|o| (o, doc.text_content(o).trim().to_string()))
        .collect();

    let (option, _) = options
        .iter()
        .find(|(_, text)| text.contains(value))
        .or_else(|| {
            let (zh, en) = gender_keywords(value)?;
            options
                .iter()
                .find(|(_, text)| text.contains(zh) || text.to_lowercase().contains(en))
        })?;
    let option = *option;

    let element = doc.element_mut(option)?;
    element.events.push("click");
    element
        .attrs
        .insert("aria-selected".to_string(), "true".to_string());

    Some(WriteAction::ChooseListboxOption {
        option_path: doc.path(option),
        delay_ms: LISTBOX_OPTION_DELAY_MS,
    })
}

fn gender_keywords(value: &str) -> Option<(&'static str, &'static str)> {
    match value {
        "男" => Some(("男", "male")),
        "女" => Some(("女", "female")),
        _ => None,
    }
}

/// Flags the control so the page can highlight the outcome.
pub fn mark(doc: &mut Document, id: NodeId, mark: FillMark) {
    if let Some(element) = doc.element_mut(id) {
        element
            .attrs
            .insert(MARK_ATTR.to_string(), mark.as_str().to_string());
    }
}
