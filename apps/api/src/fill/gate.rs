//! Fill-safety gate. The last veto before a normalized value is written.
//!
//! Three layers, applied in this order by the filler:
//! - search boxes are skipped before any matching happens
//! - content gates keyed by canonical field (length and shape checks)
//! - input gates keyed by the control itself (existing value, `type`)

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::fill::extract::FormFieldDescriptor;

static SEARCH_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"search|搜索|关键字|keyword").expect("invalid search regex"));

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email regex"));

static ID_NUMBER_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{8,30}$").expect("invalid id number regex"));

const MAX_NAME_CHARS: usize = 40;
const MIN_PHONE_DIGITS: usize = 6;
const MAX_PHONE_DIGITS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The control already holds user input.
    AlreadyFilled,
    /// `type="email"` control and the value has no `@`.
    EmailInputMismatch,
    /// `type="tel"` control and the value is not digits (hyphens/spaces aside).
    TelInputMismatch,
    NameTooLong,
    PhoneDigitCount,
    IdNumberShape,
    EmailShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    Allow,
    Reject(RejectReason),
}

/// Site search boxes are never filled.
pub fn is_search_field(identifiers: &str) -> bool {
    SEARCH_FIELD.is_match(identifiers)
}

/// Shape checks for values of well-known canonical fields.
pub fn content_gate(key: &str, value: &str) -> GateVerdict {
    let rejected = match key {
        "姓名" if value.chars().count() > MAX_NAME_CHARS => Some(RejectReason::NameTooLong),
        "手机号码" => {
            let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
            (!(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits))
                .then_some(RejectReason::PhoneDigitCount)
        }
        "身份证号" => {
            let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
            (!ID_NUMBER_SHAPE.is_match(&compact)).then_some(RejectReason::IdNumberShape)
        }
        "邮箱地址" => (!EMAIL_SHAPE.is_match(value)).then_some(RejectReason::EmailShape),
        _ => None,
    };

    match rejected {
        Some(reason) => GateVerdict::Reject(reason),
        None => GateVerdict::Allow,
    }
}

/// Checks against the control: never overwrite, respect `email`/`tel` input types.
pub fn input_gate(input_type: &str, current_value: &str, value: &str) -> GateVerdict {
    if !current_value.trim().is_empty() {
        return GateVerdict::Reject(RejectReason::AlreadyFilled);
    }

    match input_type {
        "email" if !value.contains('@') => GateVerdict::Reject(RejectReason::EmailInputMismatch),
        "tel" => {
            let compact: String = value
                .chars()
                .filter(|c| *c != '-' && !c.is_whitespace())
                .collect();
            if !compact.is_empty() && compact.chars().all(|c| c.is_ascii_digit()) {
                GateVerdict::Allow
            } else {
                GateVerdict::Reject(RejectReason::TelInputMismatch)
            }
        }
        _ => GateVerdict::Allow,
    }
}

/// Final veto before writing `value` into `field`.
pub fn check_fill(field: &FormFieldDescriptor<'_>, value: &str) -> GateVerdict {
    input_gate(field.input_type, field.current_value, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_fields_detected() {
        assert!(is_search_field("q site-search"));
        assert!(is_search_field("请输入搜索内容"));
        assert!(is_search_field("职位关键字"));
        assert!(!is_search_field("姓名 name"));
    }

    #[test]
    fn test_name_longer_than_forty_chars_rejected() {
        let forty = "张".repeat(40);
        let forty_one = "张".repeat(41);
        assert_eq!(content_gate("姓名", &forty), GateVerdict::Allow);
        assert_eq!(
            content_gate("姓名", &forty_one),
            GateVerdict::Reject(RejectReason::NameTooLong)
        );
    }

    #[test]
    fn test_phone_digit_count() {
        assert_eq!(
            content_gate("手机号码", "abc"),
            GateVerdict::Reject(RejectReason::PhoneDigitCount)
        );
        assert_eq!(content_gate("手机号码", "138-0013-8000"), GateVerdict::Allow);
        assert_eq!(
            content_gate("手机号码", "12345"),
            GateVerdict::Reject(RejectReason::PhoneDigitCount)
        );
        assert_eq!(
            content_gate("手机号码", &"1".repeat(21)),
            GateVerdict::Reject(RejectReason::PhoneDigitCount)
        );
    }

    #[test]
    fn test_id_number_shape() {
        assert_eq!(content_gate("身份证号", "11010119900307 001X"), GateVerdict::Allow);
        assert_eq!(
            content_gate("身份证号", "1234567"),
            GateVerdict::Reject(RejectReason::IdNumberShape)
        );
        assert_eq!(
            content_gate("身份证号", "1101-0119-9003"),
            GateVerdict::Reject(RejectReason::IdNumberShape)
        );
    }

    #[test]
    fn test_email_shape() {
        assert_eq!(content_gate("邮箱地址", "zhang@example.com"), GateVerdict::Allow);
        assert_eq!(
            content_gate("邮箱地址", "not-an-email"),
            GateVerdict::Reject(RejectReason::EmailShape)
        );
        assert_eq!(
            content_gate("邮箱地址", "a@b"),
            GateVerdict::Reject(RejectReason::EmailShape)
        );
    }

    #[test]
    fn test_unknown_keys_pass_content_gate() {
        assert_eq!(content_gate("", "anything"), GateVerdict::Allow);
        assert_eq!(content_gate("专业", &"x".repeat(500)), GateVerdict::Allow);
    }

    #[test]
    fn test_existing_value_never_overwritten() {
        for candidate in ["张三", "zhang@example.com", "13800138000", ""] {
            assert_eq!(
                input_gate("text", "X", candidate),
                GateVerdict::Reject(RejectReason::AlreadyFilled)
            );
        }
        assert_eq!(input_gate("text", "   ", "张三"), GateVerdict::Allow);
    }

    #[test]
    fn test_email_input_requires_at_sign() {
        assert_eq!(
            input_gate("email", "", "not-an-email"),
            GateVerdict::Reject(RejectReason::EmailInputMismatch)
        );
        assert_eq!(input_gate("email", "", "a@b.c"), GateVerdict::Allow);
    }

    #[test]
    fn test_tel_input_requires_digits() {
        assert_eq!(input_gate("tel", "", "138 0013-8000"), GateVerdict::Allow);
        assert_eq!(
            input_gate("tel", "", "abc"),
            GateVerdict::Reject(RejectReason::TelInputMismatch)
        );
        assert_eq!(
            input_gate("tel", "", "+86 138"),
            GateVerdict::Reject(RejectReason::TelInputMismatch)
        );
    }

    #[test]
    fn test_check_fill_reads_the_control() {
        use crate::dom::document::{tests::el, Document};
        use crate::fill::extract::find_form_fields;

        let doc = Document::from_snapshot(&el(
            "form",
            &[],
            vec![
                el("input", &[("type", "email")], vec![]),
                el("input", &[("value", "已有")], vec![]),
            ],
        ));
        let fields = find_form_fields(&doc);
        assert_eq!(check_fill(&fields[0], "a@b.c"), GateVerdict::Allow);
        assert_eq!(
            check_fill(&fields[0], "abc"),
            GateVerdict::Reject(RejectReason::EmailInputMismatch)
        );
        assert_eq!(
            check_fill(&fields[1], "张三"),
            GateVerdict::Reject(RejectReason::AlreadyFilled)
        );
    }

    #[test]
    fn test_input_type_vetoes_ignore_attribute_case() {
        use crate::dom::document::{tests::el, Document};
        use crate::fill::extract::find_form_fields;

        let doc = Document::from_snapshot(&el(
            "form",
            &[],
            vec![
                el("input", &[("type", "EMAIL")], vec![]),
                el("input", &[("type", "Tel")], vec![]),
            ],
        ));
        let fields = find_form_fields(&doc);
        assert_eq!(
            check_fill(&fields[0], "abc"),
            GateVerdict::Reject(RejectReason::EmailInputMismatch)
        );
        assert_eq!(
            check_fill(&fields[1], "call me"),
            GateVerdict::Reject(RejectReason::TelInputMismatch)
        );
        assert_eq!(check_fill(&fields[1], "138-0013-8000"), GateVerdict::Allow);
    }
}
