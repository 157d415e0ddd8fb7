//! Fuzzy matcher. Maps a field's identifier string to a canonical key and a
//! stored value.
//!
//! Resolution is an ordered cascade of `FieldResolver`s: taxonomy lookup, then
//! a scan of the store's own field names, then attribute guessing. The first
//! resolver that yields a non-empty normalized value wins.

use std::borrow::Cow;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::fill::extract::FormFieldDescriptor;
use crate::fill::normalize::normalize;
use crate::models::{FieldValue, ResumeStore};
use crate::taxonomy::{is_multi_entry_section, FieldTaxonomy};

/// Tokens shorter than this never match as a substring of an alias.
const MIN_CONTAINED_TOKEN_CHARS: usize = 2;

static ATTRIBUTE_CHECKS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("邮箱地址", r"email|电子邮件|邮箱"),
        ("手机号码", r"mobile|phone|tel|手机号|电话|联系电话"),
        (
            "身份证号",
            r"身份证|id\s*card|idnumber|id\s*number|identity|shenfenzheng|sfz",
        ),
        ("现居地址", r"地址|address|住址|通讯地址|家庭住址|现居|居住"),
        ("姓名", r"姓名|full\s*name|名字|name"),
        ("所在城市", r"城市|city"),
        ("出生日期", r"出生|生日|date\s*of\s*birth|dob|birth"),
        ("性别", r"性别|gender|male|female|男|女"),
    ]
    .into_iter()
    .map(|(key, pattern)| {
        (
            key,
            Regex::new(pattern).expect("invalid attribute check regex"),
        )
    })
    .collect()
});

static AUTOCOMPLETE_CHECKS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("邮箱地址", r"email"),
        ("手机号码", r"tel|mobile|phone"),
        ("姓名", r"name"),
        ("现居地址", r"address"),
        ("出生日期", r"bday|birthday|birth|dob"),
    ]
    .into_iter()
    .map(|(key, pattern)| {
        (
            key,
            Regex::new(pattern).expect("invalid autocomplete regex"),
        )
    })
    .collect()
});

fn alias_overlaps(token: &str, alias: &str) -> bool {
    token.contains(alias)
        || (token.chars().count() >= MIN_CONTAINED_TOKEN_CHARS && alias.contains(token))
}

/// Canonical key for `identifiers`: exact alias match on any token first, then
/// substring overlap between any token and any alias.
pub fn resolve_canonical_key(taxonomy: &FieldTaxonomy, identifiers: &str) -> Option<&'static str> {
    let tokens: Vec<&str> = identifiers.split_whitespace().collect();

    tokens
        .iter()
        .find_map(|token| taxonomy.canonical_for(token))
        .or_else(|| {
            tokens.iter().find_map(|token| {
                taxonomy
                    .alias_pairs()
                    .find(|(alias, _)| alias_overlaps(token, alias))
                    .map(|(_, canonical)| canonical)
            })
        })
}

/// Store-aware lookup: like `resolve_canonical_key` but only accepts keys that
/// have a value, then falls back to the store's own field names.
pub fn resolve_value<'s>(
    taxonomy: &FieldTaxonomy,
    identifiers: &str,
    store: &'s ResumeStore,
) -> Option<&'s FieldValue> {
    let tokens: Vec<&str> = identifiers.split_whitespace().collect();

    let exact = tokens
        .iter()
        .filter_map(|token| taxonomy.canonical_for(token))
        .find_map(|canonical| store.value_by_field(canonical));
    if exact.is_some() {
        return exact;
    }

    let by_alias = tokens.iter().find_map(|token| {
        taxonomy
            .alias_pairs()
            .filter(|(alias, _)| alias_overlaps(token, alias))
            .find_map(|(_, canonical)| store.value_by_field(canonical))
    });
    if by_alias.is_some() {
        return by_alias;
    }

    store.records().find_map(|record| {
        record.iter().find_map(|(field, value)| {
            let field = field.to_lowercase();
            if field.is_empty() || !value.is_present() {
                return None;
            }
            tokens
                .iter()
                .any(|token| alias_overlaps(token, &field))
                .then_some(value)
        })
    })
}

/// Last-resort key guess from the identifier text, then the `autocomplete` hint.
pub fn guess_key_by_attributes(identifiers: &str, autocomplete: &str) -> Option<&'static str> {
    let text = identifiers.to_lowercase();
    let hint = autocomplete.to_lowercase();

    ATTRIBUTE_CHECKS
        .iter()
        .find(|(_, re)| re.is_match(&text))
        .or_else(|| AUTOCOMPLETE_CHECKS.iter().find(|(_, re)| re.is_match(&hint)))
        .map(|(key, _)| *key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    Taxonomy,
    StoreScan,
    AttributeGuess,
}

/// What one resolver found. Either half may be missing.
#[derive(Debug, Clone, Default)]
pub struct Resolution<'s> {
    pub key: Option<String>,
    pub raw: Option<Cow<'s, FieldValue>>,
}

/// One step of the matching cascade.
pub trait FieldResolver: Send + Sync {
    fn stage(&self) -> MatchStage;

    fn resolve<'s>(
        &self,
        field: &FormFieldDescriptor<'_>,
        store: &'s ResumeStore,
    ) -> Resolution<'s>;
}

/// Taxonomy lookup. A key naming a multi-entry section resolves to the digest
/// of all its records.
pub struct TaxonomyResolver {
    taxonomy: Arc<FieldTaxonomy>,
}

impl FieldResolver for TaxonomyResolver {
    fn stage(&self) -> MatchStage {
        MatchStage::Taxonomy
    }

    fn resolve<'s>(
        &self,
        field: &FormFieldDescriptor<'_>,
        store: &'s ResumeStore,
    ) -> Resolution<'s> {
        let Some(key) = resolve_canonical_key(&self.taxonomy, &field.identifiers) else {
            return Resolution::default();
        };

        let raw = if is_multi_entry_section(key) {
            store
                .section_digest(key)
                .map(|digest| Cow::Owned(FieldValue::from(digest)))
        } else {
            store.value_by_field(key).map(Cow::Borrowed)
        };

        Resolution {
            key: Some(key.to_string()),
            raw,
        }
    }
}

/// Direct store scan; contributes a value but never a key.
pub struct StoreScanResolver {
    taxonomy: Arc<FieldTaxonomy>,
}

impl FieldResolver for StoreScanResolver {
    fn stage(&self) -> MatchStage {
        MatchStage::StoreScan
    }

    fn resolve<'s>(
        &self,
        field: &FormFieldDescriptor<'_>,
        store: &'s ResumeStore,
    ) -> Resolution<'s> {
        Resolution {
            key: None,
            raw: resolve_value(&self.taxonomy, &field.identifiers, store).map(Cow::Borrowed),
        }
    }
}

pub struct AttributeGuessResolver;

impl FieldResolver for AttributeGuessResolver {
    fn stage(&self) -> MatchStage {
        MatchStage::AttributeGuess
    }

    fn resolve<'s>(
        &self,
        field: &FormFieldDescriptor<'_>,
        store: &'s ResumeStore,
    ) -> Resolution<'s> {
        let Some(key) = guess_key_by_attributes(&field.identifiers, field.autocomplete) else {
            return Resolution::default();
        };
        Resolution {
            key: Some(key.to_string()),
            raw: store.value_by_field(key).map(Cow::Borrowed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Canonical key used for content gates; empty when nothing resolved.
    pub key: String,
    /// Normalized value; empty when nothing resolved.
    pub value: String,
    pub stage: Option<MatchStage>,
}

/// Ordered resolver cascade shared by every fill pass.
pub struct FieldMatcher {
    resolvers: Vec<Box<dyn FieldResolver>>,
}

impl FieldMatcher {
    pub fn new(resolvers: Vec<Box<dyn FieldResolver>>) -> Self {
        Self { resolvers }
    }

    pub fn standard(taxonomy: Arc<FieldTaxonomy>) -> Self {
        Self::new(vec![
            Box::new(TaxonomyResolver {
                taxonomy: Arc::clone(&taxonomy),
            }),
            Box::new(StoreScanResolver { taxonomy }),
            Box::new(AttributeGuessResolver),
        ])
    }

    /// Runs resolvers until one produces a non-empty normalized value. The key
    /// is the first one any resolver named, even if its value came up empty.
    pub fn resolve(&self, field: &FormFieldDescriptor<'_>, store: &ResumeStore) -> MatchOutcome {
        let mut key: Option<String> = None;

        for resolver in &self.resolvers {
            let resolution = resolver.resolve(field, store);
            if key.is_none() {
                key.clone_from(&resolution.key);
            }

            let Some(raw) = resolution.raw else {
                continue;
            };
            let normalize_key = resolution.key.as_deref().or(key.as_deref()).unwrap_or("");
            let value = normalize(normalize_key, &raw);
            if !value.is_empty() {
                return MatchOutcome {
                    key: key.unwrap_or_default(),
                    value,
                    stage: Some(resolver.stage()),
                };
            }
        }

        MatchOutcome {
            key: key.unwrap_or_default(),
            ..Default::default()
        }
    }
}
