//! Fill-all-forms orchestration.
//!
//! One pass over a snapshot: every candidate control is matched, normalized and
//! gated while the document is borrowed immutably; the owned decisions are
//! then applied as writes. Failures are per field and never abort the pass.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dom::document::{Document, NodeId, SnapshotNode};
use crate::dom::write::{mark, write_value, FillMark, WriteAction};
use crate::fill::extract::{find_form_fields, FormFieldDescriptor};
use crate::fill::gate::{check_fill, content_gate, is_search_field, GateVerdict, RejectReason};
use crate::fill::matcher::{FieldMatcher, MatchStage};
use crate::models::{FieldValue, ResumeStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Filled,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeReason {
    SearchField,
    /// No resolver produced a value.
    NoMatch,
    Rejected(RejectReason),
    /// The control offered nothing to write into (e.g. no matching option).
    NotWritable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldOutcome {
    /// Child indices from the snapshot root to the control.
    pub path: Vec<usize>,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<MatchStage>,
    pub status: FieldStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<OutcomeReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<WriteAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillReport {
    pub pass_id: Uuid,
    pub total: usize,
    pub filled: usize,
    pub failed: usize,
    pub skipped: usize,
    pub fields: Vec<FieldOutcome>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notifications: Vec<String>,
    /// The snapshot with writes and `data-autofill` marks applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<SnapshotNode>,
}

impl FillReport {
    fn empty(pass_id: Uuid) -> Self {
        Self {
            pass_id,
            total: 0,
            filled: 0,
            failed: 0,
            skipped: 0,
            fields: Vec::new(),
            notifications: Vec::new(),
            document: None,
        }
    }

    fn push(&mut self, outcome: FieldOutcome) {
        self.total += 1;
        match outcome.status {
            FieldStatus::Filled => self.filled += 1,
            FieldStatus::Failed => self.failed += 1,
            FieldStatus::Skipped => self.skipped += 1,
        }
        self.fields.push(outcome);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormStats {
    pub total: usize,
    pub filled: usize,
    pub empty: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FillOptions {
    pub show_notification: bool,
}

/// What the pass decided for one control, detached from the document borrow.
#[derive(Debug)]
struct FillDecision {
    node: NodeId,
    path: Vec<usize>,
    label: String,
    key: String,
    value: String,
    stage: Option<MatchStage>,
    verdict: Verdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Write,
    Skip,
    Fail(OutcomeReason),
}

pub struct FormFiller {
    matcher: Arc<FieldMatcher>,
}

impl FormFiller {
    pub fn new(matcher: Arc<FieldMatcher>) -> Self {
        Self { matcher }
    }

    /// Runs one fill pass over `snapshot`. Never fails; per-field problems are
    /// reported in the outcome list.
    pub fn fill(
        &self,
        store: &ResumeStore,
        snapshot: &SnapshotNode,
        options: FillOptions,
    ) -> FillReport {
        let pass_id = Uuid::new_v4();
        let mut doc = Document::from_snapshot(snapshot);
        let decisions = self.plan(&doc, store);

        let mut report = FillReport::empty(pass_id);
        for decision in decisions {
            let outcome = apply(&mut doc, decision);
            if options.show_notification && outcome.status == FieldStatus::Filled {
                if let Some(value) = &outcome.value {
                    report
                        .notifications
                        .push(format!("已填写: {} = {}", outcome.label, value));
                }
            }
            report.push(outcome);
        }

        if options.show_notification && report.filled > 0 {
            report
                .notifications
                .push(format!("自动填写完成！共填写了 {} 个字段", report.filled));
        }

        report.document = doc.to_snapshot();
        info!(
            "Fill pass {pass_id}: {}/{} filled, {} failed, {} skipped",
            report.filled, report.total, report.failed, report.skipped
        );
        report
    }

    fn plan(&self, doc: &Document, store: &ResumeStore) -> Vec<FillDecision> {
        find_form_fields(doc)
            .iter()
            .map(|field| self.decide(doc, field, store))
            .collect()
    }

    fn decide(
        &self,
        doc: &Document,
        field: &FormFieldDescriptor<'_>,
        store: &ResumeStore,
    ) -> FillDecision {
        let mut decision = FillDecision {
            node: field.node,
            path: doc.path(field.node),
            label: field.display_name().to_string(),
            key: String::new(),
            value: String::new(),
            stage: None,
            verdict: Verdict::Skip,
        };

        if is_search_field(&field.identifiers) {
            debug!("Skipping search field '{}'", decision.label);
            return decision;
        }

        let outcome = self.matcher.resolve(field, store);
        decision.key = outcome.key;
        decision.stage = outcome.stage;

        if outcome.value.is_empty() {
            warn!("Unrecognised field '{}': {}", decision.label, field.identifiers);
            decision.verdict = Verdict::Fail(OutcomeReason::NoMatch);
            return decision;
        }

        let verdict = match content_gate(&decision.key, &outcome.value) {
            GateVerdict::Allow => check_fill(field, &outcome.value),
            rejected => rejected,
        };
        decision.verdict = match verdict {
            GateVerdict::Allow => Verdict::Write,
            GateVerdict::Reject(reason) => {
                debug!(
                    "Gate rejected '{}' for key '{}': {reason:?}",
                    decision.label, decision.key
                );
                Verdict::Fail(OutcomeReason::Rejected(reason))
            }
        };
        decision.value = outcome.value;
        decision
    }
}

fn apply(doc: &mut Document, decision: FillDecision) -> FieldOutcome {
    let canonical_key = (!decision.key.is_empty()).then(|| decision.key.clone());
    let mut outcome = FieldOutcome {
        path: decision.path,
        label: decision.label,
        canonical_key,
        value: None,
        stage: decision.stage,
        status: FieldStatus::Skipped,
        reason: None,
        action: None,
    };

    match decision.verdict {
        Verdict::Skip => {
            outcome.reason = Some(OutcomeReason::SearchField);
        }
        Verdict::Fail(reason) => {
            mark(doc, decision.node, FillMark::Fail);
            outcome.status = FieldStatus::Failed;
            outcome.reason = Some(reason);
        }
        Verdict::Write => {
            match write_value(doc, decision.node, &FieldValue::from(decision.value.as_str())) {
                Some(action) => {
                    mark(doc, decision.node, FillMark::Success);
                    debug!("Filled '{}' = '{}'", outcome.label, decision.value);
                    outcome.status = FieldStatus::Filled;
                    outcome.action = Some(action);
                    outcome.value = Some(decision.value);
                }
                None => {
                    mark(doc, decision.node, FillMark::Fail);
                    outcome.status = FieldStatus::Failed;
                    outcome.reason = Some(OutcomeReason::NotWritable);
                }
            }
        }
    }
    outcome
}

/// Counts candidate controls and how many already hold a value.
pub fn form_stats(snapshot: &SnapshotNode) -> FormStats {
    let doc = Document::from_snapshot(snapshot);
    let fields = find_form_fields(&doc);
    let filled = fields
        .iter()
        .filter(|f| !f.current_value.trim().is_empty())
        .count();
    FormStats {
        total: fields.len(),
        filled,
        empty: fields.len() - filled,
    }
}
