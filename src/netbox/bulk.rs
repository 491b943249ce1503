//! Bulk mutation engine
//!
//! Takes a batch of records for one resource kind, issues one HTTP call per
//! record in caller order, classifies each outcome against the operation's
//! success predicate and folds everything into a [`BulkReport`]. A failure
//! on one record never aborts the batch; setup failures (unknown kind, dead
//! backend at construction) are handled before the engine runs.

use crate::error::{NbxError, Result};
use crate::netbox::http::{sanitize_for_log, HttpTransport, RawResponse};
use crate::resource::label::label_for;
use crate::resource::registry::{LabelOrder, ResourceKind};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::net::IpAddr;

/// Mutation operation tag; selects HTTP verb, URL shape and success predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Create => "Create",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
        }
    }

    /// Operation-specific success predicate
    fn succeeded(&self, response: &RawResponse) -> bool {
        match self {
            // Backend reports creation with a truthy `created` field
            Operation::Create => response
                .json
                .as_ref()
                .and_then(|body| body.get("created"))
                .is_some_and(truthy),
            Operation::Update => response.status == 200,
            Operation::Delete => response.status == 204,
        }
    }
}

/// JSON truthiness: null, false, 0, "" and empty containers are falsy
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// A mutation batch: one record or an ordered sequence of records.
#[derive(Debug, Clone, Default)]
pub struct Batch(Vec<Value>);

impl Batch {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_records(self) -> Vec<Value> {
        self.0
    }
}

impl From<Vec<Value>> for Batch {
    fn from(records: Vec<Value>) -> Self {
        Batch(records)
    }
}

impl From<Value> for Batch {
    /// A single record becomes a one-element batch; a JSON array is taken
    /// as the record sequence itself.
    fn from(value: Value) -> Self {
        match value {
            Value::Array(records) => Batch(records),
            record => Batch(vec![record]),
        }
    }
}

/// Response half of a failure detail; `json` is present only when the raw
/// body text parses as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseDetail {
    pub status_code: u16,
    pub text: String,
    pub json: Option<Value>,
}

impl From<RawResponse> for ResponseDetail {
    fn from(response: RawResponse) -> Self {
        ResponseDetail {
            status_code: response.status,
            text: response.text,
            json: response.json,
        }
    }
}

/// Detail recorded for one failed record. `response` is `None` when the
/// call never completed (connection failure, missing id); `error` then
/// carries the reason.
#[derive(Debug, Clone, Serialize)]
pub struct FailureDetail {
    pub request: Value,
    pub response: Option<ResponseDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated outcome of one mutation batch.
///
/// Labels are deduplicated and sorted (lexicographically, or numerically for
/// IP-address kinds); `details` holds exactly one entry per failed label, in
/// failed-label order. Distinct records can share a label, in which case
/// they collapse under set semantics per list: the last failure's detail
/// wins, and a label whose records went both ways appears in both
/// `succeeded` and `failed`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    #[serde(serialize_with = "serialize_details")]
    details: Vec<(String, FailureDetail)>,
}

impl BulkReport {
    /// Failure detail for a label, if that label failed
    pub fn detail(&self, label: &str) -> Option<&FailureDetail> {
        self.details
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, detail)| detail)
    }

    /// Failure details in failed-label order
    pub fn details(&self) -> impl Iterator<Item = (&str, &FailureDetail)> {
        self.details.iter().map(|(l, d)| (l.as_str(), d))
    }

    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty()
    }
}

/// Serialize details as a JSON object whose key order matches the failed list
fn serialize_details<S: Serializer>(
    details: &[(String, FailureDetail)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(details.len()))?;
    for (label, detail) in details {
        map.serialize_entry(label, detail)?;
    }
    map.end()
}

/// Accumulates per-record outcomes in arrival order; `finish` applies the
/// dedup/sort post-processing.
#[derive(Default)]
struct ReportBuilder {
    succeeded: Vec<String>,
    failed: Vec<String>,
    details: Vec<(String, FailureDetail)>,
}

impl ReportBuilder {
    fn record_success(&mut self, label: String) {
        self.succeeded.push(label);
    }

    /// Last-write-wins when two failed records share a label
    fn record_failure(&mut self, label: String, detail: FailureDetail) {
        if let Some(entry) = self.details.iter_mut().find(|(l, _)| *l == label) {
            entry.1 = detail;
        } else {
            self.details.push((label.clone(), detail));
        }
        self.failed.push(label);
    }

    fn finish(mut self, order: LabelOrder) -> BulkReport {
        sort_labels(&mut self.succeeded, order);
        sort_labels(&mut self.failed, order);

        // Re-key details to match the sorted failed list
        let mut details = Vec::with_capacity(self.failed.len());
        for label in &self.failed {
            if let Some(pos) = self.details.iter().position(|(l, _)| l == label) {
                details.push(self.details.swap_remove(pos));
            }
        }

        BulkReport {
            succeeded: self.succeeded,
            failed: self.failed,
            details,
        }
    }
}

fn sort_labels(labels: &mut Vec<String>, order: LabelOrder) {
    labels.sort();
    labels.dedup();
    if order == LabelOrder::IpNumeric {
        labels.sort_by_key(|label| ip_sort_key(label));
    }
}

/// Numeric IP ordering: parseable addresses first in address order (with the
/// label string as tie-breaker for equal hosts with different prefix
/// lengths), unparseable labels after, lexicographically.
fn ip_sort_key(label: &str) -> (u8, Option<IpAddr>, String) {
    let host = label.split('/').next().unwrap_or(label);
    match host.parse::<IpAddr>() {
        Ok(ip) => (0, Some(ip), label.to_string()),
        Err(_) => (1, None, label.to_string()),
    }
}

/// Run one mutation batch against the backend, one call per record in
/// caller order. Per-record failures (non-matching status, connection
/// errors, missing ids) are folded into the report; the batch continues.
pub(crate) async fn run(
    transport: &HttpTransport,
    kind: ResourceKind,
    operation: Operation,
    batch: Batch,
) -> BulkReport {
    let records = batch.into_records();
    if records.is_empty() {
        tracing::info!(
            "No {} data to {} in \"{}\"",
            kind.display_name(),
            operation.verb(),
            transport.base_url()
        );
        return BulkReport::default();
    }

    let total = records.len();
    let mut builder = ReportBuilder::default();

    for (index, record) in records.into_iter().enumerate() {
        let label = label_for(&record);
        tracing::info!(
            "{} {} object \"{}\" in \"{}\" - ...",
            operation.verb(),
            kind.display_name(),
            label,
            transport.base_url()
        );

        match dispatch(transport, kind, operation, &record).await {
            Ok(response) if operation.succeeded(&response) => {
                tracing::info!(
                    "{} {} object \"{}\" - OK ({}/{})",
                    operation.verb(),
                    kind.display_name(),
                    label,
                    index + 1,
                    total
                );
                builder.record_success(label);
            }
            Ok(response) => {
                tracing::error!(
                    "{} {} object \"{}\" - error ({}/{}): code {}, body: {}",
                    operation.verb(),
                    kind.display_name(),
                    label,
                    index + 1,
                    total,
                    response.status,
                    sanitize_for_log(&response.text)
                );
                builder.record_failure(
                    label,
                    FailureDetail {
                        request: record,
                        response: Some(response.into()),
                        error: None,
                    },
                );
            }
            Err(err) => {
                tracing::error!(
                    "{} {} object \"{}\" - error ({}/{}): {}",
                    operation.verb(),
                    kind.display_name(),
                    label,
                    index + 1,
                    total,
                    err
                );
                builder.record_failure(
                    label,
                    FailureDetail {
                        request: record,
                        response: None,
                        error: Some(err.to_string()),
                    },
                );
            }
        }
    }

    builder.finish(kind.label_order())
}

async fn dispatch(
    transport: &HttpTransport,
    kind: ResourceKind,
    operation: Operation,
    record: &Value,
) -> Result<RawResponse> {
    match operation {
        Operation::Create => transport.post(&format!("{}/", kind.path()), record).await,
        Operation::Update => {
            let id = record_id(record)?;
            transport
                .patch(&format!("{}/{}/", kind.path(), id), record)
                .await
        }
        Operation::Delete => {
            let id = record_id(record)?;
            transport.delete(&format!("{}/{}", kind.path(), id)).await
        }
    }
}

/// The record's `id` rendered for the URL path; update/delete require it
fn record_id(record: &Value) -> Result<String> {
    match record.get("id") {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Null) | None => Err(NbxError::MissingId(label_for(record))),
        Some(other) => Ok(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failure(request: Value) -> FailureDetail {
        FailureDetail {
            request,
            response: None,
            error: Some("boom".to_string()),
        }
    }

    #[test]
    fn test_finish_sorts_and_dedups() {
        let mut builder = ReportBuilder::default();
        builder.record_success("beta".to_string());
        builder.record_success("alpha".to_string());
        builder.record_success("beta".to_string());
        builder.record_failure("zulu".to_string(), failure(json!({"name": "zulu"})));
        builder.record_failure("mike".to_string(), failure(json!({"name": "mike"})));

        let report = builder.finish(LabelOrder::Lexicographic);
        assert_eq!(report.succeeded, vec!["alpha", "beta"]);
        assert_eq!(report.failed, vec!["mike", "zulu"]);
        let keys: Vec<&str> = report.details().map(|(l, _)| l).collect();
        assert_eq!(keys, vec!["mike", "zulu"]);
    }

    #[test]
    fn test_distinct_labels_stay_disjoint() {
        let mut builder = ReportBuilder::default();
        builder.record_success("a".to_string());
        builder.record_failure("b".to_string(), failure(json!({"name": "b"})));
        let report = builder.finish(LabelOrder::Lexicographic);
        assert!(report.succeeded.iter().all(|l| !report.failed.contains(l)));
    }

    // A label shared by a succeeding and a failing record stays in both
    // lists: set semantics are applied per list, not across the report.
    // Deliberate, see DESIGN.md.
    #[test]
    fn test_cross_outcome_label_collision_keeps_both() {
        let mut builder = ReportBuilder::default();
        builder.record_success("x".to_string());
        builder.record_failure("x".to_string(), failure(json!({"name": "x", "slot": 2})));

        let report = builder.finish(LabelOrder::Lexicographic);
        assert_eq!(report.succeeded, vec!["x"]);
        assert_eq!(report.failed, vec!["x"]);
        assert_eq!(report.detail("x").unwrap().request["slot"], 2);
    }

    #[test]
    fn test_ip_numeric_ordering() {
        let mut labels = vec![
            "10.0.0.10/24".to_string(),
            "10.0.0.9/24".to_string(),
            "not-an-ip".to_string(),
            "10.0.0.2".to_string(),
        ];
        sort_labels(&mut labels, LabelOrder::IpNumeric);
        assert_eq!(labels, vec!["10.0.0.2", "10.0.0.9/24", "10.0.0.10/24", "not-an-ip"]);
    }

    #[test]
    fn test_ip_ordering_rekeys_details() {
        let mut builder = ReportBuilder::default();
        builder.record_failure("10.0.0.10".to_string(), failure(json!({"address": "10.0.0.10"})));
        builder.record_failure("10.0.0.9".to_string(), failure(json!({"address": "10.0.0.9"})));

        let report = builder.finish(LabelOrder::IpNumeric);
        assert_eq!(report.failed, vec!["10.0.0.9", "10.0.0.10"]);
        let keys: Vec<&str> = report.details().map(|(l, _)| l).collect();
        assert_eq!(keys, report.failed);
    }

    // Two failed records with one label collapse to one detail entry and
    // the later record's detail wins. Deliberate, see DESIGN.md.
    #[test]
    fn test_collision_last_write_wins() {
        let mut builder = ReportBuilder::default();
        builder.record_failure("dup".to_string(), failure(json!({"name": "dup", "slot": 1})));
        builder.record_failure("dup".to_string(), failure(json!({"name": "dup", "slot": 2})));

        let report = builder.finish(LabelOrder::Lexicographic);
        assert_eq!(report.failed, vec!["dup"]);
        assert_eq!(report.detail("dup").unwrap().request["slot"], 2);
    }

    #[test]
    fn test_details_serialize_as_ordered_object() {
        let mut builder = ReportBuilder::default();
        builder.record_failure("b".to_string(), failure(json!({"name": "b"})));
        builder.record_failure("a".to_string(), failure(json!({"name": "a"})));

        let report = builder.finish(LabelOrder::Lexicographic);
        let rendered = serde_json::to_string(&report).unwrap();
        let a = rendered.find("\"a\":{").unwrap();
        let b = rendered.find("\"b\":{").unwrap();
        assert!(a < b, "details keys must follow failed-label order: {rendered}");
    }

    #[test]
    fn test_create_predicate_requires_truthy_created() {
        let ok = RawResponse {
            status: 201,
            text: String::new(),
            json: Some(json!({"created": true})),
        };
        let falsy = RawResponse {
            status: 201,
            text: String::new(),
            json: Some(json!({"created": 0})),
        };
        let missing = RawResponse {
            status: 201,
            text: String::new(),
            json: Some(json!({"name": "x"})),
        };
        let unparseable = RawResponse {
            status: 201,
            text: "not json".to_string(),
            json: None,
        };
        assert!(Operation::Create.succeeded(&ok));
        assert!(!Operation::Create.succeeded(&falsy));
        assert!(!Operation::Create.succeeded(&missing));
        assert!(!Operation::Create.succeeded(&unparseable));
    }

    #[test]
    fn test_update_and_delete_predicates_are_status_based() {
        let resp = |status| RawResponse {
            status,
            text: String::new(),
            json: None,
        };
        assert!(Operation::Update.succeeded(&resp(200)));
        assert!(!Operation::Update.succeeded(&resp(204)));
        assert!(Operation::Delete.succeeded(&resp(204)));
        assert!(!Operation::Delete.succeeded(&resp(200)));
    }

    #[test]
    fn test_record_id_variants() {
        assert_eq!(record_id(&json!({"id": 7})).unwrap(), "7");
        assert_eq!(record_id(&json!({"id": "abc"})).unwrap(), "abc");
        assert!(matches!(
            record_id(&json!({"name": "no-id"})),
            Err(NbxError::MissingId(label)) if label == "no-id"
        ));
        assert!(matches!(
            record_id(&json!({"id": null})),
            Err(NbxError::MissingId(_))
        ));
    }

    #[test]
    fn test_batch_from_single_value_and_array() {
        assert_eq!(Batch::from(json!({"id": 99})).len(), 1);
        assert_eq!(Batch::from(json!([{"id": 1}, {"id": 2}])).len(), 2);
        assert_eq!(Batch::from(Vec::<Value>::new()).len(), 0);
    }

    mod report_properties {
        use super::*;
        use proptest::prelude::*;
        use proptest::test_runner::TestCaseError;

        fn assert_sorted_dedup(labels: &[String]) -> std::result::Result<(), TestCaseError> {
            let mut expected = labels.to_vec();
            expected.sort();
            expected.dedup();
            prop_assert_eq!(labels, expected.as_slice());
            Ok(())
        }

        proptest! {
            /// Report post-processing invariants, over arbitrary outcome
            /// sequences with a small label alphabet to force collisions
            #[test]
            fn report_invariants_hold(
                outcomes in prop::collection::vec(("[a-c]{1,2}", any::<bool>()), 0..25)
            ) {
                let mut builder = ReportBuilder::default();
                for (label, ok) in &outcomes {
                    if *ok {
                        builder.record_success(label.clone());
                    } else {
                        builder.record_failure(label.clone(), failure(json!({"name": label})));
                    }
                }
                let report = builder.finish(LabelOrder::Lexicographic);

                // Both lists sorted and deduplicated
                assert_sorted_dedup(&report.succeeded)?;
                assert_sorted_dedup(&report.failed)?;

                // Detail keys are exactly the failed list, in its order
                let keys: Vec<&str> = report.details().map(|(l, _)| l).collect();
                let failed: Vec<&str> = report.failed.iter().map(String::as_str).collect();
                prop_assert_eq!(keys, failed);

                // Every reported label came from an input record with that
                // outcome; a label in both lists means distinct records with
                // that label went both ways (per-list set semantics)
                for label in &report.succeeded {
                    prop_assert!(outcomes.iter().any(|(l, ok)| l == label && *ok));
                }
                for label in &report.failed {
                    prop_assert!(outcomes.iter().any(|(l, ok)| l == label && !*ok));
                }
            }

            /// IP-numeric ordering keeps detail keys aligned with the
            /// failed list for arbitrary IPv4 labels
            #[test]
            fn ip_order_keeps_details_aligned(
                octets in prop::collection::vec((0u8..=255, 0u8..=255), 1..15)
            ) {
                let mut builder = ReportBuilder::default();
                for (a, b) in &octets {
                    let label = format!("10.0.{a}.{b}/24");
                    builder.record_failure(label.clone(), failure(json!({"address": label})));
                }
                let report = builder.finish(LabelOrder::IpNumeric);

                let keys: Vec<&str> = report.details().map(|(l, _)| l).collect();
                let failed: Vec<&str> = report.failed.iter().map(String::as_str).collect();
                prop_assert_eq!(keys, failed);

                for pair in report.failed.windows(2) {
                    prop_assert!(ip_sort_key(&pair[0]) < ip_sort_key(&pair[1]));
                }
            }
        }
    }
}
