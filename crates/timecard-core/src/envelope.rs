//! Raw response envelope shared by every read endpoint.
//!
//! The service wraps records in `{"results": {<key>: ...}}` and ships
//! full user/jobcode records referenced by the primary result set in a
//! `supplemental_data` side channel. Sections are usually maps keyed by
//! id string, but a few endpoints return plain lists; [`RawEnvelope::records`]
//! accepts both. Map iteration keeps the response's own ordering.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Jobcode, User};
use crate::resource::ResourceKind;

/// A raw record failed to deserialize into its typed form.
#[derive(Debug, Error)]
#[error("failed to decode {kind} record: {source}")]
pub struct DecodeError {
    pub kind: ResourceKind,
    #[source]
    pub source: serde_json::Error,
}

/// Decodes one raw record into its typed form.
pub fn decode_record<T: DeserializeOwned>(
    kind: ResourceKind,
    record: &Value,
) -> Result<T, DecodeError> {
    serde_json::from_value(record.clone()).map_err(|source| DecodeError { kind, source })
}

/// The untyped response envelope returned by every read endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEnvelope {
    /// Result sections keyed by resource result key.
    #[serde(default)]
    pub results: Map<String, Value>,
    /// Side-channel records referenced by the primary result set. Absent
    /// when the query matched nothing at all.
    #[serde(default)]
    pub supplemental_data: Option<SupplementalData>,
    /// Pagination flag: more pages exist beyond this response.
    #[serde(default)]
    pub more: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawEnvelope {
    /// Raw records for `kind`, whether the section is keyed by id or is
    /// a plain list. Missing sections read as empty.
    #[must_use]
    pub fn records(&self, kind: ResourceKind) -> Vec<&Value> {
        match self.results.get(kind.result_key()) {
            Some(Value::Object(map)) => map.values().collect(),
            Some(Value::Array(list)) => list.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Decodes every record for `kind` into its typed form, preserving
    /// response order.
    pub fn decode_records<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
    ) -> Result<Vec<T>, DecodeError> {
        self.records(kind)
            .into_iter()
            .map(|record| decode_record(kind, record))
            .collect()
    }
}

/// Full records referenced by ids in a primary result set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplementalData {
    /// User records keyed by id string.
    #[serde(default)]
    pub users: Map<String, Value>,
    /// Jobcode records keyed by id string.
    #[serde(default)]
    pub jobcodes: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SupplementalData {
    /// The raw user record for `user_id`, if present.
    #[must_use]
    pub fn user_record(&self, user_id: i64) -> Option<&Value> {
        self.users.get(&user_id.to_string())
    }

    /// Decodes every supplemental user, in response order.
    pub fn decode_users(&self) -> Result<Vec<User>, DecodeError> {
        self.users
            .values()
            .map(|record| decode_record(ResourceKind::Users, record))
            .collect()
    }

    /// Decodes every supplemental jobcode, in response order.
    pub fn decode_jobcodes(&self) -> Result<Vec<Jobcode>, DecodeError> {
        self.jobcodes
            .values()
            .map(|record| decode_record(ResourceKind::Jobcodes, record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: Value) -> RawEnvelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn records_reads_map_sections() {
        let envelope = envelope(json!({
            "results": {
                "users": {
                    "17": {"id": 17, "first_name": "Ana"},
                    "23": {"id": 23, "first_name": "Ben"}
                }
            }
        }));
        let records = envelope.records(ResourceKind::Users);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn records_reads_list_sections() {
        let envelope = envelope(json!({
            "results": {
                "payroll_report": [
                    {"user_id": 17, "total_work_seconds": 3600}
                ]
            }
        }));
        assert_eq!(envelope.records(ResourceKind::PayrollReport).len(), 1);
    }

    #[test]
    fn records_missing_section_reads_empty() {
        let envelope = envelope(json!({"results": {}}));
        assert!(envelope.records(ResourceKind::Timesheets).is_empty());
    }

    #[test]
    fn supplemental_data_absent_reads_as_none() {
        let envelope = envelope(json!({"results": {"timesheets": {}}}));
        assert!(envelope.supplemental_data.is_none());
    }

    #[test]
    fn supplemental_jobcodes_keep_response_order() {
        let envelope = envelope(json!({
            "results": {},
            "supplemental_data": {
                "jobcodes": {
                    "30": {"id": 30, "name": "Billing"},
                    "10": {"id": 10, "name": "Install"},
                    "20": {"id": 20, "name": "Repair"}
                }
            }
        }));
        let jobcodes = envelope
            .supplemental_data
            .as_ref()
            .unwrap()
            .decode_jobcodes()
            .unwrap();
        let ids: Vec<i64> = jobcodes.iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }

    #[test]
    fn user_record_looks_up_by_id_string() {
        let envelope = envelope(json!({
            "results": {},
            "supplemental_data": {
                "users": {"17": {"id": 17, "first_name": "Ana"}}
            }
        }));
        let supplemental = envelope.supplemental_data.as_ref().unwrap();
        assert!(supplemental.user_record(17).is_some());
        assert!(supplemental.user_record(99).is_none());
    }

    #[test]
    fn decode_error_names_the_resource_kind() {
        let err = decode_record::<User>(ResourceKind::Users, &json!({"id": "not-a-number"}))
            .unwrap_err();
        assert_eq!(err.kind, ResourceKind::Users);
        assert!(err.to_string().contains("users"));
    }

    #[test]
    fn envelope_surfaces_pagination_flag() {
        let envelope = envelope(json!({"results": {}, "more": true}));
        assert_eq!(envelope.more, Some(true));
    }
}
