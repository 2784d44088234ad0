//! Resource kinds and the fetch contract.
//!
//! Every read endpoint is described by a [`ResourceKind`] mapping to its
//! URL path and the key its records appear under in the response
//! envelope. The [`ResourceFetch`] trait is the only thing the composite
//! queries know about the transport, which keeps them testable against
//! canned responses.

use std::fmt;
use std::future::Future;

use crate::envelope::RawEnvelope;

/// The read resources exposed by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Users,
    /// The user associated with the current access token.
    CurrentUser,
    Jobcodes,
    JobcodeAssignments,
    Timesheets,
    PayrollReport,
}

impl ResourceKind {
    /// URL path of the endpoint, relative to the API base.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::CurrentUser => "current_user",
            Self::Jobcodes => "jobcodes",
            Self::JobcodeAssignments => "jobcode_assignments",
            Self::Timesheets => "timesheets",
            Self::PayrollReport => "reports/payroll",
        }
    }

    /// Key under `results` where this kind's records live.
    #[must_use]
    pub const fn result_key(self) -> &'static str {
        match self {
            Self::Users | Self::CurrentUser => "users",
            Self::Jobcodes => "jobcodes",
            Self::JobcodeAssignments => "jobcode_assignments",
            Self::Timesheets => "timesheets",
            Self::PayrollReport => "payroll_report",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint())
    }
}

/// Ordered query parameters for a resource request.
///
/// Order is kept as-built so requests are reproducible; duplicate keys
/// are allowed, matching what the wire format permits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a key/value pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Builder-style [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Appends every pair from `other`.
    pub fn extend_from(&mut self, other: &Self) {
        self.0.extend(other.0.iter().cloned());
    }

    /// The first value recorded for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All pairs, in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// An authenticated source of raw resource envelopes.
///
/// Implemented by the HTTP client and by test fakes. Errors pass through
/// the composite queries unchanged; no retrying happens at this layer.
pub trait ResourceFetch {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issues a read request for `kind` with the given query parameters
    /// and returns the raw response envelope.
    fn fetch_raw(
        &self,
        kind: ResourceKind,
        params: &QueryParams,
    ) -> impl Future<Output = Result<RawEnvelope, Self::Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_table_matches_result_keys() {
        assert_eq!(ResourceKind::Users.endpoint(), "users");
        assert_eq!(ResourceKind::CurrentUser.endpoint(), "current_user");
        assert_eq!(ResourceKind::CurrentUser.result_key(), "users");
        assert_eq!(
            ResourceKind::JobcodeAssignments.endpoint(),
            "jobcode_assignments"
        );
        assert_eq!(ResourceKind::PayrollReport.endpoint(), "reports/payroll");
        assert_eq!(ResourceKind::PayrollReport.result_key(), "payroll_report");
    }

    #[test]
    fn query_params_keep_insertion_order() {
        let mut params = QueryParams::new();
        params.push("user_ids", "1,2");
        params.push("active", "yes");
        assert_eq!(
            params.pairs(),
            &[
                ("user_ids".to_string(), "1,2".to_string()),
                ("active".to_string(), "yes".to_string()),
            ]
        );
        assert_eq!(params.get("active"), Some("yes"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn query_params_extend_appends() {
        let mut params = QueryParams::new().with("a", "1");
        let extra = QueryParams::new().with("b", "2");
        params.extend_from(&extra);
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("b"), Some("2"));
    }
}
