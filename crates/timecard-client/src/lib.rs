//! Authenticated client for the remote time-tracking REST API.
//!
//! Wraps the read endpoints behind typed methods:
//! - Per-resource listings (`list_users`, `list_jobcodes`,
//!   `list_jobcode_assignments`, `list_timesheets`, `payroll_report`)
//! - Raw envelope access for callers that need supplemental data
//! - The composite views from `timecard-core`, [`Client::jobcodes_by_user`]
//!   and [`Client::grouped_timesheets`]
//!
//! Construction performs an identity-verification call; a client you can
//! hold has already authenticated successfully.
//!
//! # Thread Safety
//!
//! The client is safe to clone and share across threads. Each clone
//! shares the underlying HTTP connection pool.

mod config;
mod error;
mod query;

pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use query::{
    AssignmentListQuery, JobcodeListQuery, PayrollReportQuery, TimesheetListQuery, UserListQuery,
};

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use timecard_core::envelope::decode_record;
use timecard_core::{
    AssignmentQuery, GroupedQuery, GroupedTimesheets, Jobcode, JobcodeAssignment, PayrollReport,
    QueryError, QueryParams, RawEnvelope, ResourceFetch, ResourceKind, Timesheet, User,
    UserIds, UserJobcodes,
};

/// Authenticated API client.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    current_user: User,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("current_user", &self.current_user.id)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Builds the HTTP session and verifies the token by fetching the
    /// user it belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidToken`] for an unusable token
    /// before any request is made, [`ClientError::Auth`] when the
    /// service rejects the verification call, and transport errors
    /// unchanged. No client exists after a failure.
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        if config.auth_token.is_empty() {
            return Err(ClientError::InvalidToken {
                reason: "auth token cannot be empty",
            });
        }
        if config.auth_token.trim().is_empty() {
            return Err(ClientError::InvalidToken {
                reason: "auth token cannot be whitespace-only",
            });
        }

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.auth_token))
            .map_err(|_| ClientError::InvalidToken {
                reason: "auth token contains characters not allowed in a header",
            })?;
        bearer.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(ClientError::ClientBuild)?;
        let base_url = normalize_base_url(&config.base_url);

        let envelope = fetch_envelope(
            &http,
            &base_url,
            ResourceKind::CurrentUser,
            &QueryParams::new(),
        )
        .await
        .map_err(ClientError::into_auth)?;
        let record = envelope
            .records(ResourceKind::CurrentUser)
            .into_iter()
            .next()
            .ok_or_else(|| {
                ClientError::InvalidResponse(
                    "identity response contained no user record".to_string(),
                )
            })?;
        let current_user: User = decode_record(ResourceKind::CurrentUser, record)?;
        tracing::debug!(user_id = current_user.id, "session verified");

        Ok(Self {
            http,
            base_url,
            current_user,
        })
    }

    /// The user associated with the access token, captured at
    /// construction time.
    #[must_use]
    pub fn current_user(&self) -> &User {
        &self.current_user
    }

    /// Fetches the raw response envelope for `kind`.
    ///
    /// This is the escape hatch for callers that need supplemental data
    /// or fields the typed records do not carry.
    pub async fn fetch_raw(
        &self,
        kind: ResourceKind,
        params: &QueryParams,
    ) -> Result<RawEnvelope, ClientError> {
        fetch_envelope(&self.http, &self.base_url, kind, params).await
    }

    /// Fetches and decodes the records for `kind`.
    pub async fn fetch_list<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        params: &QueryParams,
    ) -> Result<Vec<T>, ClientError> {
        let envelope = self.fetch_raw(kind, params).await?;
        Ok(envelope.decode_records(kind)?)
    }

    /// Lists users in the company, narrowed by `query`.
    pub async fn list_users(&self, query: &UserListQuery) -> Result<Vec<User>, ClientError> {
        self.fetch_list(ResourceKind::Users, &query.to_params()).await
    }

    /// Lists jobcodes, narrowed by `query`.
    pub async fn list_jobcodes(
        &self,
        query: &JobcodeListQuery,
    ) -> Result<Vec<Jobcode>, ClientError> {
        self.fetch_list(ResourceKind::Jobcodes, &query.to_params())
            .await
    }

    /// Lists jobcode assignments, narrowed by `query`.
    pub async fn list_jobcode_assignments(
        &self,
        query: &AssignmentListQuery,
    ) -> Result<Vec<JobcodeAssignment>, ClientError> {
        self.fetch_list(ResourceKind::JobcodeAssignments, &query.to_params())
            .await
    }

    /// Lists timesheets, narrowed by `query`.
    pub async fn list_timesheets(
        &self,
        query: &TimesheetListQuery,
    ) -> Result<Vec<Timesheet>, ClientError> {
        self.fetch_list(ResourceKind::Timesheets, &query.to_params())
            .await
    }

    /// Fetches the per-user payroll report for a timeframe.
    pub async fn payroll_report(
        &self,
        query: &PayrollReportQuery,
    ) -> Result<Vec<PayrollReport>, ClientError> {
        self.fetch_list(ResourceKind::PayrollReport, &query.to_params())
            .await
    }

    /// Per-user assigned jobcodes; see
    /// [`timecard_core::jobcodes_by_user`] for the join semantics and
    /// the `None` sentinel.
    pub async fn jobcodes_by_user(
        &self,
        user_ids: &UserIds,
        query: &AssignmentQuery,
    ) -> Result<Option<BTreeMap<i64, UserJobcodes>>, QueryError<ClientError>> {
        timecard_core::jobcodes_by_user(self, user_ids, query).await
    }

    /// Timesheets grouped by jobcode per user for an inclusive date
    /// window; see [`timecard_core::grouped_timesheets`].
    pub async fn grouped_timesheets(
        &self,
        user_ids: &UserIds,
        start_date: NaiveDate,
        end_date: NaiveDate,
        query: &GroupedQuery,
    ) -> Result<GroupedTimesheets, QueryError<ClientError>> {
        timecard_core::grouped_timesheets(self, user_ids, start_date, end_date, query).await
    }
}

impl ResourceFetch for Client {
    type Error = ClientError;

    async fn fetch_raw(
        &self,
        kind: ResourceKind,
        params: &QueryParams,
    ) -> Result<RawEnvelope, ClientError> {
        fetch_envelope(&self.http, &self.base_url, kind, params).await
    }
}

async fn fetch_envelope(
    http: &reqwest::Client,
    base_url: &str,
    kind: ResourceKind,
    params: &QueryParams,
) -> Result<RawEnvelope, ClientError> {
    let url = format!("{base_url}{}", kind.endpoint());
    tracing::debug!(%url, query_params = params.len(), "fetching resource");

    let response = http.get(&url).query(params.pairs()).send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(error::api_error(status, &body));
    }

    serde_json::from_str(&body).map_err(|err| ClientError::InvalidResponse(err.to_string()))
}

/// Guarantees exactly one trailing slash so endpoint joins are textual.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('/');
    format!("{trimmed}/")
}
