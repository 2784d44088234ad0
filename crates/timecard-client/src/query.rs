//! Typed filter sets for the list endpoints.
//!
//! Each struct mirrors the optional filters its endpoint documents.
//! Unset fields are omitted from the request so the remote defaults
//! apply. Date/time filters are passed as the strings the API expects:
//! `YYYY-MM-DD` dates or ISO 8601 timestamps for `modified_*` bounds.

use std::fmt;

use chrono::NaiveDate;
use timecard_core::{ActiveFilter, QueryParams, UserIds};

fn push_opt(params: &mut QueryParams, key: &str, value: Option<impl fmt::Display>) {
    if let Some(value) = value {
        params.push(key, value.to_string());
    }
}

/// Filters for [`Client::list_users`](crate::Client::list_users).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListQuery {
    /// Restrict to these user ids.
    pub ids: Option<UserIds>,
    /// Comma-separated usernames.
    pub usernames: Option<String>,
    pub active: Option<ActiveFilter>,
    /// `*` acts as a wildcard, matching from the start of the string.
    pub first_name: Option<String>,
    /// `*` acts as a wildcard, matching from the start of the string.
    pub last_name: Option<String>,
    pub modified_before: Option<String>,
    pub modified_since: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl UserListQuery {
    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        push_opt(&mut params, "ids", self.ids.as_ref());
        push_opt(&mut params, "usernames", self.usernames.as_ref());
        push_opt(&mut params, "active", self.active);
        push_opt(&mut params, "first_name", self.first_name.as_ref());
        push_opt(&mut params, "last_name", self.last_name.as_ref());
        push_opt(&mut params, "modified_before", self.modified_before.as_ref());
        push_opt(&mut params, "modified_since", self.modified_since.as_ref());
        push_opt(&mut params, "per_page", self.per_page);
        push_opt(&mut params, "page", self.page);
        params
    }
}

/// Filters for [`Client::list_jobcodes`](crate::Client::list_jobcodes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobcodeListQuery {
    /// Restrict to these jobcode ids (comma-separated).
    pub ids: Option<String>,
    /// Comma-separated parent ids; `0` selects top-level jobcodes and
    /// `-1` selects all regardless of parent.
    pub parent_ids: Option<String>,
    /// `regular`, `pto`, or `all`.
    pub jobcode_type: Option<String>,
    pub active: Option<ActiveFilter>,
    pub modified_before: Option<String>,
    pub modified_since: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl JobcodeListQuery {
    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        push_opt(&mut params, "ids", self.ids.as_ref());
        push_opt(&mut params, "parent_ids", self.parent_ids.as_ref());
        push_opt(&mut params, "type", self.jobcode_type.as_ref());
        push_opt(&mut params, "active", self.active);
        push_opt(&mut params, "modified_before", self.modified_before.as_ref());
        push_opt(&mut params, "modified_since", self.modified_since.as_ref());
        push_opt(&mut params, "per_page", self.per_page);
        push_opt(&mut params, "page", self.page);
        params
    }
}

/// Filters for
/// [`Client::list_jobcode_assignments`](crate::Client::list_jobcode_assignments).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentListQuery {
    /// Users whose assignments to return; company-wide grants come back
    /// with a `user_id` of `0`.
    pub user_ids: Option<UserIds>,
    /// `regular`, `pto`, or `all`.
    pub jobcode_type: Option<String>,
    /// Only assignments for jobcodes under this parent; `0` selects
    /// top-level assignments.
    pub jobcode_parent_id: Option<i64>,
    /// The remote default here is `both`, not `yes`.
    pub active: Option<ActiveFilter>,
    pub modified_before: Option<String>,
    pub modified_since: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl AssignmentListQuery {
    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        push_opt(&mut params, "user_ids", self.user_ids.as_ref());
        push_opt(&mut params, "type", self.jobcode_type.as_ref());
        push_opt(&mut params, "jobcode_parent_id", self.jobcode_parent_id);
        push_opt(&mut params, "active", self.active);
        push_opt(&mut params, "modified_before", self.modified_before.as_ref());
        push_opt(&mut params, "modified_since", self.modified_since.as_ref());
        push_opt(&mut params, "per_page", self.per_page);
        push_opt(&mut params, "page", self.page);
        params
    }
}

/// Filters for [`Client::list_timesheets`](crate::Client::list_timesheets).
///
/// The endpoint requires one of `ids`, a `start_date`/`end_date` pair,
/// or a `modified_*` bound; the service rejects requests with none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimesheetListQuery {
    /// Restrict to these timesheet ids (comma-separated).
    pub ids: Option<String>,
    /// Entries dated on or after this day.
    pub start_date: Option<NaiveDate>,
    /// Entries dated on or before this day.
    pub end_date: Option<NaiveDate>,
    pub user_ids: Option<UserIds>,
    /// Comma-separated group ids.
    pub group_ids: Option<String>,
    /// Comma-separated jobcode ids; includes time against children.
    pub jobcode_ids: Option<String>,
    /// `yes`, `no`, or `both`; the remote default is `no`.
    pub on_the_clock: Option<String>,
    /// `regular`, `pto`, or `both`.
    pub jobcode_type: Option<String>,
    pub modified_before: Option<String>,
    pub modified_since: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl TimesheetListQuery {
    /// A query for every entry of `user_ids` within the inclusive window.
    #[must_use]
    pub fn window(user_ids: UserIds, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            user_ids: Some(user_ids),
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        push_opt(&mut params, "ids", self.ids.as_ref());
        push_opt(&mut params, "start_date", self.start_date);
        push_opt(&mut params, "end_date", self.end_date);
        push_opt(&mut params, "user_ids", self.user_ids.as_ref());
        push_opt(&mut params, "group_ids", self.group_ids.as_ref());
        push_opt(&mut params, "jobcode_ids", self.jobcode_ids.as_ref());
        push_opt(&mut params, "on_the_clock", self.on_the_clock.as_ref());
        push_opt(&mut params, "jobcode_type", self.jobcode_type.as_ref());
        push_opt(&mut params, "modified_before", self.modified_before.as_ref());
        push_opt(&mut params, "modified_since", self.modified_since.as_ref());
        push_opt(&mut params, "per_page", self.per_page);
        push_opt(&mut params, "page", self.page);
        params
    }
}

/// Filters for [`Client::payroll_report`](crate::Client::payroll_report).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollReportQuery {
    /// Time on or after this day is included.
    pub start_date: NaiveDate,
    /// Time on or before this day is included.
    pub end_date: NaiveDate,
    pub user_ids: Option<UserIds>,
    /// Comma-separated group ids.
    pub group_ids: Option<String>,
    /// Include users with zero hours for the period.
    pub include_zero_time: bool,
}

impl PayrollReportQuery {
    #[must_use]
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            user_ids: None,
            group_ids: None,
            include_zero_time: false,
        }
    }

    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.push("start_date", self.start_date.to_string());
        params.push("end_date", self.end_date.to_string());
        push_opt(&mut params, "user_ids", self.user_ids.as_ref());
        push_opt(&mut params, "group_ids", self.group_ids.as_ref());
        if self.include_zero_time {
            params.push("include_zero_time", "yes");
        }
        params
    }
}
