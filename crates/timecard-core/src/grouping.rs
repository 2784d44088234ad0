//! Timesheets grouped by jobcode per user, with summed hours.
//!
//! Combines the per-user jobcode view from [`crate::join`] with a raw
//! timesheet fetch for a date window, producing nested per-user and
//! per-jobcode totals plus a grand total across every requested user.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::envelope::decode_record;
use crate::error::QueryError;
use crate::join::{AssignmentQuery, jobcodes_by_user};
use crate::models::{ActiveFilter, Jobcode, Timesheet, User, UserIds};
use crate::resource::{QueryParams, ResourceFetch, ResourceKind};

/// Options for [`grouped_timesheets`].
///
/// `exclude_global` defaults to `false` here, unlike the assignment
/// join's own default; the two are overridable independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupedQuery {
    /// Active filter forwarded to the assignment join.
    pub active: ActiveFilter,
    /// Forwarded to the assignment join; see
    /// [`AssignmentQuery::exclude_global`] for its literal meaning.
    pub exclude_global: bool,
}

/// One jobcode's timesheets within the window, with summed hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobcodeHours {
    pub jobcode: Jobcode,
    /// Matching entries in response order.
    pub timesheets: Vec<Timesheet>,
    pub total_hours: f64,
}

/// One user's grouped timesheets, with their summed hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserHours {
    pub user: User,
    /// Per-jobcode groups keyed by jobcode id.
    pub jobcodes: BTreeMap<i64, JobcodeHours>,
    pub total_hours: f64,
}

/// Timesheets grouped by jobcode, indexed by user id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedTimesheets {
    pub users: BTreeMap<i64, UserHours>,
    /// Hours across every user. A separate field rather than an entry in
    /// `users`, so no user id can ever collide with it.
    pub total_hours: f64,
}

/// Fetches timesheets for `user_ids` within the inclusive date window
/// and groups them by assigned jobcode per user.
///
/// Every requested user must appear in the timesheet response's
/// supplemental users; a missing one is reported as
/// [`QueryError::MissingUser`]. A user with no assigned jobcodes gets an
/// empty jobcode map and a `0.0` total, and a jobcode with no matching
/// entries gets an empty timesheet list; neither is an error.
pub async fn grouped_timesheets<F: ResourceFetch>(
    fetcher: &F,
    user_ids: &UserIds,
    start_date: NaiveDate,
    end_date: NaiveDate,
    query: &GroupedQuery,
) -> Result<GroupedTimesheets, QueryError<F::Error>> {
    let assignment_query = AssignmentQuery {
        exclude_global: query.exclude_global,
        active: query.active,
        extra: QueryParams::new(),
    };
    // A sentinel here means the assignment query matched nothing, so
    // every user grades out to an empty jobcode map below.
    let assigned = jobcodes_by_user(fetcher, user_ids, &assignment_query)
        .await?
        .unwrap_or_default();

    let mut params = QueryParams::new();
    params.push("user_ids", user_ids.to_query());
    params.push("start_date", start_date.to_string());
    params.push("end_date", end_date.to_string());

    let envelope = fetcher
        .fetch_raw(ResourceKind::Timesheets, &params)
        .await
        .map_err(QueryError::Fetch)?;
    let timesheets: Vec<Timesheet> = envelope.decode_records(ResourceKind::Timesheets)?;
    let supplemental = envelope.supplemental_data.as_ref();

    let mut users = BTreeMap::new();
    let mut total_hours = 0.0;
    for user_id in user_ids.iter() {
        let record = supplemental
            .and_then(|data| data.user_record(user_id))
            .ok_or(QueryError::MissingUser { user_id })?;
        let user: User = decode_record(ResourceKind::Users, record)?;

        let assigned_jobcodes = assigned
            .get(&user_id)
            .map_or(&[][..], |entry| entry.jobcodes.as_slice());

        let mut jobcodes = BTreeMap::new();
        let mut user_hours = 0.0;
        for jobcode in assigned_jobcodes {
            // Matching is by jobcode alone; a jobcode shared between
            // assignees surfaces the same entries for each of them.
            let entries: Vec<Timesheet> = timesheets
                .iter()
                .filter(|entry| entry.jobcode_id == jobcode.id)
                .cloned()
                .collect();
            let hours: f64 = entries.iter().map(Timesheet::hours).sum();
            user_hours += hours;
            jobcodes.insert(
                jobcode.id,
                JobcodeHours {
                    jobcode: jobcode.clone(),
                    timesheets: entries,
                    total_hours: hours,
                },
            );
        }
        total_hours += user_hours;
        users.insert(
            user_id,
            UserHours {
                user,
                jobcodes,
                total_hours: user_hours,
            },
        );
    }

    tracing::debug!(
        users = users.len(),
        entries = timesheets.len(),
        total_hours,
        "grouped timesheets"
    );
    Ok(GroupedTimesheets { users, total_hours })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::{Value, json};
    use thiserror::Error;

    use super::*;
    use crate::envelope::RawEnvelope;

    #[derive(Debug, Error)]
    #[error("canned fetch failed")]
    struct FakeError;

    /// Routes each request kind to a canned envelope.
    struct FakeFetch {
        assignments: Value,
        timesheets: Value,
        requests: Mutex<Vec<ResourceKind>>,
    }

    impl FakeFetch {
        fn new(assignments: Value, timesheets: Value) -> Self {
            Self {
                assignments,
                timesheets,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl ResourceFetch for FakeFetch {
        type Error = FakeError;

        async fn fetch_raw(
            &self,
            kind: ResourceKind,
            _params: &QueryParams,
        ) -> Result<RawEnvelope, FakeError> {
            self.requests.lock().unwrap().push(kind);
            let value = match kind {
                ResourceKind::JobcodeAssignments => self.assignments.clone(),
                ResourceKind::Timesheets => self.timesheets.clone(),
                _ => return Err(FakeError),
            };
            Ok(serde_json::from_value(value).unwrap())
        }
    }

    fn assignments_for_user_1() -> Value {
        json!({
            "results": {
                "jobcode_assignments": {
                    "1": {"id": 1, "user_id": 1, "jobcode_id": 10, "active": true}
                }
            },
            "supplemental_data": {
                "users": {
                    "1": {"id": 1, "first_name": "Ana", "last_name": "Torres"}
                },
                "jobcodes": {
                    "10": {"id": 10, "name": "Install", "has_children": false,
                           "assigned_to_all": false}
                }
            }
        })
    }

    fn window() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2018, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2018, 3, 31).unwrap(),
        )
    }

    fn ids(user_ids: &[i64]) -> UserIds {
        UserIds::new(user_ids.iter().copied()).unwrap()
    }

    #[tokio::test]
    async fn sums_hours_per_jobcode_and_user() {
        let fetch = FakeFetch::new(
            assignments_for_user_1(),
            json!({
                "results": {
                    "timesheets": {
                        "100": {"id": 100, "user_id": 1, "jobcode_id": 10,
                                "duration": 3600, "date": "2018-03-05"},
                        "101": {"id": 101, "user_id": 1, "jobcode_id": 10,
                                "duration": 7200, "date": "2018-03-06"}
                    }
                },
                "supplemental_data": {
                    "users": {"1": {"id": 1, "first_name": "Ana", "last_name": "Torres"}}
                }
            }),
        );
        let (start, end) = window();
        let grouped = grouped_timesheets(&fetch, &ids(&[1]), start, end, &GroupedQuery::default())
            .await
            .unwrap();

        let user = &grouped.users[&1];
        let jobcode = &user.jobcodes[&10];
        assert_eq!(jobcode.timesheets.len(), 2);
        assert!((jobcode.total_hours - 3.0).abs() < f64::EPSILON);
        assert!((user.total_hours - 3.0).abs() < f64::EPSILON);
        assert!((grouped.total_hours - 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn user_with_no_jobcodes_totals_zero() {
        let fetch = FakeFetch::new(
            json!({
                "results": {"jobcode_assignments": {}},
                "supplemental_data": {
                    "users": {"1": {"id": 1, "first_name": "Ana", "last_name": "Torres"}},
                    "jobcodes": {}
                }
            }),
            json!({
                "results": {"timesheets": {}},
                "supplemental_data": {
                    "users": {"1": {"id": 1, "first_name": "Ana", "last_name": "Torres"}}
                }
            }),
        );
        let (start, end) = window();
        let grouped = grouped_timesheets(&fetch, &ids(&[1]), start, end, &GroupedQuery::default())
            .await
            .unwrap();

        assert!(grouped.users[&1].jobcodes.is_empty());
        assert!(grouped.users[&1].total_hours.abs() < f64::EPSILON);
        assert!(grouped.total_hours.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn jobcode_with_no_entries_gets_empty_list() {
        let fetch = FakeFetch::new(
            assignments_for_user_1(),
            json!({
                "results": {"timesheets": {}},
                "supplemental_data": {
                    "users": {"1": {"id": 1, "first_name": "Ana", "last_name": "Torres"}}
                }
            }),
        );
        let (start, end) = window();
        let grouped = grouped_timesheets(&fetch, &ids(&[1]), start, end, &GroupedQuery::default())
            .await
            .unwrap();

        let jobcode = &grouped.users[&1].jobcodes[&10];
        assert!(jobcode.timesheets.is_empty());
        assert!(jobcode.total_hours.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn missing_requested_user_is_an_error() {
        let fetch = FakeFetch::new(
            assignments_for_user_1(),
            json!({
                "results": {"timesheets": {}},
                "supplemental_data": {
                    "users": {"1": {"id": 1, "first_name": "Ana", "last_name": "Torres"}}
                }
            }),
        );
        let (start, end) = window();
        let err = grouped_timesheets(&fetch, &ids(&[1, 9]), start, end, &GroupedQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::MissingUser { user_id: 9 }));
    }

    #[tokio::test]
    async fn unreadable_duration_counts_as_zero() {
        let fetch = FakeFetch::new(
            assignments_for_user_1(),
            json!({
                "results": {
                    "timesheets": {
                        "100": {"id": 100, "user_id": 1, "jobcode_id": 10,
                                "duration": "half a day", "date": "2018-03-05"},
                        "101": {"id": 101, "user_id": 1, "jobcode_id": 10,
                                "duration": 1800, "date": "2018-03-06"}
                    }
                },
                "supplemental_data": {
                    "users": {"1": {"id": 1, "first_name": "Ana", "last_name": "Torres"}}
                }
            }),
        );
        let (start, end) = window();
        let grouped = grouped_timesheets(&fetch, &ids(&[1]), start, end, &GroupedQuery::default())
            .await
            .unwrap();

        let jobcode = &grouped.users[&1].jobcodes[&10];
        assert_eq!(jobcode.timesheets.len(), 2);
        assert!((jobcode.total_hours - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn assignment_sentinel_reads_as_no_assignments() {
        let fetch = FakeFetch::new(
            json!({"results": {"jobcode_assignments": {}}}),
            json!({
                "results": {"timesheets": {}},
                "supplemental_data": {
                    "users": {"1": {"id": 1, "first_name": "Ana", "last_name": "Torres"}}
                }
            }),
        );
        let (start, end) = window();
        let grouped = grouped_timesheets(&fetch, &ids(&[1]), start, end, &GroupedQuery::default())
            .await
            .unwrap();

        assert!(grouped.users[&1].jobcodes.is_empty());
        assert!(grouped.total_hours.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn fetches_run_in_sequence() {
        let fetch = FakeFetch::new(
            assignments_for_user_1(),
            json!({
                "results": {"timesheets": {}},
                "supplemental_data": {
                    "users": {"1": {"id": 1, "first_name": "Ana", "last_name": "Torres"}}
                }
            }),
        );
        let (start, end) = window();
        grouped_timesheets(&fetch, &ids(&[1]), start, end, &GroupedQuery::default())
            .await
            .unwrap();

        assert_eq!(
            *fetch.requests.lock().unwrap(),
            vec![ResourceKind::JobcodeAssignments, ResourceKind::Timesheets]
        );
    }
}
