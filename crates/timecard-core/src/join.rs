//! Per-user jobcode view built from the assignment list.
//!
//! The assignment endpoint returns bare `(user_id, jobcode_id)` rows and
//! ships the referenced user and jobcode records in supplemental data.
//! [`jobcodes_by_user`] joins the two into a per-user list of jobcodes a
//! person can actually record time against.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::error::QueryError;
use crate::models::{ActiveFilter, Jobcode, JobcodeAssignment, User, UserIds};
use crate::resource::{QueryParams, ResourceFetch, ResourceKind};

/// Options for [`jobcodes_by_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentQuery {
    /// When set, the result keeps only jobcodes flagged
    /// `assigned_to_all`. Note the inversion relative to the name: the
    /// filter retains company-wide jobcodes rather than dropping them.
    pub exclude_global: bool,
    /// Active filter forwarded to the assignment-list endpoint.
    pub active: ActiveFilter,
    /// Additional passthrough options for the assignment-list endpoint.
    pub extra: QueryParams,
}

impl Default for AssignmentQuery {
    fn default() -> Self {
        Self {
            exclude_global: true,
            active: ActiveFilter::Yes,
            extra: QueryParams::new(),
        }
    }
}

/// A user together with the jobcodes assigned to them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserJobcodes {
    pub user: User,
    /// Assigned, non-container jobcodes in supplemental-section order.
    pub jobcodes: Vec<Jobcode>,
}

/// Fetches jobcode assignments scoped to `user_ids` and joins them with
/// their supplemental records into a per-user jobcode list.
///
/// Returns `None` when the response carries no supplemental data, which
/// means the query matched nothing at all; that is distinct from a map
/// whose entries have empty jobcode lists. Container jobcodes
/// (`has_children`) are never included.
pub async fn jobcodes_by_user<F: ResourceFetch>(
    fetcher: &F,
    user_ids: &UserIds,
    query: &AssignmentQuery,
) -> Result<Option<BTreeMap<i64, UserJobcodes>>, QueryError<F::Error>> {
    let mut params = QueryParams::new();
    params.push("user_ids", user_ids.to_query());
    params.push("active", query.active.as_str());
    params.extend_from(&query.extra);

    let envelope = fetcher
        .fetch_raw(ResourceKind::JobcodeAssignments, &params)
        .await
        .map_err(QueryError::Fetch)?;

    let Some(supplemental) = envelope.supplemental_data.as_ref() else {
        tracing::debug!(user_ids = %user_ids, "assignment query matched nothing");
        return Ok(None);
    };

    let assignments: Vec<JobcodeAssignment> =
        envelope.decode_records(ResourceKind::JobcodeAssignments)?;
    let jobcodes = supplemental.decode_jobcodes()?;

    let mut joined = BTreeMap::new();
    for user in supplemental.decode_users()? {
        joined.insert(
            user.id,
            UserJobcodes {
                user,
                jobcodes: Vec::new(),
            },
        );
    }

    for (user_id, entry) in &mut joined {
        let assigned: HashSet<i64> = assignments
            .iter()
            .filter(|assignment| assignment.user_id == *user_id)
            .map(|assignment| assignment.jobcode_id)
            .collect();
        entry.jobcodes = jobcodes
            .iter()
            .filter(|jobcode| assigned.contains(&jobcode.id) && !jobcode.has_children)
            .filter(|jobcode| !query.exclude_global || jobcode.assigned_to_all)
            .cloned()
            .collect();
    }

    tracing::debug!(
        users = joined.len(),
        assignments = assignments.len(),
        "joined jobcode assignments"
    );
    Ok(Some(joined))
}
