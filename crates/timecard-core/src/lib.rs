//! Domain models and composite queries for a remote time-tracking service.
//!
//! This crate contains the transport-independent half of the client:
//! - Typed records for users, jobcodes, assignments, timesheets, and
//!   payroll reports
//! - The raw response envelope with its supplemental-data side channel
//! - The resource-kind table and the [`ResourceFetch`] contract
//! - Two composite read queries: [`jobcodes_by_user`] and
//!   [`grouped_timesheets`]
//!
//! The composite queries are generic over [`ResourceFetch`], so they run
//! against the HTTP client from `timecard-client` or against canned
//! responses in tests. All fetches within a query are issued
//! sequentially; errors from the fetch layer pass through unchanged.

pub mod envelope;
mod error;
mod grouping;
mod join;
pub mod models;
pub mod resource;

pub use envelope::{DecodeError, RawEnvelope, SupplementalData};
pub use error::QueryError;
pub use grouping::{GroupedQuery, GroupedTimesheets, JobcodeHours, UserHours, grouped_timesheets};
pub use join::{AssignmentQuery, UserJobcodes, jobcodes_by_user};
pub use models::{
    ActiveFilter, DurationSeconds, Jobcode, JobcodeAssignment, PayrollReport, Timesheet, User,
    UserIds, ValidationError,
};
pub use resource::{QueryParams, ResourceFetch, ResourceKind};
