//! Typed records for the remote time-tracking resources.
//!
//! Every record keeps its documented fields as named struct members and
//! collects anything else the service sends into an `extra` side map, so
//! new remote fields never break deserialization.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Validation errors for request inputs and derived fields.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A user id segment could not be parsed as an integer.
    #[error("invalid user id: {value:?}")]
    InvalidUserId { value: String },

    /// Invalid active filter value.
    #[error("invalid active filter: {value}")]
    InvalidActiveFilter { value: String },

    /// The timesheet duration was not a readable number of seconds.
    #[error("duration is not a readable number of seconds")]
    UnreadableDuration,
}

/// Three-way `yes`/`no`/`both` filter accepted by several list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveFilter {
    /// Only active records. The remote default for assignments is `both`,
    /// but every caller in this crate sends `yes` unless told otherwise.
    #[default]
    Yes,
    /// Only inactive (archived/deleted) records.
    No,
    /// Active and inactive records.
    Both,
}

impl ActiveFilter {
    /// String representation used as the query-parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for ActiveFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ActiveFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "both" => Ok(Self::Both),
            _ => Err(ValidationError::InvalidActiveFilter {
                value: s.to_string(),
            }),
        }
    }
}

/// A non-empty set of user ids, rendered for the wire as a comma-joined
/// string with no surrounding whitespace.
///
/// The remote API requires exactly that format, so normalization happens
/// here once instead of at every call site. Parsing accepts sloppy input
/// such as `"12, 34 ,56"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserIds(Vec<i64>);

impl UserIds {
    /// Creates a set of user ids, rejecting an empty collection.
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Result<Self, ValidationError> {
        let ids: Vec<i64> = ids.into_iter().collect();
        if ids.is_empty() {
            return Err(ValidationError::Empty { field: "user ids" });
        }
        Ok(Self(ids))
    }

    /// The ids in their original order.
    #[must_use]
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    /// Iterates over the ids by value.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }

    /// Canonical comma-joined form, e.g. `"12,34,56"`.
    #[must_use]
    pub fn to_query(&self) -> String {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        rendered.join(",")
    }
}

impl fmt::Display for UserIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_query())
    }
}

impl std::str::FromStr for UserIds {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field: "user ids" });
        }
        let ids = s
            .split(',')
            .map(|segment| {
                let trimmed = segment.trim();
                trimmed
                    .parse::<i64>()
                    .map_err(|_| ValidationError::InvalidUserId {
                        value: trimmed.to_string(),
                    })
            })
            .collect::<Result<Vec<i64>, _>>()?;
        Self::new(ids)
    }
}

/// Timesheet duration in seconds, tolerant of malformed input.
///
/// The service documents `duration` as an integer, but the field is kept
/// lenient: integers, floats, and numeric strings all read as seconds,
/// while anything else becomes unreadable and reports zero hours rather
/// than failing the whole response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DurationSeconds(Option<i64>);

impl DurationSeconds {
    /// Wraps a known number of seconds.
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self(Some(seconds))
    }

    /// The raw seconds, or `None` when the value was unreadable.
    #[must_use]
    pub const fn seconds(self) -> Option<i64> {
        self.0
    }

    /// Duration in hours; `0.0` when the value was unreadable.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hours(self) -> f64 {
        self.0.map_or(0.0, |seconds| seconds as f64 / 3600.0)
    }

    /// Duration in hours, erroring on unreadable values instead of
    /// substituting zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn hours_checked(self) -> Result<f64, ValidationError> {
        self.0
            .map(|seconds| seconds as f64 / 3600.0)
            .ok_or(ValidationError::UnreadableDuration)
    }
}

impl Serialize for DurationSeconds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DurationSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[allow(clippy::cast_possible_truncation)]
        fn read_seconds(value: &Value) -> Option<i64> {
            match value {
                Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
                Value::String(s) => {
                    let trimmed = s.trim();
                    trimmed
                        .parse::<i64>()
                        .ok()
                        .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i64))
                }
                _ => None,
            }
        }

        let value = Value::deserialize(deserializer)?;
        Ok(Self(read_seconds(&value)))
    }
}

/// A company user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Read-only id of this user.
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    /// Id of the group this user belongs to.
    #[serde(default)]
    pub group_id: Option<i64>,
    /// `false` means the user is archived.
    #[serde(default)]
    pub active: bool,
    /// Remote fields without a named member above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

/// A billable/trackable category of work, organized in a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jobcode {
    pub id: i64,
    /// Id of this jobcode's parent; `0` means top-level.
    #[serde(default)]
    pub parent_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_code: String,
    /// `regular` or `pto`.
    #[serde(default, rename = "type")]
    pub jobcode_type: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub billable: bool,
    #[serde(default)]
    pub billable_rate: Option<f64>,
    /// Container flag: jobcodes with children are organizational folders
    /// and cannot have time recorded against them directly.
    #[serde(default)]
    pub has_children: bool,
    /// Implicitly assigned to every user in the company.
    #[serde(default)]
    pub assigned_to_all: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Jobcode {
    /// Whether this jobcode sits at the top of the tree.
    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.parent_id == 0
    }
}

/// Grants a user the ability to log time against a jobcode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobcodeAssignment {
    pub id: i64,
    /// Id of the assigned user; `0` when the grant comes from the
    /// jobcode's `assigned_to_all` flag rather than a specific user.
    pub user_id: i64,
    pub jobcode_id: i64,
    /// `false` means the assignment has been deleted.
    #[serde(default)]
    pub active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobcodeAssignment {
    /// Whether this row represents a company-wide grant.
    #[must_use]
    pub const fn is_company_wide(&self) -> bool {
        self.user_id == 0
    }
}

/// An immutable snapshot of a recorded time entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timesheet {
    pub id: i64,
    pub user_id: i64,
    pub jobcode_id: i64,
    /// Total recorded seconds; see [`DurationSeconds`] for leniency.
    #[serde(default)]
    pub duration: DurationSeconds,
    /// `YYYY-MM-DD` formatted date, kept raw as received.
    #[serde(default)]
    pub date: String,
    /// Greater than zero when the timesheet is locked for editing.
    #[serde(default)]
    pub locked: i64,
    #[serde(default)]
    pub notes: String,
    /// `regular` (start/end pair) or `manual` (date plus duration).
    #[serde(default, rename = "type")]
    pub entry_type: String,
    /// The user is still clocked in on this entry.
    #[serde(default)]
    pub on_the_clock: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Timesheet {
    /// Recorded hours; `0.0` when the duration was unreadable.
    #[must_use]
    pub fn hours(&self) -> f64 {
        self.duration.hours()
    }

    /// Recorded hours, erroring on an unreadable duration.
    pub fn hours_checked(&self) -> Result<f64, ValidationError> {
        self.duration.hours_checked()
    }

    /// The entry date parsed from its raw string form.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Per-user payroll totals for a reporting timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollReport {
    pub user_id: i64,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    /// Regular time, in seconds.
    #[serde(default)]
    pub total_re_seconds: i64,
    /// Overtime, in seconds.
    #[serde(default)]
    pub total_ot_seconds: i64,
    /// Doubletime, in seconds.
    #[serde(default)]
    pub total_dt_seconds: i64,
    /// Paid time off, in seconds.
    #[serde(default)]
    pub total_pto_seconds: i64,
    /// Total overall time, in seconds.
    #[serde(default)]
    pub total_work_seconds: i64,
    /// PTO seconds broken down by PTO jobcode id.
    #[serde(default)]
    pub pto_seconds: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PayrollReport {
    /// Total overall time in hours.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_work_hours(&self) -> f64 {
        self.total_work_seconds as f64 / 3600.0
    }
}
