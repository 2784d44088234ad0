//! Errors surfaced by the composite queries.

use thiserror::Error;

use crate::envelope::DecodeError;

/// Failure of a composite query.
///
/// Fetch-layer errors pass through unchanged; the composite queries
/// perform no retries and return no partial results.
#[derive(Debug, Error)]
pub enum QueryError<E: std::error::Error> {
    /// The underlying fetch failed.
    #[error(transparent)]
    Fetch(E),

    /// A raw record could not be decoded into its typed form.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A requested user id did not appear in the response's supplemental
    /// data. Callers must only request users the query scope can see.
    #[error("user {user_id} is missing from supplemental data")]
    MissingUser { user_id: i64 },
}
