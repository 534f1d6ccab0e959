use uuid::Uuid;

use crate::database::models::Owned;
use crate::error::ApiError;

pub fn is_owner<T: Owned>(record: &T, requesting_user: Uuid) -> bool {
    record.owner() == requesting_user
}

/// Resolves a single-record lookup for the caller. Missing and foreign
/// records produce the same 404 so a caller cannot discover ids.
pub fn owned_or_not_found<T: Owned>(
    record: Option<T>,
    requesting_user: Uuid,
    kind: &str,
    id: i64,
) -> Result<T, ApiError> {
    match record {
        Some(record) if is_owner(&record, requesting_user) => Ok(record),
        Some(_) => {
            tracing::debug!("{} {} requested by non-owner {}", kind, id, requesting_user);
            Err(not_found(kind))
        }
        None => Err(not_found(kind)),
    }
}

fn not_found(kind: &str) -> ApiError {
    ApiError::not_found(format!("{} not found", kind))
}
