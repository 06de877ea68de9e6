use thiserror::Error;

use crate::ClassId;

/// Errors that can occur when interacting with the inventory store.
///
/// None of these describe an unmet guard condition; a decrement that cannot
/// be satisfied is a normal [`DecrementResult::NotSatisfied`](crate::DecrementResult)
/// outcome, not an error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be mapped onto a record.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A class with this identity already exists.
    #[error("Class already exists: {0}")]
    DuplicateClass(ClassId),
}

/// Result type for inventory store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
