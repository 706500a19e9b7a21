//! Unified error types for the Abonementus core.
//!
//! Every fallible operation in the crate returns [`Result`]. Earlier releases
//! logged failures and carried on; now each operation surfaces an explicit
//! error so callers decide whether to display or ignore it.

use thiserror::Error;

/// Crate-wide error type covering configuration, storage, and domain lookups.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or environment problem
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what went wrong
        message: String,
    },

    /// Any error bubbling up from the storage layer
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem error, e.g. during a database export
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Referenced client does not exist
    #[error("Client {id} not found")]
    ClientNotFound {
        /// Primary key that was looked up
        id: i64,
    },

    /// Referenced subscription does not exist
    #[error("Subscription {id} not found")]
    SubscriptionNotFound {
        /// Primary key that was looked up
        id: i64,
    },

    /// Referenced lesson does not exist
    #[error("Lesson {id} not found")]
    LessonNotFound {
        /// Primary key that was looked up
        id: i64,
    },

    /// Referenced income category does not exist
    #[error("Income category {id} not found")]
    CategoryNotFound {
        /// Primary key that was looked up
        id: i64,
    },

    /// Referenced extra income entry does not exist
    #[error("Extra income {id} not found")]
    ExtraIncomeNotFound {
        /// Primary key that was looked up
        id: i64,
    },

    /// A price or amount failed validation (zero, negative, or non-finite)
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected value
        amount: f64,
    },

    /// A subscription was requested with a non-positive lesson count
    #[error("Invalid lesson count: {count}")]
    InvalidLessonCount {
        /// The rejected value
        count: i32,
    },
}

/// Convenience `Result` type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
