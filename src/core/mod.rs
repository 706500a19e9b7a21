//! Core business logic - framework-agnostic operations over the tutoring data.
//!
//! Each submodule owns one concern and exposes async functions taking a
//! `&DatabaseConnection` plus, for mutations that notify the UI, an
//! `&EventBus`. Nothing here knows about any presentation layer.

/// Database export to a dated archive file
pub mod backup;
/// Client registry CRUD
pub mod client;
/// Income aggregation and the supplemental income ledger
pub mod income;
/// Lesson completion engine and standalone lesson numbering
pub mod lesson;
/// Subscription lifecycle and orphaned-lesson reconciliation
pub mod subscription;
