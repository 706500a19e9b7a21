//! Subscription entity - A prepaid bundle of lessons ("abonement") for one client.
//!
//! A subscription is created together with exactly `lesson_count` lessons and
//! owns them for its entire lifetime. `is_active` is never set directly by the
//! user; it flips as a side effect of lesson completion (see `core::lesson`).
//! `closed_at` starts as the planned expiry (creation + 30 days) and is
//! overwritten with the completion timestamp once every lesson is completed.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Subscription database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    /// Unique identifier for the subscription
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning client, immutable after creation
    pub client_id: i64,
    /// Number of lessons purchased, fixed at creation
    pub lesson_count: i32,
    /// Total price paid for the bundle, fixed at creation
    pub total_price: f64,
    /// Start date; user-settable, may be historical or future
    pub created_at: DateTimeUtc,
    /// Planned expiry at creation; completion timestamp once finished; None
    /// while an already-finished subscription is reopened
    pub closed_at: Option<DateTimeUtc>,
    /// False only when every lesson of the subscription is completed
    pub is_active: bool,
}

/// Display status derived from `is_active` and `closed_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// Active and not past its expiry date
    Active,
    /// Past its expiry date but not all lessons completed yet
    Expired,
    /// Every lesson completed
    Finished,
}

impl Model {
    /// Whether `closed_at` is set and lies in the past.
    ///
    /// Time passing alone never finishes a subscription; expiry is a read-only
    /// overlay on an active subscription.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.closed_at.is_some_and(|closed_at| closed_at < Utc::now())
    }

    /// Derived display status; `Finished` wins over `Expired`.
    #[must_use]
    pub fn status(&self) -> SubscriptionStatus {
        if !self.is_active {
            SubscriptionStatus::Finished
        } else if self.is_expired() {
            SubscriptionStatus::Expired
        } else {
            SubscriptionStatus::Active
        }
    }
}

/// Defines relationships between Subscription and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each subscription belongs to one client
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
    /// One subscription has many lessons
    #[sea_orm(has_many = "super::lesson::Entity")]
    Lessons,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::lesson::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lessons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
