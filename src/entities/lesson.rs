//! Lesson entity - A single lesson, either part of a subscription or standalone.
//!
//! Subscription lessons are all created at subscription-creation time, numbered
//! `1..=lesson_count`, and only deleted together with their subscription.
//! Standalone lessons (`subscription_id = None`) are created individually and
//! numbered per client.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lesson database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lessons")]
pub struct Model {
    /// Unique identifier for the lesson
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning client, denormalized from the subscription when one exists
    pub client_id: i64,
    /// Owning subscription, None for a standalone lesson
    pub subscription_id: Option<i64>,
    /// Sequence number: unique within the subscription, or within the
    /// client's standalone lessons
    pub number: i32,
    /// Price of this lesson, fixed at creation
    pub price: f64,
    /// Creation date; equals the subscription start date for bundle lessons
    pub created_at: DateTimeUtc,
    /// When the lesson was actually conducted, None while pending
    pub conducted_at: Option<DateTimeUtc>,
    /// Completion flag; drives the owning subscription's active state
    pub is_completed: bool,
}

impl Model {
    /// Whether this lesson is billed individually rather than through a subscription.
    #[must_use]
    pub const fn is_standalone(&self) -> bool {
        self.subscription_id.is_none()
    }
}

/// Defines relationships between Lesson and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each lesson belongs to one client
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
    /// A lesson may belong to one subscription
    #[sea_orm(
        belongs_to = "super::subscription::Entity",
        from = "Column::SubscriptionId",
        to = "super::subscription::Column::Id",
        on_delete = "Cascade"
    )]
    Subscription,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscription.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
