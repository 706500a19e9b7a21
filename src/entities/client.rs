//! Client entity - Represents a student (or their parent) of the tutoring business.
//!
//! Only the first name is required; all contact details are optional.
//! Deleting a client cascades to their subscriptions and lessons.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Client database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    /// Unique identifier for the client
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Required given name
    pub first_name: String,
    /// Optional family name
    pub last_name: Option<String>,
    /// Optional phone number
    pub phone: Option<String>,
    /// Optional Telegram handle
    pub telegram: Option<String>,
    /// Optional email address
    pub email: Option<String>,
    /// Free-form notes about the client
    pub additional_info: Option<String>,
    /// When the client was registered
    pub created_at: DateTimeUtc,
    /// When the client record was last edited
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Display name: the first name alone, or "first last" when a last name exists.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last_name) => format!("{} {last_name}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

/// Defines relationships between Client and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One client has many subscriptions
    #[sea_orm(has_many = "super::subscription::Entity")]
    Subscriptions,
    /// One client has many lessons (subscription-owned and standalone)
    #[sea_orm(has_many = "super::lesson::Entity")]
    Lessons,
}

impl Related<super::subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriptions.def()
    }
}

impl Related<super::lesson::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lessons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
