//! Extra income entity - Supplemental income outside the lesson/subscription graph.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Extra income database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "extra_incomes")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Category this income belongs to
    pub category_id: i64,
    /// Amount received
    pub amount: f64,
    /// When the income was received; drives monthly aggregation
    pub received_at: DateTimeUtc,
    /// When the entry was recorded
    pub created_at: DateTimeUtc,
    /// When the entry was last edited
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between ExtraIncome and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one category
    #[sea_orm(
        belongs_to = "super::income_category::Entity",
        from = "Column::CategoryId",
        to = "super::income_category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::income_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
