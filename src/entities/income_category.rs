//! Income category entity - Labels for supplemental income entries.
//! Deleting a category cascades to its extra income entries.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Income category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "income_categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Category name, unique across the table
    #[sea_orm(unique)]
    pub name: String,
}

/// Defines relationships between IncomeCategory and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category has many extra income entries
    #[sea_orm(has_many = "super::extra_income::Entity")]
    ExtraIncomes,
}

impl Related<super::extra_income::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExtraIncomes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
