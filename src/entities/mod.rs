//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod client;
pub mod extra_income;
pub mod income_category;
pub mod lesson;
pub mod subscription;

// Re-export specific types to avoid conflicts
pub use client::{Column as ClientColumn, Entity as Client, Model as ClientModel};
pub use extra_income::{
    Column as ExtraIncomeColumn, Entity as ExtraIncome, Model as ExtraIncomeModel,
};
pub use income_category::{
    Column as IncomeCategoryColumn, Entity as IncomeCategory, Model as IncomeCategoryModel,
};
pub use lesson::{Column as LessonColumn, Entity as Lesson, Model as LessonModel};
pub use subscription::{
    Column as SubscriptionColumn, Entity as Subscription, Model as SubscriptionModel,
    SubscriptionStatus,
};
