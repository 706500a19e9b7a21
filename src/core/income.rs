//! Income aggregation and the supplemental income ledger.
//!
//! Monthly lesson income counts a completed lesson in the month of its
//! conducted date, falling back to its creation date when no conducted date
//! was recorded. Extra income counts in the month it was received. The
//! history view groups both by calendar month, newest first; lessons that
//! were never conducted are omitted from history.

use crate::{
    entities::{ExtraIncome, IncomeCategory, Lesson, extra_income, income_category, lesson},
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Income of a single calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    /// Calendar year
    pub year: i32,
    /// Calendar month, 1-12
    pub month: u32,
    /// Sum of completed lesson prices conducted this month
    pub lesson_income: f64,
    /// Sum of extra income received this month
    pub extra_income: f64,
}

impl MonthlySummary {
    /// Lesson and extra income combined.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lesson_income + self.extra_income
    }
}

/// Income of a calendar year, broken down by month (newest month first).
#[derive(Debug, Clone, PartialEq)]
pub struct YearlySummary {
    /// Calendar year
    pub year: i32,
    /// Per-month breakdown, sorted descending by month
    pub months: Vec<MonthlySummary>,
    /// Sum of lesson income over the year
    pub lesson_income: f64,
    /// Sum of extra income over the year
    pub extra_income: f64,
}

impl YearlySummary {
    /// Lesson and extra income combined.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lesson_income + self.extra_income
    }
}

fn falls_in_month(date: DateTime<Utc>, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

/// Sum of prices over completed lessons conducted in the given month.
///
/// A completed lesson without a conducted date counts in the month of its
/// creation date.
pub async fn completed_amount_for_month(
    db: &DatabaseConnection,
    year: i32,
    month: u32,
) -> Result<f64> {
    let completed = Lesson::find()
        .filter(lesson::Column::IsCompleted.eq(true))
        .all(db)
        .await?;

    let total = completed
        .iter()
        .filter(|l| falls_in_month(l.conducted_at.unwrap_or(l.created_at), year, month))
        .map(|l| l.price)
        .sum();
    debug!("Completed lesson income for {year}-{month:02}: {total}");
    Ok(total)
}

/// Sum of prices over completed lessons conducted in the current month.
pub async fn completed_amount_for_current_month(db: &DatabaseConnection) -> Result<f64> {
    let now = Utc::now();
    completed_amount_for_month(db, now.year(), now.month()).await
}

/// Sum of prices over all pending lessons, with no date filter.
pub async fn pending_amount(db: &DatabaseConnection) -> Result<f64> {
    let pending = Lesson::find()
        .filter(lesson::Column::IsCompleted.eq(false))
        .all(db)
        .await?;

    Ok(pending.iter().map(|l| l.price).sum())
}

/// Sum of extra income received in the given month.
pub async fn extra_income_for_month(
    db: &DatabaseConnection,
    year: i32,
    month: u32,
) -> Result<f64> {
    let incomes = ExtraIncome::find().all(db).await?;

    Ok(incomes
        .iter()
        .filter(|income| falls_in_month(income.received_at, year, month))
        .map(|income| income.amount)
        .sum())
}

/// Sum of extra income received in the current month.
pub async fn extra_income_for_current_month(db: &DatabaseConnection) -> Result<f64> {
    let now = Utc::now();
    extra_income_for_month(db, now.year(), now.month()).await
}

/// Groups completed lessons and extra income into per-month and per-year
/// totals, sorted descending by year then month.
///
/// Lessons are grouped by their conducted date; completed lessons that never
/// recorded one are skipped, matching the desktop history screen. Extra
/// income is grouped by its received date.
pub async fn monthly_history(db: &DatabaseConnection) -> Result<Vec<YearlySummary>> {
    let completed = Lesson::find()
        .filter(lesson::Column::IsCompleted.eq(true))
        .all(db)
        .await?;
    let incomes = ExtraIncome::find().all(db).await?;

    // (year, month) -> (lesson income, extra income)
    let mut by_month: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    for lesson in &completed {
        let Some(conducted_at) = lesson.conducted_at else {
            continue;
        };
        let entry = by_month
            .entry((conducted_at.year(), conducted_at.month()))
            .or_insert((0.0, 0.0));
        entry.0 += lesson.price;
    }
    for income in &incomes {
        let entry = by_month
            .entry((income.received_at.year(), income.received_at.month()))
            .or_insert((0.0, 0.0));
        entry.1 += income.amount;
    }

    let mut by_year: BTreeMap<i32, Vec<MonthlySummary>> = BTreeMap::new();
    for ((year, month), (lesson_income, extra)) in by_month {
        by_year.entry(year).or_default().push(MonthlySummary {
            year,
            month,
            lesson_income,
            extra_income: extra,
        });
    }

    let mut years: Vec<YearlySummary> = by_year
        .into_iter()
        .map(|(year, mut months)| {
            months.sort_by(|a, b| b.month.cmp(&a.month));
            let lesson_income = months.iter().map(|m| m.lesson_income).sum();
            let extra = months.iter().map(|m| m.extra_income).sum();
            YearlySummary {
                year,
                months,
                lesson_income,
                extra_income: extra,
            }
        })
        .collect();
    years.sort_by(|a, b| b.year.cmp(&a.year));

    Ok(years)
}

/// Retrieves all income categories ordered alphabetically.
pub async fn get_all_categories(db: &DatabaseConnection) -> Result<Vec<income_category::Model>> {
    IncomeCategory::find()
        .order_by_asc(income_category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates an income category with a unique, non-empty name.
pub async fn create_category(
    db: &DatabaseConnection,
    name: String,
) -> Result<income_category::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Category name cannot be empty".to_string(),
        });
    }

    let category = income_category::ActiveModel {
        name: Set(name.trim().to_string()),
        ..Default::default()
    };

    let created = category.insert(db).await?;
    info!("Created income category {} ({})", created.id, created.name);
    Ok(created)
}

/// Deletes a category; the database cascades to its income entries.
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    let existing = IncomeCategory::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    existing.delete(db).await?;
    info!("Deleted income category {category_id}");
    Ok(())
}

/// Retrieves all extra income entries, newest received first.
pub async fn get_all_extra_incomes(db: &DatabaseConnection) -> Result<Vec<extra_income::Model>> {
    ExtraIncome::find()
        .order_by_desc(extra_income::Column::ReceivedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records a supplemental income entry under a category.
pub async fn create_extra_income(
    db: &DatabaseConnection,
    category_id: i64,
    amount: f64,
    received_at: DateTime<Utc>,
) -> Result<extra_income::Model> {
    if amount <= 0.0 || !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }
    IncomeCategory::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    let now = Utc::now();
    let income = extra_income::ActiveModel {
        category_id: Set(category_id),
        amount: Set(amount),
        received_at: Set(received_at),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    income.insert(db).await.map_err(Into::into)
}

/// Rewrites an extra income entry's category, amount, and received date.
pub async fn update_extra_income(
    db: &DatabaseConnection,
    income_id: i64,
    category_id: i64,
    amount: f64,
    received_at: DateTime<Utc>,
) -> Result<extra_income::Model> {
    if amount <= 0.0 || !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }

    let existing = ExtraIncome::find_by_id(income_id)
        .one(db)
        .await?
        .ok_or(Error::ExtraIncomeNotFound { id: income_id })?;

    let mut active_model: extra_income::ActiveModel = existing.into();
    active_model.category_id = Set(category_id);
    active_model.amount = Set(amount);
    active_model.received_at = Set(received_at);
    active_model.updated_at = Set(Utc::now());

    active_model.update(db).await.map_err(Into::into)
}

/// Deletes an extra income entry.
pub async fn delete_extra_income(db: &DatabaseConnection, income_id: i64) -> Result<()> {
    let existing = ExtraIncome::find_by_id(income_id)
        .one(db)
        .await?
        .ok_or(Error::ExtraIncomeNotFound { id: income_id })?;

    existing.delete(db).await?;
    Ok(())
}
