//! Subscription lifecycle business logic.
//!
//! A subscription is created atomically with its fixed set of lessons and
//! deleted together with them. Nothing here flips `is_active` directly; that
//! is entirely a side effect of lesson completion (see `core::lesson`).
//!
//! The multi-step create and delete sequences run statement by statement with
//! no transactional wrapping. A failure mid-sequence can leave partial rows,
//! which [`cleanup_orphaned_lessons`] sweeps up before every fetch.

use crate::{
    config,
    entities::{Lesson, Subscription, lesson, subscription},
    errors::{Error, Result},
    events::{AppEvent, EventBus},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::{debug, info, warn};

/// Number of days from the start date until a subscription is considered expired.
const SUBSCRIPTION_VALIDITY_DAYS: i64 = 30;

/// Creates a subscription together with its full set of lessons.
///
/// The lessons are numbered `1..=lesson_count` in ascending order, each priced
/// `total_price / lesson_count` (plain division; residual fractions are
/// accepted), dated to the start date, and pending. The planned expiry is
/// `start_date + 30 days`.
///
/// When a lesson insert fails, the `lessons.number` schema migration is run
/// once and the whole creation retried from the subscription insert. Rows
/// inserted before a non-recoverable failure are left for orphan
/// reconciliation to remove.
///
/// Publishes [`AppEvent::SubscriptionCreated`] on success.
pub async fn create_subscription(
    db: &DatabaseConnection,
    bus: &EventBus,
    client_id: i64,
    lesson_count: i32,
    total_price: f64,
    start_date: DateTime<Utc>,
) -> Result<(subscription::Model, Vec<lesson::Model>)> {
    if lesson_count <= 0 {
        return Err(Error::InvalidLessonCount {
            count: lesson_count,
        });
    }
    if total_price <= 0.0 || !total_price.is_finite() {
        return Err(Error::InvalidAmount {
            amount: total_price,
        });
    }

    let (subscription, lessons) =
        match insert_subscription_with_lessons(db, client_id, lesson_count, total_price, start_date)
            .await
        {
            Ok(pair) => pair,
            Err(Error::Database(db_err)) => {
                warn!("Lesson insertion failed ({db_err}), attempting schema migration and retry");
                if config::database::ensure_lesson_number_column(db).await? {
                    insert_subscription_with_lessons(
                        db,
                        client_id,
                        lesson_count,
                        total_price,
                        start_date,
                    )
                    .await?
                } else {
                    // Schema was already current; the failure was something else
                    return Err(Error::Database(db_err));
                }
            }
            Err(other) => return Err(other),
        };

    info!(
        "Created subscription {} for client {client_id} with {lesson_count} lessons",
        subscription.id
    );
    bus.publish(AppEvent::SubscriptionCreated(subscription.id));
    Ok((subscription, lessons))
}

async fn insert_subscription_with_lessons(
    db: &DatabaseConnection,
    client_id: i64,
    lesson_count: i32,
    total_price: f64,
    start_date: DateTime<Utc>,
) -> Result<(subscription::Model, Vec<lesson::Model>)> {
    let closed_at = start_date + Duration::days(SUBSCRIPTION_VALIDITY_DAYS);

    let subscription = subscription::ActiveModel {
        client_id: Set(client_id),
        lesson_count: Set(lesson_count),
        total_price: Set(total_price),
        created_at: Set(start_date),
        closed_at: Set(Some(closed_at)),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let lesson_price = total_price / f64::from(lesson_count);
    debug!(
        "Creating {lesson_count} lessons for subscription {} priced {lesson_price} each",
        subscription.id
    );

    let mut lessons = Vec::with_capacity(lesson_count.unsigned_abs() as usize);
    for number in 1..=lesson_count {
        let created = lesson::ActiveModel {
            client_id: Set(client_id),
            subscription_id: Set(Some(subscription.id)),
            number: Set(number),
            price: Set(lesson_price),
            created_at: Set(start_date),
            conducted_at: Set(None),
            is_completed: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await?;
        lessons.push(created);
    }

    Ok((subscription, lessons))
}

/// Deletes a subscription and all lessons referencing it.
///
/// The subscription row delete is expected to cascade through the foreign key;
/// any lessons that survive (a cascade not honored by the store configuration)
/// are force-deleted afterwards. Publishes [`AppEvent::SubscriptionDeleted`].
pub async fn delete_subscription(db: &DatabaseConnection, bus: &EventBus, id: i64) -> Result<()> {
    let subscription = Subscription::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::SubscriptionNotFound { id })?;

    let referencing = Lesson::find()
        .filter(lesson::Column::SubscriptionId.eq(id))
        .count(db)
        .await?;
    debug!("Deleting subscription {id} with {referencing} associated lessons");

    subscription.delete(db).await?;

    // Verify the cascade actually removed the lessons
    let remnants = Lesson::find()
        .filter(lesson::Column::SubscriptionId.eq(id))
        .count(db)
        .await?;
    if remnants > 0 {
        warn!("{remnants} lessons survived cascade delete of subscription {id}, force-deleting");
        Lesson::delete_many()
            .filter(lesson::Column::SubscriptionId.eq(id))
            .exec(db)
            .await?;
    }

    info!("Deleted subscription {id}");
    bus.publish(AppEvent::SubscriptionDeleted(id));
    Ok(())
}

/// Retrieves all subscriptions, newest first, after sweeping orphaned lessons.
pub async fn get_all_subscriptions(db: &DatabaseConnection) -> Result<Vec<subscription::Model>> {
    cleanup_orphaned_lessons(db).await?;

    Subscription::find()
        .order_by_desc(subscription::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves active subscriptions, newest first, after sweeping orphaned lessons.
pub async fn get_active_subscriptions(db: &DatabaseConnection) -> Result<Vec<subscription::Model>> {
    cleanup_orphaned_lessons(db).await?;

    Subscription::find()
        .filter(subscription::Column::IsActive.eq(true))
        .order_by_desc(subscription::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a subscription by its unique ID.
pub async fn get_subscription_by_id(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<subscription::Model>> {
    Subscription::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Retrieves the lessons of one subscription ordered by lesson number.
pub async fn get_lessons_for_subscription(
    db: &DatabaseConnection,
    subscription_id: i64,
) -> Result<Vec<lesson::Model>> {
    Lesson::find()
        .filter(lesson::Column::SubscriptionId.eq(subscription_id))
        .order_by_asc(lesson::Column::Number)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Removes every lesson whose subscription no longer exists.
///
/// Compensates for a cascade delete the store configuration failed to honor.
/// Runs before every subscription fetch and is idempotent: a second pass with
/// no intervening mutation removes nothing.
///
/// # Returns
/// The number of orphaned lessons removed.
pub async fn cleanup_orphaned_lessons(db: &DatabaseConnection) -> Result<u64> {
    let referencing = Lesson::find()
        .filter(lesson::Column::SubscriptionId.is_not_null())
        .all(db)
        .await?;

    let mut removed = 0u64;
    for lesson in referencing {
        let Some(subscription_id) = lesson.subscription_id else {
            continue;
        };
        let exists = Subscription::find_by_id(subscription_id)
            .one(db)
            .await?
            .is_some();
        if !exists {
            warn!(
                "Removing orphaned lesson {} referencing missing subscription {subscription_id}",
                lesson.id
            );
            lesson.delete(db).await?;
            removed += 1;
        }
    }

    if removed > 0 {
        info!("Cleaned up {removed} orphaned lessons");
    }
    Ok(removed)
}
