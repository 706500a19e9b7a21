//! Lesson completion business logic.
//!
//! Tracks per-lesson completion and drives the owning subscription's state:
//! a subscription finishes when its last pending lesson completes and reopens
//! when any lesson of a finished subscription is uncompleted. Also creates
//! standalone lessons with per-client sequence numbers.

use crate::{
    entities::{Lesson, Subscription, lesson, subscription},
    errors::{Error, Result},
    events::{AppEvent, EventBus},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use tracing::{debug, info};

/// Creates a standalone lesson (no subscription) for a client.
///
/// With a conducted date the lesson is recorded as already completed and its
/// creation date equals that date; without one it is created pending, dated
/// now. The sequence number continues the client's standalone numbering from
/// 1. Publishes [`AppEvent::LessonCreated`].
pub async fn create_standalone_lesson(
    db: &DatabaseConnection,
    bus: &EventBus,
    client_id: i64,
    price: f64,
    conducted_at: Option<DateTime<Utc>>,
) -> Result<lesson::Model> {
    if price <= 0.0 || !price.is_finite() {
        return Err(Error::InvalidAmount { amount: price });
    }

    let number = next_standalone_number(db, client_id).await?;
    let created_at = conducted_at.unwrap_or_else(Utc::now);

    let created = lesson::ActiveModel {
        client_id: Set(client_id),
        subscription_id: Set(None),
        number: Set(number),
        price: Set(price),
        created_at: Set(created_at),
        conducted_at: Set(conducted_at),
        is_completed: Set(conducted_at.is_some()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Created standalone lesson {} number {number} for client {client_id}",
        created.id
    );
    bus.publish(AppEvent::LessonCreated);
    Ok(created)
}

/// Next free sequence number among a client's standalone lessons.
async fn next_standalone_number(db: &DatabaseConnection, client_id: i64) -> Result<i32> {
    let highest = Lesson::find()
        .filter(lesson::Column::ClientId.eq(client_id))
        .filter(lesson::Column::SubscriptionId.is_null())
        .order_by_desc(lesson::Column::Number)
        .limit(1)
        .one(db)
        .await?;

    Ok(highest.map_or(1, |lesson| lesson.number + 1))
}

/// Marks a lesson completed, conducted now.
///
/// When the lesson belongs to a subscription and it was the last pending one,
/// the subscription is finished: `is_active = false`, `closed_at` overwritten
/// with the completion timestamp, and
/// [`AppEvent::SubscriptionStatusChanged`] published. Safe to call on an
/// already-completed lesson.
pub async fn complete_lesson(
    db: &DatabaseConnection,
    bus: &EventBus,
    lesson_id: i64,
) -> Result<lesson::Model> {
    let existing = Lesson::find_by_id(lesson_id)
        .one(db)
        .await?
        .ok_or(Error::LessonNotFound { id: lesson_id })?;

    let mut active_model: lesson::ActiveModel = existing.into();
    active_model.is_completed = Set(true);
    active_model.conducted_at = Set(Some(Utc::now()));
    let updated = active_model.update(db).await?;
    debug!("Lesson {lesson_id} marked as completed");

    if let Some(subscription_id) = updated.subscription_id
        && all_lessons_completed(db, subscription_id).await?
    {
        info!("All lessons completed for subscription {subscription_id}, finishing it");
        set_subscription_state(db, subscription_id, false, Some(Utc::now())).await?;
        bus.publish(AppEvent::SubscriptionStatusChanged(subscription_id));
    }

    Ok(updated)
}

/// Marks a lesson pending again, clearing its conducted date.
///
/// When the lesson belongs to a finished subscription this reactivates it:
/// `is_active = true`, `closed_at` cleared, and
/// [`AppEvent::SubscriptionStatusChanged`] published.
pub async fn uncomplete_lesson(
    db: &DatabaseConnection,
    bus: &EventBus,
    lesson_id: i64,
) -> Result<lesson::Model> {
    let existing = Lesson::find_by_id(lesson_id)
        .one(db)
        .await?
        .ok_or(Error::LessonNotFound { id: lesson_id })?;

    let mut active_model: lesson::ActiveModel = existing.into();
    active_model.is_completed = Set(false);
    active_model.conducted_at = Set(None);
    let updated = active_model.update(db).await?;
    debug!("Lesson {lesson_id} marked as uncompleted");

    if let Some(subscription_id) = updated.subscription_id
        && !all_lessons_completed(db, subscription_id).await?
    {
        info!("Reactivating subscription {subscription_id} after lesson uncompletion");
        set_subscription_state(db, subscription_id, true, None).await?;
        bus.publish(AppEvent::SubscriptionStatusChanged(subscription_id));
    }

    Ok(updated)
}

/// Retroactively corrects when a lesson was conducted.
///
/// Only `conducted_at` changes; completion state and subscription status are
/// untouched. Affects monthly aggregation only.
pub async fn update_conducted_at(
    db: &DatabaseConnection,
    lesson_id: i64,
    conducted_at: DateTime<Utc>,
) -> Result<lesson::Model> {
    let existing = Lesson::find_by_id(lesson_id)
        .one(db)
        .await?
        .ok_or(Error::LessonNotFound { id: lesson_id })?;

    let mut active_model: lesson::ActiveModel = existing.into();
    active_model.conducted_at = Set(Some(conducted_at));
    let updated = active_model.update(db).await?;
    debug!("Lesson {lesson_id} conducted date updated to {conducted_at}");
    Ok(updated)
}

/// Unconditionally deletes a lesson row.
///
/// No guard against deleting a subscription-owned lesson; that enforcement
/// belongs to the presentation layer.
pub async fn delete_lesson(db: &DatabaseConnection, lesson_id: i64) -> Result<()> {
    let existing = Lesson::find_by_id(lesson_id)
        .one(db)
        .await?
        .ok_or(Error::LessonNotFound { id: lesson_id })?;

    existing.delete(db).await?;
    info!("Deleted lesson {lesson_id}");
    Ok(())
}

/// Retrieves every lesson of every client.
pub async fn get_all_lessons(db: &DatabaseConnection) -> Result<Vec<lesson::Model>> {
    Lesson::find()
        .order_by_asc(lesson::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Whether every lesson of a subscription is completed.
async fn all_lessons_completed(db: &DatabaseConnection, subscription_id: i64) -> Result<bool> {
    let lessons = Lesson::find()
        .filter(lesson::Column::SubscriptionId.eq(subscription_id))
        .all(db)
        .await?;
    Ok(lessons.iter().all(|lesson| lesson.is_completed))
}

async fn set_subscription_state(
    db: &DatabaseConnection,
    subscription_id: i64,
    is_active: bool,
    closed_at: Option<DateTime<Utc>>,
) -> Result<()> {
    let subscription = Subscription::find_by_id(subscription_id)
        .one(db)
        .await?
        .ok_or(Error::SubscriptionNotFound {
            id: subscription_id,
        })?;

    let mut active_model: subscription::ActiveModel = subscription.into();
    active_model.is_active = Set(is_active);
    active_model.closed_at = Set(closed_at);
    active_model.update(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::subscription::get_subscription_by_id;
    use crate::test_utils::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_standalone_numbering_per_client() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();
        let anna = create_test_client(&db, "Anna").await?;
        let boris = create_test_client(&db, "Boris").await?;

        let first = create_standalone_lesson(&db, &bus, anna.id, 700.0, None).await?;
        let second = create_standalone_lesson(&db, &bus, anna.id, 700.0, None).await?;
        let third = create_standalone_lesson(&db, &bus, anna.id, 700.0, None).await?;
        let other = create_standalone_lesson(&db, &bus, boris.id, 900.0, None).await?;

        assert_eq!(
            (first.number, second.number, third.number),
            (1, 2, 3)
        );
        assert_eq!(other.number, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_standalone_with_conducted_date_is_completed() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();
        let client = create_test_client(&db, "Gleb").await?;
        let conducted = Utc::now() - Duration::days(3);

        let lesson =
            create_standalone_lesson(&db, &bus, client.id, 800.0, Some(conducted)).await?;

        assert!(lesson.is_completed);
        assert_eq!(lesson.conducted_at, Some(conducted));
        assert_eq!(lesson.created_at, conducted);

        Ok(())
    }

    #[tokio::test]
    async fn test_standalone_without_date_is_pending() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();
        let client = create_test_client(&db, "Vlad").await?;

        let lesson = create_standalone_lesson(&db, &bus, client.id, 800.0, None).await?;

        assert!(!lesson.is_completed);
        assert!(lesson.conducted_at.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_completing_last_lesson_finishes_subscription() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let client = create_test_client(&db, "Tanya").await?;
        let (subscription, lessons) = create_test_subscription(&db, client.id, 4, 4000.0).await?;

        for lesson in &lessons[..3] {
            complete_lesson(&db, &bus, lesson.id).await?;
            let current = get_subscription_by_id(&db, subscription.id).await?.unwrap();
            assert!(current.is_active);
        }

        complete_lesson(&db, &bus, lessons[3].id).await?;
        let finished = get_subscription_by_id(&db, subscription.id).await?.unwrap();
        assert!(!finished.is_active);
        // closed_at now carries the completion timestamp, not the planned expiry
        assert!(finished.closed_at.unwrap() <= Utc::now());

        assert_eq!(
            rx.try_recv().unwrap(),
            AppEvent::SubscriptionStatusChanged(subscription.id)
        );
        assert!(rx.try_recv().is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_uncompleting_reactivates_finished_subscription() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();
        let client = create_test_client(&db, "Masha").await?;
        let (subscription, lessons) = create_test_subscription(&db, client.id, 3, 3000.0).await?;

        for lesson in &lessons {
            complete_lesson(&db, &bus, lesson.id).await?;
        }
        let mut rx = bus.subscribe();

        uncomplete_lesson(&db, &bus, lessons[1].id).await?;

        let reopened = get_subscription_by_id(&db, subscription.id).await?.unwrap();
        assert!(reopened.is_active);
        assert!(reopened.closed_at.is_none());
        assert_eq!(
            rx.try_recv().unwrap(),
            AppEvent::SubscriptionStatusChanged(subscription.id)
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_completion_predicate_is_order_independent() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();
        let client = create_test_client(&db, "Oleg").await?;
        let (subscription, lessons) = create_test_subscription(&db, client.id, 4, 4000.0).await?;

        // Complete out of order: 3, 1, 4, 2
        for index in [2usize, 0, 3, 1] {
            complete_lesson(&db, &bus, lessons[index].id).await?;
        }

        let finished = get_subscription_by_id(&db, subscription.id).await?.unwrap();
        assert!(!finished.is_active);

        Ok(())
    }

    #[tokio::test]
    async fn test_complete_is_idempotent_safe() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();
        let client = create_test_client(&db, "Inna").await?;
        let lesson = create_standalone_lesson(&db, &bus, client.id, 500.0, None).await?;

        let once = complete_lesson(&db, &bus, lesson.id).await?;
        let twice = complete_lesson(&db, &bus, lesson.id).await?;

        assert!(once.is_completed);
        assert!(twice.is_completed);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_conducted_at_keeps_completion_state() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();
        let client = create_test_client(&db, "Artem").await?;
        let (subscription, lessons) = create_test_subscription(&db, client.id, 1, 1000.0).await?;
        complete_lesson(&db, &bus, lessons[0].id).await?;

        let corrected_date = Utc::now() - Duration::days(45);
        let updated = update_conducted_at(&db, lessons[0].id, corrected_date).await?;

        assert!(updated.is_completed);
        assert_eq!(updated.conducted_at, Some(corrected_date));
        // Subscription status must not be recomputed
        let unchanged = get_subscription_by_id(&db, subscription.id).await?.unwrap();
        assert!(!unchanged.is_active);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_lesson_removes_row() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();
        let client = create_test_client(&db, "Zhenya").await?;
        let lesson = create_standalone_lesson(&db, &bus, client.id, 600.0, None).await?;

        delete_lesson(&db, lesson.id).await?;

        assert!(Lesson::find_by_id(lesson.id).one(&db).await?.is_none());
        assert!(matches!(
            delete_lesson(&db, lesson.id).await,
            Err(Error::LessonNotFound { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_price_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();
        let client = create_test_client(&db, "Lara").await?;

        let result = create_standalone_lesson(&db, &bus, client.id, -10.0, None).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        Ok(())
    }
}
