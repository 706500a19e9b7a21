//! Client registry business logic.
//!
//! CRUD over client records. No business rules beyond field validation and
//! name formatting; deleting a client cascades through the database to their
//! subscriptions and lessons. Every mutation publishes
//! [`AppEvent::ClientsChanged`] so dependent views re-fetch.

use crate::{
    entities::{Client, client},
    errors::{Error, Result},
    events::{AppEvent, EventBus},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Mutable client fields shared by create and update operations.
#[derive(Debug, Clone, Default)]
pub struct ClientDetails {
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
    /// Free-form notes
    pub additional_info: Option<String>,
}

/// Retrieves all clients ordered alphabetically by first name.
pub async fn get_all_clients(db: &DatabaseConnection) -> Result<Vec<client::Model>> {
    Client::find()
        .order_by_asc(client::Column::FirstName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a client by its unique ID.
pub async fn get_client_by_id(
    db: &DatabaseConnection,
    client_id: i64,
) -> Result<Option<client::Model>> {
    Client::find_by_id(client_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Registers a new client, stamping creation and update timestamps.
///
/// The first name is required and trimmed; all other fields are optional.
pub async fn create_client(
    db: &DatabaseConnection,
    bus: &EventBus,
    details: ClientDetails,
) -> Result<client::Model> {
    if details.first_name.trim().is_empty() {
        return Err(Error::Config {
            message: "Client first name cannot be empty".to_string(),
        });
    }

    let now = Utc::now();
    let client = client::ActiveModel {
        first_name: Set(details.first_name.trim().to_string()),
        last_name: Set(details.last_name),
        phone: Set(details.phone),
        telegram: Set(details.telegram),
        email: Set(details.email),
        additional_info: Set(details.additional_info),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = client.insert(db).await?;
    info!("Created client {} ({})", created.id, created.full_name());
    bus.publish(AppEvent::ClientsChanged);
    Ok(created)
}

/// Overwrites all mutable fields of an existing client and bumps `updated_at`.
pub async fn update_client(
    db: &DatabaseConnection,
    bus: &EventBus,
    client_id: i64,
    details: ClientDetails,
) -> Result<client::Model> {
    if details.first_name.trim().is_empty() {
        return Err(Error::Config {
            message: "Client first name cannot be empty".to_string(),
        });
    }

    let existing = Client::find_by_id(client_id)
        .one(db)
        .await?
        .ok_or(Error::ClientNotFound { id: client_id })?;

    let mut active_model: client::ActiveModel = existing.into();
    active_model.first_name = Set(details.first_name.trim().to_string());
    active_model.last_name = Set(details.last_name);
    active_model.phone = Set(details.phone);
    active_model.telegram = Set(details.telegram);
    active_model.email = Set(details.email);
    active_model.additional_info = Set(details.additional_info);
    active_model.updated_at = Set(Utc::now());

    let updated = active_model.update(db).await?;
    bus.publish(AppEvent::ClientsChanged);
    Ok(updated)
}

/// Deletes a client; the database cascades to their subscriptions and lessons.
pub async fn delete_client(db: &DatabaseConnection, bus: &EventBus, client_id: i64) -> Result<()> {
    let existing = Client::find_by_id(client_id)
        .one(db)
        .await?
        .ok_or(Error::ClientNotFound { id: client_id })?;

    existing.delete(db).await?;
    info!("Deleted client {client_id}");
    bus.publish(AppEvent::ClientsChanged);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::{Lesson, Subscription};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_client_trims_and_stamps() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();

        let created = create_client(
            &db,
            &bus,
            ClientDetails {
                first_name: "  Maria ".to_string(),
                last_name: Some("Petrova".to_string()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(created.first_name, "Maria");
        assert_eq!(created.full_name(), "Maria Petrova");
        assert_eq!(created.created_at, created.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_client_rejects_empty_name() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();

        let result = create_client(
            &db,
            &bus,
            ClientDetails {
                first_name: "   ".to_string(),
                ..Default::default()
            },
        )
        .await;

        assert!(matches!(result, Err(Error::Config { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_clients_ordered_by_first_name() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_client(&db, "Zoya").await?;
        create_test_client(&db, "Anton").await?;
        create_test_client(&db, "Mikhail").await?;

        let clients = get_all_clients(&db).await?;
        let names: Vec<&str> = clients.iter().map(|c| c.first_name.as_str()).collect();
        assert_eq!(names, vec!["Anton", "Mikhail", "Zoya"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_client_overwrites_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();
        let client = create_test_client(&db, "Olga").await?;

        let updated = update_client(
            &db,
            &bus,
            client.id,
            ClientDetails {
                first_name: "Olga".to_string(),
                phone: Some("+7 900 000 00 00".to_string()),
                email: Some("olga@example.com".to_string()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.phone.as_deref(), Some("+7 900 000 00 00"));
        assert_eq!(updated.email.as_deref(), Some("olga@example.com"));
        assert!(updated.updated_at >= client.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_client_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();

        let result = update_client(
            &db,
            &bus,
            999,
            ClientDetails {
                first_name: "Ghost".to_string(),
                ..Default::default()
            },
        )
        .await;

        assert!(matches!(result, Err(Error::ClientNotFound { id: 999 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_client_cascades_to_subscriptions_and_lessons() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();
        let client = create_test_client(&db, "Pavel").await?;
        let (subscription, _) = create_test_subscription(&db, client.id, 4, 4000.0).await?;

        delete_client(&db, &bus, client.id).await?;

        assert!(
            Subscription::find_by_id(subscription.id)
                .one(&db)
                .await?
                .is_none()
        );
        let remaining = Lesson::find().all(&db).await?;
        assert!(remaining.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_mutations_publish_clients_changed() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let client = create_client(
            &db,
            &bus,
            ClientDetails {
                first_name: "Igor".to_string(),
                ..Default::default()
            },
        )
        .await?;
        delete_client(&db, &bus, client.id).await?;

        assert_eq!(rx.try_recv().unwrap(), AppEvent::ClientsChanged);
        assert_eq!(rx.try_recv().unwrap(), AppEvent::ClientsChanged);

        Ok(())
    }
}
