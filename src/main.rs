//! Headless bootstrap for the Abonementus core.
//!
//! Initializes logging and configuration, opens the database, applies the
//! lesson-number migration, sweeps orphaned lessons, and logs a dashboard
//! summary. A desktop UI would sit on top of the same library calls.

use abonementus::{config, core, errors::Result};
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv().ok();
    let app_config = config::app::load_default_config();

    let db = config::database::connect(&app_config.database_url).await?;
    config::database::create_tables(&db).await?;
    info!("Database ready at {}", app_config.database_url);

    if config::database::ensure_lesson_number_column(&db).await? {
        info!("Applied lesson number migration");
    }

    let removed = core::subscription::cleanup_orphaned_lessons(&db).await?;
    if removed > 0 {
        info!("Startup reconciliation removed {removed} orphaned lessons");
    }

    let clients = core::client::get_all_clients(&db).await?;
    let active = core::subscription::get_active_subscriptions(&db).await?;
    let completed_month = core::income::completed_amount_for_current_month(&db).await?;
    let extra_month = core::income::extra_income_for_current_month(&db).await?;
    let pending = core::income::pending_amount(&db).await?;

    info!(
        "{} clients, {} active subscriptions | this month: {:.2} lessons + {:.2} extra | pending: {:.2}",
        clients.len(),
        active.len(),
        completed_month,
        extra_month,
        pending
    );

    Ok(())
}
