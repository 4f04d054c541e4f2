pub mod app;
pub mod forms;
pub mod handlers;
pub mod identity;

use anyhow::Result;
use clap::Subcommand;
use sea_orm_migration::prelude::*;
use tracing::info;

use crate::backend;
use crate::config::WallConfig;
use crate::database::{
    connection::{establish_connection, get_database_url},
    migrations::Migrator,
    seed_data,
};

#[derive(Subcommand, Debug)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn start_server(config: WallConfig) -> Result<()> {
    let backend = backend::connect(&config).await?;
    let app = app::create_app(backend, &config).await?;

    log_routes(&config);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("Server running on http://0.0.0.0:{}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes(config: &WallConfig) {
    info!("Routes:");
    info!("  /                           - Home");
    info!("  /memory                     - Gallery and upload");
    info!("  /memory/{{id}}                - Detail, edit, delete and comments");
    info!("  /api/v1/*                   - JSON API (memories, comments)");
    info!("  /health                     - Health check");
    if config.is_local() {
        info!(
            "  /storage/v1/object/public/{}/* - Uploaded images",
            config.bucket
        );
    }
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}

/// Stores a new access code in the local database, creating tables if needed.
pub async fn add_access_code(database_path: &str, code: &str) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;
    Migrator::up(&db, None).await?;

    if seed_data::add_access_code(&db, code).await? {
        info!("Access code added to {}", database_path);
    } else {
        info!("Access code already present in {}", database_path);
    }
    Ok(())
}
