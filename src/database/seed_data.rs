use anyhow::{anyhow, Result};
use sea_orm::*;
use tracing::info;

use crate::database::entities::access_codes;

/// Registers a shared access code for the local backend.
///
/// Returns `false` when an equivalent code (ignoring case) already exists.
pub async fn add_access_code(db: &DatabaseConnection, code: &str) -> Result<bool> {
    let code = code.trim();
    if code.is_empty() {
        return Err(anyhow!("Access code cannot be empty"));
    }

    let existing = access_codes::find_matching(db, code).await?;

    if existing.is_some() {
        info!("Access code already registered, skipping");
        return Ok(false);
    }

    access_codes::ActiveModel {
        code: Set(code.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Registered new access code");
    Ok(true)
}
