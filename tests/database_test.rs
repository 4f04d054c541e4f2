//! Database functionality tests
//!
//! Migrations, the SQL-backed store and access code seeding.

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use memory_wall::backend::sql::SqlStore;
use memory_wall::backend::WallStore;
use memory_wall::database::entities::*;
use memory_wall::database::migrations::Migrator;
use memory_wall::database::seed_data::add_access_code;
use memory_wall::database::setup_database;
use memory_wall::errors::WallError;
use memory_wall::models::{MemoryChanges, NewComment, NewMemory};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;
use tempfile::NamedTempFile;

/// Create a test database connection with migrations
async fn setup_test_db() -> Result<(DatabaseConnection, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    Ok((db, temp_file))
}

fn new_memory(title: &str) -> NewMemory {
    NewMemory {
        title: title.to_string(),
        description: "desc".to_string(),
        image_url: format!("/storage/v1/object/public/images/{}.png", title),
        uploader: "Rina".to_string(),
    }
}

#[tokio::test]
async fn test_database_migrations() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    assert!(memories::Entity::find().all(&db).await?.is_empty());
    assert!(comments::Entity::find().all(&db).await?.is_empty());
    assert!(access_codes::Entity::find().all(&db).await?.is_empty());

    let pending = Migrator::get_pending_migrations(&db).await?;
    assert!(pending.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_memories_ordered_newest_first() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();

    for (title, offset) in [("old", 0), ("newest", 60), ("tie-a", 30), ("tie-b", 30)] {
        memories::ActiveModel {
            title: Set(title.to_string()),
            description: Set(String::new()),
            image_url: Set(String::new()),
            uploader: Set(String::new()),
            created_at: Set(base + Duration::minutes(offset)),
            ..Default::default()
        }
        .insert(&db)
        .await?;
    }

    let store = SqlStore::new(db);
    let titles: Vec<String> = store
        .list_memories()
        .await?
        .into_iter()
        .map(|memory| memory.title)
        .collect();
    assert_eq!(titles, vec!["newest", "tie-b", "tie-a", "old"]);

    Ok(())
}

#[tokio::test]
async fn test_memory_update_and_missing_rows() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let store = SqlStore::new(db);

    let memory = store.insert_memory(new_memory("kiln")).await?;
    let updated = store
        .update_memory(
            memory.id,
            MemoryChanges {
                title: "kiln 2".to_string(),
                description: String::new(),
                uploader: "Budi".to_string(),
                image_url: memory.image_url.clone(),
            },
        )
        .await?;
    assert_eq!(updated.title, "kiln 2");
    assert_eq!(updated.created_at, memory.created_at);

    let err = store
        .update_memory(
            999,
            MemoryChanges {
                title: "x".to_string(),
                description: String::new(),
                uploader: "x".to_string(),
                image_url: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WallError::NotFound { id: 999, .. }));
    assert!(store.delete_memory(999).await.is_err());
    assert!(store.find_memory(999).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_comment_rows_and_cascading_deletes() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let store = SqlStore::new(db);
    let memory = store.insert_memory(new_memory("kiln")).await?;
    let other = store.insert_memory(new_memory("garden")).await?;

    let top = store
        .insert_comment(NewComment {
            memory_id: memory.id,
            text: "top".to_string(),
            commenter: "Ana".to_string(),
            parent_id: None,
        })
        .await?;
    for text in ["r1", "r2"] {
        store
            .insert_comment(NewComment {
                memory_id: memory.id,
                text: text.to_string(),
                commenter: "Budi".to_string(),
                parent_id: Some(top.id),
            })
            .await?;
    }
    store
        .insert_comment(NewComment {
            memory_id: other.id,
            text: "elsewhere".to_string(),
            commenter: "Citra".to_string(),
            parent_id: None,
        })
        .await?;

    let listed = store.list_comments(memory.id).await?;
    let texts: Vec<&str> = listed.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["top", "r1", "r2"]);

    let edited = store.update_comment_text(top.id, "top, edited").await?;
    assert_eq!(edited.commenter, "Ana");
    assert_eq!(edited.created_at, top.created_at);

    assert_eq!(store.delete_replies(top.id).await?, 2);
    assert_eq!(store.delete_comments_for_memory(memory.id).await?, 1);
    assert!(store.list_comments(memory.id).await?.is_empty());
    assert_eq!(store.list_comments(other.id).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_access_codes_match_ignoring_case() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    assert!(add_access_code(&db, " Build-2024 ").await?);
    assert!(!add_access_code(&db, "BUILD-2024").await?);
    assert!(add_access_code(&db, "   ").await.is_err());
    assert_eq!(access_codes::Entity::find().all(&db).await?.len(), 1);

    let store = SqlStore::new(db);
    assert!(store.access_code_exists("build-2024").await?);
    assert!(store.access_code_exists("  BUILD-2024\t").await?);
    assert!(!store.access_code_exists("build-2025").await?);
    assert!(!store.access_code_exists("").await?);

    Ok(())
}

#[tokio::test]
async fn test_access_codes_match_non_ascii_letters() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    assert!(add_access_code(&db, "RAHASİA-ÜBER").await?);
    assert!(add_access_code(&db, "ÜBER").await?);
    assert!(!add_access_code(&db, "über").await?);
    assert_eq!(access_codes::Entity::find().all(&db).await?.len(), 2);

    let store = SqlStore::new(db);
    assert!(store.access_code_exists("ÜBER").await?);
    assert!(store.access_code_exists(" über ").await?);
    assert!(store.access_code_exists("RAHASİA-ÜBER").await?);
    assert!(!store.access_code_exists("uber").await?);

    Ok(())
}
