use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Memories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Memories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Memories::Title).string().not_null())
                    .col(
                        ColumnDef::new(Memories::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Memories::ImageUrl).string().not_null())
                    .col(
                        ColumnDef::new(Memories::Uploader)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Memories::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_memories_created_at")
                    .table(Memories::Table)
                    .col(Memories::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Comments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Comments::MemoryId).integer().not_null())
                    .col(ColumnDef::new(Comments::Text).text().not_null())
                    .col(ColumnDef::new(Comments::Commenter).string().not_null())
                    .col(ColumnDef::new(Comments::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_memory_id")
                            .from(Comments::Table, Comments::MemoryId)
                            .to(Memories::Table, Memories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_memory_id")
                    .table(Comments::Table)
                    .col(Comments::MemoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccessCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccessCodes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccessCodes::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccessCodes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Memories::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
pub enum Memories {
    Table,
    Id,
    Title,
    Description,
    ImageUrl,
    Uploader,
    CreatedAt,
}

#[derive(Iden)]
pub enum Comments {
    Table,
    Id,
    MemoryId,
    Text,
    Commenter,
    CreatedAt,
}

#[derive(Iden)]
enum AccessCodes {
    Table,
    Id,
    Code,
}
