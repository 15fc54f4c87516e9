//! Migration: Create documents table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE documents (
                    id UUID PRIMARY KEY,
                    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    file_name VARCHAR(255) NOT NULL,
                    file_key VARCHAR(1024) NOT NULL,
                    file_url VARCHAR(2048) NOT NULL,
                    file_size BIGINT NOT NULL CHECK (file_size > 0),
                    mime_type VARCHAR(128) NOT NULL,
                    status VARCHAR(20) NOT NULL DEFAULT 'pending'
                        CHECK (status IN ('pending', 'processing', 'completed', 'failed')),
                    error_message TEXT,

                    upload_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Per-user listing, newest first
                CREATE INDEX idx_documents_user_upload_date
                    ON documents(user_id, upload_date DESC);

                -- Stuck-document sweep
                CREATE INDEX idx_documents_processing
                    ON documents(updated_at)
                    WHERE status = 'processing';

                CREATE TRIGGER update_documents_updated_at
                    BEFORE UPDATE ON documents
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS update_documents_updated_at ON documents;
                DROP TABLE IF EXISTS documents CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
