//! Migration: Create analyses table.

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
                CREATE TABLE analyses (
                    id UUID PRIMARY KEY,
                    document_id UUID NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    extracted_text TEXT,
                    executive_summary TEXT,
                    analysis_status VARCHAR(20) NOT NULL DEFAULT 'pending'
                        CHECK (analysis_status IN ('pending', 'completed', 'failed')),
                    error_message TEXT,
                    analyzed_at TIMESTAMPTZ,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Latest analysis per document
                CREATE INDEX idx_analyses_document_created
                    ON analyses(document_id, created_at DESC);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS analyses CASCADE;")
            .await?;

        Ok(())
    }
}
