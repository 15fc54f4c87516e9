//! Migration: Create financial_metrics table.

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
                CREATE TABLE financial_metrics (
                    id UUID PRIMARY KEY,
                    analysis_id UUID NOT NULL REFERENCES analyses(id) ON DELETE CASCADE,
                    document_id UUID NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    metric_name VARCHAR(255) NOT NULL,
                    metric_value VARCHAR(255),
                    unit VARCHAR(64),
                    year VARCHAR(20),
                    confidence SMALLINT CHECK (confidence BETWEEN 0 AND 100),

                    extracted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_financial_metrics_analysis_id ON financial_metrics(analysis_id);
                CREATE INDEX idx_financial_metrics_document_id ON financial_metrics(document_id);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS financial_metrics CASCADE;")
            .await?;

        Ok(())
    }
}
