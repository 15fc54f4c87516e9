//! Database queries for analyses.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::analysis::{self as analysis, ActiveModel, Entity as AnalysisEntity};
use crate::error::{AppError, AppResult};
use crate::models::{Analysis, AnalysisStatus};

use super::DbPool;

impl DbPool {
    /// Insert a new pending analysis.
    pub async fn insert_analysis(&self, document_id: Uuid, user_id: Uuid) -> AppResult<Analysis> {
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            document_id: Set(document_id),
            user_id: Set(user_id),
            extracted_text: Set(None),
            executive_summary: Set(None),
            analysis_status: Set(AnalysisStatus::Pending.as_str().to_string()),
            error_message: Set(None),
            analyzed_at: Set(None),
            created_at: Set(Utc::now()),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert analysis: {}", e)))?;

        Ok(result.into())
    }

    /// Store the extraction results and mark a still-pending analysis completed.
    ///
    /// Returns `false` when the analysis is no longer pending (for example
    /// failed by the reconciler while the pipeline was running).
    pub async fn complete_analysis(
        &self,
        id: Uuid,
        extracted_text: String,
        executive_summary: String,
    ) -> AppResult<bool> {
        let result = AnalysisEntity::update_many()
            .col_expr(analysis::Column::ExtractedText, Expr::value(extracted_text))
            .col_expr(
                analysis::Column::ExecutiveSummary,
                Expr::value(executive_summary),
            )
            .col_expr(
                analysis::Column::AnalysisStatus,
                Expr::value(AnalysisStatus::Completed.as_str()),
            )
            .col_expr(analysis::Column::ErrorMessage, Expr::value(Option::<String>::None))
            .col_expr(analysis::Column::AnalyzedAt, Expr::value(Utc::now()))
            .filter(analysis::Column::Id.eq(id))
            .filter(analysis::Column::AnalysisStatus.eq(AnalysisStatus::Pending.as_str()))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to complete analysis: {}", e)))?;

        Ok(result.rows_affected == 1)
    }

    /// Mark an analysis failed. An already failed analysis keeps its first error.
    pub async fn fail_analysis(&self, id: Uuid, error_message: String) -> AppResult<()> {
        AnalysisEntity::update_many()
            .col_expr(
                analysis::Column::AnalysisStatus,
                Expr::value(AnalysisStatus::Failed.as_str()),
            )
            .col_expr(analysis::Column::ErrorMessage, Expr::value(error_message))
            .filter(analysis::Column::Id.eq(id))
            .filter(analysis::Column::AnalysisStatus.ne(AnalysisStatus::Failed.as_str()))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to mark analysis failed: {}", e)))?;

        Ok(())
    }

    /// Get the most recently created analysis of a document.
    pub async fn get_latest_analysis(&self, document_id: Uuid) -> AppResult<Option<Analysis>> {
        let result = AnalysisEntity::find()
            .filter(analysis::Column::DocumentId.eq(document_id))
            .order_by_desc(analysis::Column::CreatedAt)
            .order_by_desc(analysis::Column::Id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get latest analysis: {}", e)))?;

        Ok(result.map(Analysis::from))
    }

    /// Fail all pending analyses of a document.
    pub async fn fail_pending_analyses(
        &self,
        document_id: Uuid,
        error_message: String,
    ) -> AppResult<u64> {
        let result = AnalysisEntity::update_many()
            .col_expr(
                analysis::Column::AnalysisStatus,
                Expr::value(AnalysisStatus::Failed.as_str()),
            )
            .col_expr(analysis::Column::ErrorMessage, Expr::value(error_message))
            .filter(analysis::Column::DocumentId.eq(document_id))
            .filter(analysis::Column::AnalysisStatus.eq(AnalysisStatus::Pending.as_str()))
            .exec(self.connection())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to fail pending analyses: {}", e))
            })?;

        Ok(result.rows_affected)
    }
}
