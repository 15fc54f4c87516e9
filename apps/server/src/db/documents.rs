//! Database queries for documents.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::document::{self as document, ActiveModel, Entity as DocumentEntity};
use crate::error::{AppError, AppResult};
use crate::models::{Document, DocumentStatus, NewDocument};

use super::DbPool;

impl DbPool {
    /// Insert a new document with status `pending`.
    pub async fn insert_document(&self, new: NewDocument) -> AppResult<Document> {
        let now = Utc::now();

        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(new.user_id),
            file_name: Set(new.file_name),
            file_key: Set(new.file_key),
            file_url: Set(new.file_url),
            file_size: Set(new.file_size),
            mime_type: Set(new.mime_type),
            status: Set(DocumentStatus::Pending.as_str().to_string()),
            error_message: Set(None),
            upload_date: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert document: {}", e)))?;

        Ok(result.into())
    }

    /// Get all documents for a user, newest first.
    pub async fn get_documents_by_user(&self, user_id: Uuid) -> AppResult<Vec<Document>> {
        let result = DocumentEntity::find()
            .filter(document::Column::UserId.eq(user_id))
            .order_by_desc(document::Column::UploadDate)
            .order_by_desc(document::Column::Id) // UUIDv7 breaks ties
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list documents: {}", e)))?;

        Ok(result.into_iter().map(Document::from).collect())
    }

    /// Get a document by ID, scoped to its owner.
    pub async fn get_document_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<Document>> {
        let result = DocumentEntity::find_by_id(id)
            .filter(document::Column::UserId.eq(user_id))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get document: {}", e)))?;

        Ok(result.map(Document::from))
    }

    /// Conditionally move a document to `processing`.
    ///
    /// Single UPDATE guarded by `status <> 'processing'`, so two concurrent
    /// callers cannot both win.
    pub async fn mark_document_processing(&self, id: Uuid) -> AppResult<bool> {
        let processing = DocumentStatus::Processing.as_str();

        let result = DocumentEntity::update_many()
            .col_expr(document::Column::Status, Expr::value(processing))
            .col_expr(document::Column::ErrorMessage, Expr::value(Option::<String>::None))
            .col_expr(document::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(document::Column::Id.eq(id))
            .filter(document::Column::Status.ne(processing))
            .exec(self.connection())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to mark document processing: {}", e))
            })?;

        Ok(result.rows_affected == 1)
    }

    /// Leave `processing` for `status`, recording `error_message`.
    ///
    /// Guarded by `status = 'processing'` like `mark_document_processing`, so a
    /// document the reconciler already failed is never moved again. Returns
    /// whether the transition happened.
    pub async fn finish_document_processing(
        &self,
        id: Uuid,
        status: DocumentStatus,
        error_message: Option<String>,
    ) -> AppResult<bool> {
        let result = DocumentEntity::update_many()
            .col_expr(document::Column::Status, Expr::value(status.as_str()))
            .col_expr(document::Column::ErrorMessage, Expr::value(error_message))
            .col_expr(document::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(document::Column::Id.eq(id))
            .filter(document::Column::Status.eq(DocumentStatus::Processing.as_str()))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update document status: {}", e)))?;

        Ok(result.rows_affected == 1)
    }

    /// Documents stuck in `processing` since before `older_than`.
    pub async fn get_stale_processing_documents(
        &self,
        older_than: DateTime<Utc>,
    ) -> AppResult<Vec<Document>> {
        let result = DocumentEntity::find()
            .filter(document::Column::Status.eq(DocumentStatus::Processing.as_str()))
            .filter(document::Column::UpdatedAt.lt(older_than))
            .order_by_asc(document::Column::UpdatedAt)
            .all(self.connection())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to find stale processing documents: {}", e))
            })?;

        Ok(result.into_iter().map(Document::from).collect())
    }
}
