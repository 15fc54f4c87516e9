//! Database queries for financial metrics.

use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::financial_metric::{self as metric, ActiveModel, Entity as MetricEntity};
use crate::error::{AppError, AppResult};
use crate::models::{ExtractedMetric, FinancialMetric};

use super::DbPool;

impl DbPool {
    /// Bulk insert metrics for an analysis.
    pub async fn insert_metrics(
        &self,
        analysis_id: Uuid,
        document_id: Uuid,
        user_id: Uuid,
        metrics: &[ExtractedMetric],
    ) -> AppResult<Vec<FinancialMetric>> {
        if metrics.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let rows: Vec<FinancialMetric> = metrics
            .iter()
            .map(|m| FinancialMetric {
                id: Uuid::now_v7(),
                analysis_id,
                document_id,
                user_id,
                metric_name: m.name.clone(),
                metric_value: m.value.clone(),
                unit: m.unit.clone(),
                year: m.year.clone(),
                confidence: m.confidence.map(i16::from),
                extracted_at: now,
            })
            .collect();

        let models = rows.iter().map(|row| ActiveModel {
            id: Set(row.id),
            analysis_id: Set(row.analysis_id),
            document_id: Set(row.document_id),
            user_id: Set(row.user_id),
            metric_name: Set(row.metric_name.clone()),
            metric_value: Set(row.metric_value.clone()),
            unit: Set(row.unit.clone()),
            year: Set(row.year.clone()),
            confidence: Set(row.confidence),
            extracted_at: Set(row.extracted_at),
        });

        MetricEntity::insert_many(models)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert metrics: {}", e)))?;

        Ok(rows)
    }

    /// Get metrics for an analysis in insertion order.
    pub async fn get_metrics_by_analysis(
        &self,
        analysis_id: Uuid,
    ) -> AppResult<Vec<FinancialMetric>> {
        let result = MetricEntity::find()
            .filter(metric::Column::AnalysisId.eq(analysis_id))
            .order_by_asc(metric::Column::Id) // UUIDv7 is time-ordered
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get metrics: {}", e)))?;

        Ok(result.into_iter().map(FinancialMetric::from).collect())
    }
}
