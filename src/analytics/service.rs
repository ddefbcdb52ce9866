use std::time::Duration;

use chrono::{Local, Utc};
use moka::future::Cache;
use serde::Serialize;
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::{AnalysisType, business_data};
use crate::{
    clients::inference::{AnalysisRequest, InferenceClient},
    error::{AppError, AppResult},
    utils::{inflight::InFlight, month::Month},
};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalysisResult {
    pub analysis_type: AnalysisType,
    #[schema(value_type = String, example = "2026-01")]
    pub month: Month,
    #[schema(value_type = String, format = "date-time")]
    pub generated_at: chrono::DateTime<Utc>,
    #[schema(value_type = Object)]
    pub analysis: Value,
}

/// Runs analyses against the oracle, at most one per type at a time, and
/// keeps the latest result of each type.
#[derive(Clone)]
pub struct AnalyticsService {
    pool: MySqlPool,
    client: InferenceClient,
    external_models: Vec<String>,
    inflight: InFlight,
    latest: Cache<AnalysisType, AnalysisResult>,
}

impl AnalyticsService {
    pub fn new(
        pool: MySqlPool,
        client: InferenceClient,
        external_models: Vec<String>,
        refresh_every: Duration,
    ) -> Self {
        let latest = Cache::builder()
            .max_capacity(16)
            .time_to_live(refresh_every * 2)
            .build();

        Self {
            pool,
            client,
            external_models,
            inflight: InFlight::new(),
            latest,
        }
    }

    pub async fn latest(&self, kind: AnalysisType) -> Option<AnalysisResult> {
        self.latest.get(&kind).await
    }

    pub fn is_running(&self, kind: AnalysisType) -> bool {
        self.inflight.is_running(kind.as_ref())
    }

    /// Fails with [`AppError::Busy`] when the same type is already running.
    pub async fn refresh(&self, kind: AnalysisType) -> AppResult<AnalysisResult> {
        let _guard = self
            .inflight
            .try_acquire(kind.as_ref())
            .ok_or_else(|| AppError::Busy(format!("{kind} analysis is already running")))?;

        let month = Month::containing(Local::now().date_naive());
        let data = business_data::collect(&self.pool, month).await?.to_value()?;

        let request = AnalysisRequest {
            business_data: &data,
            analysis_type: kind.as_ref(),
            external_models: &self.external_models,
        };

        let analysis = self.client.analyze(&request).await?;

        let result = AnalysisResult {
            analysis_type: kind,
            month,
            generated_at: Utc::now(),
            analysis,
        };
        self.latest.insert(kind, result.clone()).await;

        info!(analysis_type = %kind, %month, "Analysis refreshed");
        Ok(result)
    }

    /// Refresh used by the timer: skips a type that is still running.
    pub async fn refresh_if_idle(&self, kind: AnalysisType) {
        match self.refresh(kind).await {
            Ok(_) => {}
            Err(AppError::Busy(_)) => info!(analysis_type = %kind, "Skipped, still running"),
            Err(e) => warn!(analysis_type = %kind, error = %e, "Scheduled analysis failed"),
        }
    }
}
