use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::{
    analytics::{
        AnalysisType,
        service::{AnalysisResult, AnalyticsService},
    },
    auth::auth::AuthUser,
    error::AppError,
};

fn parse_type(raw: &str) -> Result<AnalysisType, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("Unknown analysis type `{raw}`")))
}

/// Latest cached analysis; 404 until the first refresh completes.
#[utoipa::path(
    get,
    path = "/api/analytics/{analysis_type}",
    params(("analysis_type", description = "fraud_detection | decisions | forecasting")),
    responses(
        (status = 200, body = AnalysisResult),
        (status = 404, description = "No analysis yet")
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn latest_analysis(
    auth: AuthUser,
    service: web::Data<AnalyticsService>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let kind = parse_type(&path)?;

    match service.latest(kind).await {
        Some(result) => Ok(HttpResponse::Ok().json(result)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "No analysis available yet",
            "running": service.is_running(kind)
        }))),
    }
}

#[utoipa::path(
    post,
    path = "/api/analytics/{analysis_type}/refresh",
    params(("analysis_type", description = "fraud_detection | decisions | forecasting")),
    responses(
        (status = 200, body = AnalysisResult),
        (status = 409, description = "Already running"),
        (status = 502, description = "Inference endpoint failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn refresh_analysis(
    auth: AuthUser,
    service: web::Data<AnalyticsService>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let kind = parse_type(&path)?;
    let result = service.refresh(kind).await?;

    Ok(HttpResponse::Ok().json(result))
}
