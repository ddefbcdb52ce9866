use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::advance::{Advance, AdvanceStatus},
};

#[derive(Deserialize, ToSchema)]
pub struct CreateAdvance {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = 50.0)]
    pub amount: f64,
    /// Defaults to today
    #[schema(example = "2026-01-12", value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdvanceQuery {
    pub user_id: Option<u64>,
    #[param(value_type = Option<String>, example = "pending")]
    pub status: Option<AdvanceStatus>,
}

#[utoipa::path(
    post,
    path = "/api/advances",
    request_body = CreateAdvance,
    responses(
        (status = 201, description = "Advance recorded as pending"),
        (status = 400, description = "Invalid amount"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Advances"
)]
pub async fn create_advance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAdvance>,
) -> actix_web::Result<impl Responder> {
    auth.require_finance()?;

    if !payload.amount.is_finite() || payload.amount <= 0.0 {
        return Err(AppError::validation("amount must be greater than zero").into());
    }

    let date = payload.date.unwrap_or_else(|| Local::now().date_naive());

    let result = sqlx::query(
        r#"
        INSERT INTO advances (user_id, amount, status, date)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.amount)
    .bind(AdvanceStatus::Pending.as_ref())
    .bind(date)
    .execute(pool.get_ref())
    .await
    .map_err(|e| AppError::from_insert(e, "Advance already recorded", "User not found"))?;

    info!(user_id = payload.user_id, amount = payload.amount, "Advance recorded");

    Ok(HttpResponse::Created().json(json!({
        "id": result.last_insert_id(),
        "message": "Advance recorded"
    })))
}

#[utoipa::path(
    get,
    path = "/api/advances",
    params(AdvanceQuery),
    responses((status = 200, body = [Advance])),
    security(("bearer_auth" = [])),
    tag = "Advances"
)]
pub async fn list_advances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AdvanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_finance()?;

    let status = query.status.map(|s| s.as_ref().to_string());

    let advances = sqlx::query_as::<_, Advance>(
        r#"
        SELECT id, user_id, amount, status, date
        FROM advances
        WHERE (? IS NULL OR user_id = ?)
          AND (? IS NULL OR status = ?)
        ORDER BY date DESC, id DESC
        "#,
    )
    .bind(query.user_id)
    .bind(query.user_id)
    .bind(&status)
    .bind(&status)
    .fetch_all(pool.get_ref())
    .await
    .map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(advances))
}

#[utoipa::path(
    put,
    path = "/api/advances/{advance_id}/cancel",
    params(("advance_id", description = "Advance ID")),
    responses(
        (status = 200, description = "Advance cancelled"),
        (status = 409, description = "Only pending advances can be cancelled")
    ),
    security(("bearer_auth" = [])),
    tag = "Advances"
)]
pub async fn cancel_advance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_finance()?;

    let advance_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE advances
        SET status = 'cancelled'
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(advance_id)
    .execute(pool.get_ref())
    .await
    .map_err(AppError::from)?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(
            "Advance not found or no longer pending".into(),
        )
        .into());
    }

    info!(advance_id, "Advance cancelled");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Advance cancelled"
    })))
}
