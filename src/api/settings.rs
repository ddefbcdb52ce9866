use actix_web::{HttpResponse, Responder, web};
use sqlx::MySqlPool;
use tracing::info;

use crate::{
    auth::auth::AuthUser, error::AppError, model::deduction_rules::DeductionRules,
    payroll::loader::load_deduction_rules,
};

#[utoipa::path(
    get,
    path = "/api/settings/deduction-rules",
    responses((status = 200, body = DeductionRules)),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_deduction_rules(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let rules = load_deduction_rules(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(rules))
}

#[utoipa::path(
    put,
    path = "/api/settings/deduction-rules",
    request_body = DeductionRules,
    responses(
        (status = 200, body = DeductionRules),
        (status = 400, description = "Negative or non-numeric rate")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_deduction_rules(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<DeductionRules>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let rules = body.into_inner();
    rules.validate().map_err(AppError::Validation)?;

    sqlx::query(
        r#"
        INSERT INTO deduction_rules
        (id, mode, per_minute_rate, per_hour_rate, per_half_day_rate,
         grace_minutes, overtime_multiplier)
        VALUES (1, ?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            mode = VALUES(mode),
            per_minute_rate = VALUES(per_minute_rate),
            per_hour_rate = VALUES(per_hour_rate),
            per_half_day_rate = VALUES(per_half_day_rate),
            grace_minutes = VALUES(grace_minutes),
            overtime_multiplier = VALUES(overtime_multiplier)
        "#,
    )
    .bind(rules.mode.as_ref())
    .bind(rules.per_minute_rate)
    .bind(rules.per_hour_rate)
    .bind(rules.per_half_day_rate)
    .bind(rules.grace_minutes)
    .bind(rules.overtime_multiplier)
    .execute(pool.get_ref())
    .await
    .map_err(AppError::from)?;

    info!(mode = %rules.mode, grace = rules.grace_minutes, "Deduction rules updated");

    Ok(HttpResponse::Ok().json(rules))
}
