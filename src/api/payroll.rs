use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthUser,
    error::{AppError, is_duplicate_key},
    model::{
        advance::Advance,
        attendance::{AttendanceRecord, validate_day_minutes},
        deduction_rules::DeductionRules,
        salary::SalaryRecord,
    },
    payroll::{
        loader::load_month_snapshot,
        settlement::{Adjustments, SalaryReport, compute_salary_report},
    },
    utils::month::Month,
};

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    pub user_id: u64,
    #[param(value_type = String, example = "2026-01")]
    pub month: Month,
    pub bonus: Option<f64>,
    pub other_deductions: Option<f64>,
}

#[derive(Serialize, ToSchema)]
pub struct ReportResponse {
    pub user_id: u64,
    pub full_name: String,
    #[schema(value_type = String, example = "2026-01")]
    pub month: Month,
    pub report: SalaryReport,
    pub pending_advances: Vec<Advance>,
}

/// Everything the calculator needs, supplied by the caller.
#[derive(Deserialize, ToSchema)]
pub struct PreviewRequest {
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
    #[serde(default)]
    pub advances: Vec<Advance>,
    pub rules: DeductionRules,
    #[schema(example = 3000.0)]
    pub base_salary: f64,
    #[serde(default)]
    pub bonus: f64,
    #[serde(default)]
    pub other_deductions: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateSalary {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(value_type = String, example = "2026-01")]
    pub month: Month,
    #[serde(default)]
    #[schema(example = 100.0)]
    pub bonus: f64,
    #[serde(default)]
    #[schema(example = 0.0)]
    pub other_deductions: f64,
    pub notes: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SalaryQuery {
    #[param(example = 1)]
    pub page: Option<u32>,
    #[param(example = 10)]
    pub per_page: Option<u32>,
    pub user_id: Option<u64>,
    #[param(value_type = Option<String>, example = "2026-01")]
    pub month: Option<Month>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedSalaryResponse {
    pub data: Vec<SalaryRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

fn adjustments(bonus: f64, other_deductions: f64) -> Result<Adjustments, AppError> {
    if !bonus.is_finite() || !other_deductions.is_finite() {
        return Err(AppError::validation("bonus and other_deductions must be numbers"));
    }
    Ok(Adjustments {
        bonus,
        other_deductions,
    })
}

#[utoipa::path(
    get,
    path = "/api/payroll/report",
    params(ReportQuery),
    responses(
        (status = 200, body = ReportResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn salary_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_self_or_finance(query.user_id)?;

    let adj = adjustments(
        query.bonus.unwrap_or(0.0),
        query.other_deductions.unwrap_or(0.0),
    )?;

    let snapshot = load_month_snapshot(pool.get_ref(), query.user_id, query.month).await?;

    let report = compute_salary_report(
        &snapshot.records,
        &snapshot.pending_advances,
        &snapshot.rules,
        snapshot.user.base_salary,
        adj,
    );

    Ok(HttpResponse::Ok().json(ReportResponse {
        user_id: snapshot.user.id,
        full_name: snapshot.user.full_name,
        month: query.month,
        report,
        pending_advances: snapshot.pending_advances,
    }))
}

#[utoipa::path(
    post,
    path = "/api/payroll/preview",
    request_body = PreviewRequest,
    responses((status = 200, body = SalaryReport)),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn preview_settlement(
    _auth: AuthUser,
    payload: web::Json<PreviewRequest>,
) -> actix_web::Result<impl Responder> {
    let adj = adjustments(payload.bonus, payload.other_deductions)?;
    for record in &payload.records {
        validate_day_minutes(record.late_minutes, record.overtime_minutes)
            .map_err(AppError::Validation)?;
    }

    let report = compute_salary_report(
        &payload.records,
        &payload.advances,
        &payload.rules,
        payload.base_salary,
        adj,
    );

    Ok(HttpResponse::Ok().json(report))
}

#[utoipa::path(
    post,
    path = "/api/payroll/salaries",
    request_body = CreateSalary,
    responses(
        (status = 201, description = "Salary settled", body = SalaryReport),
        (status = 404, description = "User not found"),
        (status = 409, description = "Month already settled for this employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn create_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateSalary>,
) -> actix_web::Result<impl Responder> {
    auth.require_finance()?;

    let adj = adjustments(payload.bonus, payload.other_deductions)?;
    let snapshot = load_month_snapshot(pool.get_ref(), payload.user_id, payload.month).await?;

    let report = compute_salary_report(
        &snapshot.records,
        &snapshot.pending_advances,
        &snapshot.rules,
        snapshot.user.base_salary,
        adj,
    );

    let mut tx = pool.begin().await.map_err(AppError::from)?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO salaries
        (user_id, month, base_salary, bonus, overtime_amount, late_deduction,
         advances_deduction, other_deductions, net_salary, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.month.first_day())
    .bind(report.base_salary)
    .bind(report.bonus)
    .bind(report.overtime_amount)
    .bind(report.late_deduction)
    .bind(report.advances_deduction)
    .bind(report.other_deductions)
    .bind(report.net_salary)
    .bind(&payload.notes)
    .execute(&mut *tx)
    .await;

    let salary_id = match inserted {
        Ok(r) => r.last_insert_id(),
        Err(e) if is_duplicate_key(&e) => {
            return Err(AppError::Conflict(format!(
                "Salary for {} is already settled",
                payload.month
            ))
            .into());
        }
        Err(e) => return Err(AppError::from(e).into()),
    };

    // Settled advances leave the pending pool with this salary
    for advance in &snapshot.pending_advances {
        let updated = sqlx::query(
            r#"
            UPDATE advances
            SET status = 'deducted'
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(advance.id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from)?;

        if updated.rows_affected() == 0 {
            error!(advance_id = advance.id, "Advance changed during settlement");
            return Err(AppError::Conflict(
                "An advance changed while settling, reload the report".into(),
            )
            .into());
        }
    }

    tx.commit().await.map_err(AppError::from)?;

    info!(
        salary_id,
        user_id = payload.user_id,
        month = %payload.month,
        net_salary = report.net_salary,
        "Salary settled"
    );

    Ok(HttpResponse::Created().json(json!({
        "id": salary_id,
        "report": report
    })))
}

#[utoipa::path(
    get,
    path = "/api/payroll/salaries/{salary_id}",
    params(("salary_id", description = "Salary record ID")),
    responses(
        (status = 200, body = SalaryRecord),
        (status = 404, description = "Salary record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let salary_id = path.into_inner();

    let salary = sqlx::query_as::<_, SalaryRecord>(
        r#"
        SELECT id, user_id, month, base_salary, bonus, overtime_amount, late_deduction,
               advances_deduction, other_deductions, net_salary, notes, created_at
        FROM salaries
        WHERE id = ?
        "#,
    )
    .bind(salary_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(AppError::from)?
    .ok_or_else(|| AppError::not_found("Salary record not found"))?;

    auth.require_self_or_finance(salary.user_id)?;

    Ok(HttpResponse::Ok().json(salary))
}

#[utoipa::path(
    get,
    path = "/api/payroll/salaries",
    params(SalaryQuery),
    responses((status = 200, body = PaginatedSalaryResponse)),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_salaries(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<SalaryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_finance()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;
    let month = query.month.map(|m| m.first_day());

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM salaries
        WHERE (? IS NULL OR user_id = ?) AND (? IS NULL OR month = ?)
        "#,
    )
    .bind(query.user_id)
    .bind(query.user_id)
    .bind(month)
    .bind(month)
    .fetch_one(pool.get_ref())
    .await
    .map_err(AppError::from)?;

    let data = sqlx::query_as::<_, SalaryRecord>(
        r#"
        SELECT id, user_id, month, base_salary, bonus, overtime_amount, late_deduction,
               advances_deduction, other_deductions, net_salary, notes, created_at
        FROM salaries
        WHERE (? IS NULL OR user_id = ?) AND (? IS NULL OR month = ?)
        ORDER BY month DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(query.user_id)
    .bind(query.user_id)
    .bind(month)
    .bind(month)
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(PaginatedSalaryResponse {
        data,
        page,
        per_page,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::jwt::generate_access_token, config::Config};
    use actix_web::{App, http::StatusCode, test, web::Data};
    use serde_json::{Value, json};

    fn test_config() -> Config {
        Config {
            database_url: String::new(),
            jwt_secret: "test-secret".into(),
            server_addr: "127.0.0.1:0".into(),
            access_token_ttl: 300,
            rate_login_per_min: 60,
            rate_protected_per_min: 1000,
            api_prefix: "/api".into(),
            currency: "USD".into(),
            inference_url: String::new(),
            inference_api_key: None,
            external_models: vec![],
            analysis_refresh_secs: 300,
            messaging_url: String::new(),
            messaging_token: None,
            log_dir: "logs".into(),
        }
    }

    fn preview_body() -> Value {
        json!({
            "records": [{
                "user_id": 7,
                "date": "2026-01-05",
                "scheduled_in": "09:00:00",
                "scheduled_out": "17:00:00",
                "check_in": "09:40:00",
                "check_out": "19:00:00",
                "status": "present",
                "late_minutes": 40,
                "overtime_minutes": 120
            }],
            "advances": [
                { "user_id": 7, "amount": 50.0, "status": "pending", "date": "2025-11-02" },
                { "user_id": 7, "amount": 30.0, "status": "pending", "date": "2026-01-09" }
            ],
            "rules": {
                "mode": "minute",
                "per_minute_rate": 2.0,
                "per_hour_rate": 0.0,
                "per_half_day_rate": 0.0,
                "grace_minutes": 15,
                "overtime_multiplier": 1.5
            },
            "base_salary": 3600.0,
            "bonus": 100.0
        })
    }

    #[actix_web::test]
    async fn preview_computes_the_full_report() {
        let config = test_config();
        let token =
            generate_access_token(7, "sara".into(), 4, &config.jwt_secret, 60).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(Data::new(config))
                .route("/api/payroll/preview", web::post().to(preview_settlement)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/payroll/preview")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(preview_body())
            .to_request();

        let report: SalaryReport = test::call_and_read_body_json(&app, req).await;

        assert_eq!(report.late_deduction, 50.0);
        // 3600 / 240 = 15 per hour, 2h at 1.5x
        assert_eq!(report.overtime_amount, 45.0);
        assert_eq!(report.advances_deduction, 80.0);
        assert_eq!(report.net_salary, 3600.0 + 45.0 + 100.0 - 50.0 - 80.0);
    }

    #[actix_web::test]
    async fn preview_requires_a_bearer_token() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(test_config()))
                .route("/api/payroll/preview", web::post().to(preview_settlement)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/payroll/preview")
            .set_json(preview_body())
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn preview_rejects_more_than_a_day_of_minutes() {
        let config = test_config();
        let token =
            generate_access_token(7, "sara".into(), 4, &config.jwt_secret, 60).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(Data::new(config))
                .route("/api/payroll/preview", web::post().to(preview_settlement)),
        )
        .await;

        let mut body = preview_body();
        body["records"][0]["late_minutes"] = json!(u32::MAX);

        let req = test::TestRequest::post()
            .uri("/api/payroll/preview")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(body)
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[::core::prelude::v1::test]
    fn adjustments_reject_non_numbers() {
        assert!(adjustments(f64::NAN, 0.0).is_err());
        assert_eq!(
            adjustments(10.0, 2.5).unwrap(),
            Adjustments {
                bonus: 10.0,
                other_deductions: 2.5
            }
        );
    }
}
