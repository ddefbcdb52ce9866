use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::attendance::{AttendanceRecord, AttendanceStatus, derive_minutes, validate_day_minutes},
    payroll::loader::fetch_month_attendance,
    utils::month::Month,
};

#[derive(Deserialize, ToSchema)]
pub struct CreateAttendance {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", value_type = String)]
    pub scheduled_in: NaiveTime,
    #[schema(example = "17:00:00", value_type = String)]
    pub scheduled_out: NaiveTime,
    #[schema(example = "09:20:00", value_type = Option<String>)]
    pub check_in: Option<NaiveTime>,
    #[schema(example = "18:00:00", value_type = Option<String>)]
    pub check_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
    /// Derived from the punches when omitted
    pub late_minutes: Option<u32>,
    /// Derived from the punches when omitted
    pub overtime_minutes: Option<u32>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    pub user_id: u64,
    /// `YYYY-MM`
    #[param(value_type = String, example = "2026-01")]
    pub month: Month,
}

#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = CreateAttendance,
    responses(
        (status = 201, description = "Attendance recorded"),
        (status = 400, description = "Invalid times"),
        (status = 404, description = "User not found"),
        (status = 409, description = "A record already exists for that day")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn create_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAttendance>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    if payload.scheduled_out <= payload.scheduled_in {
        return Err(AppError::validation("scheduled_out must be after scheduled_in").into());
    }
    if let (Some(i), Some(o)) = (payload.check_in, payload.check_out) {
        if o < i {
            return Err(AppError::validation("check_out is earlier than check_in").into());
        }
    }

    let (derived_late, derived_overtime) = derive_minutes(
        payload.status,
        payload.scheduled_in,
        payload.scheduled_out,
        payload.check_in,
        payload.check_out,
    );
    let late_minutes = payload.late_minutes.unwrap_or(derived_late);
    let overtime_minutes = payload.overtime_minutes.unwrap_or(derived_overtime);
    validate_day_minutes(late_minutes, overtime_minutes).map_err(AppError::Validation)?;

    let result = sqlx::query(
        r#"
        INSERT INTO attendance
        (user_id, date, scheduled_in, scheduled_out, check_in, check_out,
         status, late_minutes, overtime_minutes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.date)
    .bind(payload.scheduled_in)
    .bind(payload.scheduled_out)
    .bind(payload.check_in)
    .bind(payload.check_out)
    .bind(payload.status.as_ref())
    .bind(late_minutes)
    .bind(overtime_minutes)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(r) => {
            info!(user_id = payload.user_id, date = %payload.date, "Attendance recorded");
            Ok(HttpResponse::Created().json(json!({
                "id": r.last_insert_id(),
                "late_minutes": late_minutes,
                "overtime_minutes": overtime_minutes
            })))
        }
        Err(e) => Err(AppError::from_insert(
            e,
            "Attendance already recorded for this employee and day",
            "User not found",
        )
        .into()),
    }
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, body = [AttendanceRecord]),
        (status = 403, description = "Staff may only read their own records")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn month_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    if !auth.role.is_manager() && auth.user_id != query.user_id {
        return Err(actix_web::error::ErrorForbidden("Not allowed to view another employee"));
    }

    let records = fetch_month_attendance(pool.get_ref(), query.user_id, query.month).await?;

    Ok(HttpResponse::Ok().json(records))
}
