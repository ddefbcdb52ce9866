use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::IntoParams;

use crate::{
    auth::{auth::AuthUser, password::hash_password},
    error::{AppError, is_duplicate_key},
    model::{role::Role, user::User},
    models::CreateUserReq,
};

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    /// Include deactivated users
    pub include_inactive: Option<bool>,
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Username already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn create_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateUserReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Username and password must not be empty").into());
    }
    if Role::from_id(payload.role_id).is_none() {
        return Err(AppError::validation("Unknown role_id").into());
    }
    if !payload.base_salary.is_finite() || payload.base_salary < 0.0 {
        return Err(AppError::validation("base_salary must be a non-negative number").into());
    }

    let hashed = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, password, role_id, full_name, phone, base_salary)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(username)
    .bind(hashed)
    .bind(payload.role_id)
    .bind(payload.full_name.trim())
    .bind(&payload.phone)
    .bind(payload.base_salary)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(r) => {
            info!(user_id = r.last_insert_id(), username, "User created");
            Ok(HttpResponse::Created().json(json!({
                "id": r.last_insert_id(),
                "message": "User created successfully"
            })))
        }
        Err(e) if is_duplicate_key(&e) => {
            Err(AppError::Conflict("Username already exists".into()).into())
        }
        Err(e) => Err(AppError::from(e).into()),
    }
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(UserQuery),
    responses((status = 200, body = [User])),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<UserQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_finance()?;

    let include_inactive = query.include_inactive.unwrap_or(false);

    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, role_id, full_name, phone, base_salary, is_active
        FROM users
        WHERE is_active = TRUE OR ?
        ORDER BY full_name
        "#,
    )
    .bind(include_inactive)
    .fetch_all(pool.get_ref())
    .await
    .map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(users))
}
