use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "sara")]
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateUserReq {
    #[schema(example = "sara")]
    pub username: String,
    pub password: String,
    #[schema(example = 4)]
    pub role_id: u8,
    #[schema(example = "Sara Ali")]
    pub full_name: String,
    #[schema(example = "+9647701234567")]
    pub phone: Option<String>,
    #[schema(example = 3000.0)]
    pub base_salary: f64,
}

#[derive(FromRow)]
pub struct UserSql {
    pub id: u64, // BIGINT UNSIGNED
    pub username: String,
    pub password: String,
    pub role_id: u8,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,
}
