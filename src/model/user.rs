use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Studio staff member. `base_salary` is the monthly base used for settlement.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "sara")]
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[schema(example = 4)]
    pub role_id: u8,
    #[schema(example = "Sara Ali")]
    pub full_name: String,
    #[schema(example = "+9647701234567", nullable = true)]
    pub phone: Option<String>,
    #[schema(example = 3000.0)]
    pub base_salary: f64,
    pub is_active: bool,
}
