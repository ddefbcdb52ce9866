use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One settled month for one employee. Written once, never updated.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SalaryRecord {
    pub id: u64,
    pub user_id: u64,
    /// First day of the settled month
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub month: NaiveDate,
    pub base_salary: f64,
    pub bonus: f64,
    pub overtime_amount: f64,
    pub late_deduction: f64,
    pub advances_deduction: f64,
    pub other_deductions: f64,
    pub net_salary: f64,
    pub notes: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<NaiveDateTime>,
}
