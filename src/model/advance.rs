use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdvanceStatus {
    Pending,
    Deducted,
    Cancelled,
}

impl TryFrom<String> for AdvanceStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Cash handed to an employee ahead of payday.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Advance {
    #[serde(default)]
    pub id: u64,
    pub user_id: u64,
    #[schema(example = 50.0)]
    pub amount: f64,
    #[sqlx(try_from = "String")]
    pub status: AdvanceStatus,
    #[schema(example = "2026-01-12", value_type = String, format = "date")]
    pub date: NaiveDate,
}

impl Advance {
    pub fn is_pending(&self) -> bool {
        self.status == AdvanceStatus::Pending
    }
}
