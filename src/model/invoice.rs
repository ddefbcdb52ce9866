use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvoiceKind {
    #[default]
    Regular,
    Wedding,
}

impl TryFrom<String> for InvoiceKind {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Invoice {
    pub id: u64,
    #[schema(example = "INV-2026-0042")]
    pub invoice_no: String,
    #[sqlx(try_from = "String")]
    pub kind: InvoiceKind,
    #[schema(example = "Lina & Omar")]
    pub customer_name: String,
    #[schema(example = "+9647701234567", nullable = true)]
    pub customer_phone: Option<String>,
    /// Wedding date for wedding invoices
    #[schema(value_type = Option<String>, format = "date")]
    pub event_date: Option<NaiveDate>,
    pub discount: f64,
    pub paid_amount: f64,
    pub notes: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<NaiveDateTime>,
}

/// Stored line item, one row per line entered on the invoice form.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct InvoiceItem {
    pub id: u64,
    pub invoice_id: u64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}
