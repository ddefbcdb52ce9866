use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthUser,
    billing::{
        grouping::{RawItem, group_invoice_items},
        message::render_invoice_message,
        summary::{InvoiceStatus, InvoiceSummary},
    },
    clients::messaging::{MessagingClient, OutboundMessage},
    config::Config,
    error::{AppError, AppResult, is_duplicate_key},
    model::invoice::{Invoice, InvoiceItem, InvoiceKind},
    utils::db_utils::{build_update_sql, execute_update},
};

/// Upper bound for a single invoice line.
const MAX_LINE_QUANTITY: u32 = 10_000;

const UPDATABLE_COLUMNS: &[&str] = &[
    "customer_name",
    "customer_phone",
    "event_date",
    "discount",
    "paid_amount",
    "notes",
];

#[derive(Deserialize, ToSchema)]
pub struct CreateInvoice {
    #[schema(example = "INV-2026-0042")]
    pub invoice_no: String,
    #[serde(default)]
    pub kind: InvoiceKind,
    #[schema(example = "Lina & Omar")]
    pub customer_name: String,
    pub customer_phone: Option<String>,
    #[schema(example = "2026-06-20", value_type = Option<String>, format = "date")]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub paid_amount: f64,
    pub notes: Option<String>,
    pub items: Vec<RawItem>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvoiceQuery {
    #[param(example = 1)]
    pub page: Option<u32>,
    #[param(example = 20)]
    pub per_page: Option<u32>,
    #[param(value_type = Option<String>, example = "wedding")]
    pub kind: Option<InvoiceKind>,
}

#[derive(Serialize, ToSchema)]
pub struct InvoiceListResponse {
    pub data: Vec<InvoiceSummary>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct MessagePreview {
    pub phone: String,
    pub message: String,
    pub status: InvoiceStatus,
}

fn validate_invoice(payload: &CreateInvoice) -> AppResult<()> {
    if payload.invoice_no.trim().is_empty() || payload.customer_name.trim().is_empty() {
        return Err(AppError::validation("invoice_no and customer_name are required"));
    }
    if payload.items.is_empty() {
        return Err(AppError::validation("An invoice needs at least one item"));
    }
    for item in &payload.items {
        if item.name.trim().is_empty() {
            return Err(AppError::validation("Item name must not be empty"));
        }
        if !item.unit_price.is_finite() || item.unit_price < 0.0 {
            return Err(AppError::Validation(format!("Invalid price for `{}`", item.name)));
        }
        if item.quantity == 0 || item.quantity > MAX_LINE_QUANTITY {
            return Err(AppError::Validation(format!(
                "Quantity for `{}` must be between 1 and {MAX_LINE_QUANTITY}",
                item.name
            )));
        }
    }
    // Stored lines must group cleanly on every later read
    group_invoice_items(&payload.items)?;
    for (name, value) in [("discount", payload.discount), ("paid_amount", payload.paid_amount)] {
        if !value.is_finite() || value < 0.0 {
            return Err(AppError::Validation(format!("{name} must be a non-negative number")));
        }
    }
    Ok(())
}

fn validate_patch(payload: &Value) -> AppResult<()> {
    for key in ["discount", "paid_amount"] {
        if let Some(v) = payload.get(key) {
            match v.as_f64() {
                Some(n) if n >= 0.0 => {}
                _ => return Err(AppError::Validation(format!("{key} must be a non-negative number"))),
            }
        }
    }
    if let Some(v) = payload.get("customer_name") {
        if v.as_str().is_none_or(|s| s.trim().is_empty()) {
            return Err(AppError::validation("customer_name must not be empty"));
        }
    }
    Ok(())
}

async fn load_summary(pool: &MySqlPool, invoice_id: u64) -> AppResult<InvoiceSummary> {
    let invoice = sqlx::query_as::<_, Invoice>(
        r#"
        SELECT id, invoice_no, kind, customer_name, customer_phone, event_date,
               discount, paid_amount, notes, created_at
        FROM invoices
        WHERE id = ?
        "#,
    )
    .bind(invoice_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Invoice not found"))?;

    let items = sqlx::query_as::<_, InvoiceItem>(
        r#"
        SELECT id, invoice_id, name, unit_price, quantity
        FROM invoice_items
        WHERE invoice_id = ?
        ORDER BY id
        "#,
    )
    .bind(invoice_id)
    .fetch_all(pool)
    .await?;

    InvoiceSummary::build(invoice, &items)
}

#[utoipa::path(
    post,
    path = "/api/invoices",
    request_body = CreateInvoice,
    responses(
        (status = 201, body = InvoiceSummary),
        (status = 400, description = "Invalid invoice"),
        (status = 409, description = "Invoice number already used")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn create_invoice(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateInvoice>,
) -> actix_web::Result<impl Responder> {
    auth.require_finance()?;
    validate_invoice(&payload)?;

    let mut tx = pool.begin().await.map_err(AppError::from)?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO invoices
        (invoice_no, kind, customer_name, customer_phone, event_date, discount, paid_amount, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.invoice_no.trim())
    .bind(payload.kind.as_ref())
    .bind(payload.customer_name.trim())
    .bind(&payload.customer_phone)
    .bind(payload.event_date)
    .bind(payload.discount)
    .bind(payload.paid_amount)
    .bind(&payload.notes)
    .execute(&mut *tx)
    .await;

    let invoice_id = match inserted {
        Ok(r) => r.last_insert_id(),
        Err(e) if is_duplicate_key(&e) => {
            return Err(AppError::Conflict("Invoice number already used".into()).into());
        }
        Err(e) => return Err(AppError::from(e).into()),
    };

    for item in &payload.items {
        sqlx::query(
            r#"
            INSERT INTO invoice_items (invoice_id, name, unit_price, quantity)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(invoice_id)
        .bind(item.name.trim())
        .bind(item.unit_price)
        .bind(item.quantity)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from)?;
    }

    tx.commit().await.map_err(AppError::from)?;

    info!(invoice_id, kind = %payload.kind, items = payload.items.len(), "Invoice created");

    let summary = load_summary(pool.get_ref(), invoice_id).await?;
    Ok(HttpResponse::Created().json(summary))
}

#[utoipa::path(
    get,
    path = "/api/invoices",
    params(InvoiceQuery),
    responses((status = 200, body = InvoiceListResponse)),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn list_invoices(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<InvoiceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_finance()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;
    let kind = query.kind.map(|k| k.as_ref().to_string());

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM invoices WHERE (? IS NULL OR kind = ?)",
    )
    .bind(&kind)
    .bind(&kind)
    .fetch_one(pool.get_ref())
    .await
    .map_err(AppError::from)?;

    let ids: Vec<u64> = sqlx::query_scalar(
        r#"
        SELECT id FROM invoices
        WHERE (? IS NULL OR kind = ?)
        ORDER BY created_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(&kind)
    .bind(&kind)
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(AppError::from)?;

    let summaries = futures::future::try_join_all(
        ids.into_iter().map(|id| load_summary(pool.get_ref(), id)),
    )
    .await?;

    Ok(HttpResponse::Ok().json(InvoiceListResponse {
        data: summaries,
        page,
        per_page,
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{invoice_id}",
    params(("invoice_id", description = "Invoice ID")),
    responses(
        (status = 200, body = InvoiceSummary),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn get_invoice(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_finance()?;

    let summary = load_summary(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    patch,
    path = "/api/invoices/{invoice_id}",
    params(("invoice_id", description = "Invoice ID")),
    request_body(content = Object, description = "Any of customer_name, customer_phone, event_date, discount, paid_amount, notes"),
    responses(
        (status = 200, body = InvoiceSummary),
        (status = 400, description = "Unknown field or invalid value"),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn update_invoice(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_finance()?;

    let invoice_id = path.into_inner();
    validate_patch(&body)?;

    let update = build_update_sql("invoices", &body, UPDATABLE_COLUMNS, "id", invoice_id)?;

    execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, invoice_id, "Failed to update invoice");
        AppError::from(e)
    })?;

    // rows_affected is 0 for a no-op update too, so existence is checked by reloading
    let summary = load_summary(pool.get_ref(), invoice_id).await?;

    info!(invoice_id, status = %summary.status, "Invoice updated");
    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    post,
    path = "/api/invoices/{invoice_id}/whatsapp",
    params(("invoice_id", description = "Invoice ID")),
    responses(
        (status = 200, body = MessagePreview),
        (status = 400, description = "Customer has no usable phone"),
        (status = 502, description = "Messaging gateway failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn send_invoice_message(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    messaging: web::Data<MessagingClient>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_finance()?;

    let invoice_id = path.into_inner();
    let summary = load_summary(pool.get_ref(), invoice_id).await?;

    let phone = summary.invoice.customer_phone.clone().unwrap_or_default();
    let text = render_invoice_message(&summary, &config.currency);
    let msg = OutboundMessage::new(&phone, text)?;

    messaging.send(&msg).await?;

    info!(invoice_id, "Invoice sent over WhatsApp");

    Ok(HttpResponse::Ok().json(MessagePreview {
        phone: msg.phone,
        message: msg.message,
        status: summary.status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(items: Vec<RawItem>) -> CreateInvoice {
        CreateInvoice {
            invoice_no: "INV-1".into(),
            kind: InvoiceKind::Regular,
            customer_name: "Noor".into(),
            customer_phone: None,
            event_date: None,
            discount: 0.0,
            paid_amount: 0.0,
            notes: None,
            items,
        }
    }

    fn item(name: &str, unit_price: f64, quantity: u32) -> RawItem {
        RawItem {
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    #[test]
    fn invoice_without_items_is_rejected() {
        assert!(validate_invoice(&invoice(vec![])).is_err());
    }

    #[test]
    fn invoice_items_must_have_price_and_quantity() {
        assert!(validate_invoice(&invoice(vec![item("Album", -1.0, 1)])).is_err());
        assert!(validate_invoice(&invoice(vec![item("Album", 45.0, 0)])).is_err());
        assert!(validate_invoice(&invoice(vec![item(" ", 45.0, 1)])).is_err());
        assert!(validate_invoice(&invoice(vec![item("Album", 45.0, 2)])).is_ok());
    }

    #[test]
    fn oversized_quantities_are_rejected_before_insert() {
        assert!(validate_invoice(&invoice(vec![item("Print", 1.0, MAX_LINE_QUANTITY)])).is_ok());
        assert!(validate_invoice(&invoice(vec![item("Print", 1.0, MAX_LINE_QUANTITY + 1)])).is_err());

        let half = u32::MAX / 2 + 1;
        let err = validate_invoice(&invoice(vec![item("Print", 1.0, half), item("Print", 1.0, half)]))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn patch_rejects_negative_money_and_blank_names() {
        assert!(validate_patch(&json!({ "paid_amount": -5 })).is_err());
        assert!(validate_patch(&json!({ "discount": "ten" })).is_err());
        assert!(validate_patch(&json!({ "customer_name": "" })).is_err());
        assert!(validate_patch(&json!({ "paid_amount": 150.5, "notes": "deposit" })).is_ok());
    }
}
