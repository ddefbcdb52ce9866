use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, MySqlPool};

use crate::{error::AppResult, utils::month::Month};

#[derive(Debug, Default, Serialize, FromRow, PartialEq)]
pub struct InvoiceFigures {
    pub invoice_count: i64,
    pub wedding_count: i64,
    pub gross_total: f64,
    pub discount_total: f64,
    pub paid_total: f64,
}

#[derive(Debug, Default, Serialize, FromRow, PartialEq)]
pub struct PayrollFigures {
    pub salary_count: i64,
    pub net_salary_total: f64,
    pub late_deduction_total: f64,
    pub overtime_total: f64,
}

#[derive(Debug, Default, Serialize, FromRow, PartialEq)]
pub struct AdvanceFigures {
    pub pending_count: i64,
    pub pending_total: f64,
}

/// Figures for one month, sent to the oracle as `businessData`.
#[derive(Debug, Serialize)]
pub struct BusinessData {
    pub month: Month,
    pub invoices: InvoiceFigures,
    pub remaining_balance: f64,
    pub payroll: PayrollFigures,
    pub advances: AdvanceFigures,
}

impl BusinessData {
    pub fn new(
        month: Month,
        invoices: InvoiceFigures,
        payroll: PayrollFigures,
        advances: AdvanceFigures,
    ) -> Self {
        let remaining_balance =
            invoices.gross_total - invoices.discount_total - invoices.paid_total;
        Self {
            month,
            invoices,
            remaining_balance,
            payroll,
            advances,
        }
    }

    pub fn to_value(&self) -> AppResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

pub async fn collect(pool: &MySqlPool, month: Month) -> AppResult<BusinessData> {
    let from = month.first_day();
    let to = month.last_day();

    // SUM over no rows is NULL, hence the COALESCEs and CASTs to DOUBLE
    let invoices = sqlx::query_as::<_, InvoiceFigures>(
        r#"
        SELECT
            COUNT(*) AS invoice_count,
            CAST(COALESCE(SUM(i.kind = 'wedding'), 0) AS SIGNED) AS wedding_count,
            CAST(COALESCE(SUM(t.gross), 0) AS DOUBLE) AS gross_total,
            CAST(COALESCE(SUM(i.discount), 0) AS DOUBLE) AS discount_total,
            CAST(COALESCE(SUM(i.paid_amount), 0) AS DOUBLE) AS paid_total
        FROM invoices i
        LEFT JOIN (
            SELECT invoice_id, SUM(unit_price * quantity) AS gross
            FROM invoice_items
            GROUP BY invoice_id
        ) t ON t.invoice_id = i.id
        WHERE DATE(i.created_at) BETWEEN ? AND ?
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_one(pool);

    let payroll = sqlx::query_as::<_, PayrollFigures>(
        r#"
        SELECT
            COUNT(*) AS salary_count,
            CAST(COALESCE(SUM(net_salary), 0) AS DOUBLE) AS net_salary_total,
            CAST(COALESCE(SUM(late_deduction), 0) AS DOUBLE) AS late_deduction_total,
            CAST(COALESCE(SUM(overtime_amount), 0) AS DOUBLE) AS overtime_total
        FROM salaries
        WHERE month = ?
        "#,
    )
    .bind(from)
    .fetch_one(pool);

    let advances = sqlx::query_as::<_, AdvanceFigures>(
        r#"
        SELECT
            COUNT(*) AS pending_count,
            CAST(COALESCE(SUM(amount), 0) AS DOUBLE) AS pending_total
        FROM advances
        WHERE status = 'pending'
        "#,
    )
    .fetch_one(pool);

    let (invoices, payroll, advances) = futures::try_join!(invoices, payroll, advances)?;

    Ok(BusinessData::new(month, invoices, payroll, advances))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_balance_is_gross_minus_discount_minus_paid() {
        let data = BusinessData::new(
            Month::new(2026, 1).unwrap(),
            InvoiceFigures {
                invoice_count: 3,
                wedding_count: 1,
                gross_total: 2000.0,
                discount_total: 100.0,
                paid_total: 1500.0,
            },
            PayrollFigures::default(),
            AdvanceFigures::default(),
        );

        assert_eq!(data.remaining_balance, 400.0);
        let value = data.to_value().unwrap();
        assert_eq!(value["month"], "2026-01");
        assert_eq!(value["invoices"]["wedding_count"], 1);
    }
}
