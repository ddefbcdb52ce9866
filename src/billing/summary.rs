use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use utoipa::ToSchema;

use super::grouping::{GroupedItem, RawItem, group_invoice_items};
use crate::{
    error::AppResult,
    model::invoice::{Invoice, InvoiceItem},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvoiceStatus {
    Unpaid,
    Partial,
    Paid,
}

impl InvoiceStatus {
    pub fn derive(total: f64, paid: f64) -> Self {
        if total - paid <= 0.0 {
            InvoiceStatus::Paid
        } else if paid > 0.0 {
            InvoiceStatus::Partial
        } else {
            InvoiceStatus::Unpaid
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
    pub paid: f64,
    pub remaining: f64,
}

impl InvoiceTotals {
    pub fn compute(groups: &[GroupedItem], discount: f64, paid: f64) -> Self {
        let subtotal: f64 = groups.iter().map(|g| g.total).sum();
        let total = subtotal - discount;

        Self {
            subtotal,
            discount,
            total,
            paid,
            remaining: total - paid,
        }
    }
}

/// Invoice header with its grouped lines, totals and derived status.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvoiceSummary {
    pub invoice: Invoice,
    pub items: Vec<GroupedItem>,
    pub totals: InvoiceTotals,
    pub status: InvoiceStatus,
}

impl InvoiceSummary {
    pub fn build(invoice: Invoice, items: &[InvoiceItem]) -> AppResult<Self> {
        let raw: Vec<RawItem> = items.iter().map(RawItem::from).collect();
        let groups = group_invoice_items(&raw)?;
        let totals = InvoiceTotals::compute(&groups, invoice.discount, invoice.paid_amount);

        Ok(Self {
            status: InvoiceStatus::derive(totals.total, totals.paid),
            invoice,
            items: groups,
            totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::invoice::InvoiceKind;

    fn invoice(discount: f64, paid_amount: f64) -> Invoice {
        Invoice {
            id: 1,
            invoice_no: "INV-1".into(),
            kind: InvoiceKind::Regular,
            customer_name: "Noor".into(),
            customer_phone: None,
            event_date: None,
            discount,
            paid_amount,
            notes: None,
            created_at: None,
        }
    }

    fn item(name: &str, unit_price: f64, quantity: u32) -> InvoiceItem {
        InvoiceItem {
            id: 0,
            invoice_id: 1,
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    #[test]
    fn status_follows_remaining_balance() {
        assert_eq!(InvoiceStatus::derive(100.0, 0.0), InvoiceStatus::Unpaid);
        assert_eq!(InvoiceStatus::derive(100.0, 40.0), InvoiceStatus::Partial);
        assert_eq!(InvoiceStatus::derive(100.0, 100.0), InvoiceStatus::Paid);
        assert_eq!(InvoiceStatus::derive(100.0, 120.0), InvoiceStatus::Paid);
        assert_eq!(InvoiceStatus::derive(0.0, 0.0), InvoiceStatus::Paid);
    }

    #[test]
    fn totals_subtract_discount_then_payments() {
        let groups = group_invoice_items(&[
            RawItem { name: "Session".into(), unit_price: 150.0, quantity: 1 },
            RawItem { name: "Print".into(), unit_price: 5.0, quantity: 10 },
        ])
        .unwrap();
        let totals = InvoiceTotals::compute(&groups, 20.0, 100.0);

        assert_eq!(totals.subtotal, 200.0);
        assert_eq!(totals.total, 180.0);
        assert_eq!(totals.remaining, 80.0);
    }

    #[test]
    fn summary_groups_stored_lines() {
        let items = vec![
            item("Print 4x6", 2.0, 1),
            item("Print 4x6", 2.0, 1),
            item("Album", 60.0, 1),
        ];
        let summary = InvoiceSummary::build(invoice(4.0, 10.0), &items).unwrap();

        assert_eq!(summary.items.len(), 2);
        assert_eq!(summary.totals.total, 60.0);
        assert_eq!(summary.totals.remaining, 50.0);
        assert_eq!(summary.status, InvoiceStatus::Partial);
    }
}
