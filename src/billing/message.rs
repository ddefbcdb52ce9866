use std::fmt::Write;

use super::summary::InvoiceSummary;
use crate::model::invoice::InvoiceKind;

/// Strips everything but digits; an international `00` prefix is dropped
/// the same way a leading `+` is.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.strip_prefix("00") {
        Some(rest) => rest.to_string(),
        None => digits,
    }
}

fn money(amount: f64, currency: &str) -> String {
    format!("{amount:.2} {currency}")
}

/// Plain-text invoice used for WhatsApp and the printed receipt.
pub fn render_invoice_message(summary: &InvoiceSummary, currency: &str) -> String {
    let invoice = &summary.invoice;
    let totals = &summary.totals;
    let mut out = String::new();

    // write! into a String cannot fail
    let _ = writeln!(out, "Invoice {}", invoice.invoice_no);
    let _ = writeln!(out, "Customer: {}", invoice.customer_name);
    if invoice.kind == InvoiceKind::Wedding {
        match invoice.event_date {
            Some(date) => {
                let _ = writeln!(out, "Wedding date: {}", date.format("%Y-%m-%d"));
            }
            None => {
                let _ = writeln!(out, "Wedding package");
            }
        }
    }
    out.push('\n');

    for item in &summary.items {
        let _ = writeln!(
            out,
            "• {} x{} @ {} = {}",
            item.name,
            item.quantity,
            money(item.unit_price, currency),
            money(item.total, currency)
        );
    }
    out.push('\n');

    let _ = writeln!(out, "Subtotal: {}", money(totals.subtotal, currency));
    if totals.discount != 0.0 {
        let _ = writeln!(out, "Discount: {}", money(totals.discount, currency));
    }
    let _ = writeln!(out, "Total: {}", money(totals.total, currency));
    let _ = writeln!(out, "Paid: {}", money(totals.paid, currency));
    let _ = writeln!(out, "Remaining: {}", money(totals.remaining, currency));
    let _ = write!(out, "Status: {}", summary.status);

    out
}
