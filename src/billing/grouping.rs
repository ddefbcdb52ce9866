use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    model::invoice::InvoiceItem,
};

fn one() -> u32 {
    1
}

/// A line as entered on the invoice form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RawItem {
    #[schema(example = "Photo album 30x30")]
    pub name: String,
    #[schema(example = 45.0)]
    pub unit_price: f64,
    #[serde(default = "one")]
    #[schema(example = 1)]
    pub quantity: u32,
}

/// Lines sharing a name and unit price, merged for print and messaging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GroupedItem {
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub total: f64,
}

impl From<&InvoiceItem> for RawItem {
    fn from(item: &InvoiceItem) -> Self {
        Self {
            name: item.name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

impl From<&GroupedItem> for RawItem {
    fn from(item: &GroupedItem) -> Self {
        Self {
            name: item.name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

/// `0.0` and `-0.0` must land in the same group.
fn price_key(price: f64) -> u64 {
    if price == 0.0 { 0 } else { price.to_bits() }
}

/// Groups by exact `(name, unit_price)` in first-seen order. A group's total
/// is always `unit_price * quantity`, so grouping grouped output is a no-op.
pub fn group_invoice_items(items: &[RawItem]) -> AppResult<Vec<GroupedItem>> {
    let mut index: HashMap<(&str, u64), usize> = HashMap::new();
    let mut groups: Vec<GroupedItem> = Vec::new();

    for item in items {
        let key = (item.name.as_str(), price_key(item.unit_price));

        match index.get(&key) {
            Some(&pos) => {
                let group = &mut groups[pos];
                group.quantity = group.quantity.checked_add(item.quantity).ok_or_else(|| {
                    AppError::Validation(format!("Total quantity for `{}` is too large", item.name))
                })?;
            }
            None => {
                index.insert(key, groups.len());
                groups.push(GroupedItem {
                    name: item.name.clone(),
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    total: 0.0,
                });
            }
        }
    }

    for group in &mut groups {
        group.total = group.unit_price * group.quantity as f64;
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, unit_price: f64, quantity: u32) -> RawItem {
        RawItem {
            name: name.to_string(),
            unit_price,
            quantity,
        }
    }

    #[test]
    fn merges_same_name_and_price_in_first_seen_order() {
        let items = vec![
            raw("Print 4x6", 2.0, 1),
            raw("Album", 45.0, 1),
            raw("Print 4x6", 2.0, 1),
            raw("Print 4x6", 2.0, 3),
        ];

        let groups = group_invoice_items(&items).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Print 4x6");
        assert_eq!(groups[0].quantity, 5);
        assert_eq!(groups[0].total, 10.0);
        assert_eq!(groups[1].name, "Album");
        assert_eq!(groups[1].total, 45.0);
    }

    #[test]
    fn same_name_with_different_price_stays_separate() {
        let items = vec![raw("Frame", 10.0, 1), raw("Frame", 12.0, 1), raw("Frame", 10.0, 2)];

        let groups = group_invoice_items(&items).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!((groups[0].unit_price, groups[0].quantity), (10.0, 3));
        assert_eq!((groups[1].unit_price, groups[1].quantity), (12.0, 1));
    }

    #[test]
    fn names_are_case_sensitive() {
        let groups = group_invoice_items(&[raw("album", 45.0, 1), raw("Album", 45.0, 1)]).unwrap();
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn zero_and_negative_zero_prices_group_together() {
        let groups = group_invoice_items(&[raw("Gift USB", 0.0, 1), raw("Gift USB", -0.0, 1)]).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].quantity, 2);
    }

    #[test]
    fn regrouping_grouped_output_changes_nothing() {
        let items = vec![
            raw("Session", 120.0, 1),
            raw("Print 4x6", 2.5, 4),
            raw("Session", 120.0, 1),
            raw("Print 4x6", 3.0, 2),
        ];

        let once = group_invoice_items(&items).unwrap();
        let as_raw: Vec<RawItem> = once.iter().map(RawItem::from).collect();
        let twice = group_invoice_items(&as_raw).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn inexact_prices_regroup_to_the_same_total() {
        let items = vec![raw("Print", 0.1, 1); 10];

        let once = group_invoice_items(&items).unwrap();
        assert_eq!(once.len(), 1);
        assert_eq!(once[0].quantity, 10);
        assert_eq!(once[0].total, 0.1 * 10.0);

        let as_raw: Vec<RawItem> = once.iter().map(RawItem::from).collect();
        assert_eq!(group_invoice_items(&as_raw).unwrap(), once);
    }

    #[test]
    fn quantity_overflow_is_a_validation_error() {
        let half = u32::MAX / 2 + 1;
        let err = group_invoice_items(&[raw("Print", 1.0, half), raw("Print", 1.0, half)])
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn empty_input_gives_no_groups() {
        assert!(group_invoice_items(&[]).unwrap().is_empty());
    }

    #[test]
    fn quantity_defaults_to_one_when_omitted() {
        let item: RawItem = serde_json::from_str(r#"{"name":"Frame","unit_price":10}"#).unwrap();
        assert_eq!(item.quantity, 1);
    }
}
