//! Totals Calculator. Pure functions of the item list; documents never store
//! totals that did not come from here.

use rust_decimal::Decimal;

use super::items::{
    InventoryLineItem, InventoryTotals, RepricingLineItem, RepricingTotals, StockLineItem,
    StockTotals,
};

/// Transfer and write-off totals.
pub fn stock_totals(items: &[StockLineItem]) -> StockTotals {
    items.iter().fold(StockTotals::default(), |mut acc, item| {
        let qty = Decimal::from(item.qty);
        acc.total_qty += i64::from(item.qty);
        acc.total_price += qty * item.retail_price;
        acc.total_supply += qty * item.supply_price;
        acc
    })
}

pub fn repricing_totals(items: &[RepricingLineItem]) -> RepricingTotals {
    RepricingTotals {
        total: items
            .iter()
            .map(|item| item.retail_price * Decimal::from(item.qty))
            .sum(),
        total_items_count: items.len(),
    }
}

/// Shortages are valued at supply price, surpluses at retail price.
pub fn inventory_totals(items: &[InventoryLineItem]) -> InventoryTotals {
    items.iter().fold(InventoryTotals::default(), |mut acc, item| {
        acc.total_measurement_value += i64::from(item.scanned);

        let difference = item.scanned - item.declared;
        if difference < 0 {
            acc.shortage += 1;
            acc.difference_sum += Decimal::from(difference) * item.supply_price;
        } else if difference > 0 {
            acc.surplus += 1;
            acc.difference_sum += Decimal::from(difference) * item.retail_price;
        }
        acc
    })
}
