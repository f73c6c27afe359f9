//! Grouped summation over a `Dataset`.
//!
//! All month-keyed results are stored in canonical slots (`Month::index`), so
//! ordering never depends on the order rows appeared in the CSV.
//!
//! Sums saturate at `u64::MAX`. A loaded dataset never reaches it because
//! ingest rejects rows that would overflow the table total.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Dataset, Month};

/// Six canonical month slots. `None` means the month has no rows at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonthSeries {
    values: [Option<u64>; 6],
}

impl MonthSeries {
    pub fn add(&mut self, month: Month, quantity: u64) {
        let slot = &mut self.values[month.index()];
        *slot = Some(slot.unwrap_or(0).saturating_add(quantity));
    }

    pub fn get(&self, month: Month) -> Option<u64> {
        self.values[month.index()]
    }

    /// `(month, value)` pairs in canonical order, including absent months.
    pub fn iter(&self) -> impl Iterator<Item = (Month, Option<u64>)> + '_ {
        Month::ALL.into_iter().map(|m| (m, self.get(m)))
    }

    pub fn total(&self) -> u64 {
        self.values.iter().flatten().fold(0u64, |acc, &v| acc.saturating_add(v))
    }

    /// Month with the largest total. Ties go to the earliest canonical month;
    /// absent months are never chosen.
    pub fn peak(&self) -> Option<(Month, u64)> {
        self.iter()
            .filter_map(|(m, v)| v.map(|v| (m, v)))
            .fold(None, |best, (m, v)| match best {
                Some((_, best_v)) if best_v >= v => best,
                _ => Some((m, v)),
            })
    }
}

/// Month x product quantity matrix.
#[derive(Debug, Clone, Default)]
pub struct MonthProductTable {
    /// Product -> per-month totals. Keys iterate alphabetically.
    pub by_product: BTreeMap<String, MonthSeries>,
}

impl MonthProductTable {
    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.by_product.keys().map(String::as_str)
    }

    /// Quantity for one (month, product) cell; `None` when there were no rows.
    pub fn cell(&self, month: Month, product: &str) -> Option<u64> {
        self.by_product.get(product).and_then(|s| s.get(month))
    }

    /// Largest cell value (0 for an empty table).
    pub fn max_value(&self) -> u64 {
        self.by_product
            .values()
            .flat_map(|s| s.iter().filter_map(|(_, v)| v))
            .max()
            .unwrap_or(0)
    }
}

/// Revenue total for one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRevenue {
    pub product: String,
    pub revenue: f64,
}

/// Total quantity per product, keyed alphabetically.
pub fn product_totals(dataset: &Dataset) -> BTreeMap<String, u64> {
    let mut out = BTreeMap::new();
    for r in &dataset.records {
        let total = out.entry(r.product.clone()).or_insert(0u64);
        *total = total.saturating_add(r.quantity);
    }
    out
}

/// Total quantity per month in canonical order.
pub fn month_totals(dataset: &Dataset) -> MonthSeries {
    let mut out = MonthSeries::default();
    for r in &dataset.records {
        out.add(r.month, r.quantity);
    }
    out
}

/// Total quantity per (month, product).
pub fn month_product_totals(dataset: &Dataset) -> MonthProductTable {
    let mut table = MonthProductTable::default();
    for r in &dataset.records {
        table
            .by_product
            .entry(r.product.clone())
            .or_default()
            .add(r.month, r.quantity);
    }
    table
}

/// Revenue per product, highest first (ties by name).
///
/// Returns `None` when the dataset has no price column. Rows with an empty
/// price cell are left out of the sums.
pub fn revenue_by_product(dataset: &Dataset) -> Option<Vec<ProductRevenue>> {
    if !dataset.has_pricing() {
        return None;
    }

    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for r in &dataset.records {
        if let Some(revenue) = r.revenue() {
            *sums.entry(r.product.as_str()).or_insert(0.0) += revenue;
        }
    }

    let mut out: Vec<ProductRevenue> = sums
        .into_iter()
        .map(|(product, revenue)| ProductRevenue {
            product: product.to_string(),
            revenue,
        })
        .collect();
    out.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.product.cmp(&b.product))
    });
    Some(out)
}
