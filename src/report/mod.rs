//! Report assembly: derived values and the four display artifacts.
//!
//! Stages after load:
//! `Dataset` -> aggregates (`aggregate`) -> derived values (this module) ->
//! `Artifact`s handed to a renderer.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{AverageWindow, Dataset, MONTH_WINDOW, Month};

pub mod aggregate;
pub mod format;

pub use aggregate::{MonthProductTable, MonthSeries, ProductRevenue};

/// Printed once when revenue outputs are skipped.
pub const MISSING_PRICE_NOTICE: &str = "Error: La columna 'precio_unitario' no existe en el dataset.";

/// Bar chart of total units per product.
#[derive(Debug, Clone)]
pub struct ProductTotalsChart {
    pub totals: BTreeMap<String, u64>,
}

/// Line chart of units per month, one line per product.
#[derive(Debug, Clone)]
pub struct MonthlyTrendChart {
    pub table: MonthProductTable,
}

/// Revenue per product, highest first.
#[derive(Debug, Clone)]
pub struct RevenueTable {
    pub rows: Vec<ProductRevenue>,
}

/// Side-by-side comparison: units per month (peak highlighted) and the
/// average monthly units per product.
#[derive(Debug, Clone)]
pub struct MonthlySummary {
    pub month_totals: MonthSeries,
    pub peak: Option<(Month, u64)>,
    pub averages: Vec<(String, f64)>,
    pub divisor: usize,
}

/// One displayable report artifact.
#[derive(Debug, Clone)]
pub enum Artifact {
    ProductTotals(ProductTotalsChart),
    MonthlyTrend(MonthlyTrendChart),
    RevenueTable(RevenueTable),
    MonthlySummary(MonthlySummary),
}

impl Artifact {
    pub fn title(&self) -> &'static str {
        match self {
            Artifact::ProductTotals(_) => "Ventas por Producto",
            Artifact::MonthlyTrend(_) => "Ventas por Mes y Producto",
            Artifact::RevenueTable(_) => "Tabla Resumen: Ingresos por Producto",
            Artifact::MonthlySummary(_) => "Resumen de Ventas",
        }
    }

    /// Footnote shown under the artifact.
    pub fn caption(&self) -> String {
        match self {
            Artifact::ProductTotals(chart) => {
                let parts: Vec<String> = chart
                    .totals
                    .iter()
                    .map(|(product, qty)| format!("{qty} {product}"))
                    .collect();
                format!("En los {MONTH_WINDOW} meses se han vendido: {}.", parts.join(", "))
            }
            Artifact::MonthlyTrend(chart) => format!(
                "La grafica muestra las ventas de los {} productos por mes.",
                chart.table.by_product.len()
            ),
            Artifact::RevenueTable(_) => {
                format!("La tabla muestra los ingresos por producto de los {MONTH_WINDOW} meses.")
            }
            Artifact::MonthlySummary(summary) => match summary.peak {
                Some((month, units)) => format!("Mes con mas ventas: {month} ({units} unidades)."),
                None => "Sin ventas registradas.".to_string(),
            },
        }
    }
}

/// Serializable digest of a run, used by the JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_units: u64,
    pub units_by_product: BTreeMap<String, u64>,
    pub units_by_month: Vec<MonthUnits>,
    pub peak_month: Option<MonthUnits>,
    pub average_window: AverageWindow,
    pub average_divisor: usize,
    pub monthly_average_by_product: BTreeMap<String, f64>,
    /// `None` when the input had no price column.
    pub revenue_by_product: Option<Vec<ProductRevenue>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthUnits {
    pub month: Month,
    pub units: u64,
}

/// One step of the report, in display order.
#[derive(Debug, Clone)]
pub enum ReportItem {
    Artifact(Artifact),
    /// Diagnostic emitted in place of a skipped artifact.
    Notice(String),
}

/// Everything a renderer needs for one run.
#[derive(Debug, Clone)]
pub struct Report {
    pub items: Vec<ReportItem>,
    pub summary: ReportSummary,
}

impl Report {
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.items.iter().filter_map(|item| match item {
            ReportItem::Artifact(artifact) => Some(artifact),
            ReportItem::Notice(_) => None,
        })
    }

    pub fn notices(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            ReportItem::Notice(message) => Some(message.as_str()),
            ReportItem::Artifact(_) => None,
        })
    }
}

/// Divisor for monthly averages under the given policy.
///
/// `Observed` never returns 0 so an empty month set cannot divide by zero.
pub fn averaging_divisor(dataset: &Dataset, window: AverageWindow) -> usize {
    match window {
        AverageWindow::Fixed => MONTH_WINDOW,
        AverageWindow::Observed => dataset.observed_months().len().max(1),
    }
}

/// Average units per month for each product (full precision).
pub fn monthly_averages(totals: &BTreeMap<String, u64>, divisor: usize) -> Vec<(String, f64)> {
    let divisor = divisor.max(1) as f64;
    totals
        .iter()
        .map(|(product, &total)| (product.clone(), total as f64 / divisor))
        .collect()
}

/// Aggregate, derive and assemble every artifact for `dataset`.
pub fn build_report(dataset: &Dataset, window: AverageWindow) -> Report {
    let totals = aggregate::product_totals(dataset);
    let table = aggregate::month_product_totals(dataset);
    let month_totals = aggregate::month_totals(dataset);
    let revenue = aggregate::revenue_by_product(dataset);

    let divisor = averaging_divisor(dataset, window);
    let averages = monthly_averages(&totals, divisor);
    let peak = month_totals.peak();

    tracing::debug!(
        products = totals.len(),
        months = dataset.observed_months().len(),
        divisor,
        "aggregated sales"
    );

    let mut items = vec![
        ReportItem::Artifact(Artifact::ProductTotals(ProductTotalsChart { totals: totals.clone() })),
        ReportItem::Artifact(Artifact::MonthlyTrend(MonthlyTrendChart { table })),
    ];

    items.push(match &revenue {
        Some(rows) => ReportItem::Artifact(Artifact::RevenueTable(RevenueTable { rows: rows.clone() })),
        None => ReportItem::Notice(MISSING_PRICE_NOTICE.to_string()),
    });

    items.push(ReportItem::Artifact(Artifact::MonthlySummary(MonthlySummary {
        month_totals,
        peak,
        averages: averages.clone(),
        divisor,
    })));

    let summary = ReportSummary {
        total_units: dataset.total_quantity(),
        units_by_product: totals,
        units_by_month: month_totals
            .iter()
            .filter_map(|(month, units)| units.map(|units| MonthUnits { month, units }))
            .collect(),
        peak_month: peak.map(|(month, units)| MonthUnits { month, units }),
        average_window: window,
        average_divisor: divisor,
        monthly_average_by_product: averages.into_iter().collect(),
        revenue_by_product: revenue,
    };

    Report { items, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Pricing, SalesRecord};

    fn rec(product: &str, month: Month, quantity: u64, unit_price: Option<f64>) -> SalesRecord {
        SalesRecord {
            product: product.to_string(),
            month,
            quantity,
            unit_price,
        }
    }

    fn single_product(pricing: Pricing) -> Dataset {
        let price = (pricing == Pricing::Available).then_some(2.5);
        let records = Month::ALL
            .into_iter()
            .zip([10, 20, 30, 0, 0, 0])
            .map(|(m, q)| rec("Camisa", m, q, price))
            .collect();
        Dataset::new(records, pricing)
    }

    #[test]
    fn fixed_window_averages_over_six_months() {
        let report = build_report(&single_product(Pricing::Available), AverageWindow::Fixed);
        let Some(Artifact::MonthlySummary(summary)) = report.artifacts().last() else {
            panic!("summary artifact must be last");
        };
        assert_eq!(summary.divisor, 6);
        assert_eq!(summary.averages, vec![("Camisa".to_string(), 10.0)]);
        assert_eq!(summary.peak, Some((Month::Marzo, 30)));
    }

    #[test]
    fn observed_window_counts_distinct_months() {
        let ds = Dataset::new(
            vec![
                rec("Camisa", Month::Enero, 10, None),
                rec("Camisa", Month::Marzo, 20, None),
                rec("Zapato", Month::Marzo, 9, None),
            ],
            Pricing::Missing,
        );
        assert_eq!(averaging_divisor(&ds, AverageWindow::Observed), 2);
        assert_eq!(averaging_divisor(&ds, AverageWindow::Fixed), 6);

        let totals = aggregate::product_totals(&ds);
        let averages = monthly_averages(&totals, 2);
        assert_eq!(averages, vec![("Camisa".to_string(), 15.0), ("Zapato".to_string(), 4.5)]);
    }

    #[test]
    fn all_four_artifacts_in_order_with_pricing() {
        let report = build_report(&single_product(Pricing::Available), AverageWindow::Fixed);
        let titles: Vec<&str> = report.artifacts().map(Artifact::title).collect();
        assert_eq!(
            titles,
            vec![
                "Ventas por Producto",
                "Ventas por Mes y Producto",
                "Tabla Resumen: Ingresos por Producto",
                "Resumen de Ventas",
            ]
        );
        assert_eq!(report.notices().count(), 0);
        let revenue = report.summary.revenue_by_product.unwrap();
        assert!((revenue[0].revenue - 150.0).abs() < 1e-9);
    }

    #[test]
    fn missing_pricing_skips_revenue_with_one_notice() {
        let report = build_report(&single_product(Pricing::Missing), AverageWindow::Fixed);
        assert_eq!(report.artifacts().count(), 3);
        assert!(!report.artifacts().any(|a| matches!(a, Artifact::RevenueTable(_))));
        assert_eq!(report.notices().collect::<Vec<_>>(), vec![MISSING_PRICE_NOTICE]);
        // The notice takes the revenue table's slot.
        assert!(matches!(report.items[2], ReportItem::Notice(_)));
        assert!(report.summary.revenue_by_product.is_none());
    }

    #[test]
    fn summary_reports_peak_and_month_totals() {
        let report = build_report(&single_product(Pricing::Missing), AverageWindow::Fixed);
        assert_eq!(report.summary.total_units, 60);
        assert_eq!(report.summary.peak_month, Some(MonthUnits { month: Month::Marzo, units: 30 }));
        assert_eq!(report.summary.units_by_month.len(), 6);
        assert_eq!(report.summary.units_by_month[0], MonthUnits { month: Month::Enero, units: 10 });
    }

    #[test]
    fn captions_describe_the_data() {
        let report = build_report(&single_product(Pricing::Missing), AverageWindow::Fixed);
        let artifacts: Vec<&Artifact> = report.artifacts().collect();
        assert_eq!(artifacts[0].caption(), "En los 6 meses se han vendido: 60 Camisa.");
        assert_eq!(artifacts[2].caption(), "Mes con mas ventas: Marzo (30 unidades).");
    }
}
