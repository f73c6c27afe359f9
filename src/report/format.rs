//! Formatted terminal output: run header, revenue table, number formatting.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (the text renderer and TUI share these helpers)

use crate::io::ingest::IngestedData;
use crate::report::{ProductRevenue, Report};

/// Format the run header (input stats + skipped rows).
pub fn format_run_summary(ingest: &IngestedData, report: &Report) -> String {
    let mut out = String::new();

    out.push_str("=== ventas - Reporte de Ventas ===\n");
    out.push_str(&format!(
        "Rows: read={} | used={} | skipped={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    out.push_str(&format!(
        "Products: {} | Units: {}\n",
        report.summary.units_by_product.len(),
        report.summary.total_units
    ));
    out.push_str(&format!(
        "Average divisor: {} ({:?})\n",
        report.summary.average_divisor, report.summary.average_window
    ));

    if !ingest.row_errors.is_empty() {
        out.push_str("\nSkipped rows (first 10):\n");
        for e in ingest.row_errors.iter().take(10) {
            out.push_str(&format!("  line {}: {}\n", e.line, e.message));
        }
    }

    out
}

/// Format the revenue table (product, formatted total).
pub fn format_revenue_table(rows: &[ProductRevenue]) -> String {
    let width = rows
        .iter()
        .map(|r| r.product.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(8, 24);

    let mut out = String::new();
    out.push_str(&format!("{:<width$} {:>16}\n", "Producto", "Ingresos Totales"));
    out.push_str(&format!("{:-<width$} {:-<16}\n", "", ""));
    for r in rows {
        out.push_str(&format!(
            "{:<width$} {:>16}\n",
            truncate(&r.product, width),
            format_currency(r.revenue)
        ));
    }
    out
}

/// `$1,234.56` style currency (two decimals, comma thousands separator).
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{sign}${}.{frac_part}", group_thousands(int_part))
}

/// Integer with comma thousands separators.
pub fn format_units(value: u64) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_has_separators_and_two_decimals() {
        assert_eq!(format_currency(29.97), "$29.97");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_units(241), "241");
        assert_eq!(format_units(12000), "12,000");
    }

    #[test]
    fn revenue_table_layout() {
        let rows = vec![
            ProductRevenue { product: "Zapato".to_string(), revenue: 8440.0 },
            ProductRevenue { product: "Camisa".to_string(), revenue: 3.0 * 9.99 },
        ];
        let expected = concat!(
            "Producto Ingresos Totales\n",
            "-------- ----------------\n",
            "Zapato          $8,440.00\n",
            "Camisa             $29.97\n",
        );
        assert_eq!(format_revenue_table(&rows), expected);
    }

    #[test]
    fn truncate_marks_cut_labels() {
        assert_eq!(truncate("Pantalon", 10), "Pantalon");
        assert_eq!(truncate("Pantalones largos", 6), "Panta.");
    }
}
