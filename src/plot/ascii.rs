//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks when no interactive terminal is available
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - bars: `#` with the numeric value printed after each bar
//! - line chart: one digit marker per product, `.` segments between months
//! - peak month: trailing `*`

use crate::domain::Month;
use crate::report::format::{format_currency, format_revenue_table, format_units, truncate};
use crate::report::{Artifact, MonthProductTable, MonthlySummary};

const LABEL_MAX: usize = 16;

/// Render one artifact as a titled text block.
pub fn render_artifact(artifact: &Artifact, width: usize, height: usize) -> String {
    let mut out = String::new();
    let title = artifact.title();
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(title.chars().count()));
    out.push('\n');

    let body = match artifact {
        Artifact::ProductTotals(chart) => {
            let rows: Vec<BarRow> = chart
                .totals
                .iter()
                .map(|(product, &qty)| BarRow::new(product, qty as f64, format_units(qty)))
                .collect();
            render_bars(&rows, bar_width(width, &rows))
        }
        Artifact::MonthlyTrend(chart) => render_line_chart(&chart.table, width, height),
        Artifact::RevenueTable(table) => {
            let mut text = format_revenue_table(&table.rows);
            let total: f64 = table.rows.iter().map(|r| r.revenue).sum();
            text.push_str(&format!("Total: {}\n", format_currency(total)));
            text
        }
        Artifact::MonthlySummary(summary) => render_summary(summary, width),
    };
    out.push_str(&body);
    out.push_str(&format!("({})\n", artifact.caption()));
    out
}

/// One horizontal bar.
#[derive(Debug, Clone)]
pub struct BarRow {
    pub label: String,
    pub value: f64,
    pub value_label: String,
    pub highlight: bool,
}

impl BarRow {
    pub fn new(label: &str, value: f64, value_label: String) -> Self {
        Self {
            label: truncate(label, LABEL_MAX),
            value,
            value_label,
            highlight: false,
        }
    }
}

/// Render labelled horizontal bars scaled to the largest value.
pub fn render_bars(rows: &[BarRow], bar_width: usize) -> String {
    let label_width = rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);
    let max = rows.iter().map(|r| r.value).fold(0.0_f64, f64::max);

    let mut out = String::new();
    for r in rows {
        let len = if max > 0.0 {
            ((r.value / max) * bar_width as f64).round() as usize
        } else {
            0
        };
        let bar = "#".repeat(len.min(bar_width));
        let mark = if r.highlight { " *" } else { "" };
        out.push_str(
            format!(
                "{:<label_width$} |{:<bar_width$} {}{mark}",
                r.label, bar, r.value_label
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

fn bar_width(total_width: usize, rows: &[BarRow]) -> usize {
    let label_width = rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);
    let value_width = rows.iter().map(|r| r.value_label.len()).max().unwrap_or(0);
    total_width.saturating_sub(label_width + value_width + 5).max(10)
}

fn render_summary(summary: &MonthlySummary, width: usize) -> String {
    let peak_month = summary.peak.map(|(m, _)| m);

    let month_rows: Vec<BarRow> = summary
        .month_totals
        .iter()
        .map(|(month, units)| {
            let units = units.unwrap_or(0);
            let mut row = BarRow::new(month.display_name(), units as f64, format_units(units));
            row.highlight = Some(month) == peak_month;
            row
        })
        .collect();

    let avg_rows: Vec<BarRow> = summary
        .averages
        .iter()
        .map(|(product, avg)| BarRow::new(product, *avg, format!("{avg:.2}")))
        .collect();

    let mut out = String::new();
    out.push_str("Unidades Totales\n");
    out.push_str(&render_bars(&month_rows, bar_width(width, &month_rows)));
    out.push('\n');
    out.push_str(&format!(
        "Promedio Mensual por Producto (total / {})\n",
        summary.divisor
    ));
    out.push_str(&render_bars(&avg_rows, bar_width(width, &avg_rows)));
    out
}

/// Render the month x product line chart followed by a table of the plotted values.
pub fn render_line_chart(table: &MonthProductTable, width: usize, height: usize) -> String {
    const AXIS: usize = 7;

    let plot_width = width.saturating_sub(AXIS).max(Month::ALL.len() * 4);
    let height = height.max(5);
    let y_max = (table.max_value() as f64 * 1.1).max(1.0);

    let mut grid = vec![vec![' '; plot_width]; height];
    let products: Vec<&str> = table.products().collect();

    // Segments first so the markers overlay them.
    for product in &products {
        let mut prev: Option<(usize, usize)> = None;
        for month in Month::ALL {
            match table.cell(month, product) {
                Some(v) => {
                    let x = map_x(month.index(), plot_width);
                    let y = map_y(v as f64, y_max, height);
                    if let Some((x0, y0)) = prev {
                        draw_line(&mut grid, x0, y0, x, y, '.');
                    }
                    prev = Some((x, y));
                }
                None => prev = None,
            }
        }
    }

    for (idx, product) in products.iter().enumerate() {
        let marker = marker_for(idx);
        for month in Month::ALL {
            if let Some(v) = table.cell(month, product) {
                let x = map_x(month.index(), plot_width);
                let y = map_y(v as f64, y_max, height);
                grid[y][x] = marker;
            }
        }
    }

    let mut out = String::new();
    for (row_idx, row) in grid.into_iter().enumerate() {
        let axis_label = if row_idx == 0 {
            format!("{:>5.0}", y_max)
        } else if row_idx == height - 1 {
            format!("{:>5}", 0)
        } else {
            " ".repeat(5)
        };
        let line = format!("{axis_label} |{}", row.into_iter().collect::<String>());
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push_str(&format!("{} +{}\n", " ".repeat(5), "-".repeat(plot_width)));
    out.push_str(&format!("{}{}\n", " ".repeat(AXIS), month_axis(plot_width).trim_end()));

    out.push('\n');
    for (idx, product) in products.iter().enumerate() {
        out.push_str(&format!("{} = {}\n", marker_for(idx), product));
    }

    out.push('\n');
    out.push_str(&format_month_product_values(table));
    out
}

/// Tabulate the values plotted by the line chart (`-` for an empty cell).
pub fn format_month_product_values(table: &MonthProductTable) -> String {
    let label_width = table
        .products()
        .map(|p| p.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(8, LABEL_MAX);

    let mut out = String::new();
    let mut header = format!("{:<label_width$}", "Producto");
    for month in Month::ALL {
        header.push_str(&format!(" {:>6}", month.short_name()));
    }
    out.push_str(&header);
    out.push('\n');

    for product in table.products() {
        let mut line = format!("{:<label_width$}", truncate(product, label_width));
        for month in Month::ALL {
            let cell = table
                .cell(month, product)
                .map(format_units)
                .unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" {cell:>6}"));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn marker_for(idx: usize) -> char {
    char::from_digit(((idx % 9) + 1) as u32, 10).unwrap_or('o')
}

fn month_axis(plot_width: usize) -> String {
    let mut row = vec![' '; plot_width];
    for month in Month::ALL {
        let x = map_x(month.index(), plot_width);
        let start = x.saturating_sub(1);
        for (offset, ch) in month.short_name().chars().enumerate() {
            if let Some(cell) = row.get_mut(start + offset) {
                *cell = ch;
            }
        }
    }
    row.into_iter().collect()
}

fn map_x(month_idx: usize, width: usize) -> usize {
    let width = width.max(2);
    let last = (Month::ALL.len() - 1) as f64;
    // Leave one column of margin on each side for the month labels.
    let u = month_idx as f64 / last;
    1 + (u * (width as f64 - 3.0)).round() as usize
}

fn map_y(y: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = (y / y_max).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
