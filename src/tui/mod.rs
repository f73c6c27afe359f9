//! Ratatui-based terminal viewer.
//!
//! Each artifact gets the whole screen. `show` blocks until the user moves on
//! (Enter / Space / → / n) or quits (q / Esc / Ctrl+C), so artifacts are
//! displayed strictly one after another.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

use crate::app::pipeline::{ArtifactSink, Flow};
use crate::domain::Month;
use crate::error::AppError;
use crate::report::format::{format_currency, format_units};
use crate::report::{Artifact, MonthProductTable, MonthlySummary, ProductRevenue};

mod plotters_chart;

use plotters_chart::TrendPlottersChart;

const HEADER_BLUE: Color = Color::Rgb(0x4F, 0x81, 0xBD);
const ZEBRA_GRAY: Color = Color::Rgb(0xE6, 0xE6, 0xE6);
const PEAK_GREEN: Color = Color::Rgb(60, 179, 113);
const MONTH_GREEN: Color = Color::Rgb(144, 238, 144);
const AVERAGE_COLORS: [Color; 3] = [
    Color::Rgb(173, 216, 230),
    Color::Rgb(240, 128, 128),
    Color::Rgb(255, 255, 224),
];

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::Terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::Terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Interactive `ArtifactSink`.
pub struct TerminalViewer {
    // Field order matters: the terminal is dropped before the guard restores it.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    _guard: TerminalGuard,
    total: usize,
    position: usize,
    status: Option<String>,
    deferred: Vec<String>,
}

impl TerminalViewer {
    /// Enter the alternate screen. `total` is the number of artifacts to show.
    pub fn new(total: usize) -> Result<Self, AppError> {
        let guard = TerminalGuard::new()?;
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
            .map_err(|e| AppError::Terminal(format!("Failed to initialize terminal: {e}")))?;
        Ok(Self {
            terminal,
            _guard: guard,
            total,
            position: 0,
            status: None,
            deferred: Vec::new(),
        })
    }

    /// Restore the terminal and hand back notices that must reach stdout.
    pub fn finish(self) -> Vec<String> {
        let deferred = self.deferred;
        drop(self.terminal);
        drop(self._guard);
        deferred
    }

    fn wait_for_key(&mut self, artifact: &Artifact) -> Result<Flow, AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                let view = ViewState {
                    position: self.position,
                    total: self.total,
                    status: self.status.as_deref(),
                };
                self.terminal
                    .draw(|f| draw_artifact(f, artifact, &view))
                    .map_err(|e| AppError::Terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::Terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::Terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(Flow::Quit);
                    }
                    if let Some(flow) = flow_for_key(key.code) {
                        return Ok(flow);
                    }
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
    }
}

impl ArtifactSink for TerminalViewer {
    fn show(&mut self, artifact: &Artifact) -> Result<Flow, AppError> {
        self.position += 1;
        let flow = self.wait_for_key(artifact)?;
        self.status = None;
        Ok(flow)
    }

    fn notice(&mut self, message: &str) -> Result<(), AppError> {
        self.status = Some(message.to_string());
        self.deferred.push(message.to_string());
        Ok(())
    }
}

fn flow_for_key(code: KeyCode) -> Option<Flow> {
    match code {
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Right | KeyCode::Char('n') => Some(Flow::Continue),
        KeyCode::Char('q') | KeyCode::Esc => Some(Flow::Quit),
        _ => None,
    }
}

/// Viewer chrome that is not part of the artifact itself.
struct ViewState<'a> {
    position: usize,
    total: usize,
    status: Option<&'a str>,
}

fn draw_artifact(frame: &mut ratatui::Frame<'_>, artifact: &Artifact, view: &ViewState<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(4)])
        .split(frame.area());

    draw_header(frame, chunks[0], artifact, view);
    match artifact {
        Artifact::ProductTotals(chart) => {
            let bars: Vec<(String, u64, String, Color)> = chart
                .totals
                .iter()
                .map(|(product, &qty)| (product.clone(), qty, format_units(qty), Color::LightBlue))
                .collect();
            draw_bars(frame, chunks[1], "Cantidad Vendida", &bars);
        }
        Artifact::MonthlyTrend(chart) => draw_trend(frame, chunks[1], &chart.table),
        Artifact::RevenueTable(table) => draw_revenue(frame, chunks[1], &table.rows),
        Artifact::MonthlySummary(summary) => draw_summary(frame, chunks[1], summary),
    }
    draw_footer(frame, chunks[2], artifact, view);
}

fn draw_header(frame: &mut ratatui::Frame<'_>, area: Rect, artifact: &Artifact, view: &ViewState<'_>) {
    let line = Line::from(vec![
        Span::styled(
            artifact.title(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  ({}/{})", view.position, view.total),
            Style::default().fg(Color::Gray),
        ),
    ]);
    let p = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn draw_footer(frame: &mut ratatui::Frame<'_>, area: Rect, artifact: &Artifact, view: &ViewState<'_>) {
    let mut lines = vec![Line::from(Span::styled(
        artifact.caption(),
        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
    ))];

    let mut help = vec![Span::styled(
        "Enter/Space next  q quit",
        Style::default().fg(Color::Gray),
    )];
    if let Some(status) = view.status {
        help.push(Span::raw(" | "));
        help.push(Span::styled(status.to_string(), Style::default().fg(Color::Yellow)));
    }
    lines.push(Line::from(help));

    let p = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, area);
}

/// Vertical bar chart with a value label on each bar.
fn draw_bars(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, bars: &[(String, u64, String, Color)]) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);

    let n = bars.len().max(1) as u16;
    let gap = 2u16;
    let bar_width = (inner.width / n).saturating_sub(gap).clamp(3, 20);

    let data: Vec<Bar> = bars
        .iter()
        .map(|(label, value, text, color)| {
            Bar::default()
                .value(*value)
                .label(Line::from(label.clone()))
                .text_value(text.clone())
                .style(Style::default().fg(*color))
                .value_style(Style::default().fg(Color::Black).bg(*color).add_modifier(Modifier::BOLD))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&data))
        .bar_width(bar_width)
        .bar_gap(gap);
    frame.render_widget(chart, area);
}

fn draw_trend(frame: &mut ratatui::Frame<'_>, area: Rect, table: &MonthProductTable) {
    let block = Block::default().title("Cantidad Vendida por Mes").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(20)])
        .split(inner);

    let series = trend_series(table);
    let y_max = (table.max_value() as f64 * 1.15).max(1.0);
    let x_bounds = [-0.5, (Month::ALL.len() - 1) as f64 + 0.5];
    let y_bounds = [0.0, y_max];

    let (chart_rect, insets) = chart_layout(columns[0]);
    let widget = TrendPlottersChart {
        series: &series,
        x_bounds,
        y_bounds,
    };
    frame.render_widget(widget, chart_rect);
    if let Some(insets) = insets {
        draw_axis_ticks(frame, columns[0], chart_rect, insets, x_bounds, y_bounds);
    }

    let legend: Vec<Line> = std::iter::once(Line::from(Span::styled(
        "Producto",
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .chain(series.iter().map(|s| {
        Line::from(vec![
            Span::styled("── ", Style::default().fg(ratatui_color(s.color))),
            Span::raw(s.product.clone()),
        ])
    }))
    .collect();
    frame.render_widget(
        Paragraph::new(Text::from(legend)).block(Block::default().borders(Borders::LEFT)),
        columns[1],
    );
}

/// One product's line, split at months without sales.
pub(crate) struct TrendSeries {
    pub product: String,
    pub color: (u8, u8, u8),
    pub segments: Vec<Vec<(f64, f64)>>,
}

const SERIES_PALETTE: [(u8, u8, u8); 10] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
    (227, 119, 194),
    (127, 127, 127),
    (188, 189, 34),
    (23, 190, 207),
];

fn trend_series(table: &MonthProductTable) -> Vec<TrendSeries> {
    table
        .products()
        .enumerate()
        .map(|(idx, product)| {
            let mut segments: Vec<Vec<(f64, f64)>> = Vec::new();
            let mut current = Vec::new();
            for month in Month::ALL {
                match table.cell(month, product) {
                    Some(v) => current.push((month.index() as f64, v as f64)),
                    None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                    None => {}
                }
            }
            if !current.is_empty() {
                segments.push(current);
            }
            TrendSeries {
                product: product.to_string(),
                color: SERIES_PALETTE[idx % SERIES_PALETTE.len()],
                segments,
            }
        })
        .collect()
}

fn ratatui_color((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

fn draw_revenue(frame: &mut ratatui::Frame<'_>, area: Rect, rows: &[ProductRevenue]) {
    let header = Row::new(vec!["Producto", "Ingresos Totales"]).style(
        Style::default()
            .fg(Color::White)
            .bg(HEADER_BLUE)
            .add_modifier(Modifier::BOLD),
    );

    let body = rows.iter().enumerate().map(|(idx, r)| {
        let zebra = if idx % 2 == 1 {
            Style::default().fg(Color::Black).bg(ZEBRA_GRAY)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(r.product.clone()),
            Cell::from(format_currency(r.revenue)).style(Style::default().add_modifier(Modifier::BOLD | Modifier::ITALIC)),
        ])
        .style(zebra)
    });

    let width = area.width.min(60);
    let height = (rows.len() as u16 + 3).min(area.height);
    let centered = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let table = Table::new(body, [Constraint::Percentage(50), Constraint::Percentage(50)])
        .header(header)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(table, centered);
}

fn draw_summary(frame: &mut ratatui::Frame<'_>, area: Rect, summary: &MonthlySummary) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let peak = summary.peak.map(|(m, _)| m);
    let months: Vec<(String, u64, String, Color)> = summary
        .month_totals
        .iter()
        .map(|(month, units)| {
            let units = units.unwrap_or(0);
            let color = if Some(month) == peak { PEAK_GREEN } else { MONTH_GREEN };
            (month.short_name().to_string(), units, format_units(units), color)
        })
        .collect();
    draw_bars(frame, halves[0], "Unidades Totales", &months);

    // BarChart values are integers; scale by 100 and keep the exact label.
    let averages: Vec<(String, u64, String, Color)> = summary
        .averages
        .iter()
        .enumerate()
        .map(|(idx, (product, avg))| {
            (
                product.clone(),
                (avg * 100.0).round() as u64,
                format!("{avg:.2}"),
                AVERAGE_COLORS[idx % AVERAGE_COLORS.len()],
            )
        })
        .collect();
    let title = format!("Promedio Mensual por Producto (/ {})", summary.divisor);
    draw_bars(frame, halves[1], &title, &averages);
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 7,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

/// Month names under the chart and a few value ticks on the left.
fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let style = Style::default().fg(Color::Gray);
    let y = chart.y + chart.height;

    if y < inner.y + inner.height {
        for month in Month::ALL {
            let u = (month.index() as f64 - x_bounds[0]) / (x_bounds[1] - x_bounds[0]);
            let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
            let label = month.short_name();
            let start = x.saturating_sub((label.len() / 2) as u16);
            frame.render_widget(
                Paragraph::new(label).style(style),
                Rect {
                    x: start,
                    y,
                    width: label.len() as u16,
                    height: 1,
                },
            );
        }
    }

    let ticks = 5usize;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.0}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("Mes").alignment(Alignment::Center).style(style);
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    use crate::domain::{AverageWindow, Dataset, Pricing, SalesRecord};
    use crate::report::build_report;

    fn rendered(artifact: &Artifact, status: Option<&str>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let view = ViewState {
            position: 1,
            total: 4,
            status,
        };
        terminal.draw(|f| draw_artifact(f, artifact, &view)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn sample_report() -> crate::report::Report {
        let records = vec![
            SalesRecord {
                product: "Camisa".to_string(),
                month: Month::Enero,
                quantity: 12,
                unit_price: Some(9.99),
            },
            SalesRecord {
                product: "Zapato".to_string(),
                month: Month::Febrero,
                quantity: 4,
                unit_price: Some(55.0),
            },
        ];
        build_report(&Dataset::new(records, Pricing::Available), AverageWindow::Fixed)
    }

    #[test]
    fn keys_map_to_flow() {
        assert_eq!(flow_for_key(KeyCode::Enter), Some(Flow::Continue));
        assert_eq!(flow_for_key(KeyCode::Char(' ')), Some(Flow::Continue));
        assert_eq!(flow_for_key(KeyCode::Char('q')), Some(Flow::Quit));
        assert_eq!(flow_for_key(KeyCode::Esc), Some(Flow::Quit));
        assert_eq!(flow_for_key(KeyCode::Char('x')), None);
    }

    #[test]
    fn product_bars_show_title_and_values() {
        let report = sample_report();
        let screen = rendered(report.artifacts().next().unwrap(), None);
        assert!(screen.contains("Ventas por Producto"));
        assert!(screen.contains("(1/4)"));
        assert!(screen.contains("Camisa"));
        assert!(screen.contains("12"));
    }

    #[test]
    fn revenue_table_formats_currency() {
        let report = sample_report();
        let revenue = report.artifacts().nth(2).unwrap();
        let screen = rendered(revenue, Some("Aviso"));
        assert!(screen.contains("Ingresos Totales"));
        assert!(screen.contains("$220.00"));
        assert!(screen.contains("$119.88"));
        assert!(screen.contains("Aviso"));
    }

    #[test]
    fn summary_uses_canonical_month_labels() {
        let report = sample_report();
        let summary = report.artifacts().last().unwrap();
        let screen = rendered(summary, None);
        assert!(screen.contains("Unidades Totales"));
        assert!(screen.contains("2.00"));
    }

    #[test]
    fn trend_series_break_at_missing_months() {
        let report = sample_report();
        let Some(Artifact::MonthlyTrend(chart)) = report.artifacts().nth(1) else {
            panic!("trend chart must be second");
        };
        let series = trend_series(&chart.table);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].product, "Camisa");
        assert_eq!(series[0].segments, vec![vec![(0.0, 12.0)]]);
        assert_eq!(series[1].segments, vec![vec![(1.0, 4.0)]]);
    }
}
