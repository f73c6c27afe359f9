//! Plotters-powered month x product line chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use super::TrendSeries;

/// A render-only chart description.
///
/// All series and bounds are computed outside the render call, so `render()`
/// only draws.
pub(crate) struct TrendPlottersChart<'a> {
    /// One entry per product; x is the canonical month index.
    pub series: &'a [TrendSeries],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for TrendPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Month names and value ticks are drawn by the caller in terminal
            // cells; Plotters only draws the horizontal guide lines.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_x_axis()
                .disable_y_axis()
                .y_labels(5)
                .light_line_style(&RGBColor(60, 60, 60))
                .bold_line_style(&RGBColor(90, 90, 90))
                .draw()?;

            for s in self.series {
                let (r, g, b) = s.color;
                let color = RGBColor(r, g, b);

                for segment in &s.segments {
                    chart.draw_series(LineSeries::new(segment.iter().copied(), &color))?;
                }

                // Value label just above every plotted point.
                let label_offset = (y1 - y0) * 0.04;
                chart.draw_series(s.segments.iter().flatten().map(|&(x, y)| {
                    Text::new(
                        format!("{y:.0}"),
                        (x, y + label_offset),
                        ("sans-serif", 10).into_font().color(&color),
                    )
                }))?;
                chart.draw_series(
                    s.segments
                        .iter()
                        .flatten()
                        .map(|&(x, y)| Pixel::new((x, y), WHITE)),
                )?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
