use std::fmt;
use log::debug;
use plotters::prelude::*;
use plotters::style::Palette99;
use plotters::series::DashedLineSeries;
use plotters::drawing::DrawingAreaErrorKind;

use ds_model::Equilibrium;

use crate::views::{Overlay, Range};

#[derive(Debug)]
pub enum PlotError {
    /// Nothing to draw.
    EmptyOverlay,
    /// Backend or layout failure, e.g. an unwritable file.
    Drawing(String),
}

impl fmt::Display for PlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyOverlay => write!(f, "no trajectories to plot"),
            Self::Drawing(msg) => write!(f, "plotting failed: {}", msg),
        }
    }
}

impl std::error::Error for PlotError {}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for PlotError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        Self::Drawing(e.to_string())
    }
}

const SIZE: (u32, u32) = (1024, 600);

/// Dash length and gap in pixels of the resistant time-series curves.
/// Sensitive cells are drawn solid.
const RESISTANT_DASH: (u32, u32) = (8, 4);

/// Legend sample of a dashed curve: two dashes over 20 pixels.
fn legend_dashes() -> [(i32, i32); 2] {
    let (dash, gap) = (RESISTANT_DASH.0 as i32, RESISTANT_DASH.1 as i32);
    [(0, dash), (dash + gap, 20)]
}

/// Add some headroom above the data and always show zero.
fn padded((lo, hi): Range) -> Range {
    let lo = lo.min(0.0);
    let width = hi - lo;
    if width <= 0.0 {
        (lo, lo + 1.0)
    } else {
        (lo, hi + 0.05 * width)
    }
}

fn contains((lo, hi): Range, v: f64) -> bool {
    lo <= v && v <= hi
}

/// Compact tick labels for cell counts.
fn axis_label(v: f64) -> String {
    if v != 0.0 && v.abs() >= 1e5 {
        format!("{:.1e}", v)
    } else {
        format!("{}", v)
    }
}

/// Colours for (s, r) of one overlay entry. A single trajectory keeps the
/// classic blue/red pair.
fn entry_colors(overlay_len: usize, index: usize) -> (RGBAColor, RGBAColor) {
    if overlay_len == 1 {
        (BLUE.to_rgba(), RED.to_rgba())
    } else {
        (Palette99::pick(2 * index).to_rgba(), Palette99::pick(2 * index + 1).to_rgba())
    }
}

/// The two wing points of an arrowhead at `tip`, pointing from `from`, in
/// backend pixels.
fn arrowhead(from: (i32, i32), tip: (i32, i32), length: f64, width: f64) -> Option<[(i32, i32); 2]> {
    let dx = (tip.0 - from.0) as f64;
    let dy = (tip.1 - from.1) as f64;
    let norm = (dx * dx + dy * dy).sqrt();
    if norm < 1e-9 {
        return None;
    }
    let (ux, uy) = (dx / norm, dy / norm);
    let base = (tip.0 as f64 - length * ux, tip.1 as f64 - length * uy);
    let left = (base.0 - width * uy, base.1 + width * ux);
    let right = (base.0 + width * uy, base.1 - width * ux);
    Some([
        (left.0.round() as i32, left.1.round() as i32),
        (right.0.round() as i32, right.1.round() as i32),
    ])
}

/// Cell counts over time: one solid line per population and trajectory.
pub fn plot_time_series(overlay: &Overlay, filename: &str, title: &str) -> Result<(), PlotError> {
    let (t0, t1) = overlay.time_range().ok_or(PlotError::EmptyOverlay)?;
    let (y0, y1) = padded(overlay.count_range().ok_or(PlotError::EmptyOverlay)?);

    let root = SVGBackend::new(filename, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(t0..t1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("Duration (hours)")
        .y_desc("Cells Population")
        .y_label_formatter(&|y| axis_label(*y))
        .light_line_style(RGBColor(220, 220, 220))
        .axis_desc_style(("sans-serif", 18))
        .label_style(("sans-serif", 16))
        .draw()?;

    for entry in overlay.iter() {
        let (s_color, r_color) = entry_colors(overlay.len(), entry.index);
        let suffix = if overlay.len() == 1 { String::new() } else { format!(" ({})", entry.label) };

        chart.draw_series(LineSeries::new(
            entry.time_series.s.iter().copied(),
            s_color.stroke_width(2),
        ))?
            .label(format!("S{}", suffix))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], s_color.stroke_width(2)));

        chart.draw_series(DashedLineSeries::new(
            entry.time_series.r.iter().copied(),
            RESISTANT_DASH.0,
            RESISTANT_DASH.1,
            r_color.stroke_width(2),
        ))?
            .label(format!("R{}", suffix))
            .legend(move |(x, y)| {
                let [(a0, a1), (b0, b1)] = legend_dashes();
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(a0, 0), (a1, 0)], r_color.stroke_width(2))
                    + PathElement::new(vec![(b0, 0), (b1, 0)], r_color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .position(SeriesLabelPosition::UpperRight)
        .label_font(("sans-serif", 16).into_font())
        .draw()?;

    root.present()?;
    Ok(())
}

/// r against s for every trajectory, with start points, direction arrows
/// and the equilibria that fall inside the plotted area.
pub fn plot_phase_plane(
    overlay: &Overlay,
    equilibria: &[Equilibrium],
    filename: &str,
    title: &str,
) -> Result<(), PlotError> {
    let s_range = padded(overlay.s_range().ok_or(PlotError::EmptyOverlay)?);
    let r_range = padded(overlay.r_range().ok_or(PlotError::EmptyOverlay)?);

    let root = SVGBackend::new(filename, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(s_range.0..s_range.1, r_range.0..r_range.1)?;

    chart
        .configure_mesh()
        .x_desc("Sensitive Cells (s)")
        .y_desc("Resistant Cells (r)")
        .x_label_formatter(&|x| axis_label(*x))
        .y_label_formatter(&|y| axis_label(*y))
        .light_line_style(RGBColor(220, 220, 220))
        .axis_desc_style(("sans-serif", 18))
        .label_style(("sans-serif", 16))
        .draw()?;

    for entry in overlay.iter() {
        let (color, _) = entry_colors(overlay.len(), entry.index);
        let view = &entry.phase_plane;

        chart.draw_series(LineSeries::new(view.path.iter().copied(), color.stroke_width(2)))?
            .label(entry.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        chart.draw_series(std::iter::once(Circle::new(view.start, 5, color.filled())))?;

        for marker in &view.markers {
            let from = chart.backend_coord(&marker.from);
            let tip = chart.backend_coord(&marker.to);
            if let Some([left, right]) = arrowhead(from, tip, 12.0, 6.0) {
                root.draw(&Polygon::new(vec![left, tip, right], color.filled()))?;
            }
        }
    }

    let visible: Vec<&Equilibrium> = equilibria.iter()
        .filter(|e| contains(s_range, e.state.s) && contains(r_range, e.state.r))
        .collect();
    debug!("{} of {} equilibria inside the phase plane", visible.len(), equilibria.len());

    chart.draw_series(visible.iter().map(|e| {
        EmptyElement::at((e.state.s, e.state.r))
            + Cross::new((0, 0), 6, BLACK.stroke_width(2))
            + Text::new(e.to_string(), (8, -18), ("sans-serif", 14).into_font())
    }))?;

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .position(SeriesLabelPosition::UpperRight)
        .label_font(("sans-serif", 16).into_font())
        .draw()?;

    root.present()?;
    Ok(())
}
