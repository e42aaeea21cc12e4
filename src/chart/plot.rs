//! Assembly and drawing of a single ratio's log-log chart.

use super::series::{group_by_value_size, read_series, sorted_value_sizes, write_series, Series};
use super::style::{draw_marker, read_color, shape_for, write_color, MarkerShape, OVERLAY_COLOR};
use super::RenderOptions;
use crate::dataset::DataRecord;
use crate::error::RenderError;
use num_format::{Locale, ToFormattedString};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use tracing::trace;

pub const X_LABEL: &str = "Connections Amount";
pub const Y_LABEL: &str = "QPS (Requests/sec)";

const TITLE_FONT_SIZE: f64 = 20.0;
const LABEL_FONT_SIZE: f64 = 12.0;
const DESC_FONT_SIZE: f64 = 15.0;
pub(crate) const LEGEND_FONT_SIZE: f64 = 14.0;
pub(crate) const LEGEND_ROW_HEIGHT: i32 = 18;
const MARKER_SIZE: i32 = 4;
const LINE_WIDTH: u32 = 2;

// Legend geometry in pixels
const THUMB_WIDTH: u32 = 24;
const THUMB_GAP: u32 = 6;
const LEGEND_GAP: u32 = 4;
// Average advance of a proportional sans glyph, in ems
const GLYPH_WIDTH_EM: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

/// One throughput line with its per-point markers
#[derive(Debug, Clone)]
pub struct Line {
    pub dataset: usize,
    pub op: Operation,
    pub value_size: u64,
    pub color: RGBColor,
    pub shape: MarkerShape,
    pub series: Series,
}

/// Black markers drawn on top of a write line
#[derive(Debug, Clone)]
pub struct Overlay {
    pub shape: MarkerShape,
    pub series: Series,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LegendEntry {
    Line { label: String, color: RGBColor },
    Marker { label: String, shape: MarkerShape },
}

impl LegendEntry {
    pub fn label(&self) -> &str {
        match self {
            LegendEntry::Line { label, .. } | LegendEntry::Marker { label, .. } => label,
        }
    }
}

/// Logarithmic axis with power-of-two ticks, stored as base-2 exponents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Log2Axis {
    pub min_exp: i32,
    pub max_exp: i32,
}

impl Log2Axis {
    /// Smallest power-of-two span holding `min..=max`
    pub fn covering(min: f64, max: f64) -> Self {
        let min_exp = min.log2().floor() as i32;
        let max_exp = (max.log2().ceil() as i32).max(min_exp + 1);
        Self { min_exp, max_exp }
    }

    pub fn range(&self) -> Range<f64> {
        self.min_exp as f64..self.max_exp as f64
    }

    pub fn tick_count(&self) -> usize {
        (self.max_exp - self.min_exp + 1) as usize
    }
}

/// Map a data point into exponent space
pub fn to_log2((x, y): (f64, f64)) -> (f64, f64) {
    (x.log2(), y.log2())
}

/// Label for the tick at exponent `exp`; blank between powers of two.
pub fn tick_label(exp: f64) -> String {
    let rounded = exp.round();
    if (exp - rounded).abs() > 1e-6 {
        return String::new();
    }
    let e = rounded as i32;
    if (0..63).contains(&e) {
        (1u64 << e).to_formatted_string(&Locale::en)
    } else {
        format!("{}", 2f64.powi(e))
    }
}

/// Everything needed to draw one grid cell
#[derive(Debug, Clone)]
pub struct PlotCell {
    pub title: String,
    pub lines: Vec<Line>,
    pub overlays: Vec<Overlay>,
    pub legend: Vec<LegendEntry>,
    pub x_axis: Log2Axis,
    pub y_axis: Log2Axis,
}

impl PlotCell {
    pub fn value_sizes(&self) -> Vec<u64> {
        self.legend
            .iter()
            .filter_map(|e| match e {
                LegendEntry::Marker { label, .. } => label.parse().ok(),
                LegendEntry::Line { .. } => None,
            })
            .collect()
    }
}

/// Build the chart for one ratio from each compared dataset's records.
///
/// Returns `Ok(None)` when no dataset has records for this ratio.
pub fn assemble(
    title: impl Into<String>,
    inputs: &[(&str, &[DataRecord])],
) -> Result<Option<PlotCell>, RenderError> {
    if inputs.iter().all(|(_, rs)| rs.is_empty()) {
        return Ok(None);
    }

    let all: Vec<&[DataRecord]> = inputs.iter().map(|(_, rs)| *rs).collect();
    let values = sorted_value_sizes(&all);
    let compare = inputs.len() > 1;

    let mut lines = Vec::new();
    let mut overlays = Vec::new();
    let mut legend = Vec::new();

    for (index, (name, records)) in inputs.iter().enumerate() {
        let groups = group_by_value_size(records);
        let mut labelled = false;
        for (rank, value) in values.iter().enumerate() {
            let Some(group) = groups.get(value) else {
                continue;
            };
            let shape = shape_for(rank);
            let read = read_series(group)?;
            let write = write_series(group)?;

            if !labelled {
                let (read_label, write_label) = if compare {
                    (format!("read ({name})"), format!("write ({name})"))
                } else {
                    ("read".to_string(), "write".to_string())
                };
                legend.push(LegendEntry::Line {
                    label: read_label,
                    color: read_color(index),
                });
                legend.push(LegendEntry::Line {
                    label: write_label,
                    color: write_color(index),
                });
                labelled = true;
            }

            lines.push(Line {
                dataset: index,
                op: Operation::Read,
                value_size: *value,
                color: read_color(index),
                shape,
                series: read,
            });
            overlays.push(Overlay {
                shape,
                series: write.clone(),
            });
            lines.push(Line {
                dataset: index,
                op: Operation::Write,
                value_size: *value,
                color: write_color(index),
                shape,
                series: write,
            });
        }
    }

    for (rank, value) in values.iter().enumerate() {
        legend.push(LegendEntry::Marker {
            label: value.to_string(),
            shape: shape_for(rank),
        });
    }

    let (x0, x1, y0, y1) = lines.iter().map(|l| l.series.bounds()).fold(
        (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
        |(a0, a1, b0, b1), (x0, x1, y0, y1)| (a0.min(x0), a1.max(x1), b0.min(y0), b1.max(y1)),
    );

    Ok(Some(PlotCell {
        title: title.into(),
        lines,
        overlays,
        legend,
        x_axis: Log2Axis::covering(x0, x1),
        y_axis: Log2Axis::covering(y0, y1),
    }))
}

/// Pixel width the legend strip needs beside the chart
pub fn legend_width(entries: &[LegendEntry], font_size: f64) -> u32 {
    let widest = entries
        .iter()
        .map(|e| e.label().chars().count())
        .max()
        .unwrap_or(0);
    THUMB_WIDTH + THUMB_GAP + (widest as f64 * font_size * GLYPH_WIDTH_EM).ceil() as u32
}

/// Draw `cell` into `area`, with its legend in a strip on the right.
pub fn draw_cell<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    cell: &PlotCell,
    opts: &RenderOptions,
) -> Result<(), RenderError> {
    let font = opts.font.as_str();
    let (width, _) = area.dim_in_pixel();
    let reserved = legend_width(&cell.legend, LEGEND_FONT_SIZE) + LEGEND_GAP;
    let (chart_area, legend_area) = area.split_horizontally(width.saturating_sub(reserved));

    // Push the legend below the cell title.
    let offset = (TITLE_FONT_SIZE * 3.0) as i32;
    draw_legend(&legend_area, &cell.legend, offset, font)?;

    let mut chart = ChartBuilder::on(&chart_area)
        .caption(&cell.title, (font, TITLE_FONT_SIZE))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(cell.x_axis.range(), cell.y_axis.range())?;

    chart
        .configure_mesh()
        .x_labels(cell.x_axis.tick_count())
        .y_labels(cell.y_axis.tick_count())
        .x_label_formatter(&|x| tick_label(*x))
        .y_label_formatter(&|y| tick_label(*y))
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .label_style((font, LABEL_FONT_SIZE))
        .axis_desc_style((font, DESC_FONT_SIZE))
        .draw()?;

    for line in &cell.lines {
        trace!(
            dataset = line.dataset,
            op = ?line.op,
            value_size = line.value_size,
            points = line.series.len(),
            "drawing line"
        );
        chart.draw_series(LineSeries::new(
            line.series.points().iter().map(|&p| to_log2(p)),
            line.color.stroke_width(LINE_WIDTH),
        ))?;
        for &p in line.series.points() {
            draw_marker(chart.plotting_area(), to_log2(p), line.shape, MARKER_SIZE, line.color)?;
        }
    }

    for overlay in &cell.overlays {
        for &p in overlay.series.points() {
            draw_marker(chart.plotting_area(), to_log2(p), overlay.shape, MARKER_SIZE, OVERLAY_COLOR)?;
        }
    }

    Ok(())
}

fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    entries: &[LegendEntry],
    top: i32,
    font: &str,
) -> Result<(), RenderError> {
    let style = (font, LEGEND_FONT_SIZE).into_font().color(&BLACK);
    let thumb = THUMB_WIDTH as i32;

    for (i, entry) in entries.iter().enumerate() {
        let y = top + i as i32 * LEGEND_ROW_HEIGHT;
        let mid = y + LEGEND_ROW_HEIGHT / 2;
        match entry {
            LegendEntry::Line { color, .. } => {
                area.draw(&PathElement::new(
                    vec![(0, mid), (thumb, mid)],
                    color.stroke_width(LINE_WIDTH),
                ))?;
            }
            LegendEntry::Marker { shape, .. } => {
                draw_marker(area, (thumb / 2, mid), *shape, MARKER_SIZE, OVERLAY_COLOR)?;
            }
        }
        area.draw(&Text::new(
            entry.label().to_string(),
            (thumb + THUMB_GAP as i32, y + 2),
            style.clone(),
        ))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(conn_size: u64, value_size: u64, avg_read: f64, avg_write: f64) -> DataRecord {
        DataRecord {
            conn_size,
            value_size,
            avg_read,
            avg_write,
        }
    }

    fn sample(scale: f64) -> Vec<DataRecord> {
        let mut out = Vec::new();
        for value_size in [4096, 256] {
            for conn in [100, 1, 10] {
                out.push(rec(conn, value_size, scale * conn as f64 * 10.0, scale * conn as f64));
            }
        }
        out
    }

    #[test]
    fn single_dataset_cell() {
        let a = sample(1.0);
        let cell = assemble("R/W Ratio 0.5000", &[("a.csv", &a)]).unwrap().unwrap();

        assert_eq!(cell.title, "R/W Ratio 0.5000");
        assert_eq!(cell.lines.len(), 4);
        assert_eq!(cell.overlays.len(), 2);
        assert!(cell.lines.iter().all(|l| l.series.len() == 3));

        let labels: Vec<&str> = cell.legend.iter().map(LegendEntry::label).collect();
        assert_eq!(labels, vec!["read", "write", "256", "4096"]);
        assert_eq!(cell.value_sizes(), vec![256, 4096]);
    }

    #[test]
    fn read_and_write_share_shape_but_not_color() {
        let a = sample(1.0);
        let cell = assemble("t", &[("a", &a)]).unwrap().unwrap();

        for pair in cell.lines.chunks(2) {
            let (read, write) = (&pair[0], &pair[1]);
            assert_eq!(read.op, Operation::Read);
            assert_eq!(write.op, Operation::Write);
            assert_eq!(read.value_size, write.value_size);
            assert_eq!(read.shape, write.shape);
            assert_ne!(read.color, write.color);
        }
        assert_eq!(cell.lines[0].shape, shape_for(0));
        assert_eq!(cell.lines[2].shape, shape_for(1));

        for (overlay, write) in cell.overlays.iter().zip(cell.lines.iter().skip(1).step_by(2)) {
            assert_eq!(overlay.shape, write.shape);
            assert_eq!(overlay.series, write.series);
        }
    }

    #[test]
    fn points_follow_connection_order() {
        let a = sample(1.0);
        let cell = assemble("t", &[("a", &a)]).unwrap().unwrap();
        let xs: Vec<f64> = cell.lines[0].series.points().iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![1.0, 10.0, 100.0]);
    }

    #[test]
    fn two_datasets_share_one_cell() {
        let a = sample(1.0);
        let b = sample(2.0);
        let cell = assemble("t", &[("a", &a), ("b", &b)]).unwrap().unwrap();

        assert_eq!(cell.lines.len(), 8);
        assert_eq!(cell.overlays.len(), 4);
        let labels: Vec<&str> = cell.legend.iter().map(LegendEntry::label).collect();
        assert_eq!(
            labels,
            vec!["read (a)", "write (a)", "read (b)", "write (b)", "256", "4096"]
        );
        assert_eq!(cell.lines[0].color, cell.lines[2].color);
        assert_ne!(cell.lines[0].color, cell.lines[4].color);
    }

    #[test]
    fn shapes_stay_consistent_when_a_dataset_lacks_a_size() {
        let a = vec![rec(1, 256, 1.0, 1.0), rec(1, 1024, 1.0, 1.0)];
        let b = vec![rec(1, 1024, 2.0, 2.0)];
        let cell = assemble("t", &[("a", &a), ("b", &b)]).unwrap().unwrap();

        let b_lines: Vec<&Line> = cell.lines.iter().filter(|l| l.dataset == 1).collect();
        assert_eq!(b_lines.len(), 2);
        assert_eq!(b_lines[0].shape, shape_for(1));
    }

    #[test]
    fn missing_ratio_in_one_dataset_still_renders() {
        let a = sample(1.0);
        let cell = assemble("t", &[("a", &a), ("b", &[])]).unwrap().unwrap();
        assert_eq!(cell.lines.len(), 4);
        assert!(cell.lines.iter().all(|l| l.dataset == 0));
    }

    #[test]
    fn empty_inputs_produce_no_cell() {
        assert!(assemble("t", &[("a", &[]), ("b", &[])]).unwrap().is_none());
    }

    #[test]
    fn zero_throughput_is_a_construction_error() {
        let a = vec![rec(1, 256, 0.0, 1.0)];
        assert!(matches!(
            assemble("t", &[("a", &a)]),
            Err(RenderError::NonPositivePoint { .. })
        ));
    }

    #[test]
    fn assembling_twice_is_identical() {
        let a = sample(1.0);
        let b = sample(3.0);
        let first = assemble("t", &[("a", &a), ("b", &b)]).unwrap().unwrap();
        let second = assemble("t", &[("a", &a), ("b", &b)]).unwrap().unwrap();

        assert_eq!(first.legend, second.legend);
        assert_eq!(first.x_axis, second.x_axis);
        assert_eq!(first.y_axis, second.y_axis);
        let counts = |c: &PlotCell| c.lines.iter().map(|l| l.series.len()).collect::<Vec<_>>();
        assert_eq!(counts(&first), counts(&second));
    }

    #[test]
    fn axis_covers_data_in_powers_of_two() {
        let axis = Log2Axis::covering(1.0, 100.0);
        assert_eq!(axis, Log2Axis { min_exp: 0, max_exp: 7 });
        assert_eq!(axis.tick_count(), 8);
        assert_eq!(tick_label(axis.range().end), "128");

        let single = Log2Axis::covering(64.0, 64.0);
        assert_eq!(single, Log2Axis { min_exp: 6, max_exp: 7 });

        let a = sample(1.0);
        let cell = assemble("t", &[("a", &a)]).unwrap().unwrap();
        assert_eq!(cell.x_axis, Log2Axis { min_exp: 0, max_exp: 7 });
        assert_eq!(cell.y_axis, Log2Axis { min_exp: 0, max_exp: 10 });
    }

    #[test]
    fn tick_labels_only_at_powers_of_two() {
        assert_eq!(tick_label(0.0), "1");
        assert_eq!(tick_label(10.0), "1,024");
        assert_eq!(tick_label(-1.0), "0.5");
        assert_eq!(tick_label(2.5), "");
    }

    #[test]
    fn legend_width_grows_with_labels() {
        let short = vec![LegendEntry::Marker {
            label: "256".into(),
            shape: MarkerShape::Ring,
        }];
        let long = vec![LegendEntry::Line {
            label: "write (benchmark-run.csv)".into(),
            color: RED,
        }];
        assert!(legend_width(&long, LEGEND_FONT_SIZE) > legend_width(&short, LEGEND_FONT_SIZE));
        assert_eq!(legend_width(&[], LEGEND_FONT_SIZE), THUMB_WIDTH + THUMB_GAP);
    }
}
