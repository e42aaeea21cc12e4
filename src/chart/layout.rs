//! Tiled grid layout of per-ratio charts on one canvas.

use super::plot::{assemble, draw_cell, PlotCell, LEGEND_FONT_SIZE, LEGEND_ROW_HEIGHT};
use super::RenderOptions;
use crate::dataset::{DataRecord, DataSet, Ratio};
use crate::error::RenderError;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, warn};

const PAD_BETWEEN: u32 = 16;
const PAD_TOP: u32 = 60;
const PAD_EDGE: u32 = 8;

/// Padding and dimensions of the tile grid, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tiles {
    pub rows: usize,
    pub cols: usize,
    pub pad_x: u32,
    pub pad_y: u32,
    pub pad_top: u32,
    pub pad_bottom: u32,
    pub pad_left: u32,
    pub pad_right: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Tiles {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            pad_x: PAD_BETWEEN,
            pad_y: PAD_BETWEEN,
            pad_top: PAD_TOP,
            pad_bottom: PAD_EDGE,
            pad_left: PAD_EDGE,
            pad_right: PAD_EDGE,
        }
    }

    /// Size of every tile on a canvas of `(width, height)`
    pub fn tile_size(&self, (width, height): (u32, u32)) -> (u32, u32) {
        let cols = self.cols.max(1) as u32;
        let rows = self.rows.max(1) as u32;
        let w = width
            .saturating_sub(self.pad_left + self.pad_right)
            .saturating_sub(self.pad_x * (cols - 1))
            / cols;
        let h = height
            .saturating_sub(self.pad_top + self.pad_bottom)
            .saturating_sub(self.pad_y * (rows - 1))
            / rows;
        (w, h)
    }

    pub fn rect(&self, row: usize, col: usize, canvas: (u32, u32)) -> TileRect {
        let (width, height) = self.tile_size(canvas);
        TileRect {
            x: self.pad_left + col as u32 * (width + self.pad_x),
            y: self.pad_top + row as u32 * (height + self.pad_y),
            width,
            height,
        }
    }
}

/// Fully composed canvas, ready for a drawing backend
#[derive(Debug, Clone)]
pub struct ChartGrid {
    pub tiles: Tiles,
    pub width: u32,
    pub height: u32,
    /// Row-major cells; `None` positions stay blank
    pub cells: Vec<Vec<Option<PlotCell>>>,
    /// Global legend: the title, then one line per dataset
    pub legend: Vec<String>,
}

impl ChartGrid {
    pub fn plot_count(&self) -> usize {
        self.plots().count()
    }

    pub fn plots(&self) -> impl Iterator<Item = &PlotCell> {
        self.cells.iter().flatten().flatten()
    }
}

/// Lay out one chart per ratio, in ascending ratio order.
pub fn compose(
    datasets: &[DataSet],
    title: &str,
    opts: &RenderOptions,
) -> Result<ChartGrid, RenderError> {
    if datasets.is_empty() {
        return Err(RenderError::NoDatasets);
    }

    let ratios: BTreeSet<Ratio> = datasets
        .iter()
        .flat_map(|d| d.records.keys().copied())
        .collect();
    let max_ratios = datasets
        .iter()
        .map(|d| d.sorted_ratios().len())
        .max()
        .unwrap_or(0);

    let cols = opts.columns.max(1);
    let rows = ratios
        .len()
        .div_ceil(cols)
        .max(max_ratios.div_ceil(cols))
        .max(1);

    let mut cells: Vec<Vec<Option<PlotCell>>> =
        (0..rows).map(|_| (0..cols).map(|_| None).collect()).collect();

    let (mut row, mut col) = (0, 0);
    for ratio in ratios {
        let inputs: Vec<(&str, &[DataRecord])> = datasets
            .iter()
            .map(|d| (d.name.as_str(), d.records_for(ratio)))
            .collect();
        warn_on_disjoint_ranges(ratio, &inputs);

        let Some(cell) = assemble(ratio.to_string(), &inputs)? else {
            debug!(%ratio, "no records, skipping cell");
            continue;
        };
        debug!(
            %ratio,
            row,
            col,
            lines = cell.lines.len(),
            value_sizes = ?cell.value_sizes(),
            "assembled cell"
        );
        cells[row][col] = Some(cell);

        col += 1;
        if col == cols {
            col = 0;
            row += 1;
        }
    }

    let mut legend = vec![title.to_string()];
    legend.extend(datasets.iter().map(|d| format!("{}: {}", d.name, d.param)));

    let mut tiles = Tiles::new(rows, cols);
    let legend_height = legend.len() as u32 * LEGEND_ROW_HEIGHT as u32 + PAD_EDGE;
    tiles.pad_top = tiles.pad_top.max(legend_height);

    Ok(ChartGrid {
        tiles,
        width: opts.cell_width * cols as u32,
        height: opts.cell_height * rows as u32 + (tiles.pad_top - PAD_TOP),
        cells,
        legend,
    })
}

/// Comparing runs whose connection counts never overlap is allowed but
/// almost always a mistake.
fn warn_on_disjoint_ranges(ratio: Ratio, inputs: &[(&str, &[DataRecord])]) {
    let ranges: Vec<(&str, u64, u64)> = inputs
        .iter()
        .filter(|(_, rs)| !rs.is_empty())
        .map(|(name, rs)| {
            let lo = rs.iter().map(|r| r.conn_size).min().unwrap_or(0);
            let hi = rs.iter().map(|r| r.conn_size).max().unwrap_or(0);
            (*name, lo, hi)
        })
        .collect();

    for (i, a) in ranges.iter().enumerate() {
        for b in &ranges[i + 1..] {
            if a.2 < b.1 || b.2 < a.1 {
                warn!(
                    %ratio,
                    first = a.0,
                    second = b.0,
                    "connection count ranges do not overlap; series are not comparable"
                );
            }
        }
    }
}

/// Draw every non-empty cell and the global legend onto `root`.
pub fn draw_grid<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    grid: &ChartGrid,
    opts: &RenderOptions,
) -> Result<(), RenderError> {
    root.fill(&WHITE)?;

    for (r, row) in grid.cells.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let Some(cell) = cell else {
                continue;
            };
            let rect = grid.tiles.rect(r, c, (grid.width, grid.height));
            let area = root
                .clone()
                .shrink((rect.x, rect.y), (rect.width, rect.height));
            draw_cell(&area, cell, opts)?;
        }
    }

    let style = (opts.font.as_str(), LEGEND_FONT_SIZE).into_font().color(&BLACK);
    for (i, line) in grid.legend.iter().enumerate() {
        root.draw(&Text::new(
            line.as_str(),
            (
                grid.tiles.pad_left as i32,
                PAD_EDGE as i32 / 2 + i as i32 * LEGEND_ROW_HEIGHT,
            ),
            style.clone(),
        ))?;
    }

    Ok(())
}
