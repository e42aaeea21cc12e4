//! Encoding a composed chart grid to an image file.

use super::layout::{draw_grid, ChartGrid};
use super::RenderOptions;
use crate::error::RenderError;
use plotters::prelude::*;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.parse(),
            None => Err(RenderError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            other => Err(RenderError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Svg => write!(f, "svg"),
            OutputFormat::Png => write!(f, "png"),
        }
    }
}

/// Write `grid` to `path` in `format`.
pub fn save(
    grid: &ChartGrid,
    path: &Path,
    format: OutputFormat,
    opts: &RenderOptions,
) -> Result<(), RenderError> {
    match format {
        OutputFormat::Svg => {
            let svg = render_svg(grid, opts)?;
            std::fs::write(path, svg).map_err(|source| RenderError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
        OutputFormat::Png => save_png(grid, path, opts),
    }
}

/// Draw `grid` into an in-memory SVG document
pub fn render_svg(grid: &ChartGrid, opts: &RenderOptions) -> Result<String, RenderError> {
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, (grid.width, grid.height)).into_drawing_area();
        draw_grid(&root, grid, opts)?;
        root.present()?;
    }
    Ok(buf)
}

#[cfg(feature = "png")]
fn save_png(grid: &ChartGrid, path: &Path, opts: &RenderOptions) -> Result<(), RenderError> {
    let root = BitMapBackend::new(path, (grid.width, grid.height)).into_drawing_area();
    draw_grid(&root, grid, opts)?;
    root.present()?;
    Ok(())
}

#[cfg(not(feature = "png"))]
fn save_png(_grid: &ChartGrid, _path: &Path, _opts: &RenderOptions) -> Result<(), RenderError> {
    Err(RenderError::UnsupportedFormat(
        "png (built without the `png` feature)".to_string(),
    ))
}
