//! Rendering of benchmark datasets into a grid of log-log line charts.

pub mod export;
pub mod layout;
pub mod plot;
pub mod series;
pub mod style;

pub use export::OutputFormat;

use crate::dataset::DataSet;
use crate::error::RenderError;
use std::path::Path;
use tracing::info;

/// Render-time configuration, passed explicitly instead of process-wide state
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Font family for every piece of text
    pub font: String,
    /// Grid columns; rows follow from the number of ratios
    pub columns: usize,
    /// Pixel size of one grid cell
    pub cell_width: u32,
    pub cell_height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            font: "sans-serif".to_string(),
            columns: 1,
            cell_width: 1200,
            cell_height: 600,
        }
    }
}

/// Compose the chart grid for `datasets` and write it to `output`.
pub fn render(
    datasets: &[DataSet],
    title: &str,
    output: &Path,
    format: OutputFormat,
    opts: &RenderOptions,
) -> Result<(), RenderError> {
    let grid = layout::compose(datasets, title, opts)?;
    export::save(&grid, output, format, opts)?;

    info!(
        output = %output.display(),
        ?format,
        plots = grid.plot_count(),
        rows = grid.tiles.rows,
        cols = grid.tiles.cols,
        "chart written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DataRecord;

    fn dataset(name: &str, ratios: &[f64]) -> DataSet {
        let mut ds = DataSet::new(name, "--quota 8GiB");
        for &ratio in ratios {
            for value_size in [256, 4096] {
                for conn in [1, 10, 100] {
                    ds.push(
                        ratio,
                        DataRecord {
                            conn_size: conn,
                            value_size,
                            avg_read: 1000.0 * conn as f64,
                            avg_write: 100.0 * conn as f64,
                        },
                    );
                }
            }
        }
        ds
    }

    #[test]
    fn render_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("readwrite.svg");
        let datasets = vec![dataset("a.csv", &[0.5, 1.0]), dataset("b.csv", &[0.5])];

        render(&datasets, "etcd read/write", &out, OutputFormat::Svg, &RenderOptions::default())
            .unwrap();

        let svg = std::fs::read_to_string(&out).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("R/W Ratio 0.5000"));
        assert!(svg.contains("R/W Ratio 1.0000"));
        assert!(svg.contains("b.csv: --quota 8GiB"));
    }

    #[test]
    fn render_without_datasets_fails() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty.svg");
        let err = render(&[], "t", &out, OutputFormat::Svg, &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, RenderError::NoDatasets));
        assert!(!out.exists());
    }

    #[test]
    fn construction_error_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bad.svg");
        let mut ds = dataset("a.csv", &[0.5]);
        ds.push(
            0.5,
            DataRecord {
                conn_size: 1000,
                value_size: 256,
                avg_read: 0.0,
                avg_write: 1.0,
            },
        );

        let err = render(&[ds], "t", &out, OutputFormat::Svg, &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, RenderError::NonPositivePoint { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("out.svg");
        let err = render(
            &[dataset("a.csv", &[0.5])],
            "t",
            &out,
            OutputFormat::Svg,
            &RenderOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
