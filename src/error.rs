//! Error types for loading and rendering.

use plotters::drawing::DrawingAreaErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading a benchmark result file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}:{line}: {source}")]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}:{line}: invalid {field} {value:?}")]
    Field {
        path: PathBuf,
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("{path}:{line}: no iteration results in row")]
    NoIterations { path: PathBuf, line: usize },

    #[error("{path}: no benchmark records found")]
    Empty { path: PathBuf },
}

/// Failure while composing or exporting a chart grid
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no datasets to render")]
    NoDatasets,

    #[error("cannot build a series from an empty point list")]
    EmptySeries,

    #[error("point ({x}, {y}) cannot be placed on a logarithmic axis")]
    NonPositivePoint { x: f64, y: f64 },

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("drawing failed: {0}")]
    Draw(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Draw(err.to_string())
    }
}
