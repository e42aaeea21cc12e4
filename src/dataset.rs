//! Benchmark result datasets and the loaders that build them.

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Read/write ratio of a benchmark run, usable as an ordered map key
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ratio(pub f64);

impl PartialEq for Ratio {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ratio {}

impl PartialOrd for Ratio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ratio {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R/W Ratio {:.4}", self.0)
    }
}

/// A single averaged measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    pub conn_size: u64,
    pub value_size: u64,
    pub avg_read: f64,
    pub avg_write: f64,
}

/// All records of one benchmark run, keyed by ratio
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    pub name: String,
    pub param: String,
    pub records: BTreeMap<Ratio, Vec<DataRecord>>,
}

impl DataSet {
    pub fn new(name: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param: param.into(),
            records: BTreeMap::new(),
        }
    }

    /// Append a record under `ratio`
    pub fn push(&mut self, ratio: f64, record: DataRecord) {
        self.records.entry(Ratio(ratio)).or_default().push(record);
    }

    /// Ratios in ascending order
    pub fn sorted_ratios(&self) -> Vec<Ratio> {
        self.records.keys().copied().collect()
    }

    pub fn records_for(&self, ratio: Ratio) -> &[DataRecord] {
        self.records.get(&ratio).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }
}

/// Load a dataset, choosing the format from the file extension
pub fn load<P: AsRef<Path>>(path: P) -> Result<DataSet, LoadError> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") | Some("jsonl") => load_jsonl(path),
        _ => load_csv(path),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load the CSV written by the read/write benchmark script.
///
/// A `PARAM` row carries the run's parameter label and every `DATA` row is
/// `DATA,ratio,conn_size,value_size,read:write,read:write,...` with one
/// `read:write` cell per iteration. Other rows (the column header) are skipped.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<DataSet, LoadError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut dataset = DataSet::new(display_name(path), "");

    for (idx, row) in reader.records().enumerate() {
        let row = row.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let line = row.position().map(|p| p.line() as usize).unwrap_or(idx + 1);

        match row.get(0) {
            Some("PARAM") => {
                dataset.param = row.iter().skip(1).collect::<Vec<_>>().join(",");
            }
            Some("DATA") => {
                let (ratio, record) = parse_data_row(path, line, &row)?;
                dataset.push(ratio, record);
            }
            _ => continue,
        }
    }

    if dataset.records.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    debug!(
        file = %path.display(),
        ratios = dataset.records.len(),
        records = dataset.record_count(),
        "loaded csv dataset"
    );
    Ok(dataset)
}

fn parse_field<T: std::str::FromStr>(
    path: &Path,
    line: usize,
    field: &'static str,
    value: Option<&str>,
) -> Result<T, LoadError> {
    let value = value.unwrap_or("");
    value.parse().map_err(|_| LoadError::Field {
        path: path.to_path_buf(),
        line,
        field,
        value: value.to_string(),
    })
}

fn parse_data_row(
    path: &Path,
    line: usize,
    row: &csv::StringRecord,
) -> Result<(f64, DataRecord), LoadError> {
    let ratio: f64 = parse_field(path, line, "ratio", row.get(1))?;
    let conn_size: u64 = parse_field(path, line, "connection count", row.get(2))?;
    let value_size: u64 = parse_field(path, line, "value size", row.get(3))?;

    let mut read_sum = 0.0;
    let mut write_sum = 0.0;
    let mut iterations = 0usize;
    for cell in row.iter().skip(4).filter(|c| !c.is_empty()) {
        let (read, write) = cell.split_once(':').ok_or_else(|| LoadError::Field {
            path: path.to_path_buf(),
            line,
            field: "iteration result",
            value: cell.to_string(),
        })?;
        read_sum += parse_field::<f64>(path, line, "read qps", Some(read.trim()))?;
        write_sum += parse_field::<f64>(path, line, "write qps", Some(write.trim()))?;
        iterations += 1;
    }

    if iterations == 0 {
        return Err(LoadError::NoIterations {
            path: path.to_path_buf(),
            line,
        });
    }

    let record = DataRecord {
        conn_size,
        value_size,
        avg_read: read_sum / iterations as f64,
        avg_write: write_sum / iterations as f64,
    };
    Ok((ratio, record))
}

#[derive(Debug, Deserialize)]
struct JsonRecord {
    ratio: f64,
    #[serde(flatten)]
    record: DataRecord,
}

/// Load a JSON Lines file of already-averaged records.
///
/// A leading `#` line sets the parameter label.
pub fn load_jsonl<P: AsRef<Path>>(path: P) -> Result<DataSet, LoadError> {
    let path = path.as_ref();
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let reader = BufReader::new(file);

    let mut dataset = DataSet::new(display_name(path), "");

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            if dataset.records.is_empty() && dataset.param.is_empty() {
                dataset.param = comment.trim().to_string();
            }
            continue;
        }
        let parsed: JsonRecord = serde_json::from_str(line).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            line: line_num + 1,
            source,
        })?;
        dataset.push(parsed.ratio, parsed.record);
    }

    if dataset.records.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    debug!(
        file = %path.display(),
        ratios = dataset.records.len(),
        records = dataset.record_count(),
        "loaded json dataset"
    );
    Ok(dataset)
}
