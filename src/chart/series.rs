//! Grouping of records into per-value-size point series.

use crate::dataset::DataRecord;
use crate::error::RenderError;
use std::collections::{BTreeMap, BTreeSet};

/// Distinct value sizes across all record lists, ascending
pub fn sorted_value_sizes(records: &[&[DataRecord]]) -> Vec<u64> {
    records
        .iter()
        .flat_map(|rs| rs.iter().map(|r| r.value_size))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Records bucketed by value size, each bucket ordered by connection count
pub fn group_by_value_size(records: &[DataRecord]) -> BTreeMap<u64, Vec<DataRecord>> {
    let mut groups: BTreeMap<u64, Vec<DataRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(r.value_size).or_default().push(*r);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|r| r.conn_size);
    }
    groups
}

/// Non-empty run of strictly positive points, ready for a log-log chart
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    points: Vec<(f64, f64)>,
}

impl Series {
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self, RenderError> {
        if points.is_empty() {
            return Err(RenderError::EmptySeries);
        }
        if let Some(&(x, y)) = points
            .iter()
            .find(|(x, y)| !(x.is_finite() && y.is_finite() && *x > 0.0 && *y > 0.0))
        {
            return Err(RenderError::NonPositivePoint { x, y });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// (min x, max x, min y, max y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.points.iter().fold(
            (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
            |(x0, x1, y0, y1), &(x, y)| (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
        )
    }
}

pub fn read_series(records: &[DataRecord]) -> Result<Series, RenderError> {
    Series::new(records.iter().map(|r| (r.conn_size as f64, r.avg_read)).collect())
}

pub fn write_series(records: &[DataRecord]) -> Result<Series, RenderError> {
    Series::new(records.iter().map(|r| (r.conn_size as f64, r.avg_write)).collect())
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

    #[test]
    fn value_sizes_are_merged_sorted_and_deduplicated() {
        let a = vec![rec(1, 4096, 1.0, 1.0), rec(1, 256, 1.0, 1.0), rec(2, 4096, 1.0, 1.0)];
        let b = vec![rec(1, 1024, 1.0, 1.0), rec(1, 256, 1.0, 1.0)];
        assert_eq!(sorted_value_sizes(&[&a, &b]), vec![256, 1024, 4096]);
        assert_eq!(sorted_value_sizes(&[&b, &a]), vec![256, 1024, 4096]);
        assert!(sorted_value_sizes(&[&[]]).is_empty());
    }

    #[test]
    fn groups_are_ordered_by_connection_count() {
        let records = vec![
            rec(100, 256, 3.0, 30.0),
            rec(1, 256, 1.0, 10.0),
            rec(10, 4096, 5.0, 50.0),
            rec(10, 256, 2.0, 20.0),
        ];
        let groups = group_by_value_size(&records);
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![256, 4096]);

        let small = read_series(&groups[&256]).unwrap();
        assert_eq!(small.points(), &[(1.0, 1.0), (10.0, 2.0), (100.0, 3.0)]);
        let small_w = write_series(&groups[&256]).unwrap();
        assert_eq!(small_w.points(), &[(1.0, 10.0), (10.0, 20.0), (100.0, 30.0)]);
        assert_eq!(small_w.bounds(), (1.0, 100.0, 10.0, 30.0));
    }

    #[test]
    fn empty_series_is_rejected() {
        assert!(matches!(Series::new(vec![]), Err(RenderError::EmptySeries)));
        assert!(matches!(read_series(&[]), Err(RenderError::EmptySeries)));
    }

    #[test]
    fn non_positive_points_are_rejected() {
        let err = write_series(&[rec(1, 256, 5.0, 0.0)]).unwrap_err();
        assert!(matches!(err, RenderError::NonPositivePoint { x, y } if x == 1.0 && y == 0.0));
        assert!(Series::new(vec![(1.0, f64::NAN)]).is_err());
        assert!(Series::new(vec![(0.0, 1.0)]).is_err());
    }
}
