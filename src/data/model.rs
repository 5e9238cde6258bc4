use std::fmt;
use std::ops::Range;

// ---------------------------------------------------------------------------
// RawRecord – one data line of the source file
// ---------------------------------------------------------------------------

/// A single parsed line before filtering.
///
/// Both fields are NaN when the token was the missing-value sentinel, could
/// not be parsed, or parsed to a non-finite number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRecord {
    pub frame: f64,
    pub rmsd: f64,
}

impl RawRecord {
    /// Whether either field carries the missing-value marker.
    pub fn is_missing(&self) -> bool {
        self.frame.is_nan() || self.rmsd.is_nan()
    }
}

// ---------------------------------------------------------------------------
// Record – one surviving (frame, RMSD) pair
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    /// Trajectory frame index (x).
    pub frame: i64,
    /// RMSD value in ångström (y).
    pub rmsd: f64,
}

impl Record {
    /// Convert a raw line into a record, `None` if a field is missing.
    ///
    /// The frame is truncated toward zero, so `3.0` and `3.7` both give 3.
    pub fn from_raw(raw: &RawRecord) -> Option<Self> {
        if raw.is_missing() {
            return None;
        }
        Some(Record {
            frame: raw.frame.trunc() as i64,
            rmsd: raw.rmsd,
        })
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{:.4}", self.frame, self.rmsd)
    }
}

// ---------------------------------------------------------------------------
// RmsdDataset – the complete cleaned series
// ---------------------------------------------------------------------------

/// The cleaned series in source order. Built once, never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RmsdDataset {
    records: Vec<Record>,
}

impl RmsdDataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        RmsdDataset { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The series as plot coordinates.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.records.iter().map(|r| (r.frame as f64, r.rmsd))
    }

    /// X axis range: the frame extent with a 5% margin on both sides.
    pub fn frame_range(&self) -> Range<f64> {
        padded_range(self.records.iter().map(|r| r.frame as f64))
    }

    /// Y axis range: the RMSD extent with a 5% margin on both sides.
    pub fn rmsd_range(&self) -> Range<f64> {
        padded_range(self.records.iter().map(|r| r.rmsd))
    }
}

/// Largest magnitude an axis bound may take, so that `end - start` stays finite.
const AXIS_LIMIT: f64 = f64::MAX / 4.0;

/// Min/max of the values widened by 5% of the span.
///
/// An empty input gives `0..1`, a single distinct value is widened by 0.5
/// (or 5% of its magnitude when that is larger). Bounds are clamped to
/// `±AXIS_LIMIT`.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        return 0.0..1.0;
    }
    let min = min.clamp(-AXIS_LIMIT, AXIS_LIMIT);
    let max = max.clamp(-AXIS_LIMIT, AXIS_LIMIT);
    let span = max - min;
    if span.abs() < f64::EPSILON {
        let pad = (min.abs() * 0.05).max(0.5);
        return (min - pad)..(max + pad);
    }
    let pad = span * 0.05;
    (min - pad)..(max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(pairs: &[(i64, f64)]) -> RmsdDataset {
        RmsdDataset::from_records(
            pairs
                .iter()
                .map(|&(frame, rmsd)| Record { frame, rmsd })
                .collect(),
        )
    }

    #[test]
    fn raw_record_missing_when_either_field_is_nan() {
        assert!(RawRecord { frame: f64::NAN, rmsd: 1.0 }.is_missing());
        assert!(RawRecord { frame: 1.0, rmsd: f64::NAN }.is_missing());
        assert!(!RawRecord { frame: 1.0, rmsd: 0.2 }.is_missing());
    }

    #[test]
    fn frame_is_truncated() {
        let rec = Record::from_raw(&RawRecord { frame: 3.7, rmsd: 0.1 }).unwrap();
        assert_eq!(rec.frame, 3);
        let rec = Record::from_raw(&RawRecord { frame: -2.5, rmsd: 0.1 }).unwrap();
        assert_eq!(rec.frame, -2);
    }

    #[test]
    fn ranges_are_padded() {
        let ds = dataset(&[(0, 1.0), (10, 3.0)]);
        assert_eq!(ds.frame_range(), -0.5..10.5);
        let y = ds.rmsd_range();
        assert!((y.start - 0.9).abs() < 1e-12);
        assert!((y.end - 3.1).abs() < 1e-12);
    }

    #[test]
    fn degenerate_ranges() {
        assert_eq!(RmsdDataset::default().frame_range(), 0.0..1.0);
        assert_eq!(RmsdDataset::default().rmsd_range(), 0.0..1.0);

        let ds = dataset(&[(4, 2.0)]);
        assert_eq!(ds.frame_range(), 3.5..4.5);
        assert_eq!(ds.rmsd_range(), 1.5..2.5);

        let ds = dataset(&[(0, 1.0e20)]);
        let y = ds.rmsd_range();
        assert!(y.start < 1.0e20 && y.end > 1.0e20);
    }

    #[test]
    fn extreme_values_keep_a_finite_span() {
        let ds = dataset(&[(0, -1.5e308), (1, 1.5e308)]);
        let y = ds.rmsd_range();
        assert!(y.start.is_finite() && y.end.is_finite());
        assert!((y.end - y.start).is_finite());
        assert!(y.start < 0.0 && y.end > 0.0);

        let ds = dataset(&[(0, f64::MAX), (1, f64::MAX)]);
        let y = ds.rmsd_range();
        assert!((y.end - y.start).is_finite() && y.end > y.start);
    }
}
