use super::model::{RawRecord, Record, RmsdDataset};

// ---------------------------------------------------------------------------
// Missing-value filter
// ---------------------------------------------------------------------------

/// Drop every record with a missing field and keep the rest in source order.
pub fn drop_missing(raw: Vec<RawRecord>) -> RmsdDataset {
    let total = raw.len();
    let records: Vec<Record> = raw.iter().filter_map(Record::from_raw).collect();
    if records.len() < total {
        log::debug!("{} records with missing values dropped", total - records.len());
    }
    RmsdDataset::from_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(frame: f64, rmsd: f64) -> RawRecord {
        RawRecord { frame, rmsd }
    }

    #[test]
    fn keeps_order_and_drops_missing() {
        let ds = drop_missing(vec![
            raw(5.0, 0.5),
            raw(f64::NAN, 0.7),
            raw(1.0, 1.2),
            raw(2.0, f64::NAN),
            raw(0.0, 0.1),
        ]);
        let frames: Vec<i64> = ds.records().iter().map(|r| r.frame).collect();
        assert_eq!(frames, vec![5, 1, 0]);
    }

    #[test]
    fn all_missing_gives_empty_dataset() {
        let ds = drop_missing(vec![raw(f64::NAN, 1.0), raw(1.0, f64::NAN)]);
        assert!(ds.is_empty());
    }
}
