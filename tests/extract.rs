use std::path::PathBuf;

use rmsd_plot::data::{extract_data, ExtractOptions, Record};
use rmsd_plot::error::ExtractError;

fn write_dat(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn sentinel_rows_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dat(&dir, "rmsd.dat", "0 0.5\n1 NA\n2 1.2\n");

    let dataset = extract_data(&path, &ExtractOptions::default()).unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(
        dataset.records(),
        &[
            Record { frame: 0, rmsd: 0.5 },
            Record { frame: 2, rmsd: 1.2 },
        ]
    );
}

#[test]
fn count_is_rows_minus_contaminated_rows() {
    let dir = tempfile::tempdir().unwrap();
    let mut content = String::new();
    let mut expected = Vec::new();
    for frame in 0..500 {
        match frame % 7 {
            0 => content.push_str(&format!("{frame} NA\n")),
            3 => content.push_str(&format!("NA {}\n", frame as f64 / 100.0)),
            _ => {
                let rmsd = frame as f64 / 100.0;
                content.push_str(&format!("{frame}\t{rmsd}\n"));
                expected.push(frame);
            }
        }
    }
    let path = write_dat(&dir, "long.dat", &content);

    let dataset = extract_data(&path, &ExtractOptions::default()).unwrap();

    let frames: Vec<i64> = dataset.records().iter().map(|r| r.frame).collect();
    assert_eq!(frames, expected);
    assert!(dataset
        .records()
        .iter()
        .all(|r| r.rmsd.is_finite()));
}

#[test]
fn order_is_not_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dat(&dir, "shuffled.dat", "9 0.9\n3 0.3\nNA NA\n5 0.5\n");

    let dataset = extract_data(&path, &ExtractOptions::default()).unwrap();

    let frames: Vec<i64> = dataset.records().iter().map(|r| r.frame).collect();
    assert_eq!(frames, vec![9, 3, 5]);
}

#[test]
fn all_missing_gives_empty_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dat(&dir, "empty.dat", "0 NA\n1 NA\nNA 0.4\n");

    let dataset = extract_data(&path, &ExtractOptions::default()).unwrap();
    assert!(dataset.is_empty());
}

#[test]
fn empty_file_gives_empty_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dat(&dir, "blank.dat", "");

    let dataset = extract_data(&path, &ExtractOptions::default()).unwrap();
    assert!(dataset.is_empty());
}

#[test]
fn float_frames_are_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dat(&dir, "floats.dat", "0.0 1.5e-1\n1.0 2.5E-1\n");

    let dataset = extract_data(&path, &ExtractOptions::default()).unwrap();
    assert_eq!(
        dataset.records(),
        &[
            Record { frame: 0, rmsd: 0.15 },
            Record { frame: 1, rmsd: 0.25 },
        ]
    );
}

#[test]
fn comment_lines_with_marker() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dat(
        &dir,
        "commented.dat",
        "# RMSD of the backbone\n# frame rmsd\n0 0.1\n1 0.2 # restart\n",
    );
    let options = ExtractOptions {
        comment: Some("#".to_string()),
        ..ExtractOptions::default()
    };

    let dataset = extract_data(&path, &options).unwrap();
    assert_eq!(dataset.len(), 2);

    // Without the marker the header lines are rows with missing values and
    // the trailing comment is an ignored extra column.
    let dataset = extract_data(&path, &ExtractOptions::default()).unwrap();
    assert_eq!(dataset.len(), 2);
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.dat");

    let err = extract_data(&path, &ExtractOptions::default()).unwrap_err();
    match err {
        ExtractError::NotFound { path: reported } => assert_eq!(reported, path),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn directory_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();

    let err = extract_data(dir.path(), &ExtractOptions::default()).unwrap_err();
    assert!(matches!(err, ExtractError::Read { .. }));
}

#[test]
fn one_field_line_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dat(&dir, "broken.dat", "0 0.1\n1 0.2\n\n2\n3 0.4\n");

    let err = extract_data(&path, &ExtractOptions::default()).unwrap_err();
    match &err {
        ExtractError::Parse { line, content, .. } => {
            assert_eq!(*line, 4);
            assert_eq!(content, "2");
        }
        other => panic!("expected Parse, got {other:?}"),
    }
    assert!(err.to_string().contains("broken.dat:4"));
}
