use std::io;
use std::path::Path;

use crate::error::ExtractError;

use super::model::RawRecord;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How the data file is tokenized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Token standing for a missing measurement.
    pub sentinel: String,
    /// Comment marker; the rest of a line after it is ignored.
    /// `None` treats every line as data.
    pub comment: Option<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            sentinel: "NA".to_string(),
            comment: None,
        }
    }
}

/// A line that could not be split into two fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// 1-based line number.
    pub line: usize,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read a whitespace-delimited `.dat` file into raw records.
///
/// Expected layout, one record per line:
///
/// ```text
/// 0    0.000
/// 1    0.512
/// 2    NA
/// ```
pub fn load_file(path: &Path, options: &ExtractOptions) -> Result<Vec<RawRecord>, ExtractError> {
    let text = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ExtractError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ExtractError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let records = parse_table(&text, options).map_err(|e| ExtractError::Parse {
        path: path.to_path_buf(),
        line: e.line,
        content: e.content,
    })?;
    log::debug!("{} data lines read from {}", records.len(), path.display());
    Ok(records)
}

/// Tokenize the table text. Blank lines are skipped, extra columns ignored.
pub fn parse_table(text: &str, options: &ExtractOptions) -> Result<Vec<RawRecord>, LineError> {
    let mut records = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let data = match options.comment.as_deref() {
            Some(marker) if !marker.is_empty() => line.split(marker).next().unwrap_or(""),
            _ => line,
        };

        let mut tokens = data.split_whitespace();
        let Some(first) = tokens.next() else {
            continue;
        };
        let Some(second) = tokens.next() else {
            return Err(LineError {
                line: i + 1,
                content: line.to_string(),
            });
        };

        records.push(RawRecord {
            frame: parse_field(first, &options.sentinel),
            rmsd: parse_field(second, &options.sentinel),
        });
    }

    Ok(records)
}

/// Parse one token, NaN for the sentinel or anything that is not a finite number.
fn parse_field(token: &str, sentinel: &str) -> f64 {
    if token == sentinel {
        return f64::NAN;
    }
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<RawRecord> {
        parse_table(text, &ExtractOptions::default()).unwrap()
    }

    #[test]
    fn sentinel_and_garbage_become_nan() {
        let recs = parse("0 0.5\n1 NA\nNA 2.0\nx 1.0\n4 inf\n");
        assert_eq!(recs.len(), 5);
        assert_eq!(recs[0], RawRecord { frame: 0.0, rmsd: 0.5 });
        assert!(recs[1].rmsd.is_nan());
        assert!(recs[2].frame.is_nan());
        assert!(recs[3].frame.is_nan());
        assert!(recs[4].rmsd.is_nan());
    }

    #[test]
    fn blank_lines_and_extra_columns() {
        let recs = parse("\n  \n0\t0.1\t99\n\n1   0.2 extra\n");
        assert_eq!(
            recs,
            vec![
                RawRecord { frame: 0.0, rmsd: 0.1 },
                RawRecord { frame: 1.0, rmsd: 0.2 },
            ]
        );
    }

    #[test]
    fn single_token_line_is_an_error() {
        let err = parse_table("0 0.1\n1\n2 0.3\n", &ExtractOptions::default()).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.content, "1");
    }

    #[test]
    fn comments_disabled_by_default() {
        // Without a marker a header line is just two unparseable fields.
        let recs = parse("# frame rmsd\n0 0.1\n");
        assert_eq!(recs.len(), 2);
        assert!(recs[0].is_missing());
    }

    #[test]
    fn comment_marker_strips_lines_and_tails() {
        let options = ExtractOptions {
            comment: Some("#".to_string()),
            ..ExtractOptions::default()
        };
        let recs = parse_table("# header\n0 0.1 # first\n#\n1 0.2\n", &options).unwrap();
        assert_eq!(
            recs,
            vec![
                RawRecord { frame: 0.0, rmsd: 0.1 },
                RawRecord { frame: 1.0, rmsd: 0.2 },
            ]
        );
    }

    #[test]
    fn custom_sentinel() {
        let options = ExtractOptions {
            sentinel: "-".to_string(),
            ..ExtractOptions::default()
        };
        let recs = parse_table("0 -\n1 NA\n", &options).unwrap();
        assert!(recs[0].rmsd.is_nan());
        // "NA" is still not a number, so it is missing either way.
        assert!(recs[1].rmsd.is_nan());
    }
}
