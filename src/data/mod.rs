/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  rmsd.dat (frame  RMSD|NA)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  tokenize lines → Vec<RawRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  drop rows with a missing field
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ RmsdDataset │  Vec<Record>, source order
///   └─────────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;

use std::path::Path;

use crate::error::ExtractError;

pub use loader::ExtractOptions;
pub use model::{RawRecord, Record, RmsdDataset};

/// Read `path` and return the cleaned series.
pub fn extract_data(path: &Path, options: &ExtractOptions) -> Result<RmsdDataset, ExtractError> {
    let raw = loader::load_file(path, options)?;
    Ok(filter::drop_missing(raw))
}
