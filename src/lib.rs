//! Plot RMSD values from a molecular dynamics `.dat` file.
//!
//! The input is a whitespace-delimited table of frame indices and RMSD
//! values; rows holding `NA` are dropped and the rest is drawn as a line
//! chart in the format chosen by the output extension.

pub mod app;
pub mod cli;
pub mod color;
pub mod data;
pub mod error;
pub mod logging;
pub mod render;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
