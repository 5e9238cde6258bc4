use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning a data file into a dataset.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("input file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("cannot read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: expected at least two fields, got {content:?}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        content: String,
    },
}

/// Failures while drawing or writing the plot.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The color is not in the palette. `available` is sorted by hue.
    #[error("\"{name}\" is not a valid color")]
    InvalidColor {
        name: String,
        available: Vec<&'static str>,
    },

    #[error(
        "{} has not a valid extension. Valid extensions are: {}",
        path.display(),
        crate::render::OutputFormat::extension_list()
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("no usable font found for raster output, pass one with --font")]
    FontUnavailable,

    #[error("invalid font {}: {message}", path.display())]
    Font { path: PathBuf, message: String },

    #[error("drawing failed: {0}")]
    Drawing(String),

    #[error("encoding failed: {0}")]
    Encode(String),

    #[error("cannot write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<image::ImageError> for RenderError {
    fn from(e: image::ImageError) -> Self {
        RenderError::Encode(e.to_string())
    }
}

impl From<lopdf::Error> for RenderError {
    fn from(e: lopdf::Error) -> Self {
        RenderError::Encode(e.to_string())
    }
}
