use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::Args;
use crate::data::{extract_data, ExtractOptions};
use crate::error::RenderError;
use crate::render::{render, PlotOptions};

// ---------------------------------------------------------------------------
// Batch pipeline: extract → render → log
// ---------------------------------------------------------------------------

/// Everything one run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RmsdPlotApp {
    pub input: PathBuf,
    pub output: PathBuf,
    pub extract: ExtractOptions,
    pub plot: PlotOptions,
}

impl RmsdPlotApp {
    pub fn from_args(args: &Args) -> Self {
        Self {
            input: args.input.clone(),
            output: args.out.clone(),
            extract: ExtractOptions {
                comment: args.comment.clone(),
                ..ExtractOptions::default()
            },
            plot: PlotOptions {
                title: args.title.clone(),
                color: args.color.clone(),
                font: args.font.clone(),
                ..PlotOptions::default()
            },
        }
    }

    /// Run the pipeline and return the absolute path of the plot.
    pub fn run(&self) -> Result<PathBuf> {
        let dataset = extract_data(&self.input, &self.extract)
            .with_context(|| format!("extracting RMSD values from {}", self.input.display()))?;
        log::info!("{} frames RMSD values extracted for the RMSD plot.", dataset.len());

        let written = render(&dataset, &self.plot, &self.output)?;
        log::info!("RMSD plot created: {}", written.display());
        Ok(written)
    }
}

/// Log a failed run. Invalid colors list the valid names, one per line.
pub fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<RenderError>() {
        Some(RenderError::InvalidColor { name, available }) => {
            log::error!(
                "\"{name}\" is not a valid color. Choose a color in:\n{}",
                available.join("\n")
            );
        }
        _ => log::error!("{err:#}"),
    }
}
