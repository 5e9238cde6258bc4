use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use rmsd_plot::app::{report_error, RmsdPlotApp};
use rmsd_plot::cli::{default_log_path, output_dir, Args};
use rmsd_plot::{logging, VERSION};

fn main() -> ExitCode {
    // The output extension is checked here, before anything touches the disk.
    let args = Args::parse();

    if let Err(e) = std::fs::create_dir_all(output_dir(&args.out))
        .with_context(|| format!("creating output directory for {}", args.out.display()))
    {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    let log_path = args
        .log
        .clone()
        .unwrap_or_else(|| default_log_path(&args.out));
    if let Err(e) = logging::init(&log_path, args.log_level) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    log::info!("version: {VERSION}");
    log::info!("CMD: {}", std::env::args().collect::<Vec<_>>().join(" "));

    match RmsdPlotApp::from_args(&args).run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}
