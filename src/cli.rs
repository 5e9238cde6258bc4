use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use crate::render::{OutputFormat, EXTENSIONS};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

const ABOUT: &str = "Plot the Root Mean Square Deviation (RMSD) values from a '.dat' file for a molecule.";

const LONG_ABOUT: &str = "\
Plot the Root Mean Square Deviation (RMSD) values from a '.dat' file for a molecule.

The input holds one frame per line: the frame index and its RMSD value,
separated by whitespace. Rows where either value is 'NA' or not a number are
left out of the plot.

Distributed on an \"AS IS\" basis without warranties or conditions of any kind,
either express or implied.";

#[derive(Parser, Debug)]
#[command(
    name = "rmsd-plot",
    version,
    about = ABOUT,
    long_about = LONG_ABOUT,
    after_help = extensions_help(),
    disable_version_flag = true
)]
pub struct Args {
    /// The .dat file.
    pub input: PathBuf,

    /// Path to the output file. The extension selects the format.
    #[arg(short, long, value_parser = output_path_parser)]
    pub out: PathBuf,

    /// The plot title.
    #[arg(short, long)]
    pub title: String,

    /// The line plot color: a color name, `tab:<name>`, a `#rrggbb` code,
    /// `C0`..`C9`, or a gray level between 0 and 1.
    #[arg(short, long, default_value = "blue")]
    pub color: String,

    /// Path for the log file. If this option is skipped, the log file is
    /// created in the output directory.
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Set the log level.
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Comment marker in the input file, e.g. `#`. By default every line is data.
    #[arg(long)]
    pub comment: Option<String>,

    /// TrueType font used for raster outputs (png, jpg, tif, raw).
    #[arg(long, env = "RMSD_PLOT_FONT")]
    pub font: Option<PathBuf>,

    /// Print version.
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    pub version: Option<bool>,
}

/// Reject output paths whose extension has no encoder.
fn output_path_parser(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    OutputFormat::from_path(&path)
        .map(|_| path)
        .map_err(|e| e.to_string())
}

/// `<output directory>/rmsd-plot.log`.
pub fn default_log_path(out: &Path) -> PathBuf {
    output_dir(out).join(format!("{}.log", env!("CARGO_PKG_NAME")))
}

/// Directory of the output file, `.` for a bare file name.
pub fn output_dir(out: &Path) -> &Path {
    match out.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Supported extensions with their descriptions, one per line.
pub fn extensions_help() -> String {
    let lines: Vec<String> = EXTENSIONS
        .iter()
        .map(|(ext, _, desc)| format!("  {ext:<5} {desc}"))
        .collect();
    format!("Output formats:\n{}", lines.join("\n"))
}

// ---------------------------------------------------------------------------
// Log level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// `log` has no level above error, so CRITICAL keeps errors only.
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Error | LogLevel::Critical => LevelFilter::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("rmsd-plot").chain(args.iter().copied()))
    }

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = parse(&["-o", "out/plot.svg", "-t", "Title", "rmsd.dat"]).unwrap();
        assert_eq!(args.input, PathBuf::from("rmsd.dat"));
        assert_eq!(args.out, PathBuf::from("out/plot.svg"));
        assert_eq!(args.color, "blue");
        assert_eq!(args.log, None);
        assert_eq!(args.log_level, LogLevel::Info);
        assert_eq!(args.comment, None);
    }

    #[test]
    fn long_options() {
        let args = parse(&[
            "--out",
            "plot.PNG",
            "--title",
            "T",
            "--color",
            "red",
            "--log",
            "run.log",
            "--log-level",
            "debug",
            "--comment",
            "#",
            "in.dat",
        ])
        .unwrap();
        assert_eq!(args.color, "red");
        assert_eq!(args.log, Some(PathBuf::from("run.log")));
        assert_eq!(args.log_level, LogLevel::Debug);
        assert_eq!(args.comment.as_deref(), Some("#"));
    }

    #[test]
    fn bad_extension_is_rejected() {
        let err = parse(&["-o", "result.txt", "-t", "T", "in.dat"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("has not a valid extension"));
    }

    #[test]
    fn required_arguments() {
        assert!(parse(&["-t", "T", "in.dat"]).is_err());
        assert!(parse(&["-o", "a.png", "in.dat"]).is_err());
        assert!(parse(&["-o", "a.png", "-t", "T"]).is_err());
    }

    #[test]
    fn version_flag() {
        let err = parse(&["-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert!(err.to_string().contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn unknown_log_level() {
        assert!(parse(&["-o", "a.png", "-t", "T", "--log-level", "LOUD", "in.dat"]).is_err());
    }

    #[test]
    fn log_path_next_to_output() {
        assert_eq!(
            default_log_path(Path::new("results/plots/rmsd.png")),
            PathBuf::from("results/plots/rmsd-plot.log")
        );
        assert_eq!(
            default_log_path(Path::new("rmsd.png")),
            PathBuf::from("./rmsd-plot.log")
        );
    }

    #[test]
    fn critical_maps_to_error() {
        assert_eq!(LogLevel::Critical.filter(), LevelFilter::Error);
        assert_eq!(LogLevel::Warning.filter(), LevelFilter::Warn);
    }
}
