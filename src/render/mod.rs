/// Rendering layer: one chart, many encodings.
///
/// ```text
///   RmsdDataset + PlotOptions
///        │
///        ▼
///   draw_chart (plotters, generic over the backend)
///        │
///        ├── BitMapBackend → raster → png / jpg / tif / raw
///        │
///        └── SceneBackend  → Scene  → svg / svgz / ps / pdf / pgf
/// ```
///
/// Everything is encoded in memory first, written to a temporary file next
/// to the target and renamed over it, so a failure never leaves a
/// half-written artifact behind.

pub mod fonts;
pub mod pdf;
pub mod raster;
pub mod scene;
pub mod vector;

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use palette::Srgb;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::FontStyle;

use crate::color::parse_color;
use crate::data::RmsdDataset;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Output formats
// ---------------------------------------------------------------------------

/// Artifact encodings, chosen from the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Pdf,
    Pgf,
    Png,
    PostScript,
    Raw,
    Svg,
    Svgz,
    Tiff,
}

/// Accepted extensions and their meaning, in the order they are listed to users.
pub const EXTENSIONS: &[(&str, OutputFormat, &str)] = &[
    ("jpg", OutputFormat::Jpeg, "Joint Photographic Experts Group"),
    ("jpeg", OutputFormat::Jpeg, "Joint Photographic Experts Group"),
    ("pdf", OutputFormat::Pdf, "Portable Document Format"),
    ("pgf", OutputFormat::Pgf, "PGF code for LaTeX"),
    ("png", OutputFormat::Png, "Portable Network Graphics"),
    ("ps", OutputFormat::PostScript, "Postscript"),
    ("raw", OutputFormat::Raw, "Raw RGBA bitmap"),
    ("rgba", OutputFormat::Raw, "Raw RGBA bitmap"),
    ("svg", OutputFormat::Svg, "Scalable Vector Graphics"),
    ("svgz", OutputFormat::Svgz, "Scalable Vector Graphics"),
    ("tif", OutputFormat::Tiff, "Tagged Image File Format"),
    ("tiff", OutputFormat::Tiff, "Tagged Image File Format"),
];

impl OutputFormat {
    /// Pick the format from the path extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(name, _, _)| *name == ext)
            .map(|&(_, format, _)| format)
            .ok_or_else(|| RenderError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
    }

    /// `.jpg, .jpeg, ...` for error messages.
    pub fn extension_list() -> String {
        EXTENSIONS
            .iter()
            .map(|(ext, _, _)| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether glyphs have to be rasterized, which needs a font file.
    pub fn is_raster(self) -> bool {
        matches!(
            self,
            OutputFormat::Jpeg | OutputFormat::Png | OutputFormat::Raw | OutputFormat::Tiff
        )
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Pdf => "PDF",
            OutputFormat::Pgf => "PGF",
            OutputFormat::Png => "PNG",
            OutputFormat::PostScript => "PostScript",
            OutputFormat::Raw => "raw RGBA",
            OutputFormat::Svg => "SVG",
            OutputFormat::Svgz => "gzipped SVG",
            OutputFormat::Tiff => "TIFF",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Plot options
// ---------------------------------------------------------------------------

/// Presentation settings for a single plot.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub title: String,
    /// Color name or hex code, validated at render time.
    pub color: String,
    pub x_label: String,
    pub y_label: String,
    /// Canvas size in pixels (100 px per inch).
    pub size: (u32, u32),
    /// TrueType font for raster output; system fonts are searched when `None`.
    pub font: Option<PathBuf>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            color: "blue".to_string(),
            x_label: "frames".to_string(),
            y_label: "RMSD (\u{212B})".to_string(),
            size: (1500, 1200),
            font: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Plot `dataset` to `path` and return the absolute path written.
///
/// The color is checked first, then the extension, then the chart is drawn
/// and encoded. Only a fully encoded artifact reaches the disk.
pub fn render(
    dataset: &RmsdDataset,
    options: &PlotOptions,
    path: &Path,
) -> Result<PathBuf, RenderError> {
    let color = parse_color(&options.color)?;
    let format = OutputFormat::from_path(path)?;

    if dataset.is_empty() {
        log::warn!("no RMSD values to plot, drawing empty axes");
    }

    let bytes = encode(dataset, options, color, format)?;
    write_replacing(path, &bytes).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("{} bytes of {format} written", bytes.len());

    std::path::absolute(path).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `bytes` to a sibling temporary file, then rename it to `path`.
/// The temporary file is removed if any step fails.
fn write_replacing(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".rmsd-plot-")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Draw and encode without touching the filesystem.
pub fn encode(
    dataset: &RmsdDataset,
    options: &PlotOptions,
    color: Srgb<u8>,
    format: OutputFormat,
) -> Result<Vec<u8>, RenderError> {
    if format.is_raster() {
        return raster::render_raster(dataset, options, color, format);
    }

    let scene = scene::record(dataset, options, color)?;
    match format {
        OutputFormat::Svg => Ok(vector::to_svg(&scene).into_bytes()),
        OutputFormat::Svgz => vector::to_svgz(&scene),
        OutputFormat::PostScript => Ok(vector::to_postscript(&scene).into_bytes()),
        OutputFormat::Pgf => Ok(vector::to_pgf(&scene).into_bytes()),
        OutputFormat::Pdf => pdf::to_pdf(&scene),
        OutputFormat::Jpeg | OutputFormat::Png | OutputFormat::Raw | OutputFormat::Tiff => {
            unreachable!("raster formats are handled above")
        }
    }
}

// ---------------------------------------------------------------------------
// Chart drawing shared by all backends
// ---------------------------------------------------------------------------

/// Seaborn "darkgrid" plot area.
const PLOT_BACKGROUND: RGBColor = RGBColor(234, 234, 242);

pub(crate) fn drawing_error<E: std::error::Error + Send + Sync>(
    e: DrawingAreaErrorKind<E>,
) -> RenderError {
    RenderError::Drawing(e.to_string())
}

/// Draw title, axes, grid and the RMSD line onto `root`.
pub(crate) fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    dataset: &RmsdDataset,
    options: &PlotOptions,
    color: Srgb<u8>,
) -> Result<(), RenderError> {
    root.fill(&WHITE).map_err(drawing_error)?;

    let (width, height) = root.dim_in_pixel();
    let scale = f64::from(width.min(height)) / 1200.0;
    let px = |v: f64| (v * scale).round().max(1.0);

    let mut chart = ChartBuilder::on(root)
        .caption(
            &options.title,
            ("sans-serif", px(32.0)).into_font().style(FontStyle::Bold),
        )
        .margin(px(40.0) as u32)
        .x_label_area_size(px(80.0) as u32)
        .y_label_area_size(px(110.0) as u32)
        .build_cartesian_2d(dataset.frame_range(), dataset.rmsd_range())
        .map_err(drawing_error)?;

    chart
        .plotting_area()
        .fill(&PLOT_BACKGROUND)
        .map_err(drawing_error)?;

    chart
        .configure_mesh()
        .bold_line_style(WHITE.stroke_width(px(2.0) as u32))
        .light_line_style(WHITE.mix(0.5))
        .axis_style(PLOT_BACKGROUND)
        .x_desc(options.x_label.as_str())
        .y_desc(options.y_label.as_str())
        .axis_desc_style(("sans-serif", px(24.0)).into_font().style(FontStyle::Bold))
        .label_style(("sans-serif", px(20.0)).into_font())
        .x_label_formatter(&|x| format!("{x:.0}"))
        .y_label_formatter(&|y| format!("{y:.2}"))
        .draw()
        .map_err(drawing_error)?;

    let line = RGBColor(color.red, color.green, color.blue);
    chart
        .draw_series(LineSeries::new(
            dataset.points(),
            line.stroke_width(px(2.5) as u32),
        ))
        .map_err(drawing_error)?;

    root.present().map_err(drawing_error)?;
    Ok(())
}
