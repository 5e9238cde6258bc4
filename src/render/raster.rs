use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};
use palette::Srgb;
use plotters::prelude::*;

use crate::data::RmsdDataset;
use crate::error::RenderError;

use super::{draw_chart, fonts, OutputFormat, PlotOptions};

// ---------------------------------------------------------------------------
// Bitmap rendering
// ---------------------------------------------------------------------------

/// Rasterize the chart and encode it as `format`.
pub fn render_raster(
    dataset: &RmsdDataset,
    options: &PlotOptions,
    color: Srgb<u8>,
    format: OutputFormat,
) -> Result<Vec<u8>, RenderError> {
    fonts::ensure_registered(options.font.as_deref())?;

    let (width, height) = options.size;
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_chart(&root, dataset, options, color)?;
    }

    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| RenderError::Encode("pixel buffer size mismatch".to_string()))?;
    encode_image(DynamicImage::ImageRgb8(image), format)
}

/// Encode a finished bitmap. `Raw` is the bare RGBA8 buffer, row-major.
pub fn encode_image(image: DynamicImage, format: OutputFormat) -> Result<Vec<u8>, RenderError> {
    let image_format = match format {
        OutputFormat::Png => ImageFormat::Png,
        OutputFormat::Jpeg => ImageFormat::Jpeg,
        OutputFormat::Tiff => ImageFormat::Tiff,
        OutputFormat::Raw => return Ok(image.to_rgba8().into_raw()),
        other => {
            return Err(RenderError::Encode(format!(
                "{other} is not a raster format"
            )))
        }
    };

    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, image_format)?;
    Ok(out.into_inner())
}
