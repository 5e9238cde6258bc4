use std::convert::Infallible;

use palette::Srgb;
use plotters::prelude::IntoDrawingArea;
use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
    FontStyle, FontTransform,
};

use crate::data::RmsdDataset;
use crate::error::RenderError;

use super::{draw_chart, PlotOptions};

// ---------------------------------------------------------------------------
// Scene – a resolution-independent record of the drawing calls
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub rgb: (u8, u8, u8),
    pub alpha: f64,
}

impl From<BackendColor> for Paint {
    fn from(c: BackendColor) -> Self {
        Paint {
            rgb: c.rgb,
            alpha: c.alpha,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Text rotation, clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Clockwise angle in degrees, y axis pointing down.
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Polyline {
        points: Vec<BackendCoord>,
        paint: Paint,
        width: u32,
    },
    Rect {
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        paint: Paint,
        fill: bool,
    },
    Polygon {
        points: Vec<BackendCoord>,
        paint: Paint,
    },
    Text {
        text: String,
        pos: BackendCoord,
        size: f64,
        paint: Paint,
        bold: bool,
        h_align: HAlign,
        v_align: VAlign,
        rotation: Rotation,
    },
}

/// Drawing primitives in pixel coordinates, origin top-left.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub size: (u32, u32),
    pub shapes: Vec<Shape>,
}

impl Scene {
    pub fn new(size: (u32, u32)) -> Self {
        Scene {
            size,
            shapes: Vec::new(),
        }
    }

    /// Text items in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Draw the chart into a new scene.
pub fn record(
    dataset: &RmsdDataset,
    options: &PlotOptions,
    color: Srgb<u8>,
) -> Result<Scene, RenderError> {
    let mut scene = Scene::new(options.size);
    {
        let root = SceneBackend::new(&mut scene).into_drawing_area();
        draw_chart(&root, dataset, options, color)?;
    }
    log::debug!("scene recorded with {} shapes", scene.shapes.len());
    Ok(scene)
}

/// Average glyph advance relative to the font size, for sans-serif text.
pub const CHAR_WIDTH: f64 = 0.55;

/// Approximate rendered width of `text` at `size`.
pub fn text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * CHAR_WIDTH
}

// ---------------------------------------------------------------------------
// SceneBackend – plotters backend that records instead of rasterizing
// ---------------------------------------------------------------------------

pub struct SceneBackend<'a> {
    scene: &'a mut Scene,
}

impl<'a> SceneBackend<'a> {
    pub fn new(scene: &'a mut Scene) -> Self {
        SceneBackend { scene }
    }

    fn push(&mut self, shape: Shape) {
        self.scene.shapes.push(shape);
    }
}

fn visible(color: &BackendColor) -> bool {
    color.alpha > 0.0
}

impl DrawingBackend for SceneBackend<'_> {
    type ErrorType = Infallible;

    fn get_size(&self) -> (u32, u32) {
        self.scene.size
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Infallible>> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Infallible>> {
        Ok(())
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        if visible(&color) {
            self.push(Shape::Rect {
                upper_left: point,
                bottom_right: (point.0 + 1, point.1 + 1),
                paint: color.into(),
                fill: true,
            });
        }
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        if visible(&style.color()) {
            self.push(Shape::Polyline {
                points: vec![from, to],
                paint: style.color().into(),
                width: style.stroke_width(),
            });
        }
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        if visible(&style.color()) {
            self.push(Shape::Rect {
                upper_left,
                bottom_right,
                paint: style.color().into(),
                fill,
            });
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let points: Vec<BackendCoord> = path.into_iter().collect();
        if points.len() > 1 && visible(&style.color()) {
            self.push(Shape::Polyline {
                points,
                paint: style.color().into(),
                width: style.stroke_width(),
            });
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let points: Vec<BackendCoord> = vert.into_iter().collect();
        if points.len() > 2 && visible(&style.color()) {
            self.push(Shape::Polygon {
                points,
                paint: style.color().into(),
            });
        }
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let anchor = style.anchor();
        let h_align = match anchor.h_pos {
            HPos::Left => HAlign::Left,
            HPos::Center => HAlign::Center,
            HPos::Right => HAlign::Right,
        };
        let v_align = match anchor.v_pos {
            VPos::Top => VAlign::Top,
            VPos::Center => VAlign::Center,
            VPos::Bottom => VAlign::Bottom,
        };
        let rotation = match style.transform() {
            FontTransform::None => Rotation::None,
            FontTransform::Rotate90 => Rotation::Cw90,
            FontTransform::Rotate180 => Rotation::Cw180,
            FontTransform::Rotate270 => Rotation::Cw270,
        };
        self.push(Shape::Text {
            text: text.to_string(),
            pos,
            size: style.size(),
            paint: style.color().into(),
            bold: matches!(style.style(), FontStyle::Bold),
            h_align,
            v_align,
            rotation,
        });
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Infallible>> {
        let size = style.size();
        let (w, h) = (text_width(text, size).ceil() as u32, size.ceil() as u32);
        Ok(match style.transform() {
            FontTransform::Rotate90 | FontTransform::Rotate270 => (h, w),
            _ => (w, h),
        })
    }
}
