use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use crate::error::RenderError;

use super::scene::{text_width, Paint, Rotation, Scene, Shape};
use super::vector::{align_factor, baseline_offset, latin1, PT_PER_PX};

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

fn op(name: &str, operands: Vec<Object>) -> Operation {
    Operation::new(name, operands)
}

/// WinAnsi bytes for the standard Helvetica fonts; unmapped chars become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match latin1(c) {
            Some(b) if b >= 0x20 && !(0x7f..0xa0).contains(&b) => b,
            _ => b'?',
        })
        .collect()
}

struct Page {
    height: f64,
    ops: Vec<Operation>,
}

impl Page {
    fn point(&self, (x, y): (i32, i32)) -> (f64, f64) {
        (f64::from(x) * PT_PER_PX, self.height - f64::from(y) * PT_PER_PX)
    }

    fn stroke_color(&mut self, paint: &Paint) {
        let (r, g, b) = paint.flatten();
        self.ops.push(op("RG", vec![real(r), real(g), real(b)]));
    }

    fn fill_color(&mut self, paint: &Paint) {
        let (r, g, b) = paint.flatten();
        self.ops.push(op("rg", vec![real(r), real(g), real(b)]));
    }

    fn path(&mut self, points: &[(i32, i32)]) {
        for (i, &p) in points.iter().enumerate() {
            let (x, y) = self.point(p);
            let name = if i == 0 { "m" } else { "l" };
            self.ops.push(op(name, vec![real(x), real(y)]));
        }
    }

    fn shape(&mut self, shape: &Shape) {
        match shape {
            Shape::Polyline {
                points,
                paint,
                width,
            } => {
                self.stroke_color(paint);
                self.ops
                    .push(op("w", vec![real(f64::from(*width) * PT_PER_PX)]));
                self.path(points);
                self.ops.push(op("S", vec![]));
            }
            Shape::Rect {
                upper_left,
                bottom_right,
                paint,
                fill,
            } => {
                let (x0, y0) = self.point(*upper_left);
                let (x1, y1) = self.point(*bottom_right);
                self.ops
                    .push(op("re", vec![real(x0), real(y1), real(x1 - x0), real(y0 - y1)]));
                if *fill {
                    self.fill_color(paint);
                    self.ops.push(op("f", vec![]));
                } else {
                    self.stroke_color(paint);
                    self.ops.push(op("S", vec![]));
                }
            }
            Shape::Polygon { points, paint } => {
                self.fill_color(paint);
                self.path(points);
                self.ops.push(op("h", vec![]));
                self.ops.push(op("f", vec![]));
            }
            Shape::Text {
                text,
                pos,
                size,
                paint,
                bold,
                h_align,
                v_align,
                rotation,
            } => {
                let size = size * PT_PER_PX;
                let (x, y) = self.point(*pos);
                // Offsets in the text's own frame, y up.
                let dx = align_factor(*h_align) * text_width(text, size);
                let dy = -baseline_offset(*v_align) * size;

                // Counterclockwise angle, PDF y axis points up.
                let angle = f64::from((360 - rotation.degrees()) % 360).to_radians();
                let (sin, cos) = if *rotation == Rotation::None {
                    (0.0, 1.0)
                } else {
                    angle.sin_cos()
                };
                let tx = x + dx * cos - dy * sin;
                let ty = y + dx * sin + dy * cos;

                self.fill_color(paint);
                self.ops.push(op("BT", vec![]));
                let font = if *bold { "F2" } else { "F1" };
                self.ops
                    .push(op("Tf", vec![Object::Name(font.as_bytes().to_vec()), real(size)]));
                self.ops.push(op(
                    "Tm",
                    vec![real(cos), real(sin), real(-sin), real(cos), real(tx), real(ty)],
                ));
                self.ops.push(op(
                    "Tj",
                    vec![Object::String(win_ansi(text), StringFormat::Literal)],
                ));
                self.ops.push(op("ET", vec![]));
            }
        }
    }
}

/// Serialize as a one-page PDF using the built-in Helvetica fonts.
pub fn to_pdf(scene: &Scene) -> Result<Vec<u8>, RenderError> {
    let (w, h) = scene.size;
    let (w_pt, h_pt) = (f64::from(w) * PT_PER_PX, f64::from(h) * PT_PER_PX);

    let mut page = Page {
        height: h_pt,
        ops: vec![op("J", vec![Object::Integer(1)]), op("j", vec![Object::Integer(1)])],
    };
    for shape in &scene.shapes {
        page.shape(shape);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let content = Content {
        operations: page.ops,
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![Object::Integer(0), Object::Integer(0), real(w_pt), real(h_pt)],
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => Object::Integer(1),
        "Resources" => resources_id,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::scene::{HAlign, VAlign};

    fn scene() -> Scene {
        let mut scene = Scene::new((200, 100));
        scene.shapes.push(Shape::Polyline {
            points: vec![(0, 100), (200, 0)],
            paint: Paint {
                rgb: (255, 0, 0),
                alpha: 1.0,
            },
            width: 1,
        });
        scene.shapes.push(Shape::Text {
            text: "RMSD (\u{212B})".to_string(),
            pos: (100, 50),
            size: 10.0,
            paint: Paint {
                rgb: (0, 0, 0),
                alpha: 1.0,
            },
            bold: false,
            h_align: HAlign::Center,
            v_align: VAlign::Center,
            rotation: Rotation::None,
        });
        scene
    }

    #[test]
    fn pdf_loads_back_with_one_page() {
        let bytes = to_pdf(&scene()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn text_is_win_ansi() {
        assert_eq!(win_ansi("RMSD (\u{212B})"), b"RMSD (\xc5)".to_vec());
        assert_eq!(win_ansi("\u{3b1}"), b"?".to_vec());
    }
}
