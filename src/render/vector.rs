use std::fmt::Write as _;
use std::io::Write as _;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::RenderError;

use super::scene::{HAlign, Paint, Rotation, Scene, Shape, VAlign};

/// PostScript, PDF and PGF use points; the scene is at 100 px per inch.
pub const PT_PER_PX: f64 = 0.72;

/// Distance from the anchor point down to the text baseline, in font sizes.
pub fn baseline_offset(v_align: VAlign) -> f64 {
    match v_align {
        VAlign::Top => 0.8,
        VAlign::Center => 0.35,
        VAlign::Bottom => -0.2,
    }
}

/// Horizontal shift of the text start, in text widths.
pub fn align_factor(h_align: HAlign) -> f64 {
    match h_align {
        HAlign::Left => 0.0,
        HAlign::Center => -0.5,
        HAlign::Right => -1.0,
    }
}

impl Paint {
    /// The color composited over white, for formats without transparency.
    pub fn flatten(&self) -> (f64, f64, f64) {
        let a = self.alpha.clamp(0.0, 1.0);
        let mix = |c: u8| (f64::from(c) / 255.0) * a + (1.0 - a);
        (mix(self.rgb.0), mix(self.rgb.1), mix(self.rgb.2))
    }
}

// ---------------------------------------------------------------------------
// SVG
// ---------------------------------------------------------------------------

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn svg_paint(attr: &str, paint: &Paint) -> String {
    let (r, g, b) = paint.rgb;
    let mut s = format!("{attr}=\"#{r:02X}{g:02X}{b:02X}\"");
    if paint.alpha < 1.0 {
        let _ = write!(s, " {attr}-opacity=\"{:.3}\"", paint.alpha);
    }
    s
}

fn svg_points(points: &[(i32, i32)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x},{y}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Serialize as a standalone SVG document in pixel units.
pub fn to_svg(scene: &Scene) -> String {
    let (w, h) = scene.size;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">"
    );

    for shape in &scene.shapes {
        match shape {
            Shape::Polyline {
                points,
                paint,
                width,
            } => {
                let _ = writeln!(
                    out,
                    "<polyline fill=\"none\" {} stroke-width=\"{width}\" stroke-linejoin=\"round\" points=\"{}\"/>",
                    svg_paint("stroke", paint),
                    svg_points(points)
                );
            }
            Shape::Rect {
                upper_left: (x0, y0),
                bottom_right: (x1, y1),
                paint,
                fill,
            } => {
                let style = if *fill {
                    svg_paint("fill", paint)
                } else {
                    format!("fill=\"none\" {}", svg_paint("stroke", paint))
                };
                let _ = writeln!(
                    out,
                    "<rect x=\"{x0}\" y=\"{y0}\" width=\"{}\" height=\"{}\" {style}/>",
                    x1 - x0,
                    y1 - y0
                );
            }
            Shape::Polygon { points, paint } => {
                let _ = writeln!(
                    out,
                    "<polygon {} points=\"{}\"/>",
                    svg_paint("fill", paint),
                    svg_points(points)
                );
            }
            Shape::Text {
                text,
                pos: (x, y),
                size,
                paint,
                bold,
                h_align,
                v_align,
                rotation,
            } => {
                let anchor = match h_align {
                    HAlign::Left => "start",
                    HAlign::Center => "middle",
                    HAlign::Right => "end",
                };
                let mut attrs = format!(
                    "x=\"{x}\" y=\"{y}\" dy=\"{:.2}\" text-anchor=\"{anchor}\" font-family=\"sans-serif\" font-size=\"{size:.1}\" {}",
                    baseline_offset(*v_align) * size,
                    svg_paint("fill", paint)
                );
                if *bold {
                    attrs.push_str(" font-weight=\"bold\"");
                }
                if *rotation != Rotation::None {
                    let _ = write!(attrs, " transform=\"rotate({}, {x}, {y})\"", rotation.degrees());
                }
                let _ = writeln!(out, "<text {attrs}>{}</text>", escape_xml(text));
            }
        }
    }

    out.push_str("</svg>\n");
    out
}

/// SVG compressed with gzip.
pub fn to_svgz(scene: &Scene) -> Result<Vec<u8>, RenderError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    let encode_error = |e: std::io::Error| RenderError::Encode(e.to_string());
    encoder
        .write_all(to_svg(scene).as_bytes())
        .map_err(encode_error)?;
    encoder.finish().map_err(encode_error)
}

// ---------------------------------------------------------------------------
// PostScript
// ---------------------------------------------------------------------------

/// Latin-1 byte for a char, folding the ångström sign onto Å.
pub fn latin1(c: char) -> Option<u8> {
    let c = if c == '\u{212B}' { '\u{00C5}' } else { c };
    u8::try_from(u32::from(c)).ok()
}

fn escape_ps(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match latin1(c) {
            Some(b'(') => out.push_str("\\("),
            Some(b')') => out.push_str("\\)"),
            Some(b'\\') => out.push_str("\\\\"),
            Some(b) if (0x20..0x7f).contains(&b) => out.push(b as char),
            Some(b) => {
                let _ = write!(out, "\\{b:03o}");
            }
            None => out.push('?'),
        }
    }
    out
}

struct PsPage<'a> {
    out: String,
    height: f64,
    scene: &'a Scene,
}

fn to_pt(v: i32) -> f64 {
    f64::from(v) * PT_PER_PX
}

impl PsPage<'_> {

    fn color(&mut self, paint: &Paint) {
        let (r, g, b) = paint.flatten();
        let _ = writeln!(self.out, "{r:.3} {g:.3} {b:.3} setrgbcolor");
    }

    fn path(&mut self, points: &[(i32, i32)]) {
        for (i, &(x, y)) in points.iter().enumerate() {
            let op = if i == 0 { "moveto" } else { "lineto" };
            let _ = writeln!(self.out, "{:.2} {:.2} {op}", to_pt(x), self.height - to_pt(y));
        }
    }

    fn body(&mut self) {
        let scene = self.scene;
        for shape in &scene.shapes {
            match shape {
                Shape::Polyline {
                    points,
                    paint,
                    width,
                } => {
                    self.color(paint);
                    let _ = writeln!(self.out, "{:.2} setlinewidth", f64::from(*width) * PT_PER_PX);
                    self.path(points);
                    self.out.push_str("stroke\n");
                }
                Shape::Rect {
                    upper_left: (x0, y0),
                    bottom_right: (x1, y1),
                    paint,
                    fill,
                } => {
                    self.color(paint);
                    let op = if *fill { "rectfill" } else { "rectstroke" };
                    let _ = writeln!(
                        self.out,
                        "{:.2} {:.2} {:.2} {:.2} {op}",
                        to_pt(*x0),
                        self.height - to_pt(*y1),
                        f64::from(x1 - x0) * PT_PER_PX,
                        f64::from(y1 - y0) * PT_PER_PX
                    );
                }
                Shape::Polygon { points, paint } => {
                    self.color(paint);
                    self.path(points);
                    self.out.push_str("closepath fill\n");
                }
                Shape::Text {
                    text,
                    pos: (x, y),
                    size,
                    paint,
                    bold,
                    h_align,
                    v_align,
                    rotation,
                } => {
                    let size = size * PT_PER_PX;
                    let font = if *bold { "/Helvetica-Bold-Latin1" } else { "/Helvetica-Latin1" };
                    self.out.push_str("gsave\n");
                    self.color(paint);
                    let _ = writeln!(self.out, "{:.2} {:.2} translate", to_pt(*x), self.height - to_pt(*y));
                    if *rotation != Rotation::None {
                        // Clockwise on screen is counterclockwise in PostScript.
                        let _ = writeln!(self.out, "{} rotate", (360 - rotation.degrees()) % 360);
                    }
                    let _ = writeln!(self.out, "{font} {size:.2} selectfont");
                    let _ = writeln!(
                        self.out,
                        "({}) dup stringwidth pop {} mul {:.2} moveto show",
                        escape_ps(text),
                        align_factor(*h_align),
                        -baseline_offset(*v_align) * size
                    );
                    self.out.push_str("grestore\n");
                }
            }
        }
    }
}

const PS_PROLOG: &str = "\
/reencode {
  findfont dup length dict begin
  { 1 index /FID ne { def } { pop pop } ifelse } forall
  /Encoding ISOLatin1Encoding def
  currentdict end definefont pop
} bind def
/Helvetica-Latin1 /Helvetica reencode
/Helvetica-Bold-Latin1 /Helvetica-Bold reencode
1 setlinejoin
1 setlinecap
";

/// Serialize as a single-page PostScript document.
pub fn to_postscript(scene: &Scene) -> String {
    let (w, h) = scene.size;
    let (w_pt, h_pt) = (f64::from(w) * PT_PER_PX, f64::from(h) * PT_PER_PX);

    let mut out = String::new();
    out.push_str("%!PS-Adobe-3.0\n");
    let _ = writeln!(out, "%%Creator: rmsd-plot {}", env!("CARGO_PKG_VERSION"));
    let _ = writeln!(out, "%%BoundingBox: 0 0 {} {}", w_pt.round(), h_pt.round());
    out.push_str("%%Pages: 1\n%%EndComments\n%%BeginProlog\n");
    out.push_str(PS_PROLOG);
    out.push_str("%%EndProlog\n%%Page: 1 1\n");
    let _ = writeln!(out, "<< /PageSize [{w_pt:.2} {h_pt:.2}] >> setpagedevice");

    let mut page = PsPage {
        out,
        height: h_pt,
        scene,
    };
    page.body();

    let mut out = page.out;
    out.push_str("showpage\n%%EOF\n");
    out
}

// ---------------------------------------------------------------------------
// PGF
// ---------------------------------------------------------------------------

fn escape_tex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '\u{212B}' | '\u{00C5}' => out.push_str("\\AA{}"),
            _ => out.push(c),
        }
    }
    out
}

fn pgf_point(x: f64, y: f64) -> String {
    format!("\\pgfqpoint{{{x:.2}pt}}{{{y:.2}pt}}")
}

/// Serialize as a `pgfpicture` for inclusion in a LaTeX document.
///
/// Requires `\usepackage{pgf}` (which loads `xcolor`) in the preamble.
pub fn to_pgf(scene: &Scene) -> String {
    let (w, h) = scene.size;
    let h_pt = f64::from(h) * PT_PER_PX;
    let x = |x: i32| f64::from(x) * PT_PER_PX;
    let y = |y: i32| h_pt - f64::from(y) * PT_PER_PX;

    let mut out = String::new();
    let _ = writeln!(out, "%% Creator: rmsd-plot {}", env!("CARGO_PKG_VERSION"));
    out.push_str("%% Make sure the required packages are loaded in your preamble\n%%   \\usepackage{pgf}\n");
    out.push_str("\\begingroup%\n\\begin{pgfpicture}%\n");
    let _ = writeln!(
        out,
        "\\pgfpathrectangle{{\\pgfpointorigin}}{{{}}}%",
        pgf_point(f64::from(w) * PT_PER_PX, h_pt)
    );
    out.push_str("\\pgfusepath{use as bounding box, clip}%\n");
    out.push_str("\\pgfsetroundjoin%\n\\pgfsetroundcap%\n");

    let set_color = |out: &mut String, name: &str, paint: &Paint| {
        let (r, g, b) = paint.flatten();
        let _ = writeln!(out, "\\definecolor{{{name}}}{{rgb}}{{{r:.3},{g:.3},{b:.3}}}%");
    };

    for shape in &scene.shapes {
        match shape {
            Shape::Polyline {
                points,
                paint,
                width,
            } => {
                set_color(&mut out, "currentstroke", paint);
                out.push_str("\\pgfsetstrokecolor{currentstroke}%\n");
                let _ = writeln!(out, "\\pgfsetlinewidth{{{:.2}pt}}%", f64::from(*width) * PT_PER_PX);
                for (i, &(px, py)) in points.iter().enumerate() {
                    let op = if i == 0 { "moveto" } else { "lineto" };
                    let _ = writeln!(out, "\\pgfpath{op}{{{}}}%", pgf_point(x(px), y(py)));
                }
                out.push_str("\\pgfusepath{stroke}%\n");
            }
            Shape::Rect {
                upper_left: (x0, y0),
                bottom_right: (x1, y1),
                paint,
                fill,
            } => {
                let (name, usage) = if *fill {
                    ("currentfill", "fill")
                } else {
                    ("currentstroke", "stroke")
                };
                set_color(&mut out, name, paint);
                let _ = writeln!(out, "\\pgfset{usage}color{{{name}}}%");
                let _ = writeln!(
                    out,
                    "\\pgfpathrectangle{{{}}}{{{}}}%",
                    pgf_point(x(*x0), y(*y1)),
                    pgf_point(f64::from(x1 - x0) * PT_PER_PX, f64::from(y1 - y0) * PT_PER_PX)
                );
                let _ = writeln!(out, "\\pgfusepath{{{usage}}}%");
            }
            Shape::Polygon { points, paint } => {
                set_color(&mut out, "currentfill", paint);
                out.push_str("\\pgfsetfillcolor{currentfill}%\n");
                for (i, &(px, py)) in points.iter().enumerate() {
                    let op = if i == 0 { "moveto" } else { "lineto" };
                    let _ = writeln!(out, "\\pgfpath{op}{{{}}}%", pgf_point(x(px), y(py)));
                }
                out.push_str("\\pgfpathclose%\n\\pgfusepath{fill}%\n");
            }
            Shape::Text {
                text,
                pos: (px, py),
                size,
                paint,
                bold,
                h_align,
                v_align,
                rotation,
            } => {
                set_color(&mut out, "textcolor", paint);
                let mut opts = vec![format!("x={:.2}pt", x(*px)), format!("y={:.2}pt", y(*py))];
                match h_align {
                    HAlign::Left => opts.push("left".to_string()),
                    HAlign::Right => opts.push("right".to_string()),
                    HAlign::Center => {}
                }
                match v_align {
                    VAlign::Top => opts.push("top".to_string()),
                    VAlign::Bottom => opts.push("bottom".to_string()),
                    VAlign::Center => {}
                }
                if *rotation != Rotation::None {
                    opts.push(format!("rotate={}", (360 - rotation.degrees()) % 360));
                }
                let size = size * PT_PER_PX;
                let weight = if *bold { "\\bfseries" } else { "" };
                let _ = writeln!(
                    out,
                    "\\pgftext[{}]{{\\color{{textcolor}}\\sffamily{weight}\\fontsize{{{size:.2}}}{{{:.2}}}\\selectfont {}}}%",
                    opts.join(","),
                    size * 1.2,
                    escape_tex(text)
                );
            }
        }
    }

    out.push_str("\\end{pgfpicture}%\n\\endgroup%\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        let mut scene = Scene::new((200, 100));
        scene.shapes.push(Shape::Rect {
            upper_left: (0, 0),
            bottom_right: (200, 100),
            paint: Paint {
                rgb: (255, 255, 255),
                alpha: 1.0,
            },
            fill: true,
        });
        scene.shapes.push(Shape::Polyline {
            points: vec![(10, 90), (50, 40), (190, 10)],
            paint: Paint {
                rgb: (0, 0, 255),
                alpha: 1.0,
            },
            width: 2,
        });
        scene.shapes.push(Shape::Text {
            text: "RMSD (\u{212B}) & <more>".to_string(),
            pos: (20, 50),
            size: 12.0,
            paint: Paint {
                rgb: (0, 0, 0),
                alpha: 1.0,
            },
            bold: true,
            h_align: HAlign::Center,
            v_align: VAlign::Center,
            rotation: Rotation::Cw270,
        });
        scene
    }

    #[test]
    fn svg_document() {
        let svg = to_svg(&scene());
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"200\" height=\"100\""));
        assert!(svg.contains("points=\"10,90 50,40 190,10\""));
        assert!(svg.contains("stroke=\"#0000FF\""));
        assert!(svg.contains("RMSD (\u{212B}) &amp; &lt;more&gt;"));
        assert!(svg.contains("rotate(270, 20, 50)"));
        assert!(svg.contains("font-weight=\"bold\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn svgz_is_gzip_of_svg() {
        use std::io::Read;

        let bytes = to_svgz(&scene()).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
        let mut text = String::new();
        flate2::read::GzDecoder::new(&bytes[..])
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, to_svg(&scene()));
    }

    #[test]
    fn postscript_document() {
        let ps = to_postscript(&scene());
        assert!(ps.starts_with("%!PS-Adobe-3.0\n"));
        assert!(ps.contains("%%BoundingBox: 0 0 144 72"));
        // y is flipped: pixel row 90 of 100 is 7.2pt above the bottom.
        assert!(ps.contains("7.20 7.20 moveto"));
        assert!(ps.contains("(RMSD \\(\\305\\) & <more>)"));
        assert!(ps.contains("90 rotate"));
        assert!(ps.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn pgf_picture() {
        let pgf = to_pgf(&scene());
        assert!(pgf.contains("\\begin{pgfpicture}"));
        assert!(pgf.contains("\\pgfpathmoveto{\\pgfqpoint{7.20pt}{7.20pt}}"));
        assert!(pgf.contains("RMSD (\\AA{}) \\& <more>"));
        assert!(pgf.contains("rotate=90"));
        assert!(pgf.contains("\\bfseries"));
        assert!(pgf.contains("\\end{pgfpicture}"));
    }

    #[test]
    fn transparent_paint_is_flattened_on_white() {
        let paint = Paint {
            rgb: (0, 0, 0),
            alpha: 0.5,
        };
        assert_eq!(paint.flatten(), (0.5, 0.5, 0.5));
    }
}
