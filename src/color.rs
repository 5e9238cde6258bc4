use palette::{Hsv, IntoColor, Srgb};

use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Named colors known to the renderer
// ---------------------------------------------------------------------------

/// Single-letter shorthands.
const BASE_COLORS: &[(&str, u32)] = &[
    ("b", 0x0000ff),
    ("g", 0x008000),
    ("r", 0xff0000),
    ("c", 0x00bfbf),
    ("m", 0xbf00bf),
    ("y", 0xbfbf00),
    ("k", 0x000000),
    ("w", 0xffffff),
];

/// CSS level 4 named colors.
const CSS4_COLORS: &[(&str, u32)] = &[
    ("aliceblue", 0xf0f8ff),
    ("antiquewhite", 0xfaebd7),
    ("aqua", 0x00ffff),
    ("aquamarine", 0x7fffd4),
    ("azure", 0xf0ffff),
    ("beige", 0xf5f5dc),
    ("bisque", 0xffe4c4),
    ("black", 0x000000),
    ("blanchedalmond", 0xffebcd),
    ("blue", 0x0000ff),
    ("blueviolet", 0x8a2be2),
    ("brown", 0xa52a2a),
    ("burlywood", 0xdeb887),
    ("cadetblue", 0x5f9ea0),
    ("chartreuse", 0x7fff00),
    ("chocolate", 0xd2691e),
    ("coral", 0xff7f50),
    ("cornflowerblue", 0x6495ed),
    ("cornsilk", 0xfff8dc),
    ("crimson", 0xdc143c),
    ("cyan", 0x00ffff),
    ("darkblue", 0x00008b),
    ("darkcyan", 0x008b8b),
    ("darkgoldenrod", 0xb8860b),
    ("darkgray", 0xa9a9a9),
    ("darkgreen", 0x006400),
    ("darkgrey", 0xa9a9a9),
    ("darkkhaki", 0xbdb76b),
    ("darkmagenta", 0x8b008b),
    ("darkolivegreen", 0x556b2f),
    ("darkorange", 0xff8c00),
    ("darkorchid", 0x9932cc),
    ("darkred", 0x8b0000),
    ("darksalmon", 0xe9967a),
    ("darkseagreen", 0x8fbc8f),
    ("darkslateblue", 0x483d8b),
    ("darkslategray", 0x2f4f4f),
    ("darkslategrey", 0x2f4f4f),
    ("darkturquoise", 0x00ced1),
    ("darkviolet", 0x9400d3),
    ("deeppink", 0xff1493),
    ("deepskyblue", 0x00bfff),
    ("dimgray", 0x696969),
    ("dimgrey", 0x696969),
    ("dodgerblue", 0x1e90ff),
    ("firebrick", 0xb22222),
    ("floralwhite", 0xfffaf0),
    ("forestgreen", 0x228b22),
    ("fuchsia", 0xff00ff),
    ("gainsboro", 0xdcdcdc),
    ("ghostwhite", 0xf8f8ff),
    ("gold", 0xffd700),
    ("goldenrod", 0xdaa520),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("greenyellow", 0xadff2f),
    ("grey", 0x808080),
    ("honeydew", 0xf0fff0),
    ("hotpink", 0xff69b4),
    ("indianred", 0xcd5c5c),
    ("indigo", 0x4b0082),
    ("ivory", 0xfffff0),
    ("khaki", 0xf0e68c),
    ("lavender", 0xe6e6fa),
    ("lavenderblush", 0xfff0f5),
    ("lawngreen", 0x7cfc00),
    ("lemonchiffon", 0xfffacd),
    ("lightblue", 0xadd8e6),
    ("lightcoral", 0xf08080),
    ("lightcyan", 0xe0ffff),
    ("lightgoldenrodyellow", 0xfafad2),
    ("lightgray", 0xd3d3d3),
    ("lightgreen", 0x90ee90),
    ("lightgrey", 0xd3d3d3),
    ("lightpink", 0xffb6c1),
    ("lightsalmon", 0xffa07a),
    ("lightseagreen", 0x20b2aa),
    ("lightskyblue", 0x87cefa),
    ("lightslategray", 0x778899),
    ("lightslategrey", 0x778899),
    ("lightsteelblue", 0xb0c4de),
    ("lightyellow", 0xffffe0),
    ("lime", 0x00ff00),
    ("limegreen", 0x32cd32),
    ("linen", 0xfaf0e6),
    ("magenta", 0xff00ff),
    ("maroon", 0x800000),
    ("mediumaquamarine", 0x66cdaa),
    ("mediumblue", 0x0000cd),
    ("mediumorchid", 0xba55d3),
    ("mediumpurple", 0x9370db),
    ("mediumseagreen", 0x3cb371),
    ("mediumslateblue", 0x7b68ee),
    ("mediumspringgreen", 0x00fa9a),
    ("mediumturquoise", 0x48d1cc),
    ("mediumvioletred", 0xc71585),
    ("midnightblue", 0x191970),
    ("mintcream", 0xf5fffa),
    ("mistyrose", 0xffe4e1),
    ("moccasin", 0xffe4b5),
    ("navajowhite", 0xffdead),
    ("navy", 0x000080),
    ("oldlace", 0xfdf5e6),
    ("olive", 0x808000),
    ("olivedrab", 0x6b8e23),
    ("orange", 0xffa500),
    ("orangered", 0xff4500),
    ("orchid", 0xda70d6),
    ("palegoldenrod", 0xeee8aa),
    ("palegreen", 0x98fb98),
    ("paleturquoise", 0xafeeee),
    ("palevioletred", 0xdb7093),
    ("papayawhip", 0xffefd5),
    ("peachpuff", 0xffdab9),
    ("peru", 0xcd853f),
    ("pink", 0xffc0cb),
    ("plum", 0xdda0dd),
    ("powderblue", 0xb0e0e6),
    ("purple", 0x800080),
    ("rebeccapurple", 0x663399),
    ("red", 0xff0000),
    ("rosybrown", 0xbc8f8f),
    ("royalblue", 0x4169e1),
    ("saddlebrown", 0x8b4513),
    ("salmon", 0xfa8072),
    ("sandybrown", 0xf4a460),
    ("seagreen", 0x2e8b57),
    ("seashell", 0xfff5ee),
    ("sienna", 0xa0522d),
    ("silver", 0xc0c0c0),
    ("skyblue", 0x87ceeb),
    ("slateblue", 0x6a5acd),
    ("slategray", 0x708090),
    ("slategrey", 0x708090),
    ("snow", 0xfffafa),
    ("springgreen", 0x00ff7f),
    ("steelblue", 0x4682b4),
    ("tan", 0xd2b48c),
    ("teal", 0x008080),
    ("thistle", 0xd8bfd8),
    ("tomato", 0xff6347),
    ("turquoise", 0x40e0d0),
    ("violet", 0xee82ee),
    ("wheat", 0xf5deb3),
    ("white", 0xffffff),
    ("whitesmoke", 0xf5f5f5),
    ("yellow", 0xffff00),
    ("yellowgreen", 0x9acd32),
];

/// Tableau 10, addressed as `tab:<name>`. Not part of the listed names.
const TABLEAU_COLORS: &[(&str, u32)] = &[
    ("tab:blue", 0x1f77b4),
    ("tab:orange", 0xff7f0e),
    ("tab:green", 0x2ca02c),
    ("tab:red", 0xd62728),
    ("tab:purple", 0x9467bd),
    ("tab:brown", 0x8c564b),
    ("tab:pink", 0xe377c2),
    ("tab:gray", 0x7f7f7f),
    ("tab:olive", 0xbcbd22),
    ("tab:cyan", 0x17becf),
];

/// Color cycle addressed as `C0`..`C9`: the seaborn "deep" palette the
/// chart theme uses.
const CYCLE_COLORS: [u32; 10] = [
    0x4c72b0, 0xdd8452, 0x55a868, 0xc44e52, 0x8172b3, 0x937860, 0xda8bc3, 0x8c8c8c, 0xccb974,
    0x64b5cd,
];

fn named_colors() -> impl Iterator<Item = &'static (&'static str, u32)> {
    BASE_COLORS.iter().chain(CSS4_COLORS.iter())
}

fn unpack(hex: u32) -> Srgb<u8> {
    Srgb::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Resolve a color specification.
///
/// Accepted forms:
/// - a name from [`available_colors`], case-insensitive (single letters
///   are case-sensitive), or a Tableau name such as `tab:blue`
/// - `#rgb`, `#rrggbb` or `#rrggbbaa`; alpha is ignored
/// - `C0`..`C9` (indices wrap around the cycle)
/// - a gray level between `"0"` (black) and `"1"` (white), e.g. `"0.5"`
pub fn parse_color(spec: &str) -> Result<Srgb<u8>, RenderError> {
    let wanted = spec.trim();
    let found = match wanted.strip_prefix('#') {
        Some(hex) => parse_hex(hex),
        None => parse_cycle(wanted)
            .or_else(|| parse_gray(wanted))
            .or_else(|| parse_name(wanted)),
    };

    found.ok_or_else(|| RenderError::InvalidColor {
        name: spec.to_string(),
        available: available_colors(),
    })
}

fn parse_name(name: &str) -> Option<Srgb<u8>> {
    // Single letters are case-sensitive shorthands.
    if name.len() == 1 {
        return BASE_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, hex)| unpack(hex));
    }
    let key = name.to_ascii_lowercase();
    let key = match key.strip_prefix("tab:") {
        Some(rest) => format!("tab:{}", rest.replace("grey", "gray")),
        None => key,
    };
    named_colors()
        .chain(TABLEAU_COLORS.iter())
        .find(|(n, _)| *n == key)
        .map(|&(_, hex)| unpack(hex))
}

fn parse_cycle(spec: &str) -> Option<Srgb<u8>> {
    let digits = spec.strip_prefix('C')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let index: usize = digits.parse().ok()?;
    Some(unpack(CYCLE_COLORS[index % CYCLE_COLORS.len()]))
}

fn parse_gray(spec: &str) -> Option<Srgb<u8>> {
    let level: f64 = spec.parse().ok()?;
    if !(0.0..=1.0).contains(&level) {
        return None;
    }
    let v = (level * 255.0).round() as u8;
    Some(Srgb::new(v, v, v))
}

fn parse_hex(hex: &str) -> Option<Srgb<u8>> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let v = u32::from_str_radix(hex, 16).ok()?;
            // Expand #abc to #aabbcc.
            let (r, g, b) = ((v >> 8) & 0xf, (v >> 4) & 0xf, v & 0xf);
            Some(Srgb::new((r * 17) as u8, (g * 17) as u8, (b * 17) as u8))
        }
        6 => u32::from_str_radix(hex, 16).ok().map(unpack),
        8 => u32::from_str_radix(&hex[..6], 16).ok().map(unpack),
        _ => None,
    }
}

/// All known color names, sorted by hue, saturation, value and name.
pub fn available_colors() -> Vec<&'static str> {
    let mut by_hsv: Vec<((f32, f32, f32), &'static str)> = named_colors()
        .map(|&(name, hex)| {
            let hsv: Hsv = unpack(hex).into_format::<f32>().into_color();
            let hue = if hsv.saturation > 0.0 {
                hsv.hue.into_positive_degrees() / 360.0
            } else {
                0.0
            };
            ((hue, hsv.saturation, hsv.value), name)
        })
        .collect();

    by_hsv.sort_by(|(a, an), (b, bn)| {
        a.0.total_cmp(&b.0)
            .then(a.1.total_cmp(&b.1))
            .then(a.2.total_cmp(&b.2))
            .then_with(|| an.cmp(bn))
    });
    by_hsv.into_iter().map(|(_, name)| name).collect()
}
