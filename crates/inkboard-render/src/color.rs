//! CSS color strings to `peniko::Color`.

use peniko::Color;

/// Parse the color notations elements carry: `#rgb`, `#rrggbb`, `#rrggbbaa`,
/// `rgb()`/`rgba()`, `transparent` and a handful of names.
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = s.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }
    let named = match lower.as_str() {
        "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::from_rgba8(255, 0, 0, 255),
        "green" => Color::from_rgba8(0, 128, 0, 255),
        "blue" => Color::from_rgba8(0, 0, 255, 255),
        "yellow" => Color::from_rgba8(255, 255, 0, 255),
        "gray" | "grey" => Color::from_rgba8(128, 128, 128, 255),
        _ => return None,
    };
    Some(named)
}

/// Parse a color, falling back when the string is not understood.
pub fn color_or(s: &str, fallback: Color) -> Color {
    parse_color(s).unwrap_or_else(|| {
        log::trace!("Unrecognized color {s:?}");
        fallback
    })
}

/// True when painting with this color has no visible effect.
pub fn is_invisible(color: Color) -> bool {
    color.to_rgba8().a == 0
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    let short = |i: usize| channel(i..i + 1).map(|v| v * 17);
    match hex.len() {
        3 => Some(Color::from_rgba8(short(0)?, short(1)?, short(2)?, 255)),
        6 => Some(Color::from_rgba8(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
        8 => Some(Color::from_rgba8(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        )),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let byte = |s: &str| s.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
    match parts.as_slice() {
        [r, g, b] => Some(Color::from_rgba8(byte(r)?, byte(g)?, byte(b)?, 255)),
        [r, g, b, a] => {
            let alpha = a.parse::<f64>().ok()?.clamp(0.0, 1.0);
            Some(Color::from_rgba8(
                byte(r)?,
                byte(g)?,
                byte(b)?,
                (alpha * 255.0).round() as u8,
            ))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(color: Color) -> [u8; 4] {
        let c = color.to_rgba8();
        [c.r, c.g, c.b, c.a]
    }

    #[test]
    fn test_hex_forms() {
        assert_eq!(rgba(parse_color("#4CAF50").unwrap()), [0x4c, 0xaf, 0x50, 255]);
        assert_eq!(rgba(parse_color("#444").unwrap()), [0x44, 0x44, 0x44, 255]);
        assert_eq!(rgba(parse_color("#00000080").unwrap()), [0, 0, 0, 0x80]);
        assert!(parse_color("#12345").is_none());
        assert!(parse_color("#gg0000").is_none());
    }

    #[test]
    fn test_functional_and_named() {
        assert_eq!(rgba(parse_color("rgb(255, 0, 10)").unwrap()), [255, 0, 10, 255]);
        assert_eq!(rgba(parse_color("rgba(0,0,0,0.5)").unwrap())[3], 128);
        assert!(is_invisible(parse_color("transparent").unwrap()));
        assert_eq!(rgba(parse_color("White").unwrap()), [255, 255, 255, 255]);
        assert!(parse_color("chartreuse-ish").is_none());
    }

    #[test]
    fn test_fallback() {
        assert_eq!(rgba(color_or("nope", Color::BLACK)), [0, 0, 0, 255]);
    }
}
