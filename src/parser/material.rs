//! Material and color resolution
//!
//! Handles `DiffuseMaterial` / `SpecularMaterial` brushes and XAML color
//! strings. Image brushes are only reported here; dispatching them to the
//! texture loader is the walker's job.

use crate::model::Color;
use crate::xml::Element;

/// Surface brush of a material
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Brush {
    /// Solid color
    Solid(Color),
    /// Image source, relative to the document base URL
    Image(String),
}

/// Resolve the brush of a `DiffuseMaterial` or `SpecularMaterial`
///
/// A `Brush` attribute wins, then a nested `SolidColorBrush`'s `Color`, then
/// a nested `ImageBrush`'s `ImageSource`. A color string that cannot be
/// interpreted leaves the brush unset without falling through to images.
pub(crate) fn parse_brush(material: &Element) -> Option<Brush> {
    let color_value = material.attribute("Brush").or_else(|| {
        material
            .find_child("SolidColorBrush", true)
            .and_then(|brush| brush.attribute("Color"))
    });

    if let Some(value) = color_value {
        let color = parse_color(value);
        if color.is_none() {
            log::warn!("Unrecognized color '{}' on <{}>", value, material.name);
        }
        return color.map(Brush::Solid);
    }

    material
        .find_child("ImageBrush", true)
        .and_then(|brush| brush.attribute("ImageSource"))
        .map(|source| Brush::Image(source.to_string()))
}

/// Parse a XAML color string
///
/// Hex forms (`#AARRGGBB`, `#RRGGBB`, `#ARGB`, `#RGB`) drop any alpha
/// channel. Otherwise the value is looked up as a named color,
/// case-insensitively.
///
/// Only a common subset of the WPF named colors is known (the basic HTML
/// colors plus a few others such as `Orange` and `Gold`). Any other name,
/// e.g. `CornflowerBlue`, yields `None`.
///
/// ```
/// use xaml3d::{Color, parser::parse_color};
///
/// assert_eq!(parse_color("#80FF0000"), Some(Color(0xFF0000)));
/// assert_eq!(parse_color("Navy"), Some(Color(0x000080)));
/// assert_eq!(parse_color("CornflowerBlue"), None);
/// ```
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    match value.strip_prefix('#') {
        Some(hex) => parse_hex_color(hex),
        None => named_color(value),
    }
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let rgb = match hex.len() {
        8 => &hex[2..],
        6 => hex,
        4 => &hex[1..],
        3 => hex,
        _ => return None,
    };
    let packed = u32::from_str_radix(rgb, 16).ok()?;
    if rgb.len() == 3 {
        let expand = |nibble: u32| (nibble << 4) | nibble;
        let r = expand((packed >> 8) & 0xF);
        let g = expand((packed >> 4) & 0xF);
        let b = expand(packed & 0xF);
        return Some(Color((r << 16) | (g << 8) | b));
    }
    Some(Color(packed))
}

/// Subset of the named colors accepted by XAML color converters
const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xFFFFFF),
    ("red", 0xFF0000),
    ("lime", 0x00FF00),
    ("green", 0x008000),
    ("blue", 0x0000FF),
    ("yellow", 0xFFFF00),
    ("cyan", 0x00FFFF),
    ("aqua", 0x00FFFF),
    ("magenta", 0xFF00FF),
    ("fuchsia", 0xFF00FF),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("silver", 0xC0C0C0),
    ("darkgray", 0xA9A9A9),
    ("lightgray", 0xD3D3D3),
    ("maroon", 0x800000),
    ("olive", 0x808000),
    ("navy", 0x000080),
    ("purple", 0x800080),
    ("teal", 0x008080),
    ("orange", 0xFFA500),
    ("brown", 0xA52A2A),
    ("gold", 0xFFD700),
    ("pink", 0xFFC0CB),
];

fn named_color(name: &str) -> Option<Color> {
    NAMED_COLORS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|&(_, rgb)| Color(rgb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Document;

    fn material(xml: &str) -> Element {
        Document::parse(xml).unwrap().root().clone()
    }

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(parse_color("#FF0000"), Some(Color(0xFF0000)));
        assert_eq!(parse_color("#80FF0000"), Some(Color(0xFF0000)));
        assert_eq!(parse_color("#ffa07a"), Some(Color(0xFFA07A)));
        assert_eq!(parse_color("#F00"), Some(Color(0xFF0000)));
        assert_eq!(parse_color("#8F00"), Some(Color(0xFF0000)));
    }

    #[test]
    fn test_parse_invalid_colors() {
        assert_eq!(parse_color("#GG0000"), None);
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#"), None);
        assert_eq!(parse_color("NotAColor"), None);
    }

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(parse_color("White"), Some(Color::WHITE));
        assert_eq!(parse_color("green"), Some(Color(0x008000)));
        assert_eq!(parse_color(" Navy "), Some(Color(0x000080)));
    }

    #[test]
    fn test_brush_attribute_wins() {
        let m = material(
            r##"<DiffuseMaterial Brush="#00FF00"><DiffuseMaterial.Brush><SolidColorBrush Color="#FF0000"/></DiffuseMaterial.Brush></DiffuseMaterial>"##,
        );
        assert_eq!(parse_brush(&m), Some(Brush::Solid(Color(0x00FF00))));
    }

    #[test]
    fn test_nested_solid_color_brush() {
        let m = material(
            r##"<DiffuseMaterial><DiffuseMaterial.Brush><SolidColorBrush Color="#FF0000FF"/></DiffuseMaterial.Brush></DiffuseMaterial>"##,
        );
        assert_eq!(parse_brush(&m), Some(Brush::Solid(Color(0x0000FF))));
    }

    #[test]
    fn test_image_brush() {
        let m = material(
            r#"<DiffuseMaterial><DiffuseMaterial.Brush><ImageBrush ImageSource="textures/wood.png"/></DiffuseMaterial.Brush></DiffuseMaterial>"#,
        );
        assert_eq!(
            parse_brush(&m),
            Some(Brush::Image("textures/wood.png".to_string()))
        );
    }

    #[test]
    fn test_unparseable_color_does_not_fall_through_to_image() {
        let m = material(
            r#"<DiffuseMaterial Brush="{StaticResource woodBrush}"><ImageBrush ImageSource="wood.png"/></DiffuseMaterial>"#,
        );
        assert_eq!(parse_brush(&m), None);
    }

    #[test]
    fn test_unknown_named_color_leaves_brush_unset() {
        let m = material(r#"<DiffuseMaterial Brush="CornflowerBlue"/>"#);
        assert_eq!(parse_brush(&m), None);
        let m = material(r#"<DiffuseMaterial Brush="Gold"/>"#);
        assert_eq!(parse_brush(&m), Some(Brush::Solid(Color(0xFFD700))));
    }

    #[test]
    fn test_no_brush() {
        assert_eq!(parse_brush(&material("<SpecularMaterial/>")), None);
    }
}
