//! CSS-style color strings: parsing, theme-aware ink remapping and fill derivation.
//!
//! Elements store their colors as the strings the user picked (`#rrggbb`,
//! `#rgb`, `rgb()`/`rgba()`), so everything here works on strings and only
//! converts to [`peniko::Color`] at the rendering edge.

use peniko::Color;

/// Ink used on light backgrounds.
pub const DARK_CANVAS_INK: &str = "#111827";
/// Ink used on dark backgrounds.
pub const LIGHT_CANVAS_INK: &str = "#ffffff";
/// Alpha applied when deriving a fill from a stroke color.
pub const FILL_ALPHA: f64 = 0.2;

/// Canvas background for the active theme.
pub fn canvas_background(is_dark: bool) -> &'static str {
    if is_dark { "#171717" } else { "#ffffff" }
}

/// A parsed color string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Present only for the `rgba()`/4-component form.
    pub alpha: Option<f64>,
}

impl CanvasColor {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: None }
    }

    /// Parse `#rgb`, `#rrggbb`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }
        parse_rgb_function(&value)
    }

    /// Whether this is one of the dark ink colors (`#111827` or black).
    pub fn is_dark_ink(&self) -> bool {
        matches!((self.r, self.g, self.b), (17, 24, 39) | (0, 0, 0))
    }

    pub fn is_light_ink(&self) -> bool {
        (self.r, self.g, self.b) == (255, 255, 255)
    }
}

impl From<CanvasColor> for Color {
    fn from(color: CanvasColor) -> Self {
        let alpha = color.alpha.unwrap_or(1.0).clamp(0.0, 1.0);
        Color::from_rgba8(color.r, color.g, color.b, (alpha * 255.0).round() as u8)
    }
}

fn parse_hex(hex: &str) -> Option<CanvasColor> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some(CanvasColor::rgb(channel(0)?, channel(2)?, channel(4)?))
}

fn parse_rgb_function(value: &str) -> Option<CanvasColor> {
    let body = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |part: &str| -> Option<u8> {
        if part.is_empty() || part.len() > 3 || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        part.parse::<u16>().ok().and_then(|v| u8::try_from(v).ok())
    };
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;

    let alpha = match parts.get(3) {
        Some(raw) => {
            let a: f64 = raw.parse().ok()?;
            if !(0.0..=1.0).contains(&a) {
                return None;
            }
            Some(a)
        }
        None => None,
    };
    Some(CanvasColor { r, g, b, alpha })
}

/// Swap the canonical ink colors so strokes stay visible on the current background.
///
/// In dark mode `#111827`/black become white; in light mode white becomes
/// `#111827`. `rgba()` inputs keep their alpha. Any other color, including
/// strings that do not parse, is returned unchanged.
pub fn theme_aware_color(color: &str, is_dark: bool) -> String {
    let Some(parsed) = CanvasColor::parse(color) else {
        return color.to_string();
    };

    if is_dark && parsed.is_dark_ink() {
        return match parsed.alpha {
            Some(a) => format!("rgba(255, 255, 255, {a})"),
            None => LIGHT_CANVAS_INK.to_string(),
        };
    }
    if !is_dark && parsed.is_light_ink() {
        return match parsed.alpha {
            Some(a) => format!("rgba(17, 24, 39, {a})"),
            None => DARK_CANVAS_INK.to_string(),
        };
    }
    color.to_string()
}

/// Derive a translucent fill from a hex stroke color.
///
/// Non-hex input is returned unchanged.
pub fn to_fill_color(hex_color: &str, alpha: f64) -> String {
    let trimmed = hex_color.trim();
    let Some(hex) = trimmed.strip_prefix('#') else {
        return hex_color.to_string();
    };
    match parse_hex(&hex.to_ascii_lowercase()) {
        Some(c) => format!("rgba({}, {}, {}, {alpha})", c.r, c.g, c.b),
        None => hex_color.to_string(),
    }
}

/// Resolve a stored color string to a renderable color.
///
/// Unparseable strings resolve to `fallback`.
pub fn resolve_color(color: &str, fallback: Color) -> Color {
    CanvasColor::parse(color).map(Color::from).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(CanvasColor::parse("#fff"), Some(CanvasColor::rgb(255, 255, 255)));
        assert_eq!(CanvasColor::parse(" #3B82F6 "), Some(CanvasColor::rgb(59, 130, 246)));
        assert_eq!(CanvasColor::parse("#12345"), None);
        assert_eq!(CanvasColor::parse("#ggg"), None);
    }

    #[test]
    fn test_parse_rgb_forms() {
        let c = CanvasColor::parse("rgba(17, 24, 39, 0.5)").unwrap();
        assert_eq!((c.r, c.g, c.b), (17, 24, 39));
        assert_eq!(c.alpha, Some(0.5));
        assert_eq!(CanvasColor::parse("rgb(0,0,0)"), Some(CanvasColor::rgb(0, 0, 0)));
        assert_eq!(CanvasColor::parse("rgb(256, 0, 0)"), None);
        assert_eq!(CanvasColor::parse("rgba(0, 0, 0, 1.5)"), None);
        assert_eq!(CanvasColor::parse("hsl(0, 0%, 0%)"), None);
    }

    #[test]
    fn test_dark_theme_remaps_dark_ink() {
        assert_eq!(theme_aware_color("#111827", true), "#ffffff");
        assert_eq!(theme_aware_color("#000", true), "#ffffff");
        assert_eq!(theme_aware_color("rgba(0, 0, 0, 0.4)", true), "rgba(255, 255, 255, 0.4)");
        // White stays white on a dark background.
        assert_eq!(theme_aware_color("#ffffff", true), "#ffffff");
    }

    #[test]
    fn test_light_theme_remaps_white() {
        assert_eq!(theme_aware_color("#FFF", false), "#111827");
        assert_eq!(theme_aware_color("rgb(255, 255, 255)", false), "#111827");
        assert_eq!(theme_aware_color("rgba(255,255,255,0.2)", false), "rgba(17, 24, 39, 0.2)");
        assert_eq!(theme_aware_color("#111827", false), "#111827");
    }

    #[test]
    fn test_other_colors_pass_through() {
        assert_eq!(theme_aware_color("#ef4444", true), "#ef4444");
        assert_eq!(theme_aware_color("tomato", false), "tomato");
    }

    #[test]
    fn test_fill_color() {
        assert_eq!(to_fill_color("#3b82f6", FILL_ALPHA), "rgba(59, 130, 246, 0.2)");
        assert_eq!(to_fill_color("#f00", 0.5), "rgba(255, 0, 0, 0.5)");
        assert_eq!(to_fill_color("rgb(1, 2, 3)", FILL_ALPHA), "rgb(1, 2, 3)");
        assert_eq!(to_fill_color("#zzzzzz", FILL_ALPHA), "#zzzzzz");
    }

    #[test]
    fn test_resolve_color() {
        let fallback = Color::from_rgba8(1, 2, 3, 255);
        assert_eq!(resolve_color("#ff0000", fallback).to_rgba8().r, 255);
        assert_eq!(resolve_color("rgba(0, 0, 255, 0.2)", fallback).to_rgba8().a, 51);
        assert_eq!(resolve_color("bogus", fallback).to_rgba8().b, 3);
    }

    #[test]
    fn test_background() {
        assert_eq!(canvas_background(true), "#171717");
        assert_eq!(canvas_background(false), "#ffffff");
    }
}
