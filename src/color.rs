use palette::{Hsl, IntoColor, Srgb};

use crate::wheel::{segment_color, Item};

/// RGB color parsed from item hex strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const WHITE: RgbColor = RgbColor { r: 255, g: 255, b: 255 };
    pub const BLACK: RgbColor = RgbColor { r: 0, g: 0, b: 0 };

    /// Parse from hex string like "#FF0000" or "FF0000"
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    fn to_hsl(self) -> Hsl {
        let rgb = Srgb::new(self.r, self.g, self.b).into_format::<f32>();
        rgb.into_color()
    }

    /// Black or white, whichever reads better on top of this color
    pub fn readable_text(&self) -> Self {
        if self.to_hsl().lightness > 0.6 {
            Self::BLACK
        } else {
            Self::WHITE
        }
    }
}

/// Wedge color for an item, falling back to the palette when its color
/// string is not a hex triplet
pub fn item_color(item: &Item, index: usize) -> RgbColor {
    RgbColor::from_hex(&item.color)
        .or_else(|| RgbColor::from_hex(segment_color(index)))
        .unwrap_or(RgbColor::WHITE)
}

/// Interpolate between two colors
pub fn lerp_color(a: (u8, u8, u8), b: (u8, u8, u8), t: f32) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    (
        (a.0 as f32 + (b.0 as f32 - a.0 as f32) * t) as u8,
        (a.1 as f32 + (b.1 as f32 - a.1 as f32) * t) as u8,
        (a.2 as f32 + (b.2 as f32 - a.2 as f32) * t) as u8,
    )
}
