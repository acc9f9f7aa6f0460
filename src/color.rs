use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One LED's color.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor::new(0, 0, 0);
    pub const RED: RgbColor = RgbColor::new(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

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

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for RgbColor {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Always the configured line color
    #[default]
    Solid,
    /// Hue follows the displayed angle around the full circle
    Rainbow,
    /// Green when level, shading to red at 90° of tilt
    Tilt,
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "solid" => Ok(Self::Solid),
            "rainbow" => Ok(Self::Rainbow),
            "tilt" => Ok(Self::Tilt),
            _ => Err(format!("Unknown color scheme: {}", s)),
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ColorScheme {
    /// Color of the line for a displayed angle (degrees).
    pub fn line_color(&self, angle: f64, base: RgbColor) -> RgbColor {
        let hue = match self {
            ColorScheme::Solid => return base,
            ColorScheme::Rainbow => angle.rem_euclid(360.0) as f32,
            ColorScheme::Tilt => {
                // distance from the nearest level position, 0..=90
                let tilt = angle.rem_euclid(180.0);
                let tilt = tilt.min(180.0 - tilt) as f32;
                120.0 - (tilt / 90.0) * 120.0
            }
        };

        let hsl = Hsl::new(hue, 1.0, 0.5);
        let rgb: Srgb = hsl.into_color();

        RgbColor::new(
            (rgb.red * 255.0).round() as u8,
            (rgb.green * 255.0).round() as u8,
            (rgb.blue * 255.0).round() as u8,
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorScheme::Solid => "solid",
            ColorScheme::Rainbow => "rainbow",
            ColorScheme::Tilt => "tilt",
        }
    }

    pub fn all() -> &'static [ColorScheme] {
        &[ColorScheme::Solid, ColorScheme::Rainbow, ColorScheme::Tilt]
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let current = all.iter().position(|c| c == self).unwrap_or(0);
        all[(current + 1) % all.len()]
    }
}

/// Interpolate between two colors
pub fn lerp_color(a: RgbColor, b: RgbColor, t: f32) -> RgbColor {
    let t = t.clamp(0.0, 1.0);
    let mix = |from: u8, to: u8| (from as f32 + (to as f32 - from as f32) * t).round() as u8;
    RgbColor::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
}
