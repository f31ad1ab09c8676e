use std::fmt;

use serde::{Deserialize, Serialize};

/// Serialized as `#RRGGBB`, or `#RRGGBBAA` when not opaque.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 0 to 1
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 1.0 }
    }

    pub fn alpha(self, a: f32) -> Color {
        Color {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn hex(raw: &str) -> Result<Color, String> {
        let digits = raw
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| format!("color {} doesn't start with #", raw))?;
        let byte = |idx: usize| -> Result<u8, String> {
            digits
                .get(idx..idx + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("bad color {}", raw))
        };
        match digits.len() {
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?).alpha(f32::from(byte(6)?) / 255.0)),
            _ => Err(format!("bad color {}", raw)),
        }
    }

    /// Always `#RRGGBB`; see `opacity` for the alpha.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn opacity(self) -> f32 {
        self.a
    }

    pub fn is_opaque(self) -> bool {
        self.a >= 1.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "{}", self.to_hex())
        } else {
            write!(f, "{}{:02X}", self.to_hex(), (self.a * 255.0).round() as u8)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Color::hex(&raw)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}
