use geom::LonLat;

use crate::{Color, FontWeight, TextStyle};

const BASE_TITLE_PT: f64 = 60.0;
const BASE_SUBTITLE_PT: f64 = 30.0;
const BASE_COORDS_PT: f64 = 22.0;
const BASE_BOTTOM: f64 = 0.03;
const LINE_SPACING: f64 = 1.8;
const TITLE_GAP: f64 = 0.3;

/// One line of centered text. Positions are fractions of the canvas, with y measured up from the
/// bottom edge to the baseline.
#[derive(Clone, Debug, PartialEq)]
pub struct TextOverlay {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size_pt: f64,
    pub weight: FontWeight,
    pub color: Color,
    pub font_family: String,
}

/// Drawn on top of everything else.
#[derive(Clone, Debug, PartialEq)]
pub enum Overlay {
    Text(TextOverlay),
    /// A horizontal line, in the same fractional coordinates as text
    Divider {
        x1: f64,
        x2: f64,
        y: f64,
        width_pt: f64,
        color: Color,
    },
}

/// What gets written at the bottom of a poster.
#[derive(Clone, Debug, PartialEq)]
pub struct PosterText {
    pub city: String,
    pub country: String,
    pub center: LonLat,
    /// Overrides for the base font sizes, before scaling to the poster
    pub title_pt: Option<f64>,
    pub subtitle_pt: Option<f64>,
    pub coords_pt: Option<f64>,
    /// Replaces the theme's font family
    pub font_family: Option<String>,
}

impl PosterText {
    pub fn new(city: &str, country: &str, center: LonLat) -> PosterText {
        PosterText {
            city: city.to_string(),
            country: country.to_string(),
            center,
            title_pt: None,
            subtitle_pt: None,
            coords_pt: None,
            font_family: None,
        }
    }

    /// Lays out the title, country, divider and coordinates for a poster of this size. Sizes
    /// scale with the shorter side; a 12 inch side is the reference.
    pub fn overlays(&self, style: &TextStyle, width_in: f64, height_in: f64) -> Vec<Overlay> {
        let scale = width_in.min(height_in) / 12.0;
        let base_title = self.title_pt.unwrap_or(BASE_TITLE_PT) * scale;
        let subtitle_pt = self.subtitle_pt.unwrap_or(BASE_SUBTITLE_PT) * scale;
        let coords_pt = self.coords_pt.unwrap_or(BASE_COORDS_PT) * scale;

        // Long names shrink, down to a floor
        let num_chars = self.city.chars().count();
        let title_pt = if num_chars > 10 {
            (base_title * 10.0 / (num_chars as f64)).max(10.0 * scale)
        } else {
            base_title
        };
        let title = if is_latin_script(&self.city) {
            letter_spaced(&self.city)
        } else {
            self.city.clone()
        };

        let height_pt = height_in * 72.0;
        let title_line = title_pt * LINE_SPACING / height_pt;
        let subtitle_line = subtitle_pt * LINE_SPACING / height_pt;
        let coords_line = coords_pt * LINE_SPACING / height_pt;
        let divider_gap = 8.0 * scale / height_pt;

        let coords_y = BASE_BOTTOM + coords_line * 0.5;
        let divider_y = coords_y + coords_line * 0.5 + divider_gap;
        let subtitle_y = divider_y + divider_gap + subtitle_line * 0.5;
        let title_y = subtitle_y + subtitle_line * TITLE_GAP + title_line * TITLE_GAP;

        let font_family = self
            .font_family
            .clone()
            .unwrap_or_else(|| style.font_family.clone());
        let line = |text: String, y: f64, size_pt: f64, weight: FontWeight, color: Color| {
            Overlay::Text(TextOverlay {
                text,
                x: 0.5,
                y,
                size_pt,
                weight,
                color,
                font_family: font_family.clone(),
            })
        };
        vec![
            line(title, title_y, title_pt, style.weight, style.color),
            line(
                self.country.to_uppercase(),
                subtitle_y,
                subtitle_pt,
                FontWeight::Normal,
                style.color,
            ),
            line(
                format_coordinates(self.center),
                coords_y,
                coords_pt,
                FontWeight::Normal,
                style.color.alpha(0.7),
            ),
            Overlay::Divider {
                x1: 0.4,
                x2: 0.6,
                y: divider_y,
                width_pt: scale,
                color: style.color,
            },
        ]
    }
}

/// More than 80% of the letters come before the IPA extensions block. Text without letters
/// counts as Latin.
pub fn is_latin_script(text: &str) -> bool {
    let mut letters = 0;
    let mut latin = 0;
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        letters += 1;
        if (c as u32) < 0x250 {
            latin += 1;
        }
    }
    letters == 0 || (latin as f64) / (letters as f64) > 0.8
}

/// "Paris" becomes "P  A  R  I  S"
fn letter_spaced(text: &str) -> String {
    let upper: Vec<String> = text.to_uppercase().chars().map(|c| c.to_string()).collect();
    upper.join("  ")
}

/// Like `48.8566° N / 2.3522° E`
pub fn format_coordinates(pt: LonLat) -> String {
    let (lon, lat) = (pt.x(), pt.y());
    format!(
        "{:.4}° {} / {:.4}° {}",
        lat.abs(),
        if lat >= 0.0 { "N" } else { "S" },
        lon.abs(),
        if lon >= 0.0 { "E" } else { "W" }
    )
}
