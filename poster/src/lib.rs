//! Styles classified roads with a theme and draws them as a poster.

#[macro_use]
extern crate log;

mod canvas;
mod color;
mod error;
pub mod render;
mod style;
mod text;
mod theme;

pub use crate::canvas::{CanvasSpec, Viewport, MAX_INCHES};
pub use crate::color::Color;
pub use crate::error::{RenderError, ThemeError};
pub use crate::render::{render, to_svg, OutputFormat, Poster, RenderedImage};
pub use crate::style::{style, style_areas, AreaLayer, Layer};
pub use crate::text::{format_coordinates, is_latin_script, Overlay, PosterText, TextOverlay};
pub use crate::theme::{
    validate, FontWeight, StyleAttrs, TextStyle, Theme, ThemeDef, ThemeRegistry, DEFAULT_THEME,
};
