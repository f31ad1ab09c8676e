//! One SVG scene is built per poster; PNG and PDF are realized from that scene, so the format
//! never changes what's drawn.

mod raster;
mod svg;

use std::fmt;
use std::str::FromStr;

use road_network::{Area, ClassifiedSegment, Region};

use crate::{
    style, style_areas, AreaLayer, CanvasSpec, Color, Layer, Overlay, PosterText, RenderError,
    Theme,
};

pub use self::svg::to_svg;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    Png,
    Svg,
    Pdf,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Png, OutputFormat::Svg, OutputFormat::Pdf];

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Pdf => "pdf",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Svg => "image/svg+xml",
            OutputFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim().to_ascii_lowercase();
        OutputFormat::ALL
            .iter()
            .find(|f| f.extension() == raw)
            .copied()
            .ok_or_else(|| format!("unknown format {}; use png, svg or pdf", raw))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderedImage {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

impl RenderedImage {
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }
}

/// Everything that goes on a poster, already styled. Geometry is borrowed from the classified
/// snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Poster<'a> {
    pub region: Region,
    pub background: Color,
    pub areas: Vec<AreaLayer<'a>>,
    pub layers: Vec<Layer<'a>>,
    /// Fades the top and bottom quarter into this color
    pub gradient: Option<Color>,
    pub overlays: Vec<Overlay>,
}

impl<'a> Poster<'a> {
    /// Just a background.
    pub fn new(region: Region, background: Color) -> Poster<'a> {
        Poster {
            region,
            background,
            areas: Vec::new(),
            layers: Vec::new(),
            gradient: None,
            overlays: Vec::new(),
        }
    }

    pub fn from_theme(
        theme: &Theme,
        segments: &'a [ClassifiedSegment],
        areas: &'a [Area],
        region: Region,
    ) -> Poster<'a> {
        Poster {
            region,
            background: theme.background,
            areas: style_areas(areas, theme),
            layers: style(segments, theme),
            gradient: theme.gradient,
            overlays: Vec::new(),
        }
    }

    /// Adds the title, country and coordinates, laid out for this canvas.
    pub fn with_text(mut self, text: &PosterText, theme: &Theme, canvas: &CanvasSpec) -> Self {
        self.overlays.extend(text.overlays(
            &theme.text_style,
            canvas.width_in(),
            canvas.height_in(),
        ));
        self
    }

    fn has_text(&self) -> bool {
        self.overlays.iter().any(|o| matches!(o, Overlay::Text(_)))
    }
}

/// Draws the poster. Identical input produces identical bytes.
pub fn render(
    poster: &Poster,
    canvas: &CanvasSpec,
    format: OutputFormat,
) -> Result<RenderedImage, RenderError> {
    let svg = to_svg(poster, canvas)?;
    let bytes = match format {
        OutputFormat::Svg => svg.into_bytes(),
        OutputFormat::Png => raster::svg_to_png(&svg, canvas, poster.has_text())?,
        OutputFormat::Pdf => raster::svg_to_pdf(&svg, poster.has_text())?,
    };
    debug!(
        "Rendered {} layers as {} ({} bytes)",
        poster.layers.len(),
        format,
        bytes.len()
    );
    Ok(RenderedImage { format, bytes })
}
