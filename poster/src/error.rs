use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThemeError {
    #[error("unknown theme {name}; available themes: {}", available.join(", "))]
    UnknownTheme {
        name: String,
        available: Vec<String>,
    },
    #[error("theme {theme} is missing styles for {}", missing.join(", "))]
    IncompleteTheme { theme: String, missing: Vec<String> },
    #[error("couldn't parse theme {theme}: {reason}")]
    Parse { theme: String, reason: String },
    #[error("couldn't read themes from {path}: {reason}")]
    Io { path: String, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("invalid canvas {width_px}x{height_px} at {dpi} dpi")]
    InvalidCanvas {
        width_px: u32,
        height_px: u32,
        dpi: f64,
    },
    #[error("a {category} polyline has {num_pts} points; need at least 2")]
    InvalidGeometry { category: String, num_pts: usize },
    #[error("the region to draw has no area")]
    EmptyRegion,
    #[error("failed to parse the generated SVG: {0}")]
    SvgParse(String),
    #[error("failed to allocate a {0}x{1} pixmap")]
    PixmapAlloc(u32, u32),
    #[error("failed to encode PNG: {0}")]
    PngEncode(String),
    #[error("failed to convert SVG to PDF: {0}")]
    PdfConvert(String),
}
