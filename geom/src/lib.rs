//! 2D geometry used by both the poster renderer and the relief builder. Everything here lives in
//! one planar frame; callers decide whether units are meters (the map) or millimeters (a plate).

mod bounds;
mod gps;
mod line;
mod polygon;
mod polyline;
mod pt;
mod ring;
mod tessellation;

pub use crate::bounds::Bounds;
pub use crate::gps::LonLat;
pub use crate::line::Line;
pub use crate::polygon::Polygon;
pub use crate::polyline::PolyLine;
pub use crate::pt::Pt2D;
pub use crate::ring::Ring;
pub use crate::tessellation::{Tessellation, Triangle};

/// Shorter distances don't make usable geometry.
pub const EPSILON_DIST: f64 = 1.0e-6;
