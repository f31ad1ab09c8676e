//! Raw road data and the fixed hierarchy every road segment gets sorted into.

#[macro_use]
extern crate log;

mod areas;
mod category;
mod classify;
pub mod osm;

use serde::{Deserialize, Serialize};

use geom::{Bounds, PolyLine, Pt2D};
use posterutil::Tags;

pub use crate::areas::{Area, AreaKind};
pub use crate::category::Category;
pub use crate::classify::{classify, classify_all, CategoryCounts};

/// One piece of road as it came from the source data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub geometry: PolyLine,
    pub tags: Tags,
}

impl RoadSegment {
    pub fn new(geometry: PolyLine, tags: Tags) -> RoadSegment {
        RoadSegment { geometry, tags }
    }
}

/// A road segment reduced to what styling and extrusion need.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedSegment {
    pub geometry: PolyLine,
    pub category: Category,
}

/// The area of interest, in the same planar frame as the segments (meters).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Pt2D,
    /// Half the width of the square around the center that should be shown
    pub radius: f64,
}

impl Region {
    /// The part of the region visible through a window with this width / height ratio. The
    /// longer side spans the full radius and the shorter one is cropped, never stretched.
    pub fn window(&self, aspect: f64) -> Bounds {
        Bounds::crop_to_aspect(self.center, self.radius, aspect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portrait_window() {
        let region = Region {
            center: Pt2D::new(50.0, 10.0),
            radius: 50.0,
        };
        let window = region.window(0.5);
        assert_eq!(window.height(), 100.0);
        assert_eq!(window.width(), 50.0);
        assert_eq!(window.center(), region.center);
    }
}
