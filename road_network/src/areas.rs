use std::fmt;

use serde::{Deserialize, Serialize};

use geom::Polygon;
use posterutil::Tags;

use crate::osm;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AreaKind {
    Water,
    Park,
}

impl AreaKind {
    /// natural=water and waterway=riverbank are water; leisure=park and landuse=grass are parks.
    pub fn from_tags(tags: &Tags) -> Option<AreaKind> {
        if tags.is_any(osm::NATURAL, &["water"]) || tags.is_any(osm::WATERWAY, &["riverbank"]) {
            return Some(AreaKind::Water);
        }
        if tags.is_any(osm::LEISURE, &["park"]) || tags.is_any(osm::LANDUSE, &["grass"]) {
            return Some(AreaKind::Park);
        }
        None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AreaKind::Water => "water",
            AreaKind::Park => "park",
        }
    }
}

impl fmt::Display for AreaKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A filled shape drawn underneath the roads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub kind: AreaKind,
    pub polygon: Polygon,
}
