//! Tag keys and values that matter here.

pub const HIGHWAY: &str = "highway";

pub const NATURAL: &str = "natural";
pub const WATERWAY: &str = "waterway";
pub const LEISURE: &str = "leisure";
pub const LANDUSE: &str = "landuse";
