use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Pt2D;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// longitude is x, latitude is y
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct LonLat {
    longitude: f64,
    latitude: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> LonLat {
        LonLat {
            longitude: lon,
            latitude: lat,
        }
    }

    pub fn x(&self) -> f64 {
        self.longitude
    }

    pub fn y(&self) -> f64 {
        self.latitude
    }

    /// Haversine distance
    pub fn gps_dist_meters(self, other: LonLat) -> f64 {
        let lon1 = self.longitude.to_radians();
        let lon2 = other.longitude.to_radians();
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();

        let delta_lat = lat2 - lat1;
        let delta_lon = lon2 - lon1;

        let a = (delta_lat / 2.0).sin().powi(2)
            + (delta_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Equirectangular projection into meters around `origin`, which maps to (0, 0). North is +y.
    /// Good enough at city scale.
    pub fn to_pt(self, origin: LonLat) -> Pt2D {
        let x = (self.longitude - origin.longitude).to_radians()
            * origin.latitude.to_radians().cos()
            * EARTH_RADIUS_M;
        let y = (self.latitude - origin.latitude).to_radians() * EARTH_RADIUS_M;
        Pt2D::new(x, y)
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LonLat({0}, {1})", self.longitude, self.latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_near_origin() {
        let paris = LonLat::new(2.3522, 48.8566);
        assert_eq!(paris.to_pt(paris), Pt2D::new(0.0, 0.0));
        let pt = LonLat::new(2.3622, 48.8666).to_pt(paris);
        assert!(pt.x() > 0.0 && pt.y() > 0.0);

        // Near the origin, the projection agrees with great-circle distance
        let haversine = paris.gps_dist_meters(LonLat::new(2.3622, 48.8666));
        let planar = pt.dist_to(Pt2D::new(0.0, 0.0));
        assert!((haversine - planar).abs() / haversine < 0.001);
    }
}
