use serde::{Deserialize, Serialize};

use crate::{Polygon, Pt2D, Ring};

/// Represents a rectangular boundary of `Pt2D` points.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl Bounds {
    /// A boundary including no points.
    pub fn new() -> Bounds {
        Bounds {
            min_x: f64::MAX,
            min_y: f64::MAX,
            max_x: f64::MIN,
            max_y: f64::MIN,
        }
    }

    pub fn from_corners(min: Pt2D, max: Pt2D) -> Bounds {
        let mut b = Bounds::new();
        b.update(min);
        b.update(max);
        b
    }

    /// A boundary including all of these points.
    pub fn from(pts: &[Pt2D]) -> Bounds {
        let mut b = Bounds::new();
        for pt in pts {
            b.update(*pt);
        }
        b
    }

    /// Update the boundary to include this point.
    pub fn update(&mut self, pt: Pt2D) {
        self.min_x = self.min_x.min(pt.x());
        self.max_x = self.max_x.max(pt.x());
        self.min_y = self.min_y.min(pt.y());
        self.max_y = self.max_y.max(pt.y());
    }

    /// Expand the boundary to include another.
    pub fn union(&mut self, other: Bounds) {
        if other.is_empty() {
            return;
        }
        self.update(Pt2D::new(other.min_x, other.min_y));
        self.update(Pt2D::new(other.max_x, other.max_y));
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// True if the point is within the boundary, edges included.
    pub fn contains(&self, pt: Pt2D) -> bool {
        pt.x() >= self.min_x && pt.x() <= self.max_x && pt.y() >= self.min_y && pt.y() <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Pt2D {
        Pt2D::new(
            self.min_x + self.width() / 2.0,
            self.min_y + self.height() / 2.0,
        )
    }

    /// Shrinks every side by `dist`. Negative values grow the boundary.
    pub fn inset(&self, dist: f64) -> Bounds {
        Bounds {
            min_x: self.min_x + dist,
            min_y: self.min_y + dist,
            max_x: self.max_x - dist,
            max_y: self.max_y - dist,
        }
    }

    /// Counter-clockwise, starting from the minimum corner.
    pub fn get_corners(&self) -> Vec<Pt2D> {
        vec![
            Pt2D::new(self.min_x, self.min_y),
            Pt2D::new(self.max_x, self.min_y),
            Pt2D::new(self.max_x, self.max_y),
            Pt2D::new(self.min_x, self.max_y),
        ]
    }

    pub fn get_rectangle(&self) -> Polygon {
        let mut pts = self.get_corners();
        pts.push(pts[0]);
        Polygon::with_holes(Ring::must_new(pts), Vec::new())
    }

    /// Returns a window centered on `center` with the requested width / height ratio, fitting
    /// inside a square of half-width `radius`. The longer side spans the whole radius and the
    /// shorter one gets cropped.
    pub fn crop_to_aspect(center: Pt2D, radius: f64, aspect: f64) -> Bounds {
        let (half_x, half_y) = if aspect > 1.0 {
            (radius, radius / aspect)
        } else {
            (radius * aspect, radius)
        };
        Bounds {
            min_x: center.x() - half_x,
            min_y: center.y() - half_y,
            max_x: center.x() + half_x,
            max_y: center.y() + half_y,
        }
    }
}
