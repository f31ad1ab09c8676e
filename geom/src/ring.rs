use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::{Bounds, Pt2D};

/// Like a PolyLine, but closed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    // first equals last
    pts: Vec<Pt2D>,
}

impl Ring {
    pub fn new(pts: Vec<Pt2D>) -> Result<Ring> {
        if pts.len() < 4 {
            bail!("Can't make a ring with < 4 points");
        }
        if pts[0] != *pts.last().unwrap() {
            bail!("Can't make a ring with mismatching first/last points");
        }
        if pts.windows(2).any(|pair| pair[0] == pair[1]) {
            bail!("Ring has duplicate adjacent points");
        }
        Ok(Ring { pts })
    }

    /// Use only for rings known to be valid, like rectangles.
    pub fn must_new(pts: Vec<Pt2D>) -> Ring {
        Ring::new(pts).unwrap()
    }

    /// Accepts an open or closed sequence of points, drops adjacent duplicates and closes it.
    /// Returns None when fewer than 3 distinct points remain.
    pub fn deduped(raw: Vec<Pt2D>) -> Option<Ring> {
        let mut pts: Vec<Pt2D> = Vec::with_capacity(raw.len() + 1);
        for pt in raw {
            if pts.last() != Some(&pt) {
                pts.push(pt);
            }
        }
        while pts.len() > 1 && pts[0] == *pts.last().unwrap() {
            pts.pop();
        }
        if pts.len() < 3 {
            return None;
        }
        pts.push(pts[0]);
        Some(Ring { pts })
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.pts
    }

    /// Positive when the points go counter-clockwise.
    pub fn signed_area(&self) -> f64 {
        let mut sum = 0.0;
        for pair in self.pts.windows(2) {
            sum += pair[0].x() * pair[1].y() - pair[1].x() * pair[0].y();
        }
        sum / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    pub fn reversed(mut self) -> Ring {
        self.pts.reverse();
        self
    }

    pub fn get_bounds(&self) -> Bounds {
        Bounds::from(&self.pts)
    }

    /// Even-odd ray casting. Points exactly on the boundary may land on either side.
    pub fn contains_pt(&self, pt: Pt2D) -> bool {
        let mut inside = false;
        for pair in self.pts.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if (a.y() > pt.y()) != (b.y() > pt.y()) {
                let x = a.x() + (pt.y() - a.y()) / (b.y() - a.y()) * (b.x() - a.x());
                if pt.x() < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Returns a copy with each point transformed. The result may collapse.
    pub fn transformed<F: Fn(Pt2D) -> Pt2D>(&self, f: F) -> Option<Ring> {
        Ring::deduped(self.pts.iter().map(|pt| f(*pt)).collect())
    }
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Ring::new(vec![")?;
        for pt in &self.pts {
            writeln!(f, "  Pt2D::new({}, {}),", pt.x(), pt.y())?;
        }
        write!(f, "])")
    }
}

impl From<Ring> for geo::LineString {
    fn from(ring: Ring) -> Self {
        let pts: Vec<(f64, f64)> = ring.pts.into_iter().map(|pt| (pt.x(), pt.y())).collect();
        geo::LineString::from(pts)
    }
}

impl Ring {
    /// Converts a closed geo ring. Rings that collapse are None.
    pub fn from_geo(ls: &geo::LineString) -> Option<Ring> {
        Ring::deduped(ls.0.iter().map(|c| Pt2D::new(c.x, c.y)).collect())
    }
}
