use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::{Bounds, Line, Polygon, Pt2D};

/// An open sequence of at least two distinct points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolyLine {
    pts: Vec<Pt2D>,
}

impl PolyLine {
    /// Adjacent duplicate points are squished. Fails if fewer than 2 distinct points remain.
    pub fn new(mut pts: Vec<Pt2D>) -> Result<PolyLine> {
        pts.dedup();
        if pts.len() < 2 {
            bail!("Need at least two distinct points for a PolyLine");
        }
        Ok(PolyLine { pts })
    }

    pub fn must_new(pts: Vec<Pt2D>) -> PolyLine {
        PolyLine::new(pts).unwrap()
    }

    /// Skips the checks, so renderers can be handed broken input.
    pub fn unchecked_new(pts: Vec<Pt2D>) -> PolyLine {
        PolyLine { pts }
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.pts
    }

    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        self.pts.windows(2).map(|pair| Line::new(pair[0], pair[1]))
    }

    pub fn length(&self) -> f64 {
        self.lines().map(|l| l.length()).sum()
    }

    pub fn get_bounds(&self) -> Bounds {
        Bounds::from(&self.pts)
    }

    pub fn reversed(&self) -> PolyLine {
        let mut pts = self.pts.clone();
        pts.reverse();
        PolyLine { pts }
    }

    /// Returns a copy with each point transformed, or None if it collapses to a single point.
    pub fn transformed<F: Fn(Pt2D) -> Pt2D>(&self, f: F) -> Option<PolyLine> {
        PolyLine::new(self.pts.iter().map(|pt| f(*pt)).collect()).ok()
    }

    /// Thickens the line into one capsule per segment. Unioning these gives round caps and round
    /// joins of total width `2 * radius`.
    pub fn capsules(&self, radius: f64, cap_segments: usize) -> Vec<Polygon> {
        self.lines()
            .filter(|l| l.length() > 0.0)
            .map(|l| Polygon::capsule(l.pt1(), l.pt2(), radius, cap_segments))
            .collect()
    }
}

impl fmt::Display for PolyLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "PolyLine::new(vec![")?;
        for pt in &self.pts {
            writeln!(f, "  Pt2D::new({}, {}),", pt.x(), pt.y())?;
        }
        write!(f, "])")
    }
}
