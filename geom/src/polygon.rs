use std::fmt;

use anyhow::{anyhow, Result};
use geo::BooleanOps;
use serde::{Deserialize, Serialize};

use crate::{Bounds, Pt2D, Ring, Tessellation};

/// One outer ring and any number of holes.
#[derive(PartialEq, Serialize, Deserialize, Clone, Debug)]
pub struct Polygon {
    // The first ring is the outer one
    rings: Vec<Ring>,
}

impl Polygon {
    pub fn with_holes(outer: Ring, mut holes: Vec<Ring>) -> Polygon {
        holes.insert(0, outer);
        Polygon { rings: holes }
    }

    pub fn from_rings(rings: Vec<Ring>) -> Result<Polygon> {
        if rings.is_empty() {
            return Err(anyhow!("Can't make a Polygon without rings"));
        }
        Ok(Polygon { rings })
    }

    /// A segment thickened by `radius`, with semicircle caps of `cap_segments` pieces each.
    /// Counter-clockwise.
    pub fn capsule(pt1: Pt2D, pt2: Pt2D, radius: f64, cap_segments: usize) -> Polygon {
        let n = cap_segments.max(1);
        let theta = pt1.angle_to(pt2);
        let half_pi = std::f64::consts::FRAC_PI_2;
        let step = std::f64::consts::PI / (n as f64);

        let mut pts = Vec::with_capacity(2 * n + 3);
        for i in 0..=n {
            pts.push(pt2.project_away(radius, theta - half_pi + step * (i as f64)));
        }
        for i in 0..=n {
            pts.push(pt1.project_away(radius, theta + half_pi + step * (i as f64)));
        }
        pts.push(pts[0]);
        Polygon {
            rings: vec![Ring::must_new(pts)],
        }
    }

    pub fn outer(&self) -> &Ring {
        &self.rings[0]
    }

    pub fn holes(&self) -> &[Ring] {
        &self.rings[1..]
    }

    pub fn rings(&self) -> &Vec<Ring> {
        &self.rings
    }

    pub fn into_rings(self) -> Vec<Ring> {
        self.rings
    }

    pub fn get_bounds(&self) -> Bounds {
        self.outer().get_bounds()
    }

    pub fn area(&self) -> f64 {
        self.outer().area() - self.holes().iter().map(|r| r.area()).sum::<f64>()
    }

    /// Does this polygon contain the point in its interior?
    pub fn contains_pt(&self, pt: Pt2D) -> bool {
        self.outer().contains_pt(pt) && !self.holes().iter().any(|r| r.contains_pt(pt))
    }

    /// Transforms every point. Holes that collapse are dropped; None if the outer ring collapses.
    pub fn transformed<F: Fn(Pt2D) -> Pt2D>(&self, f: F) -> Option<Polygon> {
        let outer = self.outer().transformed(&f)?;
        let holes = self
            .holes()
            .iter()
            .filter_map(|r| r.transformed(&f))
            .collect();
        Some(Polygon::with_holes(outer, holes))
    }

    /// Triangulates the polygon. Tessellation points are the ring points in order, outer first,
    /// without each ring's repeated closing point.
    pub fn triangulate(&self) -> Result<Tessellation> {
        let mut points = Vec::new();
        let mut hole_indices = Vec::new();
        for (idx, ring) in self.rings.iter().enumerate() {
            if idx > 0 {
                hole_indices.push(points.len());
            }
            let pts = ring.points();
            points.extend_from_slice(&pts[0..pts.len() - 1]);
        }
        let mut vertices = Vec::with_capacity(points.len() * 2);
        for pt in &points {
            vertices.push(pt.x());
            vertices.push(pt.y());
        }
        let indices = earcutr::earcut(&vertices, &hole_indices, 2)
            .map_err(|err| anyhow!("Couldn't triangulate polygon: {:?}", err))?;
        Tessellation::new(points, indices)
    }

    /// Union all of the polygons. Merges pairwise, so each operation works on similarly sized
    /// inputs.
    pub fn union_all(list: Vec<Polygon>) -> Vec<Polygon> {
        let mut layer: Vec<geo::MultiPolygon> = list
            .into_iter()
            .map(|p| geo::MultiPolygon::new(vec![p.into()]))
            .collect();
        while layer.len() > 1 {
            let mut next = Vec::with_capacity(layer.len() / 2 + 1);
            let mut iter = layer.into_iter();
            while let Some(a) = iter.next() {
                match iter.next() {
                    Some(b) => next.push(a.union(&b)),
                    None => next.push(a),
                }
            }
            layer = next;
        }
        match layer.pop() {
            Some(multi) => from_multi(multi),
            None => Vec::new(),
        }
    }

    /// Everything covered by `a` but not by `b`.
    pub fn difference_all(a: &[Polygon], b: &[Polygon]) -> Vec<Polygon> {
        if a.is_empty() {
            return Vec::new();
        }
        if b.is_empty() {
            return a.to_vec();
        }
        from_multi(to_multi(a).difference(&to_multi(b)))
    }

    /// Everything covered by both `a` and `b`.
    pub fn intersection_all(a: &[Polygon], b: &[Polygon]) -> Vec<Polygon> {
        if a.is_empty() || b.is_empty() {
            return Vec::new();
        }
        from_multi(to_multi(a).intersection(&to_multi(b)))
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Polygon with {} rings", self.rings.len())?;
        for ring in &self.rings {
            writeln!(f, "{}", ring)?;
        }
        Ok(())
    }
}

impl From<Polygon> for geo::Polygon {
    fn from(poly: Polygon) -> Self {
        let mut rings = poly.rings.into_iter();
        let exterior = rings
            .next()
            .map(geo::LineString::from)
            .unwrap_or_else(|| geo::LineString::new(Vec::new()));
        Self::new(exterior, rings.map(geo::LineString::from).collect())
    }
}

impl Polygon {
    /// Converts from geo. Collapsed holes are dropped; None if the exterior collapses.
    pub fn from_geo(poly: &geo::Polygon) -> Option<Polygon> {
        let outer = Ring::from_geo(poly.exterior())?;
        let holes = poly.interiors().iter().filter_map(Ring::from_geo).collect();
        Some(Polygon::with_holes(outer, holes))
    }
}

fn to_multi(list: &[Polygon]) -> geo::MultiPolygon {
    let polys: Vec<geo::Polygon> = list.iter().map(|p| p.clone().into()).collect();
    geo::MultiPolygon::new(polys)
}

fn from_multi(multi: geo::MultiPolygon) -> Vec<Polygon> {
    multi.0.iter().filter_map(Polygon::from_geo).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        Bounds::from_corners(Pt2D::new(x, y), Pt2D::new(x + size, y + size)).get_rectangle()
    }

    #[test]
    fn union_overlapping() {
        let result = Polygon::union_all(vec![
            square(0.0, 0.0, 2.0),
            square(1.0, 0.0, 2.0),
            square(10.0, 10.0, 1.0),
        ]);
        assert_eq!(result.len(), 2);
        let total: f64 = result.iter().map(|p| p.area()).sum();
        assert!((total - 7.0).abs() < 1e-9);
    }

    #[test]
    fn difference_makes_hole() {
        let result = Polygon::difference_all(&[square(0.0, 0.0, 10.0)], &[square(4.0, 4.0, 2.0)]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].holes().len(), 1);
        assert!((result[0].area() - 96.0).abs() < 1e-9);
        assert!(!result[0].contains_pt(Pt2D::new(5.0, 5.0)));
        assert!(result[0].contains_pt(Pt2D::new(1.0, 1.0)));
    }

    #[test]
    fn intersection_clips() {
        let result =
            Polygon::intersection_all(&[square(0.0, 0.0, 10.0)], &[square(8.0, 8.0, 10.0)]);
        let total: f64 = result.iter().map(|p| p.area()).sum();
        assert!((total - 4.0).abs() < 1e-9);
    }

    #[test]
    fn triangulate_with_hole() {
        let poly = Polygon::difference_all(&[square(0.0, 0.0, 10.0)], &[square(4.0, 4.0, 2.0)])
            .remove(0);
        let tess = poly.triangulate().unwrap();
        let area: f64 = tess.triangles().iter().map(|t| t.area()).sum();
        assert!((area - 96.0).abs() < 1e-9);
        assert!(tess.points().len() >= 8);
    }
}
