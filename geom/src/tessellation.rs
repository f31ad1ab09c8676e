use anyhow::{bail, Result};

use crate::{Bounds, Pt2D};

/// A triangulated polygon.
#[derive(Clone, Debug)]
pub struct Tessellation {
    points: Vec<Pt2D>,
    /// Groups of three indices make up the triangles
    indices: Vec<u32>,
}

#[derive(Clone, Debug)]
pub struct Triangle {
    pub pt1: Pt2D,
    pub pt2: Pt2D,
    pub pt3: Pt2D,
}

impl Triangle {
    /// Positive when counter-clockwise.
    pub fn signed_area(&self) -> f64 {
        ((self.pt2.x() - self.pt1.x()) * (self.pt3.y() - self.pt1.y())
            - (self.pt3.x() - self.pt1.x()) * (self.pt2.y() - self.pt1.y()))
            / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }
}

impl Tessellation {
    pub fn new(points: Vec<Pt2D>, indices: Vec<usize>) -> Result<Tessellation> {
        if indices.len() % 3 != 0 {
            bail!("Tessellation indices aren't triples: {}", indices.len());
        }
        Ok(Tessellation {
            indices: downsize(indices, points.len())?,
            points,
        })
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.points
    }

    /// Each triangle as indices into `points`.
    pub fn triangle_indices(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|slice| [slice[0], slice[1], slice[2]])
    }

    pub fn triangles(&self) -> Vec<Triangle> {
        self.triangle_indices()
            .map(|[a, b, c]| Triangle {
                pt1: self.points[a as usize],
                pt2: self.points[b as usize],
                pt3: self.points[c as usize],
            })
            .collect()
    }

    pub fn get_bounds(&self) -> Bounds {
        Bounds::from(&self.points)
    }
}

fn downsize(input: Vec<usize>, num_points: usize) -> Result<Vec<u32>> {
    let mut output = Vec::with_capacity(input.len());
    for x in input {
        if x >= num_points {
            bail!("Triangle index {} out of range for {} points", x, num_points);
        }
        match u32::try_from(x) {
            Ok(x) => output.push(x),
            Err(_) => bail!("{} can't fit in u32, some polygon is too huge", x),
        }
    }
    Ok(output)
}
