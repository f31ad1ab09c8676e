use std::collections::HashMap;
use std::fmt::Write;
use std::ops::Range;

use crate::MeshError;

/// Triangles over shared vertices, in millimeters, z up. Faces wind counter-clockwise seen from
/// outside. The faces come in contiguous runs, one per closed solid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<[u32; 3]>,
    solids: Vec<Range<usize>>,
}

impl Mesh {
    /// One closed solid.
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<[u32; 3]>) -> Mesh {
        let solids = vec![0..faces.len()];
        Mesh {
            vertices,
            faces,
            solids,
        }
    }

    /// Adds another mesh's solids to this one.
    pub fn append(&mut self, other: Mesh) {
        let offset = self.vertices.len() as u32;
        let first_face = self.faces.len();
        self.vertices.extend(other.vertices);
        self.faces.extend(
            other
                .faces
                .into_iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
        self.solids.extend(
            other
                .solids
                .into_iter()
                .map(|r| (r.start + first_face)..(r.end + first_face)),
        );
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn num_solids(&self) -> usize {
        self.solids.len()
    }

    /// Checks that every solid is closed: each directed edge appears exactly once, and so does
    /// its reverse. Every solid must also enclose positive volume.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.solids.is_empty() {
            return Err(self.invalid("no solids".to_string()));
        }
        for (idx, range) in self.solids.iter().enumerate() {
            let faces = &self.faces[range.clone()];
            if faces.is_empty() {
                return Err(self.invalid(format!("solid {} has no faces", idx)));
            }
            if let Some(face) = faces
                .iter()
                .find(|f| f.iter().any(|v| *v as usize >= self.vertices.len()))
            {
                return Err(self.invalid(format!("face {:?} is out of range", face)));
            }

            let counts = edge_counts(faces);
            for ((a, b), count) in &counts {
                if *count != 1 {
                    return Err(self.invalid(format!(
                        "solid {}: edge {}->{} is used {} times in the same direction",
                        idx, a, b, count
                    )));
                }
                if counts.get(&(*b, *a)) != Some(&1) {
                    return Err(self.invalid(format!(
                        "solid {}: edge {}->{} has no opposite, near {:?}",
                        idx, a, b, self.vertices[*a as usize]
                    )));
                }
            }

            let volume = signed_volume(&self.vertices, faces);
            if !(volume > 0.0) {
                return Err(self.invalid(format!("solid {} has volume {}", idx, volume)));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> MeshError {
        MeshError::InvalidMesh {
            reason,
            num_vertices: self.vertices.len(),
            num_faces: self.faces.len(),
        }
    }

    /// In cubic millimeters. Only meaningful for closed solids.
    pub fn volume(&self) -> f64 {
        signed_volume(&self.vertices, &self.faces)
    }

    /// The min and max corners
    pub fn bounds(&self) -> Option<([f64; 3], [f64; 3])> {
        let first = *self.vertices.first()?;
        let mut min = first;
        let mut max = first;
        for v in &self.vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
        }
        Some((min, max))
    }

    /// Binary STL: an 80 byte header, the triangle count, then 50 bytes per triangle.
    pub fn to_stl(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(84 + 50 * self.faces.len());
        let mut header = [0u8; 80];
        let label = b"binary STL relief";
        header[..label.len()].copy_from_slice(label);
        out.extend_from_slice(&header);
        out.extend_from_slice(&(self.faces.len() as u32).to_le_bytes());
        for face in &self.faces {
            let [a, b, c] = face.map(|v| self.vertices[v as usize]);
            for x in unit_normal(a, b, c).iter().chain(&a).chain(&b).chain(&c) {
                out.extend_from_slice(&(*x as f32).to_le_bytes());
            }
            out.extend_from_slice(&0u16.to_le_bytes());
        }
        out
    }

    /// Wavefront OBJ, one object per solid. Indices are 1-based.
    pub fn to_obj(&self) -> String {
        let mut out = String::new();
        out.push_str("# relief\n");
        for v in &self.vertices {
            let _ = writeln!(out, "v {:.6} {:.6} {:.6}", v[0], v[1], v[2]);
        }
        for (idx, range) in self.solids.iter().enumerate() {
            let _ = writeln!(out, "o solid_{}", idx);
            for [a, b, c] in &self.faces[range.clone()] {
                let _ = writeln!(out, "f {} {} {}", a + 1, b + 1, c + 1);
            }
        }
        out
    }
}

pub(crate) fn edge_counts(faces: &[[u32; 3]]) -> HashMap<(u32, u32), usize> {
    let mut counts = HashMap::new();
    for [a, b, c] in faces {
        for edge in [(*a, *b), (*b, *c), (*c, *a)] {
            *counts.entry(edge).or_insert(0) += 1;
        }
    }
    counts
}

fn signed_volume(vertices: &[[f64; 3]], faces: &[[u32; 3]]) -> f64 {
    let mut sum = 0.0;
    for face in faces {
        let [a, b, c] = face.map(|v| vertices[v as usize]);
        sum += dot(a, cross(b, c));
    }
    sum / 6.0
}

pub(crate) fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn unit_normal(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> [f64; 3] {
    let n = cross(sub(b, a), sub(c, a));
    let len = dot(n, n).sqrt();
    if len == 0.0 {
        return [0.0, 0.0, 0.0];
    }
    [n[0] / len, n[1] / len, n[2] / len]
}
