//! Turns loose triangles into a closed mesh: coincident vertices are welded, degenerate faces
//! dropped, and T-junctions split.

use std::collections::{BTreeMap, HashMap};

use crate::mesh::{cross, dot, edge_counts, sub};

/// Gives up on T-junction repair after this many passes
const MAX_REPAIR_PASSES: usize = 64;

/// Collects triangles, sharing vertices with bit-identical coordinates.
#[derive(Default)]
pub struct MeshBuilder {
    vertices: Vec<[f64; 3]>,
    lookup: HashMap<[u64; 3], u32>,
    faces: Vec<[u32; 3]>,
}

impl MeshBuilder {
    pub fn new() -> MeshBuilder {
        MeshBuilder::default()
    }

    fn vertex(&mut self, pt: [f64; 3]) -> u32 {
        // 0.0 and -0.0 are the same place
        let pt = pt.map(|x| if x == 0.0 { 0.0 } else { x });
        let key = pt.map(f64::to_bits);
        if let Some(idx) = self.lookup.get(&key) {
            return *idx;
        }
        let idx = self.vertices.len() as u32;
        self.vertices.push(pt);
        self.lookup.insert(key, idx);
        idx
    }

    pub fn triangle(&mut self, a: [f64; 3], b: [f64; 3], c: [f64; 3]) {
        let face = [self.vertex(a), self.vertex(b), self.vertex(c)];
        self.faces.push(face);
    }

    /// Two triangles, for four corners in counter-clockwise order as seen from outside.
    pub fn quad(&mut self, a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3]) {
        self.triangle(a, b, c);
        self.triangle(a, c, d);
    }

    pub fn finish(self) -> (Vec<[f64; 3]>, Vec<[u32; 3]>) {
        (self.vertices, self.faces)
    }
}

/// Drops faces that repeat a vertex or have exactly zero area. Returns how many were dropped.
pub fn discard_degenerate(vertices: &[[f64; 3]], faces: &mut Vec<[u32; 3]>) -> usize {
    let before = faces.len();
    faces.retain(|[a, b, c]| {
        if a == b || b == c || a == c {
            return false;
        }
        let (pa, pb, pc) = (
            vertices[*a as usize],
            vertices[*b as usize],
            vertices[*c as usize],
        );
        let n = cross(sub(pb, pa), sub(pc, pa));
        dot(n, n) > 0.0
    });
    before - faces.len()
}

/// Where one face's edge runs past vertices that other faces end their edges at, the edge can't
/// pair up. Splits such faces at those vertices until every edge has a partner, or nothing more
/// can be split. Returns the number of faces split.
pub fn repair_t_junctions(
    vertices: &[[f64; 3]],
    faces: &mut Vec<[u32; 3]>,
    tolerance: f64,
) -> usize {
    let mut total = 0;
    for _ in 0..MAX_REPAIR_PASSES {
        let counts = edge_counts(faces);
        let unpaired: Vec<(usize, usize)> = faces
            .iter()
            .enumerate()
            .flat_map(|(idx, f)| (0..3).map(move |slot| (idx, slot, f[slot], f[(slot + 1) % 3])))
            .filter(|(_, _, a, b)| !counts.contains_key(&(*b, *a)))
            .map(|(idx, slot, _, _)| (idx, slot))
            .collect();
        if unpaired.is_empty() {
            break;
        }

        // Vertices that could sit in the middle of an unpaired edge, sorted by x
        let mut candidates: Vec<u32> = unpaired
            .iter()
            .flat_map(|(idx, slot)| [faces[*idx][*slot], faces[*idx][(*slot + 1) % 3]])
            .collect();
        candidates.sort_by(|a, b| {
            vertices[*a as usize][0]
                .total_cmp(&vertices[*b as usize][0])
                .then(a.cmp(b))
        });
        candidates.dedup();

        // At most one edge per face per pass
        let mut splits: BTreeMap<usize, (usize, Vec<u32>)> = BTreeMap::new();
        for (idx, slot) in unpaired {
            if splits.contains_key(&idx) {
                continue;
            }
            let face = faces[idx];
            let (a, b) = (face[slot], face[(slot + 1) % 3]);
            let interior = interior_vertices(vertices, &candidates, a, b, tolerance);
            if !interior.is_empty() {
                splits.insert(idx, (slot, interior));
            }
        }
        if splits.is_empty() {
            break;
        }
        total += splits.len();

        let mut result = Vec::with_capacity(faces.len() + splits.len() * 2);
        for (idx, face) in faces.iter().enumerate() {
            match splits.get(&idx) {
                Some((slot, interior)) => {
                    let a = face[*slot];
                    let b = face[(slot + 1) % 3];
                    let apex = face[(slot + 2) % 3];
                    let mut chain = vec![a];
                    chain.extend(interior);
                    chain.push(b);
                    for pair in chain.windows(2) {
                        result.push([pair[0], pair[1], apex]);
                    }
                }
                None => result.push(*face),
            }
        }
        *faces = result;
    }
    total
}

/// Candidates strictly between a and b, ordered from a to b
fn interior_vertices(
    vertices: &[[f64; 3]],
    candidates: &[u32],
    a: u32,
    b: u32,
    tolerance: f64,
) -> Vec<u32> {
    let (pa, pb) = (vertices[a as usize], vertices[b as usize]);
    let dir = sub(pb, pa);
    let len_sq = dot(dir, dir);
    if len_sq == 0.0 {
        return Vec::new();
    }
    let min_x = pa[0].min(pb[0]) - tolerance;
    let max_x = pa[0].max(pb[0]) + tolerance;
    let start = candidates.partition_point(|v| vertices[*v as usize][0] < min_x);

    let mut found: Vec<(f64, u32)> = Vec::new();
    for v in &candidates[start..] {
        let pt = vertices[*v as usize];
        if pt[0] > max_x {
            break;
        }
        if *v == a || *v == b {
            continue;
        }
        let t = dot(sub(pt, pa), dir) / len_sq;
        if t <= 0.0 || t >= 1.0 {
            continue;
        }
        let closest = [pa[0] + dir[0] * t, pa[1] + dir[1] * t, pa[2] + dir[2] * t];
        let off = sub(pt, closest);
        if dot(off, off) > tolerance * tolerance {
            continue;
        }
        let to_a = sub(pt, pa);
        let to_b = sub(pt, pb);
        if dot(to_a, to_a) <= tolerance * tolerance || dot(to_b, to_b) <= tolerance * tolerance {
            continue;
        }
        found.push((t, *v));
    }
    found.sort_by(|x, y| x.0.total_cmp(&y.0));
    found.into_iter().map(|(_, v)| v).collect()
}
