//! Overlays polygon rings into one planar subdivision. Every crossing and touching point becomes a
//! shared vertex, so neighboring faces meet along identical edges. Coordinates live on a binary
//! grid, where every orientation test is exact.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use geom::{Bounds, Polygon, Pt2D, Ring, Tessellation};

use crate::cleanup::{discard_degenerate, repair_t_junctions, MeshBuilder};
use crate::{Mesh, MeshError};

/// Grid spacing in mm. A power of two, so grid points convert to floats and back exactly.
const QUANTUM: f64 = 1.0 / 8192.0;
/// Rounding a crossing can create new crossings; give up after this many rounds
const MAX_SPLIT_PASSES: usize = 16;
/// Roughly how many index cells span the longer side
const INDEX_CELLS: i64 = 64;
/// Every vertex sits on the grid, so anything this close to an edge is exactly on it
const COLLINEAR_TOLERANCE: f64 = 1.0e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct GridPt {
    x: i64,
    y: i64,
}

impl GridPt {
    fn snap(pt: Pt2D) -> GridPt {
        GridPt {
            x: (pt.x() / QUANTUM).round() as i64,
            y: (pt.y() / QUANTUM).round() as i64,
        }
    }

    fn to_pt(self) -> Pt2D {
        Pt2D::new(self.x as f64 * QUANTUM, self.y as f64 * QUANTUM)
    }

    fn minus(self, other: GridPt) -> (i128, i128) {
        (
            i128::from(self.x) - i128::from(other.x),
            i128::from(self.y) - i128::from(other.y),
        )
    }
}

fn cross(u: (i128, i128), v: (i128, i128)) -> i128 {
    u.0 * v.1 - u.1 * v.0
}

/// Positive if c is left of a->b, zero if collinear
fn orient(a: GridPt, b: GridPt, c: GridPt) -> i128 {
    cross(b.minus(a), c.minus(a))
}

fn dot(u: (i128, i128), v: (i128, i128)) -> i128 {
    u.0 * v.0 + u.1 * v.1
}

/// Is p on the segment, but not at either end?
fn strictly_inside(p: GridPt, a: GridPt, b: GridPt) -> bool {
    orient(a, b, p) == 0 && dot(p.minus(a), b.minus(a)) > 0 && dot(p.minus(b), a.minus(b)) > 0
}

/// Where two properly crossing segments meet, rounded to the grid
fn crossing(a: GridPt, b: GridPt, c: GridPt, d: GridPt) -> GridPt {
    let ab = b.minus(a);
    let cd = d.minus(c);
    let t = cross(c.minus(a), cd) as f64 / cross(ab, cd) as f64;
    GridPt {
        x: a.x + (ab.0 as f64 * t).round() as i64,
        y: a.y + (ab.1 as f64 * t).round() as i64,
    }
}

fn undirected(a: GridPt, b: GridPt) -> Option<(GridPt, GridPt)> {
    if a == b {
        None
    } else if a < b {
        Some((a, b))
    } else {
        Some((b, a))
    }
}

/// Which half of the circle a direction points into, then counter-clockwise within it
fn angle_cmp(u: (i128, i128), v: (i128, i128)) -> std::cmp::Ordering {
    let half = |d: (i128, i128)| if d.1 > 0 || (d.1 == 0 && d.0 > 0) { 0 } else { 1 };
    half(u).cmp(&half(v)).then_with(|| 0.cmp(&cross(u, v)))
}

/// Twice the signed area; positive when counter-clockwise
fn doubled_area(cycle: &[GridPt]) -> i128 {
    let mut sum = 0;
    for (idx, a) in cycle.iter().enumerate() {
        let b = cycle[(idx + 1) % cycle.len()];
        sum += i128::from(a.x) * i128::from(b.y) - i128::from(b.x) * i128::from(a.y);
    }
    sum
}

/// Crossing-number test. Points on the cycle are outside.
fn encloses(cycle: &[GridPt], p: GridPt) -> bool {
    let mut inside = false;
    for (idx, a) in cycle.iter().enumerate() {
        let b = cycle[(idx + 1) % cycle.len()];
        if *a == p {
            return false;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let side = orient(*a, b, p);
            if side == 0 {
                return false;
            }
            if (side > 0) == (b.y > a.y) {
                inside = !inside;
            }
        }
    }
    inside
}

fn grid_bounds(pts: &[GridPt]) -> (GridPt, GridPt) {
    let mut min = pts[0];
    let mut max = pts[0];
    for pt in pts {
        min.x = min.x.min(pt.x);
        min.y = min.y.min(pt.y);
        max.x = max.x.max(pt.x);
        max.y = max.y.max(pt.y);
    }
    (min, max)
}

fn invalid(reason: String) -> MeshError {
    MeshError::InvalidMesh {
        reason,
        num_vertices: 0,
        num_faces: 0,
    }
}

/// One bounded face of the subdivision.
pub struct Face {
    /// Counter-clockwise outer ring, clockwise holes
    pub polygon: Polygon,
    tessellation: Tessellation,
}

impl Face {
    /// A point strictly inside the face
    pub fn interior_pt(&self) -> Pt2D {
        let mut best = None;
        let mut best_area = 0.0;
        for tri in self.tessellation.triangles() {
            if tri.area() > best_area {
                best_area = tri.area();
                best = Some(tri);
            }
        }
        match best {
            Some(tri) => Pt2D::new(
                (tri.pt1.x() + tri.pt2.x() + tri.pt3.x()) / 3.0,
                (tri.pt1.y() + tri.pt2.y() + tri.pt3.y()) / 3.0,
            ),
            None => self.polygon.outer().points()[0],
        }
    }
}

pub struct Arrangement {
    pts: Vec<GridPt>,
    /// Directed edges, each with the face on its left. None is outside everything.
    edges: Vec<(usize, usize, Option<usize>)>,
    faces: Vec<Face>,
}

impl Arrangement {
    /// Overlays the rings of every polygon. With a `frame`, every point is first pulled inside
    /// it, and its outline joins the overlay.
    pub fn new(polygons: &[&Polygon], frame: Option<&Bounds>) -> Result<Arrangement, MeshError> {
        let limits = frame.map(|b| {
            (
                GridPt::snap(Pt2D::new(b.min_x, b.min_y)),
                GridPt::snap(Pt2D::new(b.max_x, b.max_y)),
            )
        });
        let clamp = |pt: GridPt| match limits {
            Some((lo, hi)) => GridPt {
                x: pt.x.clamp(lo.x, hi.x),
                y: pt.y.clamp(lo.y, hi.y),
            },
            None => pt,
        };

        let mut segments = BTreeSet::new();
        let mut rings: Vec<Vec<GridPt>> = Vec::new();
        for polygon in polygons {
            for ring in polygon.rings() {
                rings.push(ring.points().iter().map(|pt| clamp(GridPt::snap(*pt))).collect());
            }
        }
        if let Some(b) = frame {
            let mut corners: Vec<GridPt> = b.get_corners().into_iter().map(GridPt::snap).collect();
            corners.push(corners[0]);
            rings.push(corners);
        }
        for ring in &rings {
            for pair in ring.windows(2) {
                segments.extend(undirected(pair[0], pair[1]));
            }
        }
        if segments.is_empty() {
            return Err(invalid("nothing to overlay".to_string()));
        }

        let segments = split_all(segments.into_iter().collect())?;
        let arrangement = Arrangement::from_segments(segments)?;
        debug!(
            "Overlaid {} rings into {} vertices, {} edges, {} faces",
            rings.len(),
            arrangement.pts.len(),
            arrangement.edges.len() / 2,
            arrangement.faces.len()
        );
        Ok(arrangement)
    }

    fn from_segments(segments: Vec<(GridPt, GridPt)>) -> Result<Arrangement, MeshError> {
        let mut ids: BTreeMap<GridPt, usize> = BTreeMap::new();
        for (a, b) in &segments {
            for pt in [a, b] {
                let next = ids.len();
                ids.entry(*pt).or_insert(next);
            }
        }
        let mut pts = vec![GridPt { x: 0, y: 0 }; ids.len()];
        for (pt, id) in &ids {
            pts[*id] = *pt;
        }
        let mut adjacency: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); pts.len()];
        for (a, b) in &segments {
            adjacency[ids[a]].insert(ids[b]);
            adjacency[ids[b]].insert(ids[a]);
        }

        // Dangling edges bound nothing
        let mut queue: Vec<usize> = (0..pts.len())
            .filter(|v| adjacency[*v].len() == 1)
            .collect();
        while let Some(v) = queue.pop() {
            let Some(other) = adjacency[v].iter().next().copied() else {
                continue;
            };
            adjacency[v].clear();
            adjacency[other].remove(&v);
            if adjacency[other].len() == 1 {
                queue.push(other);
            }
        }

        // Outgoing edges around each vertex, counter-clockwise
        let mut offsets = Vec::with_capacity(pts.len());
        let mut out: Vec<Vec<usize>> = Vec::with_capacity(pts.len());
        let mut slot_of: HashMap<(usize, usize), usize> = HashMap::new();
        let mut total = 0;
        for (v, neighbors) in adjacency.iter().enumerate() {
            let mut sorted: Vec<usize> = neighbors.iter().copied().collect();
            sorted.sort_by(|a, b| angle_cmp(pts[*a].minus(pts[v]), pts[*b].minus(pts[v])));
            for (slot, w) in sorted.iter().enumerate() {
                slot_of.insert((v, *w), slot);
            }
            offsets.push(total);
            total += sorted.len();
            out.push(sorted);
        }
        let half_edges: Vec<(usize, usize)> = out
            .iter()
            .enumerate()
            .flat_map(|(v, ws)| ws.iter().map(move |w| (v, *w)))
            .collect();

        // Walk each cycle keeping its face on the left: at every vertex, take the next edge
        // clockwise from the one we arrived on
        let mut cycle_of = vec![usize::MAX; half_edges.len()];
        let mut cycles: Vec<Vec<usize>> = Vec::new();
        for start in 0..half_edges.len() {
            if cycle_of[start] != usize::MAX {
                continue;
            }
            let mut cycle = Vec::new();
            let mut current = start;
            loop {
                cycle_of[current] = cycles.len();
                let (u, v) = half_edges[current];
                cycle.push(u);
                let back = slot_of[&(v, u)];
                let n = out[v].len();
                current = offsets[v] + (back + n - 1) % n;
                if current == start {
                    break;
                }
            }
            cycles.push(cycle);
        }

        let to_grid = |cycle: &Vec<usize>| -> Vec<GridPt> { cycle.iter().map(|v| pts[*v]).collect() };
        let areas: Vec<i128> = cycles.iter().map(|c| doubled_area(&to_grid(c))).collect();
        let boxes: Vec<(GridPt, GridPt)> = cycles.iter().map(|c| grid_bounds(&to_grid(c))).collect();

        // Counter-clockwise cycles bound faces. Each clockwise one is the outline of a separate
        // piece, and becomes a hole of the smallest face around it, if any.
        let mut face_of_cycle: Vec<Option<usize>> = vec![None; cycles.len()];
        let mut outlines: Vec<usize> = Vec::new();
        for (idx, area) in areas.iter().enumerate() {
            if *area > 0 {
                face_of_cycle[idx] = Some(outlines.len());
                outlines.push(idx);
            }
        }
        let mut holes: Vec<Vec<usize>> = vec![Vec::new(); outlines.len()];
        for (idx, area) in areas.iter().enumerate() {
            if *area > 0 {
                continue;
            }
            let first = pts[cycles[idx][0]];
            let mut best: Option<usize> = None;
            for (face, outline) in outlines.iter().enumerate() {
                let (min, max) = boxes[*outline];
                if first.x < min.x || first.x > max.x || first.y < min.y || first.y > max.y {
                    continue;
                }
                if best.map_or(false, |b| areas[outlines[b]] <= areas[*outline]) {
                    continue;
                }
                if encloses(&to_grid(&cycles[*outline]), first) {
                    best = Some(face);
                }
            }
            if let Some(face) = best {
                face_of_cycle[idx] = Some(face);
                holes[face].push(idx);
            }
        }

        let ring = |cycle: &Vec<usize>| -> Result<Ring, MeshError> {
            let mut ring_pts: Vec<Pt2D> = cycle.iter().map(|v| pts[*v].to_pt()).collect();
            ring_pts.push(ring_pts[0]);
            Ring::new(ring_pts).map_err(|err| invalid(err.to_string()))
        };
        let mut faces = Vec::with_capacity(outlines.len());
        for (face, outline) in outlines.iter().enumerate() {
            let mut rings = vec![ring(&cycles[*outline])?];
            for hole in &holes[face] {
                rings.push(ring(&cycles[*hole])?);
            }
            let polygon = Polygon::from_rings(rings).map_err(|err| invalid(err.to_string()))?;
            let tessellation = polygon
                .triangulate()
                .map_err(|err| invalid(err.to_string()))?;
            faces.push(Face {
                polygon,
                tessellation,
            });
        }

        let edges = half_edges
            .iter()
            .enumerate()
            .map(|(idx, (u, v))| (*u, *v, face_of_cycle[cycle_of[idx]]))
            .collect();
        Ok(Arrangement { pts, edges, faces })
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Raises every face with a top from `floor` to that height, as one closed solid. `tops` has
    /// one entry per face, each above `floor`; faces with None are left out.
    pub fn extrude(&self, floor: f64, tops: &[Option<f64>]) -> Result<Mesh, MeshError> {
        let top_of = |face: Option<usize>| face.and_then(|f| tops.get(f).copied().flatten());
        let mut builder = MeshBuilder::new();
        for (face, top) in self.faces.iter().zip(tops) {
            if let Some(top) = top {
                cap(&mut builder, &face.tessellation, *top, true);
                cap(&mut builder, &face.tessellation, floor, false);
            }
        }

        let mut left_of: HashMap<(usize, usize), Option<usize>> = HashMap::new();
        for (u, v, face) in &self.edges {
            left_of.insert((*u, *v), *face);
        }
        for (u, v, left) in &self.edges {
            if u > v {
                continue;
            }
            let right = left_of.get(&(*v, *u)).copied().flatten();
            let (a, b) = (self.pts[*u].to_pt(), self.pts[*v].to_pt());
            let (zl, zr) = (top_of(*left), top_of(right));
            // The wall faces whichever side is lower
            match (zl, zr) {
                (Some(zl), Some(zr)) if zl > zr => {
                    builder.quad(at(a, zr), at(b, zr), at(b, zl), at(a, zl))
                }
                (Some(zl), Some(zr)) if zr > zl => {
                    builder.quad(at(b, zl), at(a, zl), at(a, zr), at(b, zr))
                }
                (Some(zl), None) => builder.quad(at(a, floor), at(b, floor), at(b, zl), at(a, zl)),
                (None, Some(zr)) => builder.quad(at(b, floor), at(a, floor), at(a, zr), at(b, zr)),
                _ => {}
            }
        }

        let (vertices, mut faces) = builder.finish();
        if faces.is_empty() {
            return Err(invalid("no face has a height".to_string()));
        }
        let dropped = discard_degenerate(&vertices, &mut faces);
        let split = repair_t_junctions(&vertices, &mut faces, COLLINEAR_TOLERANCE);
        if dropped > 0 || split > 0 {
            debug!(
                "Dropped {} degenerate faces, split {} at T-junctions",
                dropped, split
            );
        }
        Ok(Mesh::new(vertices, faces))
    }
}

/// Splits segments wherever they cross or touch, until nothing does.
fn split_all(mut segments: Vec<(GridPt, GridPt)>) -> Result<Vec<(GridPt, GridPt)>, MeshError> {
    for _ in 0..MAX_SPLIT_PASSES {
        let cuts = find_cuts(&segments);
        if cuts.is_empty() {
            return Ok(segments);
        }
        let mut next = BTreeSet::new();
        for (idx, (a, b)) in segments.iter().enumerate() {
            let Some(extra) = cuts.get(&idx) else {
                next.insert((*a, *b));
                continue;
            };
            let dir = b.minus(*a);
            let mut along: Vec<(i128, GridPt)> = extra
                .iter()
                .filter(|pt| *pt != a && *pt != b)
                .map(|pt| (dot(pt.minus(*a), dir), *pt))
                .collect();
            along.sort();
            let mut chain = vec![*a];
            chain.extend(along.into_iter().map(|(_, pt)| pt));
            chain.push(*b);
            for pair in chain.windows(2) {
                next.extend(undirected(pair[0], pair[1]));
            }
        }
        segments = next.into_iter().collect();
    }
    Err(invalid(format!(
        "segments still cross after {} rounds of splitting",
        MAX_SPLIT_PASSES
    )))
}

/// For each segment that needs it, the points to split it at
fn find_cuts(segments: &[(GridPt, GridPt)]) -> BTreeMap<usize, Vec<GridPt>> {
    let all: Vec<GridPt> = segments.iter().flat_map(|(a, b)| [*a, *b]).collect();
    let (min, max) = grid_bounds(&all);
    let cell = ((max.x - min.x).max(max.y - min.y) / INDEX_CELLS).max(1);
    let key = |pt: GridPt| ((pt.x - min.x) / cell, (pt.y - min.y) / cell);

    let mut index: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (idx, (a, b)) in segments.iter().enumerate() {
        let (lo, hi) = grid_bounds(&[*a, *b]);
        let (x1, y1) = key(lo);
        let (x2, y2) = key(hi);
        for x in x1..=x2 {
            for y in y1..=y2 {
                index.entry((x, y)).or_default().push(idx);
            }
        }
    }

    let mut seen = HashSet::new();
    let mut cuts: BTreeMap<usize, Vec<GridPt>> = BTreeMap::new();
    for bucket in index.values() {
        for (n, i) in bucket.iter().enumerate() {
            for j in &bucket[n + 1..] {
                if !seen.insert((*i, *j)) {
                    continue;
                }
                let (a, b) = segments[*i];
                let (c, d) = segments[*j];
                let (ab_lo, ab_hi) = grid_bounds(&[a, b]);
                let (cd_lo, cd_hi) = grid_bounds(&[c, d]);
                if ab_hi.x < cd_lo.x || cd_hi.x < ab_lo.x || ab_hi.y < cd_lo.y || cd_hi.y < ab_lo.y
                {
                    continue;
                }

                let (o1, o2) = (orient(a, b, c).signum(), orient(a, b, d).signum());
                let (o3, o4) = (orient(c, d, a).signum(), orient(c, d, b).signum());
                if o1 * o2 < 0 && o3 * o4 < 0 {
                    let pt = crossing(a, b, c, d);
                    cuts.entry(*i).or_default().push(pt);
                    cuts.entry(*j).or_default().push(pt);
                    continue;
                }
                for (pt, on, (p, q)) in [(c, *i, (a, b)), (d, *i, (a, b)), (a, *j, (c, d)), (b, *j, (c, d))]
                {
                    if strictly_inside(pt, p, q) {
                        cuts.entry(on).or_default().push(pt);
                    }
                }
            }
        }
    }
    cuts
}

fn at(pt: Pt2D, z: f64) -> [f64; 3] {
    [pt.x(), pt.y(), z]
}

/// Triangles at `z`, wound counter-clockwise seen from above, or from below if `!up`.
fn cap(builder: &mut MeshBuilder, tessellation: &Tessellation, z: f64, up: bool) {
    for tri in tessellation.triangles() {
        if (tri.signed_area() > 0.0) == up {
            builder.triangle(at(tri.pt1, z), at(tri.pt2, z), at(tri.pt3, z));
        } else {
            builder.triangle(at(tri.pt1, z), at(tri.pt3, z), at(tri.pt2, z));
        }
    }
}
