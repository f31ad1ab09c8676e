use serde::{Deserialize, Serialize};

use geom::{Bounds, Polygon};
use posterutil::Timer;
use road_network::{Category, ClassifiedSegment};

use crate::arrangement::Arrangement;
use crate::kernel::guarded;
use crate::{
    DegenerateGeometryWarning, ExtrusionProfile, FootprintKernel, GeoKernel, Mesh, MeshError,
    PlateFrame, PlateSpec,
};

/// Narrower ridges can't be printed and upset the boolean operations
const MIN_RIDGE_WIDTH: f64 = 1.0e-3;

static DEFAULT_KERNEL: GeoKernel = GeoKernel;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RidgeMode {
    /// Plate and ridges form one watertight solid
    Fused,
    /// The plate, plus one closed prism per ridge region standing on it
    Separate,
}

/// A raised frame along the plate edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub width: f64,
    /// Defaults to the tallest ridge
    pub height: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Same frame as the road segments; projected like them
    Map,
    /// Already in plate millimeters
    Plate,
}

/// Extra shapes raised like another terrace, such as text outlines or parks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmbossShape {
    pub polygons: Vec<Polygon>,
    pub height: f64,
    pub placement: Placement,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReliefModel {
    pub mesh: Mesh,
    /// Everything that was left flat
    pub warnings: Vec<DegenerateGeometryWarning>,
    /// How the map was placed on the plate, if there was anything to place
    pub frame: Option<PlateFrame>,
}

/// Something to raise, before terracing
struct Level {
    name: String,
    height: f64,
    footprint: Vec<Polygon>,
}

/// Disjoint regions at one height
struct Terrace {
    height: f64,
    regions: Vec<Polygon>,
}

/// Builds a relief with the default options: ridges fused to the plate, no border, no emboss
/// shapes, the segments filling the plate.
pub fn build_mesh(
    segments: &[ClassifiedSegment],
    profile: &ExtrusionProfile,
    plate: &PlateSpec,
) -> Result<ReliefModel, MeshError> {
    ReliefBuilder::new(*plate, profile.clone()).build(segments, &mut Timer::throwaway())
}

pub struct ReliefBuilder<'a> {
    plate: PlateSpec,
    profile: ExtrusionProfile,
    mode: RidgeMode,
    border: Option<Border>,
    emboss: Vec<EmbossShape>,
    source: Option<Bounds>,
    invert: bool,
    kernel: &'a dyn FootprintKernel,
}

impl ReliefBuilder<'static> {
    pub fn new(plate: PlateSpec, profile: ExtrusionProfile) -> ReliefBuilder<'static> {
        ReliefBuilder {
            plate,
            profile,
            mode: RidgeMode::Fused,
            border: None,
            emboss: Vec::new(),
            source: None,
            invert: false,
            kernel: &DEFAULT_KERNEL,
        }
    }
}

impl<'a> ReliefBuilder<'a> {
    pub fn mode(mut self, mode: RidgeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn border(mut self, border: Option<Border>) -> Self {
        self.border = border;
        self
    }

    pub fn emboss(mut self, shape: EmbossShape) -> Self {
        self.emboss.push(shape);
        self
    }

    /// Fit this part of the map frame to the plate, instead of the bounds of the segments.
    pub fn fit_to(mut self, source: Bounds) -> Self {
        self.source = Some(source);
        self
    }

    /// Engrave every terrace into the plate instead of raising it. The plate top stays flat and
    /// each terrace sinks as deep as it would have stood tall.
    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn kernel<'b>(self, kernel: &'b dyn FootprintKernel) -> ReliefBuilder<'b> {
        ReliefBuilder {
            plate: self.plate,
            profile: self.profile,
            mode: self.mode,
            border: self.border,
            emboss: self.emboss,
            source: self.source,
            invert: self.invert,
            kernel,
        }
    }

    pub fn build(
        &self,
        segments: &[ClassifiedSegment],
        timer: &mut Timer,
    ) -> Result<ReliefModel, MeshError> {
        self.plate.validate()?;
        for (high, low) in self.profile.hierarchy_violations() {
            warn!(
                "{} ridges ({}mm) stand taller than {} ridges ({}mm)",
                low,
                self.profile.ridge(low).height,
                high,
                self.profile.ridge(high).height
            );
        }

        let mut warnings = Vec::new();
        let frame = self.frame(segments, &mut warnings);

        timer.start("extrude footprints");
        let mut levels = Vec::new();
        if let Some(ref frame) = frame {
            levels.extend(self.road_levels(segments, frame, &mut warnings));
        }
        levels.extend(self.border_level(&mut warnings));
        levels.extend(self.emboss_levels(frame.as_ref(), &mut warnings));
        timer.stop("extrude footprints");
        self.check_engraving(&levels)?;

        timer.start("terrace ridges");
        let terraces = self.terrace(levels, &mut warnings);
        timer.stop("terrace ridges");

        timer.start("assemble mesh");
        let mesh = self.assemble(&terraces);
        timer.stop("assemble mesh");
        let mesh = mesh?;

        for w in &warnings {
            timer.warn(w.to_string());
        }
        info!(
            "Relief has {} vertices, {} faces, {} solids, {:.1} mm^3",
            mesh.num_vertices(),
            mesh.num_faces(),
            mesh.num_solids(),
            mesh.volume()
        );
        Ok(ReliefModel {
            mesh,
            warnings,
            frame,
        })
    }

    /// Without an explicit source, the segments' bounds fill the room for roads, pulled in far
    /// enough that the widest ridge's round ends still fit.
    fn frame(
        &self,
        segments: &[ClassifiedSegment],
        warnings: &mut Vec<DegenerateGeometryWarning>,
    ) -> Option<PlateFrame> {
        let inner = self.plate.inner_bounds();
        if let Some(source) = self.source {
            return PlateFrame::fit(&source, &inner);
        }
        let source = segment_bounds(segments)?;
        let reach = Category::ALL
            .iter()
            .map(|c| self.profile.ridge(*c))
            .filter(|r| r.height > 0.0)
            .map(|r| r.width / 2.0)
            .fold(0.0, f64::max);
        let padded = inner.inset(reach);
        let target = if padded.width() > 0.0 && padded.height() > 0.0 {
            padded
        } else {
            inner
        };
        let frame = PlateFrame::fit(&source, &target);
        if frame.is_none() {
            warnings.push(DegenerateGeometryWarning {
                layer: "roads".to_string(),
                num_shapes: segments.len(),
                reason: format!("nothing to scale in bounds {:?}", source),
            });
        }
        frame
    }

    /// An engraving has to leave some of the plate underneath.
    fn check_engraving(&self, levels: &[Level]) -> Result<(), MeshError> {
        if !self.invert {
            return Ok(());
        }
        match levels
            .iter()
            .filter(|l| !l.footprint.is_empty())
            .max_by(|a, b| a.height.total_cmp(&b.height))
        {
            Some(deepest) if deepest.height >= self.plate.thickness => {
                Err(MeshError::InvalidProfile(format!(
                    "engraving {} {}mm deep cuts through a {}mm plate",
                    deepest.name, deepest.height, self.plate.thickness
                )))
            }
            _ => Ok(()),
        }
    }

    fn assemble(&self, terraces: &[Terrace]) -> Result<Mesh, MeshError> {
        let mode = if self.invert && self.mode == RidgeMode::Separate {
            warn!("Engraved terraces can't be separate pieces; fusing them into the plate");
            RidgeMode::Fused
        } else {
            self.mode
        };
        let mesh = match mode {
            RidgeMode::Fused => fused_solid(&self.plate, terraces, self.invert)?,
            RidgeMode::Separate => {
                let mut mesh = fused_solid(&self.plate, &[], false)?;
                for terrace in terraces {
                    for region in &terrace.regions {
                        let top = self.plate.thickness + terrace.height;
                        match prism(region, self.plate.thickness, top) {
                            Ok(prism) => mesh.append(prism),
                            Err(err) => debug!("Skipping a piece {}mm tall: {}", terrace.height, err),
                        }
                    }
                }
                mesh
            }
        };
        mesh.validate()?;
        Ok(mesh)
    }

    fn road_levels(
        &self,
        segments: &[ClassifiedSegment],
        frame: &PlateFrame,
        warnings: &mut Vec<DegenerateGeometryWarning>,
    ) -> Vec<Level> {
        let inner = self.plate.inner_bounds();
        let mut levels = Vec::new();
        for category in Category::ALL {
            let ridge = self.profile.ridge(category);
            let lines: Vec<_> = segments
                .iter()
                .filter(|s| s.category == category)
                .filter_map(|s| s.geometry.transformed(|pt| frame.to_plate(pt)))
                .collect();
            if lines.is_empty() || ridge.height <= 0.0 {
                continue;
            }
            let skip = |reason: String| DegenerateGeometryWarning {
                layer: category.to_string(),
                num_shapes: lines.len(),
                reason,
            };
            if ridge.width <= MIN_RIDGE_WIDTH {
                warnings.push(skip(format!("ridge width {}mm is too thin", ridge.width)));
                continue;
            }

            let footprint = guarded("footprint", || {
                let mut pieces = Vec::new();
                for pl in &lines {
                    pieces.extend(self.kernel.offset(pl, ridge.width)?);
                }
                let merged = self.kernel.union(pieces)?;
                self.kernel.clip(&merged, &inner)
            });
            match footprint {
                Ok(footprint) => {
                    debug!(
                        "{} {} segments cover {} polygons",
                        lines.len(),
                        category,
                        footprint.len()
                    );
                    levels.push(Level {
                        name: category.to_string(),
                        height: ridge.height,
                        footprint,
                    });
                }
                Err(err) => warnings.push(skip(err.to_string())),
            }
        }
        levels
    }

    fn border_level(&self, warnings: &mut Vec<DegenerateGeometryWarning>) -> Option<Level> {
        let border = self.border?;
        let height = border.height.unwrap_or_else(|| self.profile.max_height());
        if height <= 0.0 {
            return None;
        }
        let bounds = self.plate.bounds();
        let inner = bounds.inset(border.width);
        if border.width <= MIN_RIDGE_WIDTH || inner.width() <= 0.0 || inner.height() <= 0.0 {
            warnings.push(DegenerateGeometryWarning {
                layer: "border".to_string(),
                num_shapes: 1,
                reason: format!(
                    "width {}mm doesn't fit a {}x{}mm plate",
                    border.width, self.plate.width, self.plate.depth
                ),
            });
            return None;
        }
        let outer = bounds.get_rectangle().into_rings().remove(0);
        let hole = inner.get_rectangle().into_rings().remove(0).reversed();
        Some(Level {
            name: "border".to_string(),
            height,
            footprint: vec![Polygon::with_holes(outer, vec![hole])],
        })
    }

    fn emboss_levels(
        &self,
        frame: Option<&PlateFrame>,
        warnings: &mut Vec<DegenerateGeometryWarning>,
    ) -> Vec<Level> {
        let bounds = self.plate.bounds();
        let mut levels = Vec::new();
        for (idx, shape) in self.emboss.iter().enumerate() {
            if shape.height <= 0.0 || shape.polygons.is_empty() {
                continue;
            }
            let name = format!("emboss {}", idx);
            let polygons: Vec<Polygon> = match (shape.placement, frame) {
                (Placement::Plate, _) => shape.polygons.clone(),
                (Placement::Map, Some(frame)) => shape
                    .polygons
                    .iter()
                    .filter_map(|p| p.transformed(|pt| frame.to_plate(pt)))
                    .collect(),
                (Placement::Map, None) => {
                    warnings.push(DegenerateGeometryWarning {
                        layer: name,
                        num_shapes: shape.polygons.len(),
                        reason: "nothing places the map on the plate".to_string(),
                    });
                    continue;
                }
            };
            let num_shapes = polygons.len();
            let footprint = guarded("emboss", || {
                let merged = self.kernel.union(polygons)?;
                self.kernel.clip(&merged, &bounds)
            });
            match footprint {
                Ok(footprint) => levels.push(Level {
                    name,
                    height: shape.height,
                    footprint,
                }),
                Err(err) => warnings.push(DegenerateGeometryWarning {
                    layer: name,
                    num_shapes,
                    reason: err.to_string(),
                }),
            }
        }
        levels
    }

    /// Tallest first, each level only keeps the area nothing taller already claimed.
    fn terrace(
        &self,
        mut levels: Vec<Level>,
        warnings: &mut Vec<DegenerateGeometryWarning>,
    ) -> Vec<Terrace> {
        levels.sort_by(|a, b| b.height.total_cmp(&a.height));
        let mut covered: Vec<Polygon> = Vec::new();
        let mut terraces = Vec::new();
        for level in levels {
            if level.footprint.is_empty() {
                continue;
            }
            let result = guarded("terrace", || {
                let regions = if covered.is_empty() {
                    level.footprint.clone()
                } else {
                    self.kernel.difference(&level.footprint, &covered)?
                };
                let mut all = covered.clone();
                all.extend(level.footprint.iter().cloned());
                Ok((regions, self.kernel.union(all)?))
            });
            match result {
                Ok((regions, now_covered)) => {
                    covered = now_covered;
                    if !regions.is_empty() {
                        terraces.push(Terrace {
                            height: level.height,
                            regions,
                        });
                    }
                }
                Err(err) => warnings.push(DegenerateGeometryWarning {
                    layer: level.name,
                    num_shapes: level.footprint.len(),
                    reason: err.to_string(),
                }),
            }
        }
        terraces
    }
}

fn segment_bounds(segments: &[ClassifiedSegment]) -> Option<Bounds> {
    let mut bounds = Bounds::new();
    for s in segments {
        bounds.union(s.geometry.get_bounds());
    }
    if bounds.is_empty() {
        None
    } else {
        Some(bounds)
    }
}

/// The plate with every terrace on top, or sunk into it, as one solid. Where terraces overlap
/// after rounding, the tallest wins.
fn fused_solid(plate: &PlateSpec, terraces: &[Terrace], invert: bool) -> Result<Mesh, MeshError> {
    let regions: Vec<(f64, &Polygon, Bounds)> = terraces
        .iter()
        .flat_map(|t| t.regions.iter().map(move |p| (t.height, p, p.get_bounds())))
        .collect();
    let polygons: Vec<&Polygon> = regions.iter().map(|(_, p, _)| *p).collect();
    let arrangement = Arrangement::new(&polygons, Some(&plate.bounds()))?;

    let tops: Vec<Option<f64>> = arrangement
        .faces()
        .iter()
        .map(|face| {
            let pt = face.interior_pt();
            let height = regions
                .iter()
                .find(|(_, p, bounds)| bounds.contains(pt) && p.contains_pt(pt))
                .map(|(height, _, _)| *height)
                .unwrap_or(0.0);
            Some(if invert {
                plate.thickness - height
            } else {
                plate.thickness + height
            })
        })
        .collect();
    arrangement.extrude(0.0, &tops)
}

/// A closed prism over the region, from `base` up to `top`.
fn prism(region: &Polygon, base: f64, top: f64) -> Result<Mesh, MeshError> {
    let arrangement = Arrangement::new(&[region], None)?;
    let tops: Vec<Option<f64>> = arrangement
        .faces()
        .iter()
        .map(|face| region.contains_pt(face.interior_pt()).then_some(top))
        .collect();
    arrangement.extrude(base, &tops)
}

#[cfg(test)]
mod tests {
    use geom::{PolyLine, Pt2D};

    use super::*;
    use crate::{KernelError, Ridge};

    fn plate() -> PlateSpec {
        PlateSpec {
            width: 100.0,
            depth: 100.0,
            thickness: 3.0,
            margin: 0.0,
        }
    }

    fn profile() -> ExtrusionProfile {
        ExtrusionProfile::uniform(Ridge {
            height: 1.0,
            width: 4.0,
        })
        .unwrap()
        .with_ridge(
            Category::Motorway,
            Ridge {
                height: 2.0,
                width: 6.0,
            },
        )
        .unwrap()
    }

    fn segment(category: Category, pts: Vec<(f64, f64)>) -> ClassifiedSegment {
        ClassifiedSegment {
            geometry: PolyLine::must_new(pts.into_iter().map(|(x, y)| Pt2D::new(x, y)).collect()),
            category,
        }
    }

    fn square() -> Bounds {
        Bounds::from_corners(Pt2D::new(0.0, 0.0), Pt2D::new(100.0, 100.0))
    }

    #[test]
    fn plate_alone() {
        let model = build_mesh(&[], &profile(), &plate()).unwrap();
        assert_eq!(model.mesh.num_vertices(), 8);
        assert_eq!(model.mesh.num_faces(), 12);
        assert!((model.mesh.volume() - 30_000.0).abs() < 1e-6);
        assert!(model.warnings.is_empty());
        assert!(model.frame.is_none());
    }

    #[test]
    fn one_road() {
        let segments = vec![segment(Category::Primary, vec![(20.0, 50.0), (80.0, 50.0)])];
        let model = ReliefBuilder::new(plate(), profile())
            .fit_to(square())
            .build(&segments, &mut Timer::throwaway())
            .unwrap();
        model.mesh.validate().unwrap();
        let (min, max) = model.mesh.bounds().unwrap();
        assert_eq!(min, [0.0, 0.0, 0.0]);
        assert_eq!(max[2], 4.0);
        // The plate, plus a 60x4 ridge with round ends, 1mm tall
        let ridge = model.mesh.volume() - 30_000.0;
        assert!(ridge > 240.0 && ridge < 240.0 + std::f64::consts::PI * 4.0);
    }

    #[test]
    fn crossing_categories() {
        let segments = vec![
            segment(Category::Motorway, vec![(10.0, 50.0), (90.0, 50.0)]),
            segment(Category::Residential, vec![(50.0, 10.0), (50.0, 90.0)]),
            segment(Category::Residential, vec![(30.0, 20.0), (30.0, 80.0), (70.0, 80.0)]),
        ];
        let model = ReliefBuilder::new(plate(), profile())
            .fit_to(square())
            .build(&segments, &mut Timer::throwaway())
            .unwrap();
        model.mesh.validate().unwrap();
        assert_eq!(model.mesh.num_solids(), 1);
        assert_eq!(model.mesh.bounds().unwrap().1[2], 5.0);
    }

    #[test]
    fn roads_past_the_edge() {
        // Ridges reach the plate edge and get clipped there
        let segments = vec![
            segment(Category::Secondary, vec![(-10.0, 30.0), (110.0, 30.0)]),
            segment(Category::Motorway, vec![(0.0, 0.0), (100.0, 100.0)]),
        ];
        let model = ReliefBuilder::new(plate(), profile())
            .fit_to(square())
            .build(&segments, &mut Timer::throwaway())
            .unwrap();
        model.mesh.validate().unwrap();
        let (min, max) = model.mesh.bounds().unwrap();
        assert_eq!((min[0], min[1], max[0], max[1]), (0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn border_frame() {
        let segments = vec![segment(Category::Service, vec![(0.0, 50.0), (100.0, 50.0)])];
        let model = ReliefBuilder::new(plate(), profile())
            .fit_to(square())
            .border(Some(Border {
                width: 5.0,
                height: None,
            }))
            .build(&segments, &mut Timer::throwaway())
            .unwrap();
        model.mesh.validate().unwrap();
        // The frame takes the tallest ridge height
        assert_eq!(model.mesh.bounds().unwrap().1[2], 5.0);
        assert!(model.mesh.volume() > 30_000.0 + 2.0 * (400.0 - 100.0));
    }

    #[test]
    fn emboss_in_plate_frame() {
        let label =
            Bounds::from_corners(Pt2D::new(40.0, 5.0), Pt2D::new(60.0, 15.0)).get_rectangle();
        let model = ReliefBuilder::new(plate(), profile())
            .emboss(EmbossShape {
                polygons: vec![label],
                height: 0.5,
                placement: Placement::Plate,
            })
            .build(&[], &mut Timer::throwaway())
            .unwrap();
        model.mesh.validate().unwrap();
        assert!((model.mesh.volume() - 30_100.0).abs() < 1e-6);
    }

    #[test]
    fn separate_prisms() {
        let segments = vec![
            segment(Category::Motorway, vec![(10.0, 50.0), (90.0, 50.0)]),
            segment(Category::Tertiary, vec![(50.0, 10.0), (50.0, 90.0)]),
        ];
        let model = ReliefBuilder::new(plate(), profile())
            .fit_to(square())
            .mode(RidgeMode::Separate)
            .build(&segments, &mut Timer::throwaway())
            .unwrap();
        // The plate, the motorway, and the two halves of the tertiary road it cuts
        assert_eq!(model.mesh.num_solids(), 4);
        model.mesh.validate().unwrap();
    }

    #[test]
    fn zero_width_is_skipped() {
        let profile = profile()
            .with_ridge(
                Category::Service,
                Ridge {
                    height: 1.0,
                    width: 0.0,
                },
            )
            .unwrap();
        let segments = vec![
            segment(Category::Service, vec![(10.0, 10.0), (90.0, 90.0)]),
            segment(Category::Primary, vec![(10.0, 90.0), (90.0, 10.0)]),
        ];
        let model = ReliefBuilder::new(plate(), profile)
            .fit_to(square())
            .build(&segments, &mut Timer::throwaway())
            .unwrap();
        model.mesh.validate().unwrap();
        assert_eq!(model.warnings.len(), 1);
        assert_eq!(model.warnings[0].layer, "service");
    }

    /// Delegates to the real kernel, except offsetting fails in one of two ways for one width
    struct FlakyKernel {
        width: f64,
        panic: bool,
    }

    impl FootprintKernel for FlakyKernel {
        fn offset(&self, pl: &PolyLine, width: f64) -> Result<Vec<Polygon>, KernelError> {
            if width == self.width {
                if self.panic {
                    panic!("kernel exploded");
                }
                return Err(KernelError("numerical trouble".to_string()));
            }
            GeoKernel.offset(pl, width)
        }

        fn union(&self, polygons: Vec<Polygon>) -> Result<Vec<Polygon>, KernelError> {
            GeoKernel.union(polygons)
        }

        fn difference(&self, a: &[Polygon], b: &[Polygon]) -> Result<Vec<Polygon>, KernelError> {
            GeoKernel.difference(a, b)
        }

        fn clip(&self, polygons: &[Polygon], bounds: &Bounds) -> Result<Vec<Polygon>, KernelError> {
            GeoKernel.clip(polygons, bounds)
        }
    }

    #[test]
    fn failing_kernel_skips_category() {
        let segments = vec![
            segment(Category::Motorway, vec![(10.0, 50.0), (90.0, 50.0)]),
            segment(Category::Residential, vec![(50.0, 10.0), (50.0, 90.0)]),
        ];
        for panic in [false, true] {
            let kernel = FlakyKernel { width: 6.0, panic };
            let model = ReliefBuilder::new(plate(), profile())
                .fit_to(square())
                .kernel(&kernel)
                .build(&segments, &mut Timer::throwaway())
                .unwrap();
            model.mesh.validate().unwrap();
            assert_eq!(model.warnings.len(), 1);
            assert_eq!(model.warnings[0].layer, "motorway");
            // Only the residential ridge is left
            assert_eq!(model.mesh.bounds().unwrap().1[2], 4.0);
        }
    }

    #[test]
    fn straight_road_fills_the_plate() {
        // Everything is on one line, so the segments' bounds have no height
        let segments = vec![segment(Category::Motorway, vec![(0.0, 500.0), (1000.0, 500.0)])];
        let model = build_mesh(&segments, &profile(), &plate()).unwrap();
        model.mesh.validate().unwrap();
        assert!(model.warnings.is_empty(), "{:?}", model.warnings);
        assert!(model.frame.is_some());
        let (min, max) = model.mesh.bounds().unwrap();
        assert_eq!((min[0], max[0], max[2]), (0.0, 100.0, 5.0));
        // 94mm of 6mm wide ridge, 2mm tall, plus the round ends
        let ridge = model.mesh.volume() - 30_000.0;
        assert!(ridge > 94.0 * 6.0 * 2.0, "{}", ridge);
    }

    #[test]
    fn engraved_roads() {
        let segments = vec![
            segment(Category::Motorway, vec![(10.0, 50.0), (90.0, 50.0)]),
            segment(Category::Residential, vec![(50.0, 10.0), (50.0, 90.0)]),
        ];
        let raised = ReliefBuilder::new(plate(), profile())
            .fit_to(square())
            .build(&segments, &mut Timer::throwaway())
            .unwrap();
        let gained = raised.mesh.volume() - 30_000.0;

        // Separate pieces can't be sunk into the plate, so both modes fuse
        for mode in [RidgeMode::Fused, RidgeMode::Separate] {
            let model = ReliefBuilder::new(plate(), profile())
                .fit_to(square())
                .mode(mode)
                .invert(true)
                .build(&segments, &mut Timer::throwaway())
                .unwrap();
            model.mesh.validate().unwrap();
            assert_eq!(model.mesh.num_solids(), 1);
            let (min, max) = model.mesh.bounds().unwrap();
            assert_eq!((min[2], max[2]), (0.0, 3.0));
            let lost = 30_000.0 - model.mesh.volume();
            assert!((lost - gained).abs() < 1e-6, "{} vs {}", lost, gained);
        }
    }

    #[test]
    fn engraving_through_the_plate() {
        let mut thin = plate();
        thin.thickness = 1.5;
        let segments = vec![segment(Category::Motorway, vec![(10.0, 50.0), (90.0, 50.0)])];
        let result = ReliefBuilder::new(thin, profile())
            .fit_to(square())
            .invert(true)
            .build(&segments, &mut Timer::throwaway());
        assert!(matches!(result, Err(MeshError::InvalidProfile(_))));

        // Raising is fine on a thin plate
        ReliefBuilder::new(thin, profile())
            .fit_to(square())
            .build(&segments, &mut Timer::throwaway())
            .unwrap();
    }

    #[test]
    fn invalid_plate() {
        let mut bad = plate();
        bad.depth = -1.0;
        assert!(matches!(
            build_mesh(&[], &profile(), &bad),
            Err(MeshError::InvalidPlate(_))
        ));
    }
}
