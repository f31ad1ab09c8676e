//! End-to-end orchestration: classify raw roads once, then style and render posters or extrude a
//! relief from that same snapshot. Batch mode renders many themes in parallel.

#[macro_use]
extern crate log;

mod batch;

use std::sync::Arc;

use anyhow::{Context, Result};

use geom::Polygon;
use poster::{render, CanvasSpec, OutputFormat, Poster, PosterText, RenderedImage, Theme};
use posterutil::Timer;
use relief::{EmbossShape, Placement, ReliefBuilder, ReliefModel, ReliefSettings};
use road_network::{
    classify_all, Area, AreaKind, CategoryCounts, ClassifiedSegment, Region, RoadSegment,
};

pub use crate::batch::{render_all_themes, ThemeOutput};

/// Everything downstream reads: classified roads and areas in one planar frame, plus the part of
/// the map to show. Cheap to clone and share across threads.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub segments: Arc<[ClassifiedSegment]>,
    pub areas: Arc<[Area]>,
    pub region: Region,
    pub counts: CategoryCounts,
}

impl Snapshot {
    pub fn new(
        raw: Vec<RoadSegment>,
        areas: Vec<Area>,
        region: Region,
        timer: &mut Timer,
    ) -> Snapshot {
        timer.start("classify road segments");
        let segments = classify_all(raw);
        let counts = CategoryCounts::new(&segments);
        timer.stop("classify road segments");
        info!("{}", counts);
        if !areas.is_empty() {
            info!("Plus {} water and park areas", areas.len());
        }

        Snapshot {
            segments: segments.into(),
            areas: areas.into(),
            region,
            counts,
        }
    }
}

/// How to draw a poster, independent of the theme.
#[derive(Clone, Debug, PartialEq)]
pub struct PosterOptions {
    pub canvas: CanvasSpec,
    pub format: OutputFormat,
    /// Title, country and coordinates; None leaves just the map
    pub text: Option<PosterText>,
}

/// Styles the snapshot with one theme and draws it.
pub fn render_poster(
    snapshot: &Snapshot,
    theme: &Theme,
    opts: &PosterOptions,
) -> Result<RenderedImage> {
    let mut poster = Poster::from_theme(
        theme,
        &snapshot.segments,
        &snapshot.areas,
        snapshot.region,
    );
    if let Some(ref text) = opts.text {
        poster = poster.with_text(text, theme, &opts.canvas);
    }
    render(&poster, &opts.canvas, opts.format).with_context(|| {
        format!(
            "rendering {} as {} with theme {}",
            snapshot.counts, opts.format, theme.key
        )
    })
}

/// Extrudes the snapshot onto a plate. The region is cropped to the plate's aspect ratio, the same
/// way a poster crops it to the canvas. Parks become low plateaus, unless `park_height` is 0.
pub fn build_relief(
    snapshot: &Snapshot,
    settings: &ReliefSettings,
    timer: &mut Timer,
) -> Result<ReliefModel> {
    let plate = settings.plate();
    let profile = settings.profile().context("building the extrusion profile")?;
    let window = snapshot.region.window(plate.width / plate.depth);

    let mut builder = ReliefBuilder::new(plate, profile)
        .mode(settings.ridge_mode)
        .border(settings.border())
        .invert(settings.invert)
        .fit_to(window);
    let parks: Vec<Polygon> = snapshot
        .areas
        .iter()
        .filter(|a| a.kind == AreaKind::Park)
        .map(|a| a.polygon.clone())
        .collect();
    if !parks.is_empty() && settings.park_height_mm() > 0.0 {
        builder = builder.emboss(EmbossShape {
            polygons: parks,
            height: settings.park_height_mm(),
            placement: Placement::Map,
        });
    }

    let model = builder
        .build(&snapshot.segments, timer)
        .with_context(|| format!("extruding {}", snapshot.counts))?;
    for warning in &model.warnings {
        warn!("Left flat: {}", warning);
    }
    Ok(model)
}
