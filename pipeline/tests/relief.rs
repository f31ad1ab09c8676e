use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use geom::{PolyLine, Pt2D};
use pipeline::{build_relief, Snapshot};
use posterutil::{Tags, Timer};
use relief::ReliefSettings;
use road_network::{Region, RoadSegment};

const HIGHWAYS: &[&str] = &[
    "motorway",
    "primary",
    "secondary",
    "tertiary",
    "residential",
    "service",
    "footway",
];

/// Roads reaching well past the region, so most of them get clipped.
fn sprawl(seed: u64) -> Snapshot {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    let mut raw = Vec::new();
    while raw.len() < 120 {
        let pts: Vec<Pt2D> = (0..rng.gen_range(2..5))
            .map(|_| Pt2D::new(rng.gen_range(-800.0..800.0), rng.gen_range(-800.0..800.0)))
            .collect();
        if let Ok(geometry) = PolyLine::new(pts) {
            let mut tags = Tags::empty();
            tags.insert("highway", HIGHWAYS[rng.gen_range(0..HIGHWAYS.len())]);
            raw.push(RoadSegment::new(geometry, tags));
        }
    }
    let region = Region {
        center: Pt2D::new(0.0, 0.0),
        radius: 500.0,
    };
    Snapshot::new(raw, Vec::new(), region, &mut Timer::throwaway())
}

#[test]
fn clipped_sprawl_is_printable() {
    let settings = ReliefSettings::default();
    for seed in 0..10 {
        let model = build_relief(&sprawl(seed), &settings, &mut Timer::throwaway())
            .unwrap_or_else(|err| panic!("seed {}: {:#}", seed, err));
        if let Err(err) = model.mesh.validate() {
            panic!("seed {}: {}", seed, err);
        }
        assert_eq!(model.mesh.num_solids(), 1, "seed {}", seed);
        let plate_volume = settings.width_mm * settings.height_mm * settings.base_thickness;
        assert!(model.mesh.volume() > plate_volume, "seed {}", seed);
    }
}

#[test]
fn one_straight_road_is_kept() {
    let mut tags = Tags::empty();
    tags.insert("highway", "primary");
    let road = RoadSegment::new(
        PolyLine::must_new(vec![Pt2D::new(-300.0, 0.0), Pt2D::new(300.0, 0.0)]),
        tags,
    );
    let region = Region {
        center: Pt2D::new(0.0, 0.0),
        radius: 500.0,
    };
    let snapshot = Snapshot::new(vec![road], Vec::new(), region, &mut Timer::throwaway());
    let settings = ReliefSettings {
        add_border: false,
        ..Default::default()
    };
    let model = build_relief(&snapshot, &settings, &mut Timer::throwaway()).unwrap();
    model.mesh.validate().unwrap();
    assert!(model.frame.is_some());
    let (_, max) = model.mesh.bounds().unwrap();
    assert!(max[2] > settings.base_thickness);
}
