use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use geom::{PolyLine, Pt2D};
use poster::{
    render, style, validate, CanvasSpec, OutputFormat, Poster, ThemeError, ThemeRegistry,
};
use road_network::{Category, ClassifiedSegment, Region};

fn random_segments(rng: &mut XorShiftRng, count: usize) -> Vec<ClassifiedSegment> {
    (0..count)
        .map(|_| {
            let start = Pt2D::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
            let end = start.offset(rng.gen_range(1.0..50.0), rng.gen_range(1.0..50.0));
            ClassifiedSegment {
                geometry: PolyLine::must_new(vec![start, end]),
                category: Category::ALL[rng.gen_range(0..Category::ALL.len())],
            }
        })
        .collect()
}

#[test]
fn every_builtin_is_complete() {
    let registry = ThemeRegistry::with_builtins().unwrap();
    assert!(registry.list_names().len() >= 8);
    for theme in registry.all() {
        validate(&theme.to_def()).unwrap();
        assert!(!theme.display_name.is_empty(), "{}", theme.key);
    }
}

#[test]
fn dropping_a_category_is_caught() {
    let registry = ThemeRegistry::with_builtins().unwrap();
    let mut def = registry.get("noir").unwrap().to_def();
    def.roads.remove("path_or_track");
    assert_eq!(
        validate(&def),
        Err(ThemeError::IncompleteTheme {
            theme: def.name.clone(),
            missing: vec!["path_or_track".to_string()],
        })
    );
}

#[test]
fn random_networks_style_in_order() {
    let registry = ThemeRegistry::with_builtins().unwrap();
    let mut rng = XorShiftRng::seed_from_u64(42);
    for _ in 0..20 {
        let count = rng.gen_range(0..30);
        let segments = random_segments(&mut rng, count);
        for theme in registry.all() {
            let layers = style(&segments, theme);
            assert!(layers
                .windows(2)
                .all(|pair| pair[0].style.z_order <= pair[1].style.z_order));
            assert!(layers.iter().all(|l| !l.geometry.is_empty()));
            let drawn: usize = layers.iter().map(|l| l.geometry.len()).sum();
            assert_eq!(drawn, segments.len());
        }
    }
}

#[test]
fn every_theme_renders_identically_twice() {
    let registry = ThemeRegistry::with_builtins().unwrap();
    let segments = random_segments(&mut XorShiftRng::seed_from_u64(7), 25);
    let region = Region {
        center: Pt2D::new(0.0, 0.0),
        radius: 120.0,
    };
    let canvas = CanvasSpec::from_inches(1.0, 1.5, 40.0);
    for theme in registry.all() {
        let poster = Poster::from_theme(theme, &segments, &[], region);
        for format in [OutputFormat::Svg, OutputFormat::Png] {
            let first = render(&poster, &canvas, format).unwrap();
            let second = render(&poster, &canvas, format).unwrap();
            assert_eq!(first, second, "{} as {}", theme.key, format);
            assert_eq!(first.mime(), format.mime());
        }
    }
}
