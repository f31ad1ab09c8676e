use std::collections::BTreeMap;
use std::fmt;

use posterutil::{prettyprint_usize, Tags};

use crate::{osm, Category, ClassifiedSegment, RoadSegment};

/// "highway is one of these values"
struct Rule {
    category: Category,
    key: &'static str,
    values: &'static [&'static str],
}

impl Rule {
    fn matches(&self, tags: &Tags) -> bool {
        tags.is_any(self.key, self.values)
    }
}

// Checked in order; the first match wins. Anything left over is unclassified.
const RULES: &[Rule] = &[
    Rule {
        category: Category::Motorway,
        key: osm::HIGHWAY,
        values: &["motorway", "motorway_link"],
    },
    Rule {
        category: Category::Trunk,
        key: osm::HIGHWAY,
        values: &["trunk", "trunk_link"],
    },
    Rule {
        category: Category::Primary,
        key: osm::HIGHWAY,
        values: &["primary", "primary_link"],
    },
    Rule {
        category: Category::Secondary,
        key: osm::HIGHWAY,
        values: &["secondary", "secondary_link"],
    },
    Rule {
        category: Category::Tertiary,
        key: osm::HIGHWAY,
        values: &["tertiary", "tertiary_link"],
    },
    Rule {
        category: Category::Residential,
        key: osm::HIGHWAY,
        values: &["residential", "living_street", "unclassified", "road"],
    },
    Rule {
        category: Category::Service,
        key: osm::HIGHWAY,
        values: &["service", "services", "rest_area", "busway"],
    },
    Rule {
        category: Category::PathOrTrack,
        key: osm::HIGHWAY,
        values: &[
            "track",
            "path",
            "footway",
            "cycleway",
            "bridleway",
            "steps",
            "pedestrian",
            "corridor",
            "via_ferrata",
        ],
    },
];

/// Total and deterministic. When several values are present (`primary;residential`), the highest
/// matching category wins, because the rules are checked from the top.
pub fn classify(tags: &Tags) -> Category {
    RULES
        .iter()
        .find(|rule| rule.matches(tags))
        .map(|rule| rule.category)
        .unwrap_or(Category::Unclassified)
}

pub fn classify_all(segments: Vec<RoadSegment>) -> Vec<ClassifiedSegment> {
    let result: Vec<ClassifiedSegment> = segments
        .into_iter()
        .map(|seg| ClassifiedSegment {
            category: classify(&seg.tags),
            geometry: seg.geometry,
        })
        .collect();
    debug!("{}", CategoryCounts::new(&result));
    result
}

/// How many segments landed in each category.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryCounts(BTreeMap<Category, usize>);

impl CategoryCounts {
    pub fn new(segments: &[ClassifiedSegment]) -> CategoryCounts {
        let mut counts = BTreeMap::new();
        for seg in segments {
            *counts.entry(seg.category).or_insert(0) += 1;
        }
        CategoryCounts(counts)
    }

    pub fn get(&self, category: Category) -> usize {
        self.0.get(&category).cloned().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

impl fmt::Display for CategoryCounts {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} road segments", prettyprint_usize(self.total()))?;
        if self.0.is_empty() {
            return Ok(());
        }
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(category, count)| format!("{} {}", prettyprint_usize(*count), category))
            .collect();
        write!(f, ": {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    use geom::{PolyLine, Pt2D};

    use super::*;

    fn tags(pairs: Vec<(&str, &str)>) -> Tags {
        pairs.into_iter().collect()
    }

    #[test]
    fn basic_categories() {
        assert_eq!(classify(&tags(vec![("highway", "motorway")])), Category::Motorway);
        assert_eq!(classify(&tags(vec![("highway", "trunk_link")])), Category::Trunk);
        assert_eq!(classify(&tags(vec![("highway", "living_street")])), Category::Residential);
        assert_eq!(classify(&tags(vec![("highway", "footway")])), Category::PathOrTrack);
        assert_eq!(classify(&tags(vec![("highway", "service")])), Category::Service);
        assert_eq!(classify(&tags(vec![("highway", "construction")])), Category::Unclassified);
        assert_eq!(classify(&Tags::empty()), Category::Unclassified);
        assert_eq!(classify(&tags(vec![("name", "Main St")])), Category::Unclassified);
    }

    #[test]
    fn multi_valued() {
        let mut t = Tags::empty();
        t.insert_list(
            "highway",
            vec!["residential".to_string(), "unclassified".to_string()],
        );
        assert_eq!(classify(&t), Category::Residential);

        // The highest category present wins, regardless of the order of values
        assert_eq!(
            classify(&tags(vec![("highway", "footway;primary")])),
            Category::Primary
        );
    }

    #[test]
    fn normalizes_values() {
        assert_eq!(classify(&tags(vec![("highway", " Motorway ")])), Category::Motorway);
        assert_eq!(classify(&tags(vec![("highway", "")])), Category::Unclassified);
        assert_eq!(classify(&tags(vec![("highway", ";;")])), Category::Unclassified);
    }

    #[test]
    fn total_and_deterministic() {
        let keys = ["highway", "name", "surface", "HIGHWAY"];
        let values = [
            "motorway",
            "primary_link",
            "residential",
            "track",
            "busway",
            "proposed",
            "",
            "Secondary",
            "tertiary;steps",
            "x;y;z",
        ];
        let mut rng = XorShiftRng::seed_from_u64(42);
        for _ in 0..1000 {
            let mut t = Tags::empty();
            for _ in 0..rng.gen_range(0..4) {
                let k = keys[rng.gen_range(0..keys.len())];
                let v = values[rng.gen_range(0..values.len())];
                t.insert(k, v);
            }
            let first = classify(&t);
            assert!(Category::ALL.contains(&first));
            assert_eq!(classify(&t.clone()), first);
        }
    }

    #[test]
    fn counts() {
        let pl = PolyLine::must_new(vec![Pt2D::new(0.0, 0.0), Pt2D::new(1.0, 0.0)]);
        let segments = classify_all(vec![
            RoadSegment::new(pl.clone(), tags(vec![("highway", "primary")])),
            RoadSegment::new(pl.clone(), tags(vec![("highway", "primary")])),
            RoadSegment::new(pl, Tags::empty()),
        ]);
        let counts = CategoryCounts::new(&segments);
        assert_eq!(counts.get(Category::Primary), 2);
        assert_eq!(counts.get(Category::Unclassified), 1);
        assert_eq!(counts.get(Category::Motorway), 0);
        assert_eq!(counts.total(), 3);
        assert_eq!(
            counts.to_string(),
            "3 road segments: 2 primary, 1 unclassified"
        );
        assert_eq!(CategoryCounts::new(&[]).to_string(), "0 road segments");
    }
}
