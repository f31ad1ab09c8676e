use anyhow::{bail, Context, Result};
use geojson::{GeoJson, Value};

use geom::{LonLat, PolyLine, Polygon, Ring};
use posterutil::Tags;
use road_network::{Area, AreaKind, RoadSegment};

/// Features straight from a GeoJSON file, still in longitude and latitude.
#[derive(Debug, Default)]
pub struct RawInput {
    pub roads: Vec<(Vec<LonLat>, Tags)>,
    /// Outer ring first, then holes
    pub areas: Vec<(Vec<Vec<LonLat>>, Tags)>,
}

pub fn read_geojson(path: &str) -> Result<RawInput> {
    let raw = fs_err::read_to_string(path)?;
    let input = parse_geojson(&raw).with_context(|| format!("parsing {}", path))?;
    info!(
        "Read {} lines and {} polygons from {}",
        input.roads.len(),
        input.areas.len(),
        path
    );
    Ok(input)
}

/// LineStrings become roads and Polygons become areas. Properties become tags; list values keep
/// every entry. Other geometry is ignored.
pub fn parse_geojson(raw: &str) -> Result<RawInput> {
    let features = match raw.parse::<GeoJson>()? {
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Geometry(_) => {
            bail!("expected a Feature or FeatureCollection, not a bare geometry")
        }
    };

    let mut input = RawInput::default();
    let mut skipped = 0;
    for feature in features {
        let mut tags = Tags::empty();
        for (key, value) in feature.properties_iter() {
            match value {
                serde_json::Value::String(s) => tags.insert(key, s.as_str()),
                serde_json::Value::Array(list) => tags.insert_list(
                    key,
                    list.iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string()))
                        .collect(),
                ),
                serde_json::Value::Number(n) => tags.insert(key, n.to_string()),
                serde_json::Value::Bool(b) => tags.insert(key, if *b { "yes" } else { "no" }),
                serde_json::Value::Null | serde_json::Value::Object(_) => {}
            }
        }

        let geometry = match feature.geometry {
            Some(g) => g,
            None => {
                skipped += 1;
                continue;
            }
        };
        match geometry.value {
            Value::LineString(pts) => input.roads.push((to_lonlat(&pts), tags)),
            Value::MultiLineString(lines) => {
                for pts in lines {
                    input.roads.push((to_lonlat(&pts), tags.clone()));
                }
            }
            Value::Polygon(rings) => input
                .areas
                .push((rings.iter().map(|r| to_lonlat(r)).collect(), tags)),
            Value::MultiPolygon(polygons) => {
                for rings in polygons {
                    input
                        .areas
                        .push((rings.iter().map(|r| to_lonlat(r)).collect(), tags.clone()));
                }
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("Ignored {} features without line or polygon geometry", skipped);
    }
    Ok(input)
}

fn to_lonlat(pts: &[Vec<f64>]) -> Vec<LonLat> {
    pts.iter()
        .filter(|pt| pt.len() >= 2)
        .map(|pt| LonLat::new(pt[0], pt[1]))
        .collect()
}

impl RawInput {
    /// The middle of everything's longitude and latitude extent.
    pub fn center(&self) -> Option<LonLat> {
        let mut pts = self
            .roads
            .iter()
            .flat_map(|(pts, _)| pts.iter())
            .chain(self.areas.iter().flat_map(|(rings, _)| rings.iter().flatten()));
        let first = *pts.next()?;
        let (mut min_lon, mut max_lon) = (first.x(), first.x());
        let (mut min_lat, mut max_lat) = (first.y(), first.y());
        for pt in pts {
            min_lon = min_lon.min(pt.x());
            max_lon = max_lon.max(pt.x());
            min_lat = min_lat.min(pt.y());
            max_lat = max_lat.max(pt.y());
        }
        Some(LonLat::new((min_lon + max_lon) / 2.0, (min_lat + max_lat) / 2.0))
    }

    /// Projects everything into meters around `origin`. Lines that collapse are dropped, as are
    /// polygons that aren't water or parks.
    pub fn project(self, origin: LonLat) -> (Vec<RoadSegment>, Vec<Area>) {
        let mut roads = Vec::new();
        let mut bad_roads = 0;
        for (pts, tags) in self.roads {
            match PolyLine::new(pts.into_iter().map(|pt| pt.to_pt(origin)).collect()) {
                Ok(pl) => roads.push(RoadSegment::new(pl, tags)),
                Err(_) => bad_roads += 1,
            }
        }
        if bad_roads > 0 {
            warn!("Skipped {} degenerate road lines", bad_roads);
        }

        let mut areas = Vec::new();
        for (rings, tags) in self.areas {
            let kind = match AreaKind::from_tags(&tags) {
                Some(kind) => kind,
                None => continue,
            };
            let rings: Vec<Ring> = rings
                .into_iter()
                .filter_map(|ring| {
                    Ring::deduped(ring.into_iter().map(|pt| pt.to_pt(origin)).collect())
                })
                .collect();
            if let Ok(polygon) = Polygon::from_rings(rings) {
                areas.push(Area { kind, polygon });
            }
        }
        (roads, areas)
    }
}

/// Understands `40.7128`, `-74.0060`, `40.7128N`, `74.0060W` and `40.7128°N`. S and W make the
/// value negative.
pub fn parse_coordinate(raw: &str) -> Result<f64> {
    let upper = raw.trim().to_uppercase();
    let southwest = upper.contains('S') || upper.contains('W');
    let cleaned: String = upper
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        bail!("couldn't parse coordinate {}", raw);
    }
    let value: f64 = cleaned
        .parse()
        .with_context(|| format!("couldn't parse coordinate {}", raw))?;
    if southwest && value > 0.0 {
        Ok(-value)
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"highway": "primary", "lanes": 2},
                "geometry": {"type": "LineString", "coordinates": [[2.35, 48.85], [2.36, 48.86]]}
            },
            {
                "type": "Feature",
                "properties": {"highway": ["residential", "unclassified"]},
                "geometry": {"type": "MultiLineString", "coordinates": [
                    [[2.34, 48.85], [2.34, 48.86]],
                    [[2.33, 48.85], [2.33, 48.86]]
                ]}
            },
            {
                "type": "Feature",
                "properties": {"leisure": "park"},
                "geometry": {"type": "Polygon", "coordinates": [
                    [[2.35, 48.85], [2.351, 48.85], [2.351, 48.851], [2.35, 48.851], [2.35, 48.85]]
                ]}
            },
            {
                "type": "Feature",
                "properties": {"building": "yes"},
                "geometry": {"type": "Polygon", "coordinates": [
                    [[2.35, 48.85], [2.351, 48.85], [2.351, 48.851], [2.35, 48.85]]
                ]}
            },
            {
                "type": "Feature",
                "properties": {"name": "a bench"},
                "geometry": {"type": "Point", "coordinates": [2.35, 48.85]}
            }
        ]
    }"#;

    #[test]
    fn reads_features() {
        let input = parse_geojson(SAMPLE).unwrap();
        assert_eq!(input.roads.len(), 3);
        assert_eq!(input.areas.len(), 2);
        assert!(input.roads[0].1.is("highway", "primary"));
        assert!(input.roads[0].1.is("lanes", "2"));
        assert!(input.roads[1].1.is_any("highway", &["unclassified"]));

        let center = input.center().unwrap();
        assert!((center.x() - 2.345).abs() < 1e-9);
        assert!((center.y() - 48.855).abs() < 1e-9);

        let (roads, areas) = input.project(center);
        assert_eq!(roads.len(), 3);
        // The building isn't drawn
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].kind, AreaKind::Park);
    }

    #[test]
    fn bare_geometry_is_an_error() {
        assert!(parse_geojson(r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#).is_err());
        assert!(parse_geojson("not json").is_err());
    }

    #[test]
    fn coordinates() {
        assert_eq!(parse_coordinate("40.7128").unwrap(), 40.7128);
        assert_eq!(parse_coordinate("-74.0060").unwrap(), -74.006);
        assert_eq!(parse_coordinate("40.7128N").unwrap(), 40.7128);
        assert_eq!(parse_coordinate("74.0060W").unwrap(), -74.006);
        assert_eq!(parse_coordinate(" 33.8688°s ").unwrap(), -33.8688);
        assert!(parse_coordinate("north").is_err());
        assert!(parse_coordinate("").is_err());
    }
}
