use std::cmp::Reverse;
use std::collections::BTreeMap;

use geom::{PolyLine, Polygon};
use road_network::{Area, AreaKind, Category, ClassifiedSegment};

use crate::{Color, StyleAttrs, Theme};

/// Every segment of one category, drawn the same way. Geometry is borrowed from the classified
/// snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer<'a> {
    pub category: Category,
    pub style: StyleAttrs,
    pub geometry: Vec<&'a PolyLine>,
}

/// Groups segments by category and orders the groups for drawing: ascending z_order, and for
/// ties, lower-priority categories first so more important roads land on top. Categories without
/// segments produce no layer.
pub fn style<'a>(segments: &'a [ClassifiedSegment], theme: &Theme) -> Vec<Layer<'a>> {
    let mut groups: BTreeMap<Category, Vec<&'a PolyLine>> = BTreeMap::new();
    for seg in segments {
        groups.entry(seg.category).or_default().push(&seg.geometry);
    }

    let mut layers: Vec<Layer<'a>> = groups
        .into_iter()
        .map(|(category, geometry)| Layer {
            category,
            style: theme.style(category).clone(),
            geometry,
        })
        .collect();
    layers.sort_by_key(|l| (l.style.z_order, Reverse(l.category)));
    layers
}

/// Filled areas under the roads.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaLayer<'a> {
    pub kind: AreaKind,
    pub color: Color,
    pub polygons: Vec<&'a Polygon>,
}

/// Water first, then parks. A kind is skipped if the theme has no color for it or there's nothing
/// to draw.
pub fn style_areas<'a>(areas: &'a [Area], theme: &Theme) -> Vec<AreaLayer<'a>> {
    let mut result = Vec::new();
    for (kind, color) in [(AreaKind::Water, theme.water), (AreaKind::Park, theme.parks)] {
        let color = match color {
            Some(c) => c,
            None => continue,
        };
        let polygons: Vec<&'a Polygon> = areas
            .iter()
            .filter(|a| a.kind == kind)
            .map(|a| &a.polygon)
            .collect();
        if !polygons.is_empty() {
            result.push(AreaLayer {
                kind,
                color,
                polygons,
            });
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use geom::{Bounds, Pt2D};

    use super::*;
    use crate::theme::tests::complete_def;
    use crate::ThemeRegistry;

    fn seg(category: Category) -> ClassifiedSegment {
        ClassifiedSegment {
            geometry: PolyLine::must_new(vec![Pt2D::new(0.0, 0.0), Pt2D::new(1.0, 1.0)]),
            category,
        }
    }

    #[test]
    fn ordered_and_nonempty() {
        let theme = ThemeRegistry::with_builtins().unwrap().get("terracotta").unwrap();
        let segments = vec![
            seg(Category::Motorway),
            seg(Category::Residential),
            seg(Category::Residential),
            seg(Category::PathOrTrack),
        ];
        let layers = style(&segments, &theme);
        assert_eq!(
            layers.iter().map(|l| l.category).collect::<Vec<_>>(),
            vec![Category::PathOrTrack, Category::Residential, Category::Motorway]
        );
        assert!(layers.windows(2).all(|pair| pair[0].style.z_order <= pair[1].style.z_order));
        assert!(layers.iter().all(|l| !l.geometry.is_empty()));
        assert_eq!(layers[1].geometry.len(), 2);

        // Idempotent
        assert_eq!(style(&segments, &theme), layers);
        assert!(style(&[], &theme).is_empty());
    }

    #[test]
    fn ties_put_higher_categories_on_top() {
        let mut def = complete_def();
        for attrs in def.roads.values_mut() {
            attrs.z_order = 0;
        }
        let theme = Theme::from_def("flat", def).unwrap();
        let segments = vec![seg(Category::Primary), seg(Category::Service), seg(Category::Trunk)];
        let layers = style(&segments, &theme);
        assert_eq!(
            layers.iter().map(|l| l.category).collect::<Vec<_>>(),
            vec![Category::Service, Category::Primary, Category::Trunk]
        );
    }

    #[test]
    fn areas() {
        let theme = ThemeRegistry::with_builtins().unwrap().get("terracotta").unwrap();
        let square =
            Bounds::from_corners(Pt2D::new(0.0, 0.0), Pt2D::new(1.0, 1.0)).get_rectangle();
        let areas = vec![
            Area {
                kind: AreaKind::Park,
                polygon: square.clone(),
            },
            Area {
                kind: AreaKind::Water,
                polygon: square,
            },
        ];
        let layers = style_areas(&areas, &theme);
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].kind, AreaKind::Water);
        assert_eq!(layers[1].kind, AreaKind::Park);

        let mut def = theme.to_def();
        def.parks = None;
        let no_parks = Theme::from_def("no_parks", def).unwrap();
        assert_eq!(style_areas(&areas, &no_parks).len(), 1);
    }
}
