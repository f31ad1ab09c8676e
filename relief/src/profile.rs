use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use road_network::Category;

use crate::{Border, MeshError, PlateSpec, RidgeMode};

/// How one category is raised, in millimeters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ridge {
    pub height: f64,
    pub width: f64,
}

/// Every category's ridge. Categories with no height aren't raised at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionProfile {
    ridges: BTreeMap<Category, Ridge>,
}

impl ExtrusionProfile {
    /// Fails if some category is missing, or a height or width isn't usable.
    pub fn new(ridges: BTreeMap<Category, Ridge>) -> Result<ExtrusionProfile, MeshError> {
        for c in Category::ALL {
            let ridge = ridges
                .get(&c)
                .ok_or_else(|| MeshError::InvalidProfile(format!("no ridge for {}", c)))?;
            if !ridge.height.is_finite() {
                return Err(MeshError::InvalidProfile(format!(
                    "{} has height {}",
                    c, ridge.height
                )));
            }
            if !ridge.width.is_finite() || ridge.width < 0.0 {
                return Err(MeshError::InvalidProfile(format!(
                    "{} has width {}",
                    c, ridge.width
                )));
            }
        }
        Ok(ExtrusionProfile { ridges })
    }

    pub fn uniform(ridge: Ridge) -> Result<ExtrusionProfile, MeshError> {
        ExtrusionProfile::new(Category::ALL.iter().map(|c| (*c, ridge)).collect())
    }

    pub fn ridge(&self, category: Category) -> Ridge {
        // Construction guarantees every category is present
        self.ridges[&category]
    }

    /// Returns a copy with one category changed.
    pub fn with_ridge(mut self, category: Category, ridge: Ridge) -> Result<Self, MeshError> {
        self.ridges.insert(category, ridge);
        ExtrusionProfile::new(self.ridges)
    }

    pub fn max_height(&self) -> f64 {
        self.ridges.values().map(|r| r.height).fold(0.0, f64::max)
    }

    /// Pairs `(more important, less important)` where the less important category stands taller.
    /// Prints fine, but the hierarchy reads backwards.
    pub fn hierarchy_violations(&self) -> Vec<(Category, Category)> {
        let mut result = Vec::new();
        for (idx, high) in Category::ALL.iter().enumerate() {
            for low in &Category::ALL[idx + 1..] {
                if self.ridge(*low).height > self.ridge(*high).height {
                    result.push((*high, *low));
                }
            }
        }
        result
    }
}

/// Relative to `max_relief_height`
fn height_fraction(category: Category) -> f64 {
    match category {
        Category::Motorway => 1.0,
        Category::Trunk | Category::Primary => 0.85,
        Category::Secondary => 0.70,
        Category::Tertiary => 0.55,
        Category::Residential
        | Category::Service
        | Category::PathOrTrack
        | Category::Unclassified => 0.40,
    }
}

/// In pixels of a `resolution`-wide grid, before `road_width_scale`
fn base_width(category: Category) -> f64 {
    match category {
        Category::Motorway => 4.0,
        Category::Trunk | Category::Primary => 3.5,
        Category::Secondary => 3.0,
        Category::Tertiary => 2.5,
        Category::Residential
        | Category::Service
        | Category::PathOrTrack
        | Category::Unclassified => 2.0,
    }
}

/// Everything about a relief that a person would tweak. Loaded from JSON; missing fields take the
/// defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliefSettings {
    pub width_mm: f64,
    pub height_mm: f64,
    pub base_thickness: f64,
    /// The tallest ridge, in mm
    pub max_relief_height: f64,
    pub road_width_scale: f64,
    /// Keeps roads this far from the plate edge
    pub margin_mm: f64,
    pub add_border: bool,
    pub border_width: f64,
    /// Road widths are defined against a grid this many cells across the longer side
    pub resolution: u32,
    /// Parks are raised this fraction of `max_relief_height`; 0 leaves them flat
    pub park_height: f64,
    pub ridge_mode: RidgeMode,
    /// Engrave everything into the plate instead of raising it
    pub invert: bool,
}

impl Default for ReliefSettings {
    fn default() -> ReliefSettings {
        ReliefSettings {
            width_mm: 150.0,
            height_mm: 200.0,
            base_thickness: 3.0,
            max_relief_height: 2.5,
            road_width_scale: 1.5,
            margin_mm: 0.0,
            add_border: true,
            border_width: 5.0,
            resolution: 800,
            park_height: 0.15,
            ridge_mode: RidgeMode::Fused,
            invert: false,
        }
    }
}

impl ReliefSettings {
    pub fn from_json(raw: &str) -> Result<ReliefSettings, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn plate(&self) -> PlateSpec {
        PlateSpec {
            width: self.width_mm,
            depth: self.height_mm,
            thickness: self.base_thickness,
            margin: self.margin_mm,
        }
    }

    pub fn profile(&self) -> Result<ExtrusionProfile, MeshError> {
        let mm_per_cell = self.width_mm.max(self.height_mm) / f64::from(self.resolution.max(1));
        ExtrusionProfile::new(
            Category::ALL
                .iter()
                .map(|c| {
                    (
                        *c,
                        Ridge {
                            height: height_fraction(*c) * self.max_relief_height,
                            width: base_width(*c) * self.road_width_scale * mm_per_cell,
                        },
                    )
                })
                .collect(),
        )
    }

    /// As tall as the tallest road.
    pub fn border(&self) -> Option<Border> {
        if !self.add_border || self.border_width <= 0.0 {
            return None;
        }
        Some(Border {
            width: self.border_width,
            height: None,
        })
    }

    pub fn park_height_mm(&self) -> f64 {
        self.park_height * self.max_relief_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = ReliefSettings::default();
        let profile = settings.profile().unwrap();
        assert_eq!(profile.ridge(Category::Motorway).height, 2.5);
        assert!((profile.ridge(Category::Residential).height - 1.0).abs() < 1e-9);
        // 4 cells * 1.5 * 200mm / 800 cells
        assert_eq!(profile.ridge(Category::Motorway).width, 1.5);
        assert!(profile.hierarchy_violations().is_empty());
        assert_eq!(profile.max_height(), 2.5);
    }

    #[test]
    fn partial_json() {
        let settings =
            ReliefSettings::from_json(r#"{"width_mm": 100, "add_border": false}"#).unwrap();
        assert_eq!(settings.width_mm, 100.0);
        assert_eq!(settings.height_mm, 200.0);
        assert!(settings.border().is_none());
        assert_eq!(settings.ridge_mode, RidgeMode::Fused);
        assert!(!settings.invert);

        let separate = ReliefSettings::from_json(r#"{"ridge_mode": "separate"}"#).unwrap();
        assert_eq!(separate.ridge_mode, RidgeMode::Separate);
    }

    #[test]
    fn hierarchy() {
        let profile = ExtrusionProfile::uniform(Ridge {
            height: 1.0,
            width: 1.0,
        })
        .unwrap()
        .with_ridge(
            Category::Service,
            Ridge {
                height: 2.0,
                width: 1.0,
            },
        )
        .unwrap();
        let violations = profile.hierarchy_violations();
        assert_eq!(violations.len(), 6);
        assert!(violations.contains(&(Category::Motorway, Category::Service)));
        assert!(violations.iter().all(|(_, low)| *low == Category::Service));
    }

    #[test]
    fn invalid() {
        assert!(ExtrusionProfile::uniform(Ridge {
            height: 1.0,
            width: -1.0,
        })
        .is_err());
        assert!(ExtrusionProfile::new(BTreeMap::new()).is_err());
    }
}
