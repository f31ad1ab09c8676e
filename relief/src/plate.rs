use serde::{Deserialize, Serialize};

use geom::{Bounds, Pt2D};

use crate::MeshError;

/// The physical plate, in millimeters. Its top-left is at the origin of the plate frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlateSpec {
    pub width: f64,
    pub depth: f64,
    pub thickness: f64,
    /// Roads stay this far from the edge
    pub margin: f64,
}

impl PlateSpec {
    pub fn validate(&self) -> Result<(), MeshError> {
        for (name, value) in [
            ("width", self.width),
            ("depth", self.depth),
            ("thickness", self.thickness),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MeshError::InvalidPlate(format!("{} is {}", name, value)));
            }
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(MeshError::InvalidPlate(format!("margin is {}", self.margin)));
        }
        if 2.0 * self.margin >= self.width.min(self.depth) {
            return Err(MeshError::InvalidPlate(format!(
                "margin {} leaves no room on a {}x{} plate",
                self.margin, self.width, self.depth
            )));
        }
        Ok(())
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_corners(Pt2D::new(0.0, 0.0), Pt2D::new(self.width, self.depth))
    }

    /// Where roads may go
    pub fn inner_bounds(&self) -> Bounds {
        self.bounds().inset(self.margin)
    }
}

/// Maps the map frame onto the plate: uniform scale, centered in the inner rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlateFrame {
    source: Bounds,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl PlateFrame {
    /// Scales the source to fit `target`, centered. A source that's only a line gets squared up
    /// around its middle. None if the source is a single point, or the target has no area.
    pub fn fit(source: &Bounds, target: &Bounds) -> Option<PlateFrame> {
        if source.is_empty() || target.width() <= 0.0 || target.height() <= 0.0 {
            return None;
        }
        let side = source.width().max(source.height());
        if side <= 0.0 {
            return None;
        }
        let source = if source.width() <= 0.0 || source.height() <= 0.0 {
            Bounds::crop_to_aspect(source.center(), side / 2.0, 1.0)
        } else {
            *source
        };
        let scale = (target.width() / source.width()).min(target.height() / source.height());
        Some(PlateFrame {
            source,
            scale,
            offset_x: target.min_x + (target.width() - source.width() * scale) / 2.0,
            offset_y: target.min_y + (target.height() - source.height() * scale) / 2.0,
        })
    }

    /// Millimeters per map unit
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_plate(&self, pt: Pt2D) -> Pt2D {
        Pt2D::new(
            self.offset_x + (pt.x() - self.source.min_x) * self.scale,
            self.offset_y + (pt.y() - self.source.min_y) * self.scale,
        )
    }
}
