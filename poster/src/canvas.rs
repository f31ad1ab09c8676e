use geom::{Bounds, Pt2D};
use road_network::Region;

use crate::RenderError;

/// Posters bigger than this, in either dimension, get clamped.
pub const MAX_INCHES: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSpec {
    pub width_px: u32,
    pub height_px: u32,
    pub dpi: f64,
}

impl CanvasSpec {
    pub fn from_inches(width_in: f64, height_in: f64, dpi: f64) -> CanvasSpec {
        CanvasSpec {
            width_px: (width_in * dpi).round().max(0.0) as u32,
            height_px: (height_in * dpi).round().max(0.0) as u32,
            dpi,
        }
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width_px == 0 || self.height_px == 0 || !self.dpi.is_finite() || self.dpi <= 0.0 {
            return Err(RenderError::InvalidCanvas {
                width_px: self.width_px,
                height_px: self.height_px,
                dpi: self.dpi,
            });
        }
        Ok(())
    }

    pub fn width_in(&self) -> f64 {
        f64::from(self.width_px) / self.dpi
    }

    pub fn height_in(&self) -> f64 {
        f64::from(self.height_px) / self.dpi
    }

    /// width / height
    pub fn aspect(&self) -> f64 {
        f64::from(self.width_px) / f64::from(self.height_px)
    }

    /// Line widths and font sizes are in points.
    pub fn px_per_pt(&self) -> f64 {
        self.dpi / 72.0
    }
}

/// Maps the planar frame of the map onto the canvas: uniform scale, north up, centered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    window: Bounds,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    height_px: f64,
}

impl Viewport {
    /// Centers the region on the canvas, cropping it to the canvas aspect ratio.
    pub fn new(region: &Region, canvas: &CanvasSpec) -> Result<Viewport, RenderError> {
        canvas.validate()?;
        if !(region.radius > 0.0) {
            return Err(RenderError::EmptyRegion);
        }
        let window = region.window(canvas.aspect());
        let width_px = f64::from(canvas.width_px);
        let height_px = f64::from(canvas.height_px);
        // Both ratios agree, up to rounding of the pixel size
        let scale = (width_px / window.width()).min(height_px / window.height());
        Ok(Viewport {
            window,
            scale,
            offset_x: (width_px - window.width() * scale) / 2.0,
            offset_y: (height_px - window.height() * scale) / 2.0,
            height_px,
        })
    }

    /// The part of the map that's visible.
    pub fn window(&self) -> &Bounds {
        &self.window
    }

    /// Canvas pixels per map unit
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Canvas coordinates have y pointing down.
    pub fn to_canvas(&self, pt: Pt2D) -> (f64, f64) {
        let x = self.offset_x + (pt.x() - self.window.min_x) * self.scale;
        let y = self.height_px - (self.offset_y + (pt.y() - self.window.min_y) * self.scale);
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_canvas() {
        assert!(CanvasSpec::from_inches(0.0, 10.0, 300.0).validate().is_err());
        assert!(CanvasSpec {
            width_px: 10,
            height_px: 10,
            dpi: 0.0
        }
        .validate()
        .is_err());
        let canvas = CanvasSpec::from_inches(12.0, 16.0, 300.0);
        assert_eq!(canvas.width_px, 3600);
        assert_eq!(canvas.height_px, 4800);
        assert!(canvas.validate().is_ok());
        assert_eq!(canvas.width_in(), 12.0);
    }

    #[test]
    fn north_up_and_centered() {
        let region = Region {
            center: Pt2D::new(100.0, 100.0),
            radius: 50.0,
        };
        let canvas = CanvasSpec {
            width_px: 100,
            height_px: 200,
            dpi: 72.0,
        };
        let viewport = Viewport::new(&region, &canvas).unwrap();
        // Portrait: the full radius spans the height
        assert_eq!(viewport.window().height(), 100.0);
        assert_eq!(viewport.window().width(), 50.0);
        assert_eq!(viewport.scale(), 2.0);

        assert_eq!(viewport.to_canvas(Pt2D::new(100.0, 100.0)), (50.0, 100.0));
        // North is up
        let (_, y) = viewport.to_canvas(Pt2D::new(100.0, 150.0));
        assert_eq!(y, 0.0);
    }
}
