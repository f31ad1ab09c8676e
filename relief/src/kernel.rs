use std::panic::{catch_unwind, AssertUnwindSafe};

use geom::{Bounds, PolyLine, Polygon};

use crate::KernelError;

/// Straight segments of the round caps on each side
const CAP_SEGMENTS: usize = 8;

/// The few 2D operations the relief builder needs. Every one may fail; the builder skips the
/// shape involved and carries on.
pub trait FootprintKernel {
    /// The area within `width / 2` of the line, with round caps and joins.
    fn offset(&self, pl: &PolyLine, width: f64) -> Result<Vec<Polygon>, KernelError>;
    fn union(&self, polygons: Vec<Polygon>) -> Result<Vec<Polygon>, KernelError>;
    /// Everything in `a` not covered by `b`.
    fn difference(&self, a: &[Polygon], b: &[Polygon]) -> Result<Vec<Polygon>, KernelError>;
    /// The part of the polygons inside the rectangle.
    fn clip(&self, polygons: &[Polygon], bounds: &Bounds) -> Result<Vec<Polygon>, KernelError>;
}

/// Boolean operations from the `geo` crate.
pub struct GeoKernel;

/// Runs one kernel operation. Some kernels panic on degenerate input; that becomes an error too.
pub(crate) fn guarded<T, F: FnOnce() -> Result<T, KernelError>>(
    op: &str,
    f: F,
) -> Result<T, KernelError> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(err) => {
            let detail = err
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| err.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(KernelError(format!("{} panicked: {}", op, detail)))
        }
    }
}

impl FootprintKernel for GeoKernel {
    fn offset(&self, pl: &PolyLine, width: f64) -> Result<Vec<Polygon>, KernelError> {
        if !width.is_finite() || width <= geom::EPSILON_DIST {
            return Err(KernelError(format!("can't buffer by width {}", width)));
        }
        let capsules = pl.capsules(width / 2.0, CAP_SEGMENTS);
        if capsules.is_empty() {
            return Err(KernelError("polyline has no length".to_string()));
        }
        Ok(Polygon::union_all(capsules))
    }

    fn union(&self, polygons: Vec<Polygon>) -> Result<Vec<Polygon>, KernelError> {
        Ok(Polygon::union_all(polygons))
    }

    fn difference(&self, a: &[Polygon], b: &[Polygon]) -> Result<Vec<Polygon>, KernelError> {
        Ok(Polygon::difference_all(a, b))
    }

    fn clip(&self, polygons: &[Polygon], bounds: &Bounds) -> Result<Vec<Polygon>, KernelError> {
        let rect = vec![bounds.get_rectangle()];
        Ok(Polygon::intersection_all(polygons, &rect))
    }
}

#[cfg(test)]
mod tests {
    use geom::Pt2D;

    use super::*;

    #[test]
    fn offset_straight_line() {
        let pl = PolyLine::must_new(vec![Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0)]);
        let result = GeoKernel.offset(&pl, 2.0).unwrap();
        assert_eq!(result.len(), 1);
        let bounds = result[0].get_bounds();
        assert!((bounds.min_x + 1.0).abs() < 1e-6);
        assert!((bounds.max_y - 1.0).abs() < 1e-6);
        // A 10x2 rectangle plus a disc approximated by a 16-gon
        let area = result[0].area();
        assert!(area > 20.0 + 2.9 && area < 20.0 + std::f64::consts::PI);

        assert!(GeoKernel.offset(&pl, 0.0).is_err());
    }

    #[test]
    fn clip_and_difference() {
        let big = Bounds::from_corners(Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 10.0)).get_rectangle();
        let small = Bounds::from_corners(Pt2D::new(2.0, 2.0), Pt2D::new(4.0, 4.0)).get_rectangle();
        let ring = GeoKernel.difference(&[big.clone()], &[small]).unwrap();
        assert_eq!(ring.len(), 1);
        assert_eq!(ring[0].holes().len(), 1);
        assert!((ring[0].area() - 96.0).abs() < 1e-9);

        let half = Bounds::from_corners(Pt2D::new(5.0, -5.0), Pt2D::new(20.0, 20.0));
        let clipped = GeoKernel.clip(&[big], &half).unwrap();
        assert!((clipped[0].area() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn panics_become_errors() {
        let result: Result<(), KernelError> = guarded("test", || panic!("boom"));
        assert_eq!(result, Err(KernelError("test panicked: boom".to_string())));
    }
}
