use serde::{Deserialize, Serialize};

use crate::Pt2D;

/// A line segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line(Pt2D, Pt2D);

impl Line {
    pub fn new(pt1: Pt2D, pt2: Pt2D) -> Line {
        Line(pt1, pt2)
    }

    pub fn pt1(&self) -> Pt2D {
        self.0
    }

    pub fn pt2(&self) -> Pt2D {
        self.1
    }

    pub fn length(&self) -> f64 {
        self.0.dist_to(self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length() {
        let line = Line::new(Pt2D::new(0.0, 0.0), Pt2D::new(3.0, 4.0));
        assert_eq!(line.length(), 5.0);
        assert_eq!(line.pt2(), Pt2D::new(3.0, 4.0));
    }
}
