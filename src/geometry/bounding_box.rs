use crate::data_structures::IntRect;

use super::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundingBox {
    /// An empty box; the first point added becomes both corners
    pub fn new() -> Self {
        Self {
            min: Point {
                x: f32::INFINITY,
                y: f32::INFINITY,
            },
            max: Point {
                x: f32::NEG_INFINITY,
                y: f32::NEG_INFINITY,
            },
        }
    }

    pub fn from_points(points: &[Point]) -> Self {
        let mut bbox = Self::new();

        for &p in points {
            bbox.add_point(p);
        }

        bbox
    }

    pub fn add_point(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);

        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn merge(&mut self, other: Self) {
        self.min.x = self.min.x.min(other.min.x);
        self.min.y = self.min.y.min(other.min.y);

        self.max.x = self.max.x.max(other.max.x);
        self.max.y = self.max.y.max(other.max.y);
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// The smallest pixel rectangle that fully contains the box
    pub fn outer_rect(&self) -> IntRect {
        // `as` saturates, and maps NaN to 0
        IntRect::new(
            self.min.x.floor() as i32,
            self.min.y.floor() as i32,
            self.max.x.ceil() as i32,
            self.max.y.ceil() as i32,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn outer_rect_rounds_outwards() {
        let bbox = BoundingBox::from_points(&[Point::new(0.5, 1.2), Point::new(3.1, 4.0)]);
        assert_eq!(bbox.outer_rect(), IntRect::new(0, 1, 4, 4));
    }

    #[test]
    fn empty_box_is_not_finite() {
        assert!(!BoundingBox::new().is_finite());
    }
}
