use crate::{
    error::PdfResult, geometry::Point, number_array, objects::Object, resolve::Resolve, FromObj,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    lower_left_x: f32,
    lower_left_y: f32,
    upper_right_x: f32,
    upper_right_y: f32,
}

impl FromObj for Rectangle {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let [x0, y0, x1, y1] = number_array::<4>(obj, resolver)?;

        Ok(Rectangle::new(x0, y0, x1, y1))
    }
}

impl Rectangle {
    /// The corners may be given in any order; the rectangle is normalized so
    /// that the lower left corner is the smaller one
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            lower_left_x: x0.min(x1),
            lower_left_y: y0.min(y1),
            upper_right_x: x0.max(x1),
            upper_right_y: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.upper_right_x - self.lower_left_x
    }

    pub fn height(&self) -> f32 {
        self.upper_right_y - self.lower_left_y
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.lower_left_x, self.lower_left_y),
            Point::new(self.upper_right_x, self.lower_left_y),
            Point::new(self.upper_right_x, self.upper_right_y),
            Point::new(self.lower_left_x, self.upper_right_y),
        ]
    }
}

/// A rectangle of whole device pixels. `right` and `bottom` are exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl IntRect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_size(width: usize, height: usize) -> Self {
        Self::new(
            0,
            0,
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        )
    }

    pub fn width(&self) -> usize {
        usize::try_from(self.right.saturating_sub(self.left)).unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        usize::try_from(self.bottom.saturating_sub(self.top)).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    pub fn intersect(&self, other: &IntRect) -> IntRect {
        IntRect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rectangle_is_normalized() {
        let rect = Rectangle::new(10.0, 20.0, 0.0, 5.0);
        assert_eq!(rect.width(), 10.0);
        assert_eq!(rect.height(), 15.0);
        assert_eq!(rect.corners()[0], Point::new(0.0, 5.0));
    }

    #[test]
    fn disjoint_intersection_is_empty() {
        let a = IntRect::new(0, 0, 10, 10);
        let b = IntRect::new(20, 0, 30, 10);
        let overlap = a.intersect(&b);

        assert!(overlap.is_empty());
        assert_eq!(overlap.width(), 0);
    }

    #[test]
    fn intersection() {
        let a = IntRect::new(0, 0, 10, 10);
        let b = IntRect::new(5, -5, 30, 8);
        assert_eq!(a.intersect(&b), IntRect::new(5, 0, 10, 8));
    }
}
