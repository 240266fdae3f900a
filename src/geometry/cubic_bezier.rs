use crate::data_structures::Matrix;

use super::{point::Point, BoundingBox, Line};

/// Most line segments a single curve is split into when filling
const MAX_FLATTEN_SEGMENTS: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct CubicBezierCurve {
    pub start: Point,
    pub end: Point,
    pub first_control_point: Point,
    pub second_control_point: Point,
}

impl CubicBezierCurve {
    pub fn new(
        start: Point,
        end: Point,
        first_control_point: Point,
        second_control_point: Point,
    ) -> Self {
        Self {
            start,
            first_control_point,
            second_control_point,
            end,
        }
    }

    pub fn basis(&self, t: f32) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;

        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        self.start * mt3
            + 3.0 * self.first_control_point * mt2 * t
            + 3.0 * self.second_control_point * mt * t2
            + self.end * t3
    }

    pub fn apply_transform(&mut self, transformation: Matrix) {
        self.start *= transformation;
        self.end *= transformation;
        self.first_control_point *= transformation;
        self.second_control_point *= transformation;
    }

    /// The curve lies within the convex hull of its control points
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&[
            self.start,
            self.first_control_point,
            self.second_control_point,
            self.end,
        ])
    }

    fn control_polygon_length(&self) -> f32 {
        self.start.euclidean_distance(self.first_control_point)
            + self
                .first_control_point
                .euclidean_distance(self.second_control_point)
            + self.second_control_point.euclidean_distance(self.end)
    }

    /// Approximate the curve with line segments roughly two pixels long
    pub fn flatten(&self) -> Vec<Line> {
        let len = self.control_polygon_length();
        let segments = if len.is_finite() {
            ((len / 2.0).ceil() as usize).clamp(1, MAX_FLATTEN_SEGMENTS)
        } else {
            1
        };

        let mut lines = Vec::with_capacity(segments);
        let mut previous = self.start;

        for i in 1..=segments {
            let p = if i == segments {
                self.end
            } else {
                self.basis(i as f32 / segments as f32)
            };

            lines.push(Line::new(previous, p));
            previous = p;
        }

        lines
    }
}
