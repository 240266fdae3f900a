use crate::data_structures::Matrix;

use super::{BoundingBox, CubicBezierCurve, Line, Point};

#[derive(Debug, Clone, Copy)]
pub enum Subpath {
    Line(Line),
    Cubic(CubicBezierCurve),
}

impl Subpath {
    pub fn apply_transform(&mut self, transformation: Matrix) {
        match self {
            Self::Line(line) => {
                line.start *= transformation;
                line.end *= transformation;
            }
            Self::Cubic(curve) => curve.apply_transform(transformation),
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Self::Line(line) => BoundingBox::from_points(&[line.start, line.end]),
            Self::Cubic(curve) => curve.bounding_box(),
        }
    }
}

/// A single closed-or-open contour made of lines and cubic curves
#[derive(Debug, Clone)]
pub struct Path {
    pub subpaths: Vec<Subpath>,
    pub current_point: Point,
    start: Point,
}

impl Path {
    pub const fn new(start: Point) -> Self {
        Self {
            subpaths: Vec::new(),
            current_point: start,
            start,
        }
    }

    pub fn close_path(&mut self) {
        if self.current_point != self.start {
            self.line_to(self.start);
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::new();

        for subpath in &self.subpaths {
            bbox.merge(subpath.bounding_box());
        }

        bbox
    }

    pub fn apply_transform(&mut self, transformation: Matrix) {
        for subpath in &mut self.subpaths {
            subpath.apply_transform(transformation);
        }

        self.start *= transformation;
        self.current_point *= transformation;
    }

    pub fn line_to(&mut self, p: Point) {
        self.subpaths
            .push(Subpath::Line(Line::new(self.current_point, p)));
        self.current_point = p;
    }

    pub fn cubic_curve_to(
        &mut self,
        first_control_point: Point,
        second_control_point: Point,
        end: Point,
    ) {
        self.subpaths.push(Subpath::Cubic(CubicBezierCurve::new(
            self.current_point,
            end,
            first_control_point,
            second_control_point,
        )));
        self.current_point = end;
    }

    /// The path as a polygon. An open path is treated as if it were closed
    pub fn flatten(&self) -> Vec<Line> {
        let mut lines = Vec::new();

        for subpath in &self.subpaths {
            match subpath {
                Subpath::Line(line) => lines.push(*line),
                Subpath::Cubic(curve) => lines.extend(curve.flatten()),
            }
        }

        if self.current_point != self.start {
            lines.push(Line::new(self.current_point, self.start));
        }

        lines
    }
}
