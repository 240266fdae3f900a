use std::ops::{Mul, MulAssign};

use crate::{
    error::PdfResult,
    geometry::{BoundingBox, Point},
    number_array,
    objects::Object,
    resolve::Resolve,
    FromObj,
};

use super::Rectangle;

/// A 3x3 matrix
///
/// It is only possible to specify 6 out of the 9 possible values.
///
/// The full matrix is of the form:
///
/// [a b 0]
/// [c d 0]
/// [e f 1]
///
/// Points are row vectors, so `x' = a*x + c*y + e` and `y' = b*x + d*y + f`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

/// `self * other` applies `self` first, then `other`
impl Mul<Matrix> for Matrix {
    type Output = Matrix;
    fn mul(self, other: Matrix) -> Self::Output {
        let a = self.a * other.a + self.b * other.c;
        let b = self.a * other.b + self.b * other.d;

        let c = self.c * other.a + self.d * other.c;
        let d = self.c * other.b + self.d * other.d;

        let e = self.e * other.a + self.f * other.c + other.e;
        let f = self.e * other.b + self.f * other.d + other.f;

        Matrix::new(a, b, c, d, e, f)
    }
}

impl Mul<Point> for Matrix {
    type Output = Point;

    fn mul(self, other: Point) -> Self::Output {
        let x = self.a * other.x + self.c * other.y + self.e;
        let y = self.b * other.x + self.d * other.y + self.f;

        Point::new(x, y)
    }
}

impl MulAssign<Matrix> for Point {
    fn mul_assign(&mut self, rhs: Matrix) {
        *self = rhs * *self;
    }
}

impl MulAssign<Matrix> for Matrix {
    fn mul_assign(&mut self, rhs: Matrix) {
        *self = *self * rhs;
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn identity() -> Self {
        Matrix {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub const fn new_translation(x: f32, y: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    pub fn new_scale(x: f32, y: f32) -> Self {
        Self::new(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    pub fn from_arr(arr: [f32; 6]) -> Self {
        let [a, b, c, d, e, f] = arr;
        Self { a, b, c, d, e, f }
    }

    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// `None` if the matrix collapses the plane onto a line or a point
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();

        if det == 0.0 || !det.is_finite() {
            return None;
        }

        let a = self.d / det;
        let b = -self.b / det;
        let c = -self.c / det;
        let d = self.a / det;
        let e = -(self.e * a + self.f * c);
        let f = -(self.e * b + self.f * d);

        Some(Self::new(a, b, c, d, e, f))
    }

    /// The smallest axis-aligned box containing the transformed rectangle
    pub fn transform_rect(&self, rect: &Rectangle) -> BoundingBox {
        let mut bbox = BoundingBox::new();

        for corner in rect.corners() {
            bbox.add_point(*self * corner);
        }

        bbox
    }
}

impl FromObj for Matrix {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        number_array::<6>(obj, resolver).map(Self::from_arr)
    }
}
