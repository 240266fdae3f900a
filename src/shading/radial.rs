use crate::{
    data_structures::Matrix,
    error::PdfResult,
    geometry::Point,
    number_array,
    objects::Dictionary,
    render::Bitmap,
    Resolve,
};

use super::{extend, parametric_domain, step_index, steps::shading_steps, Shading};

/// Coefficients closer to zero than this are treated as zero
const EPSILON: f32 = 1e-4;

/// Type 3 (radial) shadings define a colour blend that varies between two circles. Shadings
/// of this type are commonly used to depict three-dimensional spheres and cones
///
/// This type of shading shall not be used with an Indexed colour space
#[derive(Debug, Clone)]
pub(crate) struct RadialShading {
    /// The centres and radii of the starting and ending circles, expressed in the shading's
    /// target coordinate space. The radii r0 and r1 shall both be greater than or equal to 0.
    /// If one radius is 0, the corresponding circle shall be treated as a point; if both are
    /// 0, nothing shall be painted
    start: Circle,
    end: Circle,

    /// An array of two numbers [t0 t1] specifying the limiting values of a parametric
    /// variable t. The variable is considered to vary linearly between these two values
    /// as the colour gradient varies between the starting and ending circles
    ///
    /// Default value: [0.0 1.0].
    domain: [f32; 2],

    /// An array of two boolean values specifying whether to extend the shading beyond the
    /// starting and ending circles, respectively
    ///
    /// Default value: [false false].
    extend: [bool; 2],
}

#[derive(Debug, Clone, Copy)]
struct Circle {
    center: Point,
    radius: f32,
}

impl RadialShading {
    pub fn from_dict(dict: &mut Dictionary, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let [x0, y0, r0, x1, y1, r1] = number_array::<6>(dict.expect_object("Coords")?, resolver)?;
        let domain = parametric_domain(dict, resolver)?;
        let extend = extend(dict, resolver)?;

        Ok(Self {
            start: Circle {
                center: Point::new(x0, y0),
                radius: r0,
            },
            end: Circle {
                center: Point::new(x1, y1),
                radius: r1,
            },
            domain,
            extend,
        })
    }

    fn equation(&self) -> RadialEquation {
        RadialEquation::new(self.start, self.end, self.extend)
    }

    pub fn draw(&self, shading: &Shading, bitmap: &mut Bitmap, matrix: Matrix, alpha: u8) {
        let Some(inverse) = matrix.inverse() else {
            log::debug!("skipping radial shading with a singular matrix");
            return;
        };

        let steps = shading_steps(
            self.domain[0],
            self.domain[1],
            shading.functions(),
            shading.color_space(),
            alpha,
            shading.results_count(),
        );

        let equation = self.equation();

        bitmap.for_each_row(|row, pixels| {
            for (column, pixel) in pixels.iter_mut().enumerate() {
                let pos = inverse * Point::new(column as f32, row as f32);

                let index = equation
                    .solve(pos)
                    .and_then(|s| step_index(s, self.extend));

                if let Some(index) = index {
                    *pixel = steps[index];
                }
            }
        });
    }
}

/// The family of circles interpolated between a start and an end circle.
///
/// A point lies on the circle at parameter `s` when `a·s² + b·s + c = 0`, with
/// `a` depending only on the two circles.
#[derive(Debug, Clone, Copy)]
struct RadialEquation {
    start: Circle,
    dx: f32,
    dy: f32,
    dr: f32,
    a: f32,

    /// The circles shrink faster than their centres move apart
    decreasing: bool,
    extend: [bool; 2],
}

impl RadialEquation {
    fn new(start: Circle, end: Circle, extend: [bool; 2]) -> Self {
        let dx = end.center.x - start.center.x;
        let dy = end.center.y - start.center.y;
        let dr = end.radius - start.radius;

        Self {
            start,
            dx,
            dy,
            dr,
            a: dx * dx + dy * dy - dr * dr,
            decreasing: dr < 0.0 && dx.hypot(dy) < -dr,
            extend,
        }
    }

    /// The quadratic term vanishes, leaving a linear equation in `s`
    fn is_linear(&self) -> bool {
        self.a.abs() < EPSILON
    }

    /// The parameter of the circle passing through `pos`, if any
    fn solve(&self, pos: Point) -> Option<f32> {
        let pos_dx = pos.x - self.start.center.x;
        let pos_dy = pos.y - self.start.center.y;

        let b = -2.0 * (pos_dx * self.dx + pos_dy * self.dy + self.start.radius * self.dr);
        let c = pos_dx * pos_dx + pos_dy * pos_dy - self.start.radius * self.start.radius;

        let s = if b.abs() < EPSILON {
            (-c / self.a).sqrt()
        } else if self.is_linear() {
            -c / b
        } else {
            let discriminant = b * b - 4.0 * self.a * c;

            if discriminant < 0.0 {
                return None;
            }

            let root = discriminant.sqrt();

            let (mut s1, mut s2) = ((-b - root) / (2.0 * self.a), (-b + root) / (2.0 * self.a));

            if self.a <= 0.0 {
                std::mem::swap(&mut s1, &mut s2);
            }

            if self.decreasing {
                if s1 >= 0.0 || self.extend[0] {
                    s1
                } else {
                    s2
                }
            } else if s2 <= 1.0 || self.extend[1] {
                s2
            } else {
                s1
            }
        };

        if !s.is_finite() || self.start.radius + s * self.dr < 0.0 {
            return None;
        }

        Some(s)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        color::Color,
        objects::Object,
        resolve::ObjectStore,
        test_util::{dict, linear_function, numbers},
        FromObj,
    };

    use super::*;

    fn circle(x: f32, y: f32, radius: f32) -> Circle {
        Circle {
            center: Point::new(x, y),
            radius,
        }
    }

    fn red_to_blue(coords: &[f32], extend: bool) -> Shading {
        let dict = dict([
            ("ShadingType", Object::Integer(3)),
            ("ColorSpace", Object::name("DeviceRGB")),
            ("Coords", numbers(coords)),
            ("Function", linear_function(&[1.0, 0.0, 0.0], &[0.0, 0.0, 1.0])),
            ("Extend", Object::Array(vec![Object::bool(extend), Object::bool(extend)])),
        ]);

        Shading::from_obj(Object::Dictionary(dict), &mut ObjectStore::new()).unwrap()
    }

    #[test]
    fn parallel_circles_are_not_linear() {
        let equation =
            RadialEquation::new(circle(0.0, 0.0, 5.0), circle(10.0, 0.0, 5.0), [false; 2]);
        assert!(!equation.is_linear());

        let equation =
            RadialEquation::new(circle(3.0, 3.0, 5.0), circle(3.0, 3.0, 5.0), [false; 2]);
        assert!(equation.is_linear());
    }

    #[test]
    fn concentric_circles() {
        let equation =
            RadialEquation::new(circle(0.0, 0.0, 0.0), circle(0.0, 0.0, 10.0), [false; 2]);

        let s = equation.solve(Point::new(5.0, 0.0)).unwrap();
        assert!((s - 0.5).abs() < 1e-5);

        let s = equation.solve(Point::new(0.0, 10.0)).unwrap();
        assert!((s - 1.0).abs() < 1e-5);
    }

    #[test]
    fn outside_a_cone_is_skipped() {
        // a point circle moving right: nothing to the left of the start is covered
        let equation =
            RadialEquation::new(circle(0.0, 0.0, 0.0), circle(10.0, 0.0, 1.0), [false; 2]);

        assert_eq!(equation.solve(Point::new(-5.0, 5.0)), None);
        assert!(equation.solve(Point::new(10.0, 0.0)).is_some());
    }

    #[test]
    fn linear_equation_skips_negative_radius() {
        let equation =
            RadialEquation::new(circle(0.0, 0.0, 0.0), circle(10.0, 0.0, 10.0), [true; 2]);
        assert!(equation.is_linear());

        assert_eq!(equation.solve(Point::new(-5.0, 0.0)), None);

        let s = equation.solve(Point::new(5.0, 0.0)).unwrap();
        assert!((s - 0.25).abs() < 1e-5);
    }

    #[test]
    fn shrinking_circles_prefer_smaller_root() {
        let equation =
            RadialEquation::new(circle(0.0, 0.0, 10.0), circle(0.0, 0.0, 0.0), [false; 2]);
        assert!(equation.decreasing);

        let s = equation.solve(Point::new(5.0, 0.0)).unwrap();
        assert!((s - 0.5).abs() < 1e-5);
    }

    #[test]
    fn draw_concentric() {
        let shading = red_to_blue(&[5.0, 5.0, 0.0, 5.0, 5.0, 5.0], false);

        let mut bitmap = Bitmap::new(11, 11);
        shading.draw(&mut bitmap, Matrix::identity(), 255, Default::default());

        assert_eq!(bitmap.pixel(5, 5), Some(Color::RED));
        assert_eq!(bitmap.pixel(10, 5), Some(0xff_01_00_fe));

        // outside the end circle
        assert_eq!(bitmap.pixel(0, 0), Some(0));
    }

    #[test]
    fn extended_fills_outside() {
        let shading = red_to_blue(&[5.0, 5.0, 0.0, 5.0, 5.0, 5.0], true);

        let mut bitmap = Bitmap::new(11, 11);
        shading.draw(&mut bitmap, Matrix::identity(), 255, Default::default());

        assert_eq!(bitmap.pixel(0, 0), Some(0xff_01_00_fe));
    }
}
