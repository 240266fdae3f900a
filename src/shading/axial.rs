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

/// Type 2 (axial) shadings define a colour blend that varies along a linear axis between two
/// endpoints and extends indefinitely perpendicular to that axis. The shading may optionally
/// be extended beyond either or both endpoints by continuing the boundary colours indefinitely
///
/// This type of shading shall not be used with an Indexed colour space.
#[derive(Debug, Clone)]
pub(crate) struct AxialShading {
    /// The starting and ending coordinates of the axis, expressed in the
    /// shading's target coordinate space
    start: Point,
    end: Point,

    /// An array of two numbers [t0 t1] specifying the limiting values of a parametric variable
    /// t. The variable is considered to vary linearly between these two values as the colour
    /// gradient varies between the starting and ending points of the axis. The variable t becomes
    /// the input argument to the colour function(s)
    ///
    /// Default value: [0.0 1.0].
    domain: [f32; 2],

    /// An array of two boolean values specifying whether to extend the shading beyond the starting
    /// and ending points of the axis, respectively. Default value: [false false].
    extend: [bool; 2],
}

impl AxialShading {
    pub fn from_dict(dict: &mut Dictionary, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let [x0, y0, x1, y1] = number_array::<4>(dict.expect_object("Coords")?, resolver)?;
        let domain = parametric_domain(dict, resolver)?;
        let extend = extend(dict, resolver)?;

        Ok(Self {
            start: Point::new(x0, y0),
            end: Point::new(x1, y1),
            domain,
            extend,
        })
    }

    /// How far along the axis the projection of `pos` lies, with `0.0` at the
    /// start and `1.0` at the end
    fn axis_position(&self, pos: Point, axis_len_square: f32) -> f32 {
        let span = self.end - self.start;

        ((pos.x - self.start.x) * span.x + (pos.y - self.start.y) * span.y) / axis_len_square
    }

    pub fn draw(&self, shading: &Shading, bitmap: &mut Bitmap, matrix: Matrix, alpha: u8) {
        let span = self.end - self.start;
        let axis_len_square = span.x * span.x + span.y * span.y;

        if axis_len_square == 0.0 {
            log::debug!("skipping axial shading with a zero-length axis");
            return;
        }

        let Some(inverse) = matrix.inverse() else {
            log::debug!("skipping axial shading with a singular matrix");
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

        bitmap.for_each_row(|row, pixels| {
            for (column, pixel) in pixels.iter_mut().enumerate() {
                let pos = inverse * Point::new(column as f32, row as f32);

                let t = self.axis_position(pos, axis_len_square);

                if let Some(index) = step_index(t, self.extend) {
                    *pixel = steps[index];
                }
            }
        });
    }
}
