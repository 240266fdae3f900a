use crate::{
    data_structures::Matrix,
    error::PdfResult,
    function::call_function_list,
    geometry::Point,
    number_array,
    objects::Dictionary,
    render::Bitmap,
    Resolve,
};

use super::Shading;

/// In type 1 (function-based) shadings, the colour at every point in the domain is defined by a
/// specified mathematical function. The function need not be smooth or continuous. This type is
/// the most general of the available shading types and is useful for shadings that cannot be
/// adequately described with any of the other types
#[derive(Debug, Clone)]
pub(crate) struct FunctionBasedShading {
    /// An array of four numbers [xmin xmax ymin ymax] specifying the rectangular domain of
    /// coordinates over which the colour function(s) are defined
    ///
    /// Default value: [0.0 1.0 0.0 1.0].
    domain: [f32; 4],

    /// An array of six numbers specifying a transformation matrix mapping the coordinate space
    /// specified by the Domain entry into the shading's target coordinate space
    ///
    /// Default value: the identity matrix [1 0 0 1 0 0].
    matrix: Matrix,
}

impl FunctionBasedShading {
    pub fn from_dict(dict: &mut Dictionary, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let domain = match dict.get_object("Domain") {
            Some(obj) => number_array::<4>(obj, resolver)?,
            None => [0.0, 1.0, 0.0, 1.0],
        };

        let matrix = dict
            .get::<Matrix>("Matrix", resolver)?
            .unwrap_or_else(Matrix::identity);

        Ok(Self { domain, matrix })
    }

    fn contains(&self, pos: Point) -> bool {
        let [xmin, xmax, ymin, ymax] = self.domain;

        (xmin..=xmax).contains(&pos.x) && (ymin..=ymax).contains(&pos.y)
    }

    pub fn draw(&self, shading: &Shading, bitmap: &mut Bitmap, matrix: Matrix, alpha: u8) {
        let Some(bitmap_to_domain) = (self.matrix * matrix).inverse() else {
            log::debug!("skipping function-based shading with a singular matrix");
            return;
        };

        let results_count = shading.results_count();

        bitmap.for_each_row(|row, pixels| {
            let mut results = vec![0.0; results_count];

            for (column, pixel) in pixels.iter_mut().enumerate() {
                let pos = bitmap_to_domain * Point::new(column as f32, row as f32);

                if !self.contains(pos) {
                    continue;
                }

                results.fill(0.0);
                call_function_list(shading.functions(), &[pos.x, pos.y], &mut results);

                *pixel = shading.color_space().rgb_or_black(&results).to_argb(alpha);
            }
        });
    }
}
