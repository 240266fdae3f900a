use crate::{
    data_structures::Matrix,
    error::{ParseError, PdfResult},
    objects::Object,
    shading::Shading,
    FromObj, Resolve,
};

/// Shading patterns define a gradient fill that produces a smooth transition between
/// colours across the area. The colour to use shall be specified as a function of position
/// using any of a variety of methods.
#[derive(Debug, Clone)]
pub struct ShadingPattern {
    /// A shading object defining the shading pattern's gradient fill
    shading: Shading,

    /// An array of six numbers specifying the pattern matrix
    ///
    /// Default value: the identity matrix [1 0 0 1 0 0].
    matrix: Matrix,

    /// Whether this wraps a shading painted directly with the `sh` operator,
    /// rather than a pattern dictionary. Such shadings have no background
    is_shading_object: bool,
}

impl ShadingPattern {
    /// A shading painted directly, outside of any pattern
    pub fn from_shading(shading: Shading, matrix: Matrix) -> Self {
        Self {
            shading,
            matrix,
            is_shading_object: true,
        }
    }

    pub fn shading(&self) -> &Shading {
        &self.shading
    }

    pub fn matrix(&self) -> Matrix {
        self.matrix
    }

    pub fn is_shading_object(&self) -> bool {
        self.is_shading_object
    }
}

impl FromObj for ShadingPattern {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let mut dict = resolver.assert_dict(obj)?;

        let pattern_type = dict.expect::<PatternType>("PatternType", resolver)?;

        if pattern_type != PatternType::Shading {
            anyhow::bail!(ParseError::InvalidShading {
                reason: "tiling patterns are not shading patterns",
            });
        }

        let shading = dict.expect::<Shading>("Shading", resolver)?;
        let matrix = dict
            .get::<Matrix>("Matrix", resolver)?
            .unwrap_or_else(Matrix::identity);

        // graphics state parameters in `ExtGState` are left to the caller

        Ok(Self {
            shading,
            matrix,
            is_shading_object: false,
        })
    }
}

#[pdf_enum(Integer)]
enum PatternType {
    Tiling = 1,
    Shading = 2,
}
