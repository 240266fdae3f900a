use std::sync::Arc;

use crate::{
    color::ColorSpace,
    data_structures::{Matrix, Rectangle},
    error::{ParseError, PdfResult},
    function::{load_function_list, total_output_count, Function},
    objects::{Dictionary, Object, ObjectType},
    render::{Bitmap, RenderOptions},
    FromObj, Resolve,
};

use self::{
    axial::AxialShading, coons_patch_mesh::CoonsPatchMeshShading, freeform::FreeformShading,
    function_based::FunctionBasedShading, latticeform::LatticeformShading,
    radial::RadialShading, tensor_product_patch_mesh::TensorProductPatchMeshShading,
};

pub use self::mesh_stream::MeshVertex;

mod axial;
mod coons_patch_mesh;
mod freeform;
mod function_based;
mod gouraud;
mod latticeform;
mod mesh_stream;
mod radial;
mod steps;
mod tensor_product_patch_mesh;

/// Resolution of the color lookup table used by axial and radial shadings
pub(crate) const SHADING_STEPS: usize = 256;

#[derive(Debug, Clone)]
pub struct Shading {
    shading_type: ShadingType,

    /// The colour space in which colour values shall be expressed. This may be any device,
    /// CIE-based, or special colour space except a Pattern space
    color_space: ColorSpace,

    /// An array of colour components appropriate to the colour space, specifying a single
    /// background colour value. If present, this colour shall be used, before any painting
    /// operation involving the shading, to fill those portions of the area to be painted
    /// that lie outside the bounds of the shading object
    ///
    /// The background colour is applied only when the shading is used as part of a shading
    /// pattern, not when it is painted directly with the sh operator
    background: Option<Vec<f32>>,

    /// An array of four numbers giving the left, bottom, right, and top coordinates,
    /// respectively, of the shading's bounding box. The coordinates shall be interpreted
    /// in the shading's target coordinate space. If present, this bounding box shall be
    /// applied as a temporary clipping boundary when the shading is painted
    bbox: Option<Rectangle>,

    /// A flag indicating whether to filter the shading function to prevent aliasing artifacts
    ///
    /// Default value: false
    anti_alias: bool,

    /// Either a single function or one function per colour component. A `None`
    /// entry is a function that failed to load
    functions: Vec<Option<Arc<Function>>>,

    sub_type: SubtypeShading,
}

#[derive(Debug, Clone)]
enum SubtypeShading {
    FunctionBased(FunctionBasedShading),
    Axial(AxialShading),
    Radial(RadialShading),
    Freeform(FreeformShading),
    Latticeform(LatticeformShading),
    CoonsPatchMesh(CoonsPatchMeshShading),
    TensorProductPatchMesh(TensorProductPatchMeshShading),
}

impl FromObj for Shading {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let (mut dict, data) = match resolver.resolve(obj)? {
            Object::Stream(stream) => {
                let data = stream.decode(resolver)?.into_owned();
                (stream.dict.other, Some(data))
            }
            Object::Dictionary(dict) => (dict, None),
            found => anyhow::bail!(ParseError::MismatchedObjectTypeAny {
                expected: &[ObjectType::Dictionary, ObjectType::Stream],
                found,
            }),
        };

        let shading_type = dict.expect::<ShadingType>("ShadingType", resolver)?;
        let color_space = dict.expect::<ColorSpace>("ColorSpace", resolver)?;
        let background = dict.get::<Vec<f32>>("Background", resolver)?;
        let bbox = dict.get::<Rectangle>("BBox", resolver)?;
        let anti_alias = dict.get::<bool>("AntiAlias", resolver)?.unwrap_or(false);

        let functions = match dict.get_object("Function") {
            Some(obj) => load_function_list(obj, resolver)?,
            None if shading_type.is_mesh() => Vec::new(),
            None => anyhow::bail!(ParseError::MissingRequiredKey { key: "Function" }),
        };

        validate_functions(&functions, shading_type, &color_space)?;

        let sub_type = if shading_type.is_mesh() {
            let Some(data) = data else {
                anyhow::bail!(ParseError::MismatchedObjectType {
                    expected: ObjectType::Stream,
                    found: Object::Dictionary(dict),
                });
            };

            // mesh colors are a single parametric value when a function is present
            let component_count = if functions.is_empty() {
                color_space.component_count()
            } else {
                1
            };

            SubtypeShading::mesh_from_dict(
                shading_type,
                &mut dict,
                data,
                component_count,
                resolver,
            )?
        } else {
            SubtypeShading::from_dict(shading_type, &mut dict, resolver)?
        };

        Ok(Self {
            shading_type,
            color_space,
            background,
            bbox,
            anti_alias,
            functions,
            sub_type,
        })
    }
}

/// There must be one function, or one per color component. Every present
/// function must take the shading's parametric inputs, and between them they
/// must produce at least one value per color component
fn validate_functions(
    functions: &[Option<Arc<Function>>],
    shading_type: ShadingType,
    color_space: &ColorSpace,
) -> PdfResult<()> {
    if functions.is_empty() {
        return Ok(());
    }

    let component_count = color_space.component_count();

    if functions.len() != 1 && functions.len() != component_count {
        anyhow::bail!(ParseError::InvalidShading {
            reason: "expected a single function or one per color component",
        });
    }

    let input_count = match shading_type {
        ShadingType::FunctionBased => 2,
        _ => 1,
    };

    if functions
        .iter()
        .flatten()
        .any(|function| function.input_count() != input_count)
    {
        anyhow::bail!(ParseError::InvalidShading {
            reason: "function takes the wrong number of inputs",
        });
    }

    let total = total_output_count(functions);

    if total != 0 && total < component_count {
        anyhow::bail!(ParseError::InvalidShading {
            reason: "functions produce fewer outputs than the color space has components",
        });
    }

    Ok(())
}

impl SubtypeShading {
    fn from_dict(
        shading_type: ShadingType,
        dict: &mut Dictionary,
        resolver: &mut dyn Resolve,
    ) -> PdfResult<Self> {
        Ok(match shading_type {
            ShadingType::FunctionBased => {
                SubtypeShading::FunctionBased(FunctionBasedShading::from_dict(dict, resolver)?)
            }
            ShadingType::Axial => SubtypeShading::Axial(AxialShading::from_dict(dict, resolver)?),
            ShadingType::Radial => {
                SubtypeShading::Radial(RadialShading::from_dict(dict, resolver)?)
            }
            ShadingType::Freeform
            | ShadingType::Latticeform
            | ShadingType::CoonsPatchMesh
            | ShadingType::TensorProductPatchMesh => {
                anyhow::bail!(ParseError::InvalidShading {
                    reason: "mesh shadings must be streams",
                })
            }
        })
    }

    fn mesh_from_dict(
        shading_type: ShadingType,
        dict: &mut Dictionary,
        data: Vec<u8>,
        component_count: usize,
        resolver: &mut dyn Resolve,
    ) -> PdfResult<Self> {
        Ok(match shading_type {
            ShadingType::Freeform => SubtypeShading::Freeform(FreeformShading::from_dict(
                dict,
                data,
                component_count,
                resolver,
            )?),
            ShadingType::Latticeform => SubtypeShading::Latticeform(
                LatticeformShading::from_dict(dict, data, component_count, resolver)?,
            ),
            ShadingType::CoonsPatchMesh => SubtypeShading::CoonsPatchMesh(
                CoonsPatchMeshShading::from_dict(dict, data, component_count, resolver)?,
            ),
            ShadingType::TensorProductPatchMesh => SubtypeShading::TensorProductPatchMesh(
                TensorProductPatchMeshShading::from_dict(dict, data, component_count, resolver)?,
            ),
            ShadingType::FunctionBased | ShadingType::Axial | ShadingType::Radial => {
                anyhow::bail!(ParseError::InvalidShading {
                    reason: "not a mesh shading",
                })
            }
        })
    }
}

impl Shading {
    pub fn shading_type(&self) -> ShadingType {
        self.shading_type
    }

    pub fn color_space(&self) -> &ColorSpace {
        &self.color_space
    }

    pub fn background(&self) -> Option<&[f32]> {
        self.background.as_deref()
    }

    pub fn bbox(&self) -> Option<Rectangle> {
        self.bbox
    }

    pub fn anti_alias(&self) -> bool {
        self.anti_alias
    }

    pub fn functions(&self) -> &[Option<Arc<Function>>] {
        &self.functions
    }

    /// The number of values the function chain writes per evaluation, and the
    /// size of the buffer it writes into. `0` means the shading has functions
    /// but none of them produce anything, so nothing is drawn
    pub(crate) fn results_count(&self) -> usize {
        let total = total_output_count(&self.functions);

        if total == 0 {
            return 0;
        }

        total.max(self.color_space.component_count())
    }

    /// Rasterize into `bitmap`. `matrix` maps the shading's target space onto
    /// bitmap pixels
    pub(crate) fn draw(
        &self,
        bitmap: &mut Bitmap,
        matrix: Matrix,
        alpha: u8,
        options: RenderOptions,
    ) {
        if !self.functions.is_empty() && self.results_count() == 0 {
            log::debug!("skipping shading whose functions produce no output");
            return;
        }

        match &self.sub_type {
            SubtypeShading::FunctionBased(shading) => shading.draw(self, bitmap, matrix, alpha),
            SubtypeShading::Axial(shading) => shading.draw(self, bitmap, matrix, alpha),
            SubtypeShading::Radial(shading) => shading.draw(self, bitmap, matrix, alpha),
            SubtypeShading::Freeform(shading) => shading.draw(self, bitmap, matrix, alpha),
            SubtypeShading::Latticeform(shading) => shading.draw(self, bitmap, matrix, alpha),
            SubtypeShading::CoonsPatchMesh(shading) => {
                shading.draw(self, bitmap, matrix, alpha, !options.no_path_smooth)
            }
            SubtypeShading::TensorProductPatchMesh(shading) => {
                shading.draw(self, bitmap, matrix, alpha, !options.no_path_smooth)
            }
        }
    }
}

#[pdf_enum(Integer)]
pub enum ShadingType {
    FunctionBased = 1,
    Axial = 2,
    Radial = 3,

    /// Free-form Gouraud-shaded triangle mesh
    Freeform = 4,

    /// Lattice-form Gouraud-shaded triangle mesh
    Latticeform = 5,
    CoonsPatchMesh = 6,
    TensorProductPatchMesh = 7,
}

impl ShadingType {
    /// Mesh shadings read their geometry from the shading stream
    pub fn is_mesh(self) -> bool {
        matches!(
            self,
            ShadingType::Freeform
                | ShadingType::Latticeform
                | ShadingType::CoonsPatchMesh
                | ShadingType::TensorProductPatchMesh
        )
    }
}

/// The `[t0 t1]` parametric domain of axial and radial shadings
fn parametric_domain(dict: &mut Dictionary, resolver: &mut dyn Resolve) -> PdfResult<[f32; 2]> {
    Ok(match dict.get_object("Domain") {
        Some(obj) => crate::number_array::<2>(obj, resolver)?,
        None => [0.0, 1.0],
    })
}

/// Whether axial and radial shadings continue past their start and end
fn extend(dict: &mut Dictionary, resolver: &mut dyn Resolve) -> PdfResult<[bool; 2]> {
    let Some(arr) = dict.get_arr("Extend", resolver)? else {
        return Ok([false, false]);
    };

    crate::assert_len(&arr, 2)?;

    let mut extend = [false; 2];

    for (e, obj) in extend.iter_mut().zip(arr) {
        *e = resolver.assert_bool(obj)?;
    }

    Ok(extend)
}

/// Map a parametric position onto the step table. Positions before the start
/// or past the end only map to the first or last step when extended
pub(crate) fn step_index(t: f32, extend: [bool; 2]) -> Option<usize> {
    if t.is_nan() {
        return None;
    }

    if t < 0.0 {
        return extend[0].then_some(0);
    }

    if t > 1.0 {
        return extend[1].then_some(SHADING_STEPS - 1);
    }

    Some((t * (SHADING_STEPS - 1) as f32).round() as usize)
}
