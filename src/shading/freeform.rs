use crate::{
    data_structures::Matrix, error::PdfResult, objects::Dictionary, render::Bitmap, Resolve,
};

use super::{
    gouraud::draw_gouraud,
    mesh_stream::{MeshParams, MeshStream},
    MeshVertex, Shading,
};

/// Type 4 shadings (free-form Gouraud-shaded triangle meshes) are commonly used to
/// represent complex coloured and shaded three-dimensional shapes. The area to be
/// shaded is defined by a path composed entirely of triangles. The colour at each
/// vertex of the triangles is specified, and a technique known as Gouraud interpolation
/// is used to colour the interiors. The interpolation functions defining the shading may
/// be linear or nonlinear
#[derive(Debug, Clone)]
pub(crate) struct FreeformShading {
    mesh: MeshParams,
}

impl FreeformShading {
    pub fn from_dict(
        dict: &mut Dictionary,
        data: Vec<u8>,
        component_count: usize,
        resolver: &mut dyn Resolve,
    ) -> PdfResult<Self> {
        let mesh = MeshParams::from_dict(dict, data, component_count, true, resolver)?;

        Ok(Self { mesh })
    }

    /// The edge flag of each vertex says how it joins the previous triangle:
    ///
    ///  * `0` starts a new triangle, with the next two vertices (whose flags
    ///    are ignored)
    ///  * `1` shares the edge between the second and third vertices of the
    ///    previous triangle
    ///  * `2` shares the edge between the first and third vertices of the
    ///    previous triangle
    pub fn draw(&self, shading: &Shading, bitmap: &mut Bitmap, matrix: Matrix, alpha: u8) {
        let mut stream = MeshStream::new(
            &self.mesh,
            shading.functions(),
            shading.color_space(),
            shading.results_count(),
        );

        let mut triangle = [MeshVertex::default(); 3];
        let mut has_triangle = false;

        while !stream.is_eof() {
            let Some((vertex, flag)) = stream.read_vertex(matrix) else {
                break;
            };

            match flag {
                0 => {
                    triangle[0] = vertex;

                    let Some((second, _)) = stream.read_vertex(matrix) else {
                        break;
                    };
                    let Some((third, _)) = stream.read_vertex(matrix) else {
                        break;
                    };

                    triangle[1] = second;
                    triangle[2] = third;
                    has_triangle = true;
                }
                _ if !has_triangle => {
                    log::trace!("ignoring vertex with edge flag {} before any triangle", flag);
                    continue;
                }
                1 => {
                    triangle[0] = triangle[1];
                    triangle[1] = triangle[2];
                    triangle[2] = vertex;
                }
                _ => {
                    triangle[1] = triangle[2];
                    triangle[2] = vertex;
                }
            }

            draw_gouraud(bitmap, alpha, &triangle);
        }
    }
}
