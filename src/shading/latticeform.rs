use crate::{
    data_structures::Matrix,
    error::{ParseError, PdfResult},
    objects::Dictionary,
    render::Bitmap,
    Resolve,
};

use super::{
    gouraud::draw_gouraud,
    mesh_stream::{MeshParams, MeshStream},
    Shading,
};

/// Type 5 shadings (lattice-form Gouraud-shaded triangle meshes) are similar to type
/// 4, but instead of using freeform geometry, their vertices are arranged in a
/// pseudorectangular lattice, which is topologically equivalent to a rectangular
/// grid. The vertices are organized into rows, which need not be geometrically linear
#[derive(Debug, Clone)]
pub(crate) struct LatticeformShading {
    mesh: MeshParams,

    /// The number of vertices in each row of the lattice; the value shall be
    /// greater than or equal to 2. The number of rows need not be specified.
    vertices_per_row: usize,
}

impl LatticeformShading {
    pub fn from_dict(
        dict: &mut Dictionary,
        data: Vec<u8>,
        component_count: usize,
        resolver: &mut dyn Resolve,
    ) -> PdfResult<Self> {
        let vertices_per_row = dict.expect::<u32>("VerticesPerRow", resolver)? as usize;

        if vertices_per_row < 2 {
            anyhow::bail!(ParseError::InvalidShading {
                reason: "a lattice needs at least two vertices per row",
            });
        }

        let mesh = MeshParams::from_dict(dict, data, component_count, false, resolver)?;

        Ok(Self {
            mesh,
            vertices_per_row,
        })
    }

    /// Each cell between two consecutive rows is split into two triangles
    pub fn draw(&self, shading: &Shading, bitmap: &mut Bitmap, matrix: Matrix, alpha: u8) {
        let mut stream = MeshStream::new(
            &self.mesh,
            shading.functions(),
            shading.color_space(),
            shading.results_count(),
        );

        let Some(mut previous) = stream.read_vertex_row(matrix, self.vertices_per_row) else {
            return;
        };

        while !stream.is_eof() {
            let Some(current) = stream.read_vertex_row(matrix, self.vertices_per_row) else {
                break;
            };

            for i in 1..self.vertices_per_row {
                let mut triangle = [previous[i], current[i - 1], previous[i - 1]];
                draw_gouraud(bitmap, alpha, &triangle);

                triangle[2] = current[i];
                draw_gouraud(bitmap, alpha, &triangle);
            }

            previous = current;
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        color::Color,
        objects::Object,
        resolve::ObjectStore,
        stream::Stream,
        test_util::{dict, numbers},
        FromObj,
    };

    use super::*;

    fn gray_lattice(vertices_per_row: i32, data: Vec<u8>) -> PdfResult<Shading> {
        let dict = dict([
            ("ShadingType", Object::Integer(5)),
            ("ColorSpace", Object::name("DeviceGray")),
            ("BitsPerCoordinate", Object::Integer(8)),
            ("BitsPerComponent", Object::Integer(8)),
            ("VerticesPerRow", Object::Integer(vertices_per_row)),
            ("Decode", numbers(&[0.0, 255.0, 0.0, 255.0, 0.0, 1.0])),
        ]);

        Shading::from_obj(Object::Stream(Stream::new(dict, data)), &mut ObjectStore::new())
    }

    #[test]
    fn two_by_two_lattice_fills_square() {
        let shading = gray_lattice(
            2,
            vec![
                0, 0, 255, 8, 0, 255, //
                0, 8, 255, 8, 8, 255, //
            ],
        )
        .unwrap();

        let mut bitmap = Bitmap::new(10, 10);
        shading.draw(&mut bitmap, Matrix::identity(), 255, Default::default());

        assert_eq!(bitmap.pixel(0, 0), Some(Color::WHITE));
        assert_eq!(bitmap.pixel(7, 7), Some(Color::WHITE));
        assert_eq!(bitmap.pixel(9, 9), Some(0));
    }

    #[test]
    fn single_row_draws_nothing() {
        let shading = gray_lattice(2, vec![0, 0, 255, 8, 0, 255]).unwrap();

        let mut bitmap = Bitmap::new(10, 10);
        shading.draw(&mut bitmap, Matrix::identity(), 255, Default::default());

        assert!(bitmap.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn one_vertex_per_row_is_rejected() {
        assert!(gray_lattice(1, Vec::new()).is_err());
    }

    #[test]
    fn row_longer_than_stream_draws_nothing() {
        let shading = gray_lattice(i32::MAX, vec![0; 12]).unwrap();

        let mut bitmap = Bitmap::new(10, 10);
        shading.draw(&mut bitmap, Matrix::identity(), 255, Default::default());

        assert!(bitmap.pixels().iter().all(|&p| p == 0));
    }
}
