use crate::{
    data_structures::Matrix, error::PdfResult, objects::Dictionary, render::Bitmap, Resolve,
};

use super::{coons_patch_mesh::draw_patch_mesh, mesh_stream::MeshParams, Shading};

/// Type 7 shadings (tensor-product patch meshes) are identical to type 6, except that
/// they are based on a bicubic tensor-product patch defined by 16 control points
/// instead of the 12 control points that define a Coons patch. The shading dictionaries
/// representing the two patch types differ only in the value of the ShadingType entry
/// and in the number of control points specified for each patch in the data stream.
#[derive(Debug, Clone)]
pub(crate) struct TensorProductPatchMeshShading {
    mesh: MeshParams,
}

impl TensorProductPatchMeshShading {
    pub fn from_dict(
        dict: &mut Dictionary,
        data: Vec<u8>,
        component_count: usize,
        resolver: &mut dyn Resolve,
    ) -> PdfResult<Self> {
        let mesh = MeshParams::from_dict(dict, data, component_count, true, resolver)?;

        Ok(Self { mesh })
    }

    pub fn draw(
        &self,
        shading: &Shading,
        bitmap: &mut Bitmap,
        matrix: Matrix,
        alpha: u8,
        full_cover: bool,
    ) {
        draw_patch_mesh(shading, &self.mesh, bitmap, matrix, alpha, full_cover, 16);
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

    #[test]
    fn interior_points_are_read_and_skipped() {
        let dict = dict([
            ("ShadingType", Object::Integer(7)),
            ("ColorSpace", Object::name("DeviceRGB")),
            ("BitsPerCoordinate", Object::Integer(8)),
            ("BitsPerComponent", Object::Integer(8)),
            ("BitsPerFlag", Object::Integer(8)),
            (
                "Decode",
                numbers(&[0.0, 255.0, 0.0, 255.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]),
            ),
        ]);

        let mut data = vec![0];
        data.extend_from_slice(&[
            0, 0, 0, 3, 0, 6, 0, 9, //
            3, 9, 6, 9, 9, 9, 9, 6, //
            9, 3, 9, 0, 6, 0, 3, 0, //
            // interior control points
            3, 3, 3, 6, 6, 6, 6, 3, //
        ]);
        data.extend_from_slice(&[0, 0, 255].repeat(4));

        let shading =
            Shading::from_obj(Object::Stream(Stream::new(dict, data)), &mut ObjectStore::new())
                .unwrap();

        let mut bitmap = Bitmap::new(12, 12);
        shading.draw(&mut bitmap, Matrix::identity(), 255, Default::default());

        assert_eq!(bitmap.pixel(4, 4), Some(Color::BLUE));
        assert_eq!(bitmap.pixel(11, 11), Some(0));
    }
}
