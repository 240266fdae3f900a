use std::sync::Arc;

use crate::{
    color::{ColorSpace, Rgb},
    data_structures::Matrix,
    error::{ParseError, PdfResult},
    function::{call_function_list, Function},
    geometry::Point,
    objects::Dictionary,
    parse_binary::BitReader,
    Resolve,
};

/// A mesh vertex, already transformed into bitmap space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeshVertex {
    pub position: Point,
    pub rgb: Rgb,
}

#[pdf_enum(Integer)]
pub(crate) enum BitsPerCoordinate {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
    Twelve = 12,
    Sixteen = 16,
    TwentyFour = 24,
    ThirtyTwo = 32,
}

#[pdf_enum(Integer)]
pub(crate) enum BitsPerComponent {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
    Twelve = 12,
    Sixteen = 16,
}

#[pdf_enum(Integer)]
pub(crate) enum BitsPerFlag {
    Two = 2,
    Four = 4,
    Eight = 8,
}

/// The packed layout of a mesh shading stream, shared by shading types 4 to 7
#[derive(Debug, Clone)]
pub(crate) struct MeshParams {
    /// The number of bits used to represent each vertex coordinate
    bits_per_coordinate: BitsPerCoordinate,

    /// The number of bits used to represent each colour component
    bits_per_component: BitsPerComponent,

    /// The number of bits used to represent the edge flag for each vertex. Absent
    /// for lattice-form meshes, which have no flags
    bits_per_flag: Option<BitsPerFlag>,

    /// `[xmin xmax ymin ymax c1min c1max ... cnmin cnmax]`, mapping the packed
    /// integers onto coordinates and colour components
    decode: Vec<f32>,

    /// Colour components per vertex: 1 when a function is present, otherwise
    /// one per component of the colour space
    component_count: usize,

    /// The decoded stream contents
    data: Vec<u8>,
}

impl MeshParams {
    pub fn from_dict(
        dict: &mut Dictionary,
        data: Vec<u8>,
        component_count: usize,
        has_flags: bool,
        resolver: &mut dyn Resolve,
    ) -> PdfResult<Self> {
        let bits_per_coordinate = dict.expect::<BitsPerCoordinate>("BitsPerCoordinate", resolver)?;
        let bits_per_component = dict.expect::<BitsPerComponent>("BitsPerComponent", resolver)?;
        let bits_per_flag = if has_flags {
            Some(dict.expect::<BitsPerFlag>("BitsPerFlag", resolver)?)
        } else {
            None
        };

        let decode = dict.expect::<Vec<f32>>("Decode", resolver)?;

        if decode.len() < 4 + 2 * component_count {
            anyhow::bail!(ParseError::InvalidShading {
                reason: "Decode must have a range for both coordinates and every color component",
            });
        }

        Ok(Self {
            bits_per_coordinate,
            bits_per_component,
            bits_per_flag,
            decode,
            component_count,
            data,
        })
    }
}

/// The largest value a field of `bits` bits can hold
fn max_value(bits: u32) -> f32 {
    ((1_u64 << bits) - 1) as f32
}

/// Sequential reader of the vertices or patches in a mesh shading stream
pub(crate) struct MeshStream<'a> {
    params: &'a MeshParams,
    reader: BitReader<'a>,
    functions: &'a [Option<Arc<Function>>],
    color_space: &'a ColorSpace,
    results: Vec<f32>,
    components: Vec<f32>,
}

impl<'a> MeshStream<'a> {
    pub fn new(
        params: &'a MeshParams,
        functions: &'a [Option<Arc<Function>>],
        color_space: &'a ColorSpace,
        results_count: usize,
    ) -> Self {
        Self {
            params,
            reader: BitReader::new(&params.data),
            functions,
            color_space,
            results: vec![0.0; results_count],
            components: vec![0.0; params.component_count],
        }
    }

    pub fn is_eof(&self) -> bool {
        self.reader.is_eof()
    }

    fn coordinate_bits(&self) -> u32 {
        self.params.bits_per_coordinate as u32
    }

    fn component_bits(&self) -> u32 {
        self.params.bits_per_component as u32
    }

    /// Only the low two bits of a flag are meaningful
    pub fn read_flag(&mut self) -> Option<u32> {
        let bits = self.params.bits_per_flag? as u32;

        self.reader.read(bits).map(|flag| flag & 3)
    }

    pub fn read_coords(&mut self) -> Option<Point> {
        let bits = self.coordinate_bits();
        let max = max_value(bits);

        let x = self.reader.read(bits)?;
        let y = self.reader.read(bits)?;

        let decode = &self.params.decode;

        Some(Point::new(
            decode[0] + x as f32 * (decode[1] - decode[0]) / max,
            decode[2] + y as f32 * (decode[3] - decode[2]) / max,
        ))
    }

    pub fn read_color(&mut self) -> Option<Rgb> {
        let bits = self.component_bits();
        let max = max_value(bits);

        for i in 0..self.params.component_count {
            let value = self.reader.read(bits)?;
            let min = self.params.decode[4 + 2 * i];
            let range = self.params.decode[5 + 2 * i] - min;

            self.components[i] = min + value as f32 * range / max;
        }

        if self.functions.is_empty() {
            return Some(self.color_space.rgb_or_black(&self.components));
        }

        self.results.fill(0.0);
        call_function_list(self.functions, &self.components, &mut self.results);

        Some(self.color_space.rgb_or_black(&self.results))
    }

    /// A free-form vertex: its edge flag, position and color. Each vertex
    /// starts on a byte boundary
    pub fn read_vertex(&mut self, matrix: Matrix) -> Option<(MeshVertex, u32)> {
        let flag = self.read_flag()?;
        let position = matrix * self.read_coords()?;
        let rgb = self.read_color()?;

        self.reader.byte_align();

        Some((MeshVertex { position, rgb }, flag))
    }

    /// A row of lattice vertices. `None` if the stream ends before the row is complete
    pub fn read_vertex_row(&mut self, matrix: Matrix, count: usize) -> Option<Vec<MeshVertex>> {
        let mut row = Vec::new();

        for _ in 0..count {
            let position = matrix * self.read_coords()?;
            let rgb = self.read_color()?;

            self.reader.byte_align();

            row.push(MeshVertex { position, rgb });
        }

        Some(row)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        objects::Object,
        resolve::ObjectStore,
        test_util::{dict, linear_function, numbers},
        FromObj,
    };

    use super::*;

    fn params(
        data: Vec<u8>,
        decode: &[f32],
        component_count: usize,
        has_flags: bool,
    ) -> MeshParams {
        let mut dict = dict([
            ("BitsPerCoordinate", Object::Integer(8)),
            ("BitsPerComponent", Object::Integer(8)),
            ("BitsPerFlag", Object::Integer(8)),
            ("Decode", numbers(decode)),
        ]);

        MeshParams::from_dict(&mut dict, data, component_count, has_flags, &mut ObjectStore::new())
            .unwrap()
    }

    #[test]
    fn read_rgb_vertex() {
        let params = params(
            vec![0, 0, 255, 255, 0, 0, 2, 255, 0, 255, 0, 0],
            &[0.0, 10.0, 0.0, 20.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
            3,
            true,
        );

        let mut stream = MeshStream::new(&params, &[], &ColorSpace::DeviceRGB, 0);

        let (vertex, flag) = stream.read_vertex(Matrix::identity()).unwrap();
        assert_eq!(flag, 0);
        assert_eq!(vertex.position, Point::new(0.0, 20.0));
        assert_eq!(vertex.rgb, Rgb::new(1.0, 0.0, 0.0));

        let (vertex, flag) = stream.read_vertex(Matrix::new_translation(1.0, 1.0)).unwrap();
        assert_eq!(flag, 2);
        assert_eq!(vertex.position, Point::new(11.0, 1.0));
        assert_eq!(vertex.rgb, Rgb::new(1.0, 0.0, 0.0));

        assert!(stream.is_eof());
        assert_eq!(stream.read_vertex(Matrix::identity()), None);
    }

    #[test]
    fn truncated_vertex() {
        let params = params(vec![0, 0, 255], &[0.0, 1.0, 0.0, 1.0, 0.0, 1.0], 1, true);

        let mut stream = MeshStream::new(&params, &[], &ColorSpace::DeviceGray, 0);

        assert_eq!(stream.read_vertex(Matrix::identity()), None);
    }

    #[test]
    fn colors_through_function() {
        let function = Function::from_obj(
            linear_function(&[0.0, 0.0, 1.0], &[1.0, 0.0, 0.0]),
            &mut ObjectStore::new(),
        )
        .unwrap();
        let functions = [Some(Arc::new(function))];

        let params = params(vec![0, 0, 255], &[0.0, 1.0, 0.0, 1.0, 0.0, 1.0], 1, false);

        let mut stream = MeshStream::new(&params, &functions, &ColorSpace::DeviceRGB, 3);

        let row = stream.read_vertex_row(Matrix::identity(), 1).unwrap();
        assert_eq!(row[0].rgb, Rgb::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn lattice_rows_must_be_complete() {
        let params = params(vec![0, 0, 255, 1, 1], &[0.0, 1.0, 0.0, 1.0, 0.0, 1.0], 1, false);

        let mut stream = MeshStream::new(&params, &[], &ColorSpace::DeviceGray, 0);

        assert_eq!(stream.read_vertex_row(Matrix::identity(), 2), None);
    }

    #[test]
    fn short_decode_is_rejected() {
        let mut dict = dict([
            ("BitsPerCoordinate", Object::Integer(8)),
            ("BitsPerComponent", Object::Integer(8)),
            ("BitsPerFlag", Object::Integer(8)),
            ("Decode", numbers(&[0.0, 1.0, 0.0, 1.0, 0.0, 1.0])),
        ]);

        let result = MeshParams::from_dict(&mut dict, Vec::new(), 3, true, &mut ObjectStore::new());
        assert!(result.is_err());
    }

    #[test]
    fn odd_bit_widths() {
        let mut dict = dict([
            ("BitsPerCoordinate", Object::Integer(4)),
            ("BitsPerComponent", Object::Integer(4)),
            ("BitsPerFlag", Object::Integer(2)),
            ("Decode", numbers(&[0.0, 15.0, 0.0, 15.0, 0.0, 1.0])),
        ]);

        // flag 01, x = 0b1010, y = 0b0101, gray = 0b1111, then padding
        let data = vec![0b0110_1001, 0b0111_1100];
        let params =
            MeshParams::from_dict(&mut dict, data, 1, true, &mut ObjectStore::new()).unwrap();

        let mut stream = MeshStream::new(&params, &[], &ColorSpace::DeviceGray, 0);
        let (vertex, flag) = stream.read_vertex(Matrix::identity()).unwrap();

        assert_eq!(flag, 1);
        assert_eq!(vertex.position, Point::new(10.0, 5.0));
        assert_eq!(vertex.rgb, Rgb::new(1.0, 1.0, 1.0));
        assert!(stream.is_eof());
    }
}
