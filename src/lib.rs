//! PDF function evaluation and shading rasterization.
//!
//! Shadings are loaded from an in-memory object graph ([`resolve::Resolve`]),
//! and drawn into a 32-bit ARGB [`render::Bitmap`] with [`render::render_shading`].

#[macro_use]
extern crate pdf_macro;

pub use error::{ParseError, PdfResult};

use objects::Object;
use resolve::Resolve;

pub mod color;
pub mod data_structures;
pub mod error;
pub mod filter;
pub mod function;
pub mod geometry;
pub mod objects;
mod parse_binary;
pub mod pattern;
pub mod render;
pub mod resolve;
pub mod shading;
pub mod stream;

/// Conversion from an object, following indirect references through `resolver`
pub trait FromObj: Sized {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self>;
}

impl FromObj for Object {
    fn from_obj(obj: Object, _resolver: &mut dyn Resolve) -> PdfResult<Self> {
        Ok(obj)
    }
}

impl FromObj for bool {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        resolver.assert_bool(obj)
    }
}

impl FromObj for i32 {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        resolver.assert_integer(obj)
    }
}

impl FromObj for u32 {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        resolver.assert_unsigned_integer(obj)
    }
}

impl FromObj for f32 {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        resolver.assert_number(obj)
    }
}

impl FromObj for objects::Dictionary {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        resolver.assert_dict(obj)
    }
}

impl FromObj for stream::Stream {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        resolver.assert_stream(obj)
    }
}

impl<T: FromObj> FromObj for Vec<T> {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        resolver
            .assert_arr(obj)?
            .into_iter()
            .map(|obj| T::from_obj(obj, resolver))
            .collect()
    }
}

pub(crate) fn assert_len(arr: &[Object], len: usize) -> PdfResult<()> {
    if arr.len() != len {
        anyhow::bail!(ParseError::ArrayOfInvalidLength {
            expected: len,
            found: arr.to_vec(),
        });
    }

    Ok(())
}

/// An array of exactly `N` numbers
pub(crate) fn number_array<const N: usize>(
    obj: Object,
    resolver: &mut dyn Resolve,
) -> PdfResult<[f32; N]> {
    let arr = resolver.assert_arr(obj)?;
    assert_len(&arr, N)?;

    let mut numbers = [0.0; N];

    for (n, obj) in numbers.iter_mut().zip(arr) {
        *n = resolver.assert_number(obj)?;
    }

    Ok(numbers)
}
