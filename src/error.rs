use std::{fmt, num::TryFromIntError};

use crate::{
    function::PostScriptError,
    objects::{Object, ObjectType, Reference},
};

pub type PdfResult<T> = anyhow::Result<T>;

#[derive(Debug)]
pub enum ParseError {
    MismatchedObjectType {
        expected: ObjectType,
        found: Object,
    },
    MismatchedObjectTypeAny {
        expected: &'static [ObjectType],
        found: Object,
    },
    MissingRequiredKey {
        key: &'static str,
    },
    ArrayOfInvalidLength {
        expected: usize,
        found: Vec<Object>,
    },
    UnrecognizedVariant {
        found: String,
        ty: &'static str,
    },
    UnsupportedFilter {
        filter: String,
    },
    InvalidFunction {
        reason: &'static str,
    },
    InvalidShading {
        reason: &'static str,
    },
    InvalidColorSpace {
        reason: &'static str,
    },
    /// A color space family that cannot be converted to RGB
    UnsupportedColorSpace {
        name: &'static str,
    },
    /// An indirect object refers back to an object that is still being loaded
    CyclicReference {
        reference: Reference,
    },
    /// A function was called with the wrong number of inputs, or with too few
    /// output slots
    ArityMismatch {
        expected: usize,
        found: usize,
    },
    IntegerConversion(TryFromIntError),
    PostScript(PostScriptError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#?}", self)
    }
}

impl std::error::Error for ParseError {}

impl From<TryFromIntError> for ParseError {
    fn from(err: TryFromIntError) -> Self {
        Self::IntegerConversion(err)
    }
}

impl From<PostScriptError> for ParseError {
    fn from(err: PostScriptError) -> Self {
        Self::PostScript(err)
    }
}
