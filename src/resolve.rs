use std::collections::HashMap;

use crate::{
    error::{ParseError, PdfResult},
    objects::{Dictionary, Object, ObjectType, Reference},
    stream::Stream,
};

/// Longest chain of references-to-references followed before giving up
const MAX_REFERENCE_CHAIN: usize = 32;

pub trait Resolve {
    fn lex_object_from_reference(&mut self, reference: Reference) -> PdfResult<Object>;

    /// Follow references until reaching a direct object
    fn resolve(&mut self, mut obj: Object) -> PdfResult<Object> {
        let mut depth = 0;

        while let Object::Reference(reference) = obj {
            depth += 1;

            if depth > MAX_REFERENCE_CHAIN {
                anyhow::bail!(ParseError::CyclicReference { reference });
            }

            obj = self.lex_object_from_reference(reference)?;
        }

        Ok(obj)
    }

    fn assert_integer(&mut self, obj: Object) -> PdfResult<i32> {
        match self.resolve(obj)? {
            Object::Integer(i) => Ok(i),
            found => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Integer,
                found,
            }),
        }
    }

    fn assert_unsigned_integer(&mut self, obj: Object) -> PdfResult<u32> {
        let i = self.assert_integer(obj)?;
        Ok(u32::try_from(i).map_err(ParseError::from)?)
    }

    /// Either an integer, or a real
    fn assert_number(&mut self, obj: Object) -> PdfResult<f32> {
        match self.resolve(obj)? {
            Object::Integer(i) => Ok(i as f32),
            Object::Real(r) => Ok(r),
            found => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Real,
                found,
            }),
        }
    }

    fn assert_dict(&mut self, obj: Object) -> PdfResult<Dictionary> {
        match self.resolve(obj)? {
            Object::Dictionary(d) => Ok(d),
            found => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Dictionary,
                found,
            }),
        }
    }

    fn assert_name(&mut self, obj: Object) -> PdfResult<String> {
        match self.resolve(obj)? {
            Object::Name(n) => Ok(n),
            found => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Name,
                found,
            }),
        }
    }

    fn assert_arr(&mut self, obj: Object) -> PdfResult<Vec<Object>> {
        match self.resolve(obj)? {
            Object::Array(a) => Ok(a),
            found => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Array,
                found,
            }),
        }
    }

    fn assert_bool(&mut self, obj: Object) -> PdfResult<bool> {
        match self.resolve(obj)? {
            Object::True => Ok(true),
            Object::False => Ok(false),
            found => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Boolean,
                found,
            }),
        }
    }

    fn assert_stream(&mut self, obj: Object) -> PdfResult<Stream> {
        match self.resolve(obj)? {
            Object::Stream(s) => Ok(s),
            found => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Stream,
                found,
            }),
        }
    }
}

/// Indirect objects held in memory, keyed by reference
#[derive(Debug, Default)]
pub struct ObjectStore {
    objects: HashMap<Reference, Object>,
    next_object_number: usize,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            next_object_number: 1,
        }
    }

    /// Allocate a reference without giving it a value yet. Until
    /// [`ObjectStore::insert_at`] is called, the reference resolves to `null`
    pub fn reserve(&mut self) -> Reference {
        let reference = Reference::new(self.next_object_number.max(1), 0);
        self.next_object_number = reference.object_number + 1;
        reference
    }

    pub fn insert(&mut self, obj: Object) -> Reference {
        let reference = self.reserve();
        self.objects.insert(reference, obj);
        reference
    }

    pub fn insert_at(&mut self, reference: Reference, obj: Object) {
        self.next_object_number = self.next_object_number.max(reference.object_number + 1);
        self.objects.insert(reference, obj);
    }
}

impl Resolve for ObjectStore {
    fn lex_object_from_reference(&mut self, reference: Reference) -> PdfResult<Object> {
        Ok(self.objects.get(&reference).cloned().unwrap_or(Object::Null))
    }
}
