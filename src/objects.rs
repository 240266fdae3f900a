use std::collections::HashMap;

use crate::{error::ParseError, resolve::Resolve, stream::Stream, FromObj, PdfResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Null,
    Boolean,
    Integer,
    Real,
    String,
    Name,
    Array,
    Stream,
    Dictionary,
    Reference,
}

#[derive(Debug, Clone)]
pub enum Object {
    Null,
    True,
    False,
    Integer(i32),
    Real(f32),
    String(String),
    Name(String),
    Array(Vec<Self>),
    Stream(Stream),
    Dictionary(Dictionary),
    Reference(Reference),
}

impl Object {
    pub fn name(name: &str) -> Self {
        Object::Name(name.to_owned())
    }

    pub fn bool(b: bool) -> Self {
        if b {
            Object::True
        } else {
            Object::False
        }
    }

    /// An array of reals
    pub fn number_array(numbers: &[f32]) -> Self {
        Object::Array(numbers.iter().copied().map(Object::Real).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }
}

/// A reference to a non-existing object is considered a `null`
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct Reference {
    pub object_number: usize,
    pub generation: usize,
}

impl Reference {
    pub const fn new(object_number: usize, generation: usize) -> Self {
        Self {
            object_number,
            generation,
        }
    }
}

/// Entries are removed as they are read, so each key can be consumed once
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    dict: HashMap<String, Object>,
}

impl Dictionary {
    pub fn new(dict: HashMap<String, Object>) -> Self {
        Self { dict }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, obj: Object) -> Option<Object> {
        self.dict.insert(key.to_owned(), obj)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.dict.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    pub fn get_object(&mut self, key: &str) -> Option<Object> {
        self.dict.remove(key)
    }

    pub fn expect_object(&mut self, key: &'static str) -> PdfResult<Object> {
        match self.dict.remove(key) {
            Some(obj) => Ok(obj),
            None => anyhow::bail!(ParseError::MissingRequiredKey { key }),
        }
    }

    pub fn get<T: FromObj>(
        &mut self,
        key: &str,
        resolver: &mut dyn Resolve,
    ) -> PdfResult<Option<T>> {
        self.dict
            .remove(key)
            .map(|obj| T::from_obj(obj, resolver))
            .transpose()
    }

    pub fn expect<T: FromObj>(
        &mut self,
        key: &'static str,
        resolver: &mut dyn Resolve,
    ) -> PdfResult<T> {
        let obj = self.expect_object(key)?;
        T::from_obj(obj, resolver)
    }

    pub fn get_arr(
        &mut self,
        key: &str,
        resolver: &mut dyn Resolve,
    ) -> PdfResult<Option<Vec<Object>>> {
        self.dict
            .remove(key)
            .map(|obj| resolver.assert_arr(obj))
            .transpose()
    }

    pub fn expect_arr(
        &mut self,
        key: &'static str,
        resolver: &mut dyn Resolve,
    ) -> PdfResult<Vec<Object>> {
        let obj = self.expect_object(key)?;
        resolver.assert_arr(obj)
    }
}

impl FromIterator<(&'static str, Object)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (&'static str, Object)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(key, obj)| (key.to_owned(), obj))
                .collect(),
        )
    }
}
