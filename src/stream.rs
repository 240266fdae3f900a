use std::{borrow::Cow, fmt};

use crate::{
    error::PdfResult,
    filter::decode_stream,
    objects::{Dictionary, Object},
    resolve::Resolve,
};

#[derive(Clone)]
pub struct Stream {
    pub(crate) dict: StreamDict,
    pub(crate) stream: Vec<u8>,
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("dict", &self.dict)
            .field("stream", &format!("[ {} bytes ]", self.stream.len()))
            .finish()
    }
}

impl Stream {
    /// `stream` holds the raw bytes between `stream` and `endstream`, so
    /// `Length` is not needed and is discarded
    pub fn new(mut dict: Dictionary, stream: Vec<u8>) -> Self {
        dict.get_object("Length");

        let filter = dict.get_object("Filter").map(Box::new);
        let decode_parms = dict.get_object("DecodeParms").map(Box::new);

        Self {
            dict: StreamDict {
                filter,
                decode_parms,
                other: dict,
            },
            stream,
        }
    }

    /// The stream contents with every filter undone
    pub fn decode(&self, resolver: &mut dyn Resolve) -> PdfResult<Cow<'_, [u8]>> {
        decode_stream(&self.stream, &self.dict, resolver)
    }
}

#[derive(Debug, Clone)]
pub struct StreamDict {
    /// A name or an array of names
    pub filter: Option<Box<Object>>,

    /// A dictionary or an array of dictionaries (entries may be `null`)
    pub decode_parms: Option<Box<Object>>,

    /// Entries specific to the kind of stream
    pub other: Dictionary,
}
