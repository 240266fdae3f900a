use std::borrow::Cow;

use crate::{
    error::{ParseError, PdfResult},
    objects::{Dictionary, Object},
    resolve::Resolve,
    stream::StreamDict,
    FromObj,
};

use flate::{FlateDecoder, FlateDecoderParams};

pub mod ascii;
pub mod flate;

pub(crate) fn decode_stream<'a>(
    stream: &'a [u8],
    stream_dict: &StreamDict,
    resolver: &mut dyn Resolve,
) -> PdfResult<Cow<'a, [u8]>> {
    let filters = match stream_dict.filter.as_deref().cloned() {
        Some(obj) => one_or_many(obj, resolver, |obj, resolver| {
            FilterKind::from_obj(obj, resolver)
        })?,
        None => return Ok(Cow::Borrowed(stream)),
    };

    if filters.is_empty() {
        return Ok(Cow::Borrowed(stream));
    }

    let decode_parms = match stream_dict.decode_parms.as_deref().cloned() {
        Some(obj) => one_or_many(obj, resolver, |obj, resolver| match resolver.resolve(obj)? {
            Object::Null => Ok(None),
            obj => resolver.assert_dict(obj).map(Some),
        })?,
        None => Vec::new(),
    };

    let mut stream = stream.to_vec();

    for (idx, filter) in filters.into_iter().enumerate() {
        let decode_parms = decode_parms
            .get(idx)
            .cloned()
            .flatten()
            .unwrap_or_else(Dictionary::empty);

        stream = match filter {
            FilterKind::AsciiHex => ascii::decode_ascii_hex(&stream)?,
            FilterKind::Flate => {
                let params = FlateDecoderParams::from_dict(decode_parms, resolver)?;
                FlateDecoder::new(&stream, params)?.decode()?
            }
            other => anyhow::bail!(ParseError::UnsupportedFilter {
                filter: format!("{:?}", other),
            }),
        };
    }

    Ok(Cow::Owned(stream))
}

/// Values such as `Filter` may be given either directly or as an array
fn one_or_many<T>(
    obj: Object,
    resolver: &mut dyn Resolve,
    convert: impl Fn(Object, &mut dyn Resolve) -> PdfResult<T>,
) -> PdfResult<Vec<T>> {
    match resolver.resolve(obj)? {
        Object::Array(arr) => arr.into_iter().map(|obj| convert(obj, resolver)).collect(),
        obj => Ok(vec![convert(obj, resolver)?]),
    }
}

#[pdf_enum]
pub enum FilterKind {
    /// Decodes data encoded in an ASCII hexadecimal representation, reproducing
    /// the original binary data
    AsciiHex = "ASCIIHexDecode",

    /// Decodes data encoded in an ASCII base-85 representation, reproducing the
    /// original binary data
    Ascii85 = "ASCII85Decode",

    /// Decompresses data encoded using the LZW (Lempel-ZivWelch) adaptive compression
    /// method, reproducing the original text or binary data
    Lzw = "LZWDecode",

    /// Decompresses data encoded using the zlib/deflate compression method,
    /// reproducing the original text or binary data
    Flate = "FlateDecode",

    /// Decompresses data encoded using a byte-oriented run-length encoding algorithm,
    /// reproducing the original text or binary data
    RunLength = "RunLengthDecode",

    /// Decompresses data encoded using the CCITT facsimile standard
    CcittFax = "CCITTFaxDecode",

    /// Decompresses data encoded using the JBIG2 standard
    Jbig2 = "JBIG2Decode",

    /// Decompresses data encoded using a DCT (discrete cosine transform) technique
    /// based on the JPEG standard
    Dct = "DCTDecode",

    /// Decompresses data encoded using the wavelet-based JPEG2000 standard
    Jpx = "JPXDecode",

    /// Decrypts data encrypted by a security handler
    Crypt = "Crypt",
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use flate2::{write::ZlibEncoder, Compression};

    use super::*;
    use crate::{resolve::ObjectStore, stream::Stream};

    #[test]
    fn unfiltered_stream_is_borrowed() {
        let mut store = ObjectStore::new();
        let stream = Stream::new(Dictionary::empty(), vec![1, 2, 3]);
        assert!(matches!(stream.decode(&mut store).unwrap(), Cow::Borrowed(&[1, 2, 3])));
    }

    #[test]
    fn filter_chain_is_applied_in_order() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[0x00, 0x7f, 0xff]).unwrap();
        let compressed = encoder.finish().unwrap();

        let hex = compressed
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<String>()
            + ">";

        let dict = Dictionary::from_iter([(
            "Filter",
            Object::Array(vec![
                Object::name("ASCIIHexDecode"),
                Object::name("FlateDecode"),
            ]),
        )]);

        let mut store = ObjectStore::new();
        let stream = Stream::new(dict, hex.into_bytes());
        assert_eq!(&*stream.decode(&mut store).unwrap(), &[0x00, 0x7f, 0xff]);
    }

    #[test]
    fn unsupported_filter_is_an_error() {
        let dict = Dictionary::from_iter([("Filter", Object::name("DCTDecode"))]);
        let mut store = ObjectStore::new();
        assert!(Stream::new(dict, vec![0xff]).decode(&mut store).is_err());
    }
}
