use crate::error::PdfResult;

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Whitespace is ignored and `>` ends the data. A final odd digit behaves as
/// if it were followed by `0`
pub(crate) fn decode_ascii_hex(stream: &[u8]) -> PdfResult<Vec<u8>> {
    let mut buffer = Vec::with_capacity(stream.len() / 2);
    let mut high: Option<u8> = None;

    for &c in stream.iter().filter(|b| !b.is_ascii_whitespace()) {
        if c == b'>' {
            break;
        }

        let Some(digit) = hex_digit(c) else {
            anyhow::bail!("invalid character in ASCIIHexDecode stream: {:?}", c as char);
        };

        match high.take() {
            Some(high) => buffer.push((high << 4) | digit),
            None => high = Some(digit),
        }
    }

    if let Some(high) = high {
        buffer.push(high << 4);
    }

    Ok(buffer)
}
