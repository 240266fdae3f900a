use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::{error::PdfResult, objects::Dictionary, resolve::Resolve};

/// <https://www.adobe.com/content/dam/acom/en/devnet/postscript/pdfs/TN5603.Filters.pdf>
#[derive(Debug)]
pub struct FlateDecoderParams {
    /// The default value is 1 (Predictor::Unused)
    predictor: Predictor,

    /// Specifies the number of samples in the sampled row.
    ///
    /// The value of this key only has an effect on the filter if
    /// the value of `predictor` is greater than 1.
    ///
    /// The default value is 1
    columns: u32,

    /// Specifies the number of interleaved color components in a sample.
    ///
    /// The default value is 1
    colors: u32,

    /// The number of bits used to represent each component.
    ///
    /// The possible values are 1, 2, 4, 8, and 16
    ///
    /// The default value is 8
    bits_per_component: u32,
}

impl FlateDecoderParams {
    pub fn from_dict(mut dict: Dictionary, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let predictor = dict
            .get::<Predictor>("Predictor", resolver)?
            .unwrap_or(Predictor::Unused);
        let columns = dict.get::<u32>("Columns", resolver)?.unwrap_or(1);
        let colors = dict.get::<u32>("Colors", resolver)?.unwrap_or(1);
        let bits_per_component = dict.get::<u32>("BitsPerComponent", resolver)?.unwrap_or(8);

        if !matches!(bits_per_component, 1 | 2 | 4 | 8 | 16) {
            anyhow::bail!("invalid BitsPerComponent for FlateDecode: {}", bits_per_component);
        }

        Ok(Self {
            predictor,
            columns,
            colors,
            bits_per_component,
        })
    }

    fn bits_per_pixel(&self) -> usize {
        self.colors as usize * self.bits_per_component as usize
    }

    /// Rounded up, and at least 1, as the PNG predictors operate on whole bytes
    fn bytes_per_pixel(&self) -> usize {
        ((self.bits_per_pixel() + 7) / 8).max(1)
    }

    fn bytes_per_row(&self) -> usize {
        (self.bits_per_pixel() * self.columns as usize + 7) / 8
    }
}

#[pdf_enum(Integer)]
enum Predictor {
    /// No filter is applied *and* no byte precedes each row
    Unused = 1,

    /// TIFF Predictor 2
    Tiff = 2,

    /// No filter is applied
    None = 10,

    /// The pixel is subtracted by the pixel to the left of it
    Sub = 11,

    /// The pixel is subtracted by the pixel above it
    Up = 12,

    /// The pixel is subtracted by the average of the pixel to the left and above
    Average = 13,

    /// The pixel is subtracted by the pixel that comes out of a prediction algorithm
    Paeth = 14,

    /// A hybrid of all 4
    Optimum = 15,
}

#[derive(Debug)]
pub struct FlateDecoder {
    params: FlateDecoderParams,
    buffer: Vec<u8>,
}

impl FlateDecoder {
    pub fn new(buffer: &[u8], params: FlateDecoderParams) -> PdfResult<Self> {
        let mut decoder = ZlibDecoder::new(buffer);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;

        Ok(Self {
            buffer: out,
            params,
        })
    }

    pub fn decode(self) -> PdfResult<Vec<u8>> {
        match self.params.predictor {
            Predictor::Unused => Ok(self.buffer),
            Predictor::Tiff => anyhow::bail!("TIFF predictors are not supported"),
            // with the PNG predictors, every row carries its own filter type byte
            // and the `Predictor` value itself is only a hint
            _ => self.undo_png_predictors(),
        }
    }

    fn undo_png_predictors(&self) -> PdfResult<Vec<u8>> {
        let bytes_per_row = self.params.bytes_per_row();
        let bpp = self.params.bytes_per_pixel();

        let mut out = Vec::with_capacity(self.buffer.len());
        let mut row_above = vec![0; bytes_per_row];

        for chunk in self.buffer.chunks(bytes_per_row + 1) {
            let Some((&filter_type, row)) = chunk.split_first() else {
                continue;
            };

            let mut row = row.to_vec();

            match filter_type {
                0 => {}
                1 => Self::decode_sub(&mut row, bpp),
                2 => Self::decode_up(&mut row, &row_above),
                3 => Self::decode_average(&mut row, &row_above, bpp),
                4 => Self::decode_paeth(&mut row, &row_above, bpp),
                found => anyhow::bail!("invalid PNG filter type {}", found),
            }

            row_above[..row.len()].copy_from_slice(&row);
            out.extend_from_slice(&row);
        }

        Ok(out)
    }

    fn decode_sub(this_row: &mut [u8], bpp: usize) {
        // start at `bpp` because first pixel is unchanged
        for idx in bpp..this_row.len() {
            this_row[idx] = this_row[idx].wrapping_add(this_row[idx - bpp]);
        }
    }

    fn decode_up(this_row: &mut [u8], row_above: &[u8]) {
        for (byte, above) in this_row.iter_mut().zip(row_above) {
            *byte = byte.wrapping_add(*above);
        }
    }

    fn decode_average(this_row: &mut [u8], row_above: &[u8], bpp: usize) {
        for idx in 0..this_row.len() {
            let left = if idx >= bpp { this_row[idx - bpp] } else { 0 };
            let average = (u16::from(left) + u16::from(row_above[idx])) / 2;
            this_row[idx] = this_row[idx].wrapping_add(average as u8);
        }
    }

    fn decode_paeth(this_row: &mut [u8], row_above: &[u8], bpp: usize) {
        for idx in 0..this_row.len() {
            let (left, above_left) = if idx >= bpp {
                (this_row[idx - bpp], row_above[idx - bpp])
            } else {
                (0, 0)
            };

            let predicted = Self::paeth_predictor(
                i16::from(left),
                i16::from(row_above[idx]),
                i16::from(above_left),
            );

            this_row[idx] = this_row[idx].wrapping_add(predicted);
        }
    }

    fn paeth_predictor(a: i16, b: i16, c: i16) -> u8 {
        let p = a + b - c;
        let pa = (p - a).abs();
        let pb = (p - b).abs();
        let pc = (p - c).abs();

        // order here for ties is important
        if pa <= pb && pa <= pc {
            a as u8
        } else if pb <= pc {
            b as u8
        } else {
            c as u8
        }
    }
}
