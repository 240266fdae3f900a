use bitvec::prelude::*;

use crate::{
    error::{ParseError, PdfResult},
    parse_binary::read_bits_at,
    resolve::Resolve,
    stream::Stream,
};

use super::interpolate;

/// Sampled functions with more inputs than this are rejected, as every call
/// visits up to 2^m table entries per output
const MAX_SAMPLED_INPUTS: usize = 16;

/// Type 0 functions use a sequence of sample values (contained in a stream) to provide an
/// approximation for functions whose domains and ranges are bounded. The samples are organized
/// as an m-dimensional table in which each entry has n components.
#[derive(Debug, Clone)]
pub struct SampledFunction {
    /// An array of m positive integers that shall specify the number of samples in each
    /// input dimension of the sample table
    size: Vec<u32>,

    /// The number of bits that shall represent each sample. (If the function has multiple
    /// output values, each one shall occupy BitsPerSample bits.)
    bits_per_sample: BitsPerSample,

    /// A copy of the function's `Domain`, which `encode` maps from
    domain: Vec<f32>,

    /// An array of 2 * m numbers specifying the linear mapping of input values into the domain
    /// of the function's sample table.
    ///
    /// Default value: [0 (Size0 - 1) 0 (Size1 - 1) ...]
    encode: Vec<f32>,

    /// An array of 2 * n numbers specifying the linear mapping of sample values into the range
    /// appropriate for the function's output values
    ///
    /// Default value: same as the value of Range
    decode: Vec<f32>,

    /// The decoded sample table
    samples: Vec<u8>,
}

#[pdf_enum(Integer)]
#[derive(Default)]
enum InterpolationOrder {
    #[default]
    Linear = 1,
    Cubic = 3,
}

#[pdf_enum(Integer)]
enum BitsPerSample {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
    Twelve = 12,
    Sixteen = 16,
    TwentyFour = 24,
    ThirtyTwo = 32,
}

impl SampledFunction {
    pub fn from_stream(
        mut stream: Stream,
        domain: &[f32],
        range: &[f32],
        resolver: &mut dyn Resolve,
    ) -> PdfResult<Self> {
        let input_count = domain.len() / 2;
        let output_count = range.len() / 2;

        if input_count > MAX_SAMPLED_INPUTS {
            anyhow::bail!(ParseError::InvalidFunction {
                reason: "too many inputs for a sampled function",
            });
        }

        let samples = stream.decode(resolver)?.into_owned();
        let dict = &mut stream.dict.other;

        let size = dict.expect::<Vec<u32>>("Size", resolver)?;

        if size.len() != input_count || size.contains(&0) {
            anyhow::bail!(ParseError::InvalidFunction {
                reason: "Size must hold a positive entry for every input",
            });
        }

        let bits_per_sample = dict.expect::<BitsPerSample>("BitsPerSample", resolver)?;

        // The order of interpolation between samples. Valid values shall be 1 and 3,
        // specifying linear and cubic spline interpolation, respectively
        let order = dict
            .get::<InterpolationOrder>("Order", resolver)?
            .unwrap_or_default();

        if order == InterpolationOrder::Cubic {
            log::debug!("cubic sampled function will be interpolated linearly");
        }

        let encode = match dict.get::<Vec<f32>>("Encode", resolver)? {
            Some(encode) => encode,
            None => size
                .iter()
                .flat_map(|&i| [0.0, (i - 1) as f32])
                .collect(),
        };

        if encode.len() != 2 * input_count {
            anyhow::bail!(ParseError::InvalidFunction {
                reason: "Encode must hold a pair for every input",
            });
        }

        let decode = dict
            .get::<Vec<f32>>("Decode", resolver)?
            .unwrap_or_else(|| range.to_vec());

        if decode.len() != 2 * output_count {
            anyhow::bail!(ParseError::InvalidFunction {
                reason: "Decode must hold a pair for every output",
            });
        }

        let required_bits = size
            .iter()
            .try_fold(output_count * bits_per_sample as usize, |acc, &n| {
                acc.checked_mul(n as usize)
            });

        match required_bits {
            Some(bits) if bits <= samples.len().saturating_mul(8) => {}
            _ => anyhow::bail!(ParseError::InvalidFunction {
                reason: "sample table is shorter than Size requires",
            }),
        }

        Ok(Self {
            size,
            bits_per_sample,
            domain: domain.to_vec(),
            encode,
            decode,
            samples,
        })
    }

    fn output_count(&self) -> usize {
        self.decode.len() / 2
    }

    /// Multilinear interpolation between the samples surrounding the encoded
    /// input. Cubic interpolation is approximated linearly
    pub fn call(&self, inputs: &[f32], results: &mut [f32]) {
        let bits = BitSlice::<u8, Msb0>::from_slice(&self.samples);
        let bits_per_sample = self.bits_per_sample as u32;
        let max_sample = ((1u64 << bits_per_sample) - 1) as f32;
        let output_count = self.output_count();

        let m = inputs.len();

        let mut index = [0usize; MAX_SAMPLED_INPUTS];
        let mut fraction = [0.0f32; MAX_SAMPLED_INPUTS];
        let mut stride = [0usize; MAX_SAMPLED_INPUTS];

        // dimensions where the input falls strictly between two samples
        let mut active = [0usize; MAX_SAMPLED_INPUTS];
        let mut active_count = 0;

        let mut step = 1;

        for i in 0..m {
            let last = (self.size[i] - 1) as f32;
            let e = interpolate(
                inputs[i],
                self.domain[2 * i],
                self.domain[2 * i + 1],
                self.encode[2 * i],
                self.encode[2 * i + 1],
            );
            let e = if e.is_nan() { 0.0 } else { e.clamp(0.0, last) };

            let floor = e.floor();
            index[i] = floor as usize;
            fraction[i] = e - floor;
            stride[i] = step;
            step *= self.size[i] as usize;

            if fraction[i] > 0.0 {
                active[active_count] = i;
                active_count += 1;
            }
        }

        let base = (0..m).map(|i| index[i] * stride[i]).sum::<usize>();

        for (j, result) in results.iter_mut().enumerate().take(output_count) {
            let mut value = 0.0;

            for corner in 0..(1usize << active_count) {
                let mut weight = 1.0;
                let mut offset = base;

                for (bit, &dim) in active[..active_count].iter().enumerate() {
                    if corner & (1 << bit) == 0 {
                        weight *= 1.0 - fraction[dim];
                    } else {
                        weight *= fraction[dim];
                        offset += stride[dim];
                    }
                }

                let sample_idx = offset * output_count + j;
                let bit_offset = sample_idx * bits_per_sample as usize;
                let sample = read_bits_at(bits, bit_offset, bits_per_sample).unwrap_or(0);

                value += weight * sample as f32;
            }

            *result = interpolate(
                value,
                0.0,
                max_sample,
                self.decode[2 * j],
                self.decode[2 * j + 1],
            );
        }
    }
}
