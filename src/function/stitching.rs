use std::collections::HashSet;

use crate::{
    error::{ParseError, PdfResult},
    objects::{Dictionary, Reference},
    resolve::Resolve,
};

use super::{interpolate, Function};

/// Type 3 functions (PDF 1.3) define a stitching of the subdomains of several 1-input functions to
/// produce a single new 1-input function. Since the resulting stitching function is a 1-input function,
/// the domain is given by a two-element array, [Domain0 Domain1].
#[derive(Debug, Clone)]
pub struct StitchingFunction {
    /// An array of k 1-input functions that shall make up the stitching function. The output
    /// dimensionality of all functions shall be the same, and compatible with the value of Range if Range
    /// is present
    functions: Vec<Function>,

    /// The k - 1 `Bounds`, with `Domain0` prepended and `Domain1` appended, so
    /// that function `i` covers `bounds[i]..bounds[i + 1]`
    bounds: Vec<f32>,

    /// An array of 2 * k numbers that, taken in pairs, shall map each subset of the domain defined by
    /// Domain and the Bounds array to the domain of the corresponding function
    encode: Vec<f32>,
}

impl StitchingFunction {
    pub fn from_dict(
        dict: &mut Dictionary,
        domain: &[f32],
        resolver: &mut dyn Resolve,
        visited: &mut HashSet<Reference>,
    ) -> PdfResult<Self> {
        let &[domain_min, domain_max] = domain else {
            anyhow::bail!(ParseError::InvalidFunction {
                reason: "stitching functions take a single input",
            });
        };

        let functions = dict
            .expect_arr("Functions", resolver)?
            .into_iter()
            .map(|obj| Function::load(obj, resolver, visited))
            .collect::<PdfResult<Vec<Function>>>()?;

        let Some(first) = functions.first() else {
            anyhow::bail!(ParseError::InvalidFunction {
                reason: "stitching function without subfunctions",
            });
        };

        let output_count = first.output_count();

        if functions
            .iter()
            .any(|f| f.input_count() != 1 || f.output_count() != output_count)
        {
            anyhow::bail!(ParseError::InvalidFunction {
                reason: "stitched functions must take one input and agree on their outputs",
            });
        }

        let k = functions.len();

        let inner_bounds = dict.expect::<Vec<f32>>("Bounds", resolver)?;

        if inner_bounds.len() != k - 1 {
            anyhow::bail!(ParseError::InvalidFunction {
                reason: "Bounds must have one entry fewer than Functions",
            });
        }

        let mut bounds = Vec::with_capacity(k + 1);
        bounds.push(domain_min);
        bounds.extend(inner_bounds);
        bounds.push(domain_max);

        if !bounds.windows(2).all(|pair| pair[0] <= pair[1]) {
            anyhow::bail!(ParseError::InvalidFunction {
                reason: "Bounds must be increasing and inside Domain",
            });
        }

        let encode = dict.expect::<Vec<f32>>("Encode", resolver)?;

        if encode.len() != 2 * k {
            anyhow::bail!(ParseError::InvalidFunction {
                reason: "Encode must hold a pair for every function",
            });
        }

        Ok(Self {
            functions,
            bounds,
            encode,
        })
    }

    pub fn output_count(&self) -> usize {
        self.functions[0].output_count()
    }

    /// A value on a bound belongs to the interval starting there
    pub fn call(&self, x: f32, results: &mut [f32]) -> PdfResult<()> {
        let k = self.functions.len();

        let i = self.bounds[1..k]
            .iter()
            .position(|&bound| x < bound)
            .unwrap_or(k - 1);

        let encoded = interpolate(
            x,
            self.bounds[i],
            self.bounds[i + 1],
            self.encode[2 * i],
            self.encode[2 * i + 1],
        );

        self.functions[i].call(&[encoded], results)?;

        Ok(())
    }
}
