use crate::{
    error::{ParseError, PdfResult},
    objects::Dictionary,
    resolve::Resolve,
};

/// Type 2 functions (PDF 1.3) include a set of parameters that define an exponential
/// interpolation of one input value and n output values
#[derive(Debug, Clone)]
pub struct ExponentialInterpolationFunction {
    /// An array of n numbers that shall define the function result when x = 0.0.
    ///
    /// Default value: [0.0]
    c0: Vec<f32>,

    /// An array of n numbers that shall define the function result when x = 1.0.
    ///
    /// Default value: [1.0]
    c1: Vec<f32>,

    /// The interpolation exponent. Each input value x shall return n values, given by
    /// yj = C0j + xN * (C1j - C0j), for 0 <= j < n
    n: f32,
}

impl ExponentialInterpolationFunction {
    pub fn from_dict(
        dict: &mut Dictionary,
        domain: &[f32],
        resolver: &mut dyn Resolve,
    ) -> PdfResult<Self> {
        if domain.len() != 2 {
            anyhow::bail!(ParseError::InvalidFunction {
                reason: "exponential interpolation functions take a single input",
            });
        }

        let c0 = dict
            .get::<Vec<f32>>("C0", resolver)?
            .unwrap_or_else(|| vec![0.0]);
        let c1 = dict
            .get::<Vec<f32>>("C1", resolver)?
            .unwrap_or_else(|| vec![1.0]);

        if c0.len() != c1.len() {
            anyhow::bail!(ParseError::InvalidFunction {
                reason: "C0 and C1 must have the same length",
            });
        }

        let n = dict.expect::<f32>("N", resolver)?;

        // the domain must keep x^N real and finite
        if n.fract() != 0.0 && domain[0] < 0.0 {
            anyhow::bail!(ParseError::InvalidFunction {
                reason: "a non-integer exponent requires a non-negative domain",
            });
        }

        if n < 0.0 && domain[0] <= 0.0 && domain[1] >= 0.0 {
            anyhow::bail!(ParseError::InvalidFunction {
                reason: "a negative exponent requires a domain excluding zero",
            });
        }

        Ok(Self { c0, c1, n })
    }

    pub fn output_count(&self) -> usize {
        self.c0.len()
    }

    pub fn call(&self, x: f32, results: &mut [f32]) {
        let xn = if self.n == 1.0 { x } else { x.powf(self.n) };

        for ((result, c0), c1) in results.iter_mut().zip(&self.c0).zip(&self.c1) {
            *result = c0 + xn * (c1 - c0);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{objects::Object, resolve::ObjectStore, test_util::{dict, numbers}};

    fn parse(entries: Dictionary, domain: &[f32]) -> PdfResult<ExponentialInterpolationFunction> {
        let mut entries = entries;
        ExponentialInterpolationFunction::from_dict(&mut entries, domain, &mut ObjectStore::new())
    }

    #[test]
    fn defaults_to_identity() {
        let f = parse(dict([("N", Object::Integer(1))]), &[0.0, 1.0]).unwrap();
        let mut results = [0.0];

        f.call(0.3, &mut results);
        assert_eq!(results, [0.3]);
    }

    #[test]
    fn quadratic() {
        let f = parse(
            dict([
                ("C0", numbers(&[0.0, 1.0])),
                ("C1", numbers(&[1.0, 0.0])),
                ("N", Object::Integer(2)),
            ]),
            &[0.0, 1.0],
        )
        .unwrap();

        let mut results = [0.0; 2];
        f.call(0.5, &mut results);
        assert_eq!(results, [0.25, 0.75]);
    }

    #[test]
    fn mismatched_c0_c1() {
        let entries = dict([
            ("C0", numbers(&[0.0, 1.0])),
            ("C1", numbers(&[1.0])),
            ("N", Object::Integer(1)),
        ]);

        assert!(parse(entries, &[0.0, 1.0]).is_err());
    }

    #[test]
    fn fractional_exponent_over_negative_domain() {
        let entries = dict([("N", Object::Real(0.5))]);
        assert!(parse(entries, &[-1.0, 1.0]).is_err());
    }

    #[test]
    fn negative_exponent_over_zero() {
        let entries = dict([("N", Object::Integer(-1))]);
        assert!(parse(entries, &[0.0, 1.0]).is_err());

        let entries = dict([("N", Object::Integer(-1))]);
        assert!(parse(entries, &[1.0, 2.0]).is_ok());
    }

    #[test]
    fn two_inputs_rejected() {
        let entries = dict([("N", Object::Integer(1))]);
        assert!(parse(entries, &[0.0, 1.0, 0.0, 1.0]).is_err());
    }
}
