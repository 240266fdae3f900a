use std::{collections::HashSet, sync::Arc};

use crate::{
    error::{ParseError, PdfResult},
    objects::{Dictionary, Object, ObjectType, Reference},
    resolve::Resolve,
    stream::Stream,
    FromObj,
};

use self::{
    exponential_interpolation::ExponentialInterpolationFunction,
    postscript_calculator::PostScriptCalculatorFunction, sampled::SampledFunction,
    stitching::StitchingFunction,
};

pub use postscript_calculator::PostScriptError;

mod exponential_interpolation;
mod postscript_calculator;
mod sampled;
mod stitching;

/// Functions with more inputs than this are rejected when loading
pub(crate) const MAX_INPUTS: usize = 32;

#[derive(Debug, Clone)]
pub struct Function {
    /// An array of 2 * m numbers, where m shall be the number of input values.
    /// For each i from 0 to m - 1, Domain2i shall be less than or equal to Domain2i+1,
    /// and the ith input value, xi, shall lie in the interval Domain2i <= xi <= Domain2i+1.
    /// Input values outside the declared domain shall be clipped to the nearest boundary
    /// value.
    domain: Vec<f32>,

    /// An array of 2 * n numbers, where n shall be the number of output values. For
    /// each j from 0 to n - 1, Range2j shall be less than or equal to Range2j+1,
    /// and the jth output value, yj , shall lie in the interval Range2j <= yj <= Range2j+1.
    /// Output values outside the declared range shall be clipped to the nearest
    /// boundary value. If this entry is absent, no clipping shall be done.
    range: Option<Vec<f32>>,

    output_count: usize,

    subtype: FunctionSubtype,
}

#[derive(Debug)]
pub(crate) enum StreamOrDict {
    Stream(Stream),
    Dict(Dictionary),
}

impl StreamOrDict {
    pub fn dict(&mut self) -> &mut Dictionary {
        match self {
            Self::Dict(dict) => dict,
            Self::Stream(stream) => &mut stream.dict.other,
        }
    }

    pub fn expect_stream(self) -> PdfResult<Stream> {
        match self {
            Self::Dict(dict) => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Stream,
                found: Object::Dictionary(dict),
            }),
            Self::Stream(stream) => Ok(stream),
        }
    }
}

impl FromObj for Function {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        Function::load(obj, resolver, &mut HashSet::new())
    }
}

impl Function {
    /// Load a function, failing if it (indirectly) contains itself.
    ///
    /// `visited` holds the references currently being loaded further up the
    /// call stack. Each reference is removed again once it is done, so the same
    /// function may appear more than once as long as it does not contain itself.
    pub(crate) fn load(
        obj: Object,
        resolver: &mut dyn Resolve,
        visited: &mut HashSet<Reference>,
    ) -> PdfResult<Self> {
        if let Object::Reference(reference) = obj {
            if !visited.insert(reference) {
                anyhow::bail!(ParseError::CyclicReference { reference });
            }

            let function = resolver
                .lex_object_from_reference(reference)
                .and_then(|obj| Self::load(obj, resolver, visited));

            visited.remove(&reference);

            return function;
        }

        let mut stream_or_dict = match obj {
            Object::Stream(stream) => StreamOrDict::Stream(stream),
            Object::Dictionary(dict) => StreamOrDict::Dict(dict),
            found => anyhow::bail!(ParseError::MismatchedObjectTypeAny {
                expected: &[ObjectType::Dictionary, ObjectType::Stream],
                found,
            }),
        };

        let dict = stream_or_dict.dict();

        let function_type = dict.expect::<FunctionType>("FunctionType", resolver)?;

        let domain = dict.expect::<Vec<f32>>("Domain", resolver)?;
        validate_intervals(&domain, "Domain must be a non-empty array of min/max pairs")?;

        let range = dict.get::<Vec<f32>>("Range", resolver)?;
        if let Some(range) = &range {
            validate_intervals(range, "Range must be a non-empty array of min/max pairs")?;
        }

        let input_count = domain.len() / 2;

        if input_count > MAX_INPUTS {
            anyhow::bail!(ParseError::InvalidFunction {
                reason: "too many inputs",
            });
        }

        let subtype = match function_type {
            FunctionType::Sampled => {
                let range = range.as_deref().ok_or(ParseError::InvalidFunction {
                    reason: "sampled functions require a Range",
                })?;

                FunctionSubtype::Sampled(SampledFunction::from_stream(
                    stream_or_dict.expect_stream()?,
                    &domain,
                    range,
                    resolver,
                )?)
            }
            FunctionType::ExponentialInterpolation => FunctionSubtype::ExponentialInterpolation(
                ExponentialInterpolationFunction::from_dict(dict, &domain, resolver)?,
            ),
            FunctionType::Stitching => FunctionSubtype::Stitching(StitchingFunction::from_dict(
                dict, &domain, resolver, visited,
            )?),
            FunctionType::PostScriptCalculator => {
                if range.is_none() {
                    anyhow::bail!(ParseError::InvalidFunction {
                        reason: "PostScript calculator functions require a Range",
                    });
                }

                FunctionSubtype::PostScriptCalculator(PostScriptCalculatorFunction::from_stream(
                    stream_or_dict.expect_stream()?,
                    resolver,
                )?)
            }
        };

        let output_count = match &range {
            Some(range) => range.len() / 2,
            None => subtype.natural_output_count().unwrap_or(0),
        };

        if let Some(natural) = subtype.natural_output_count() {
            if natural != output_count {
                anyhow::bail!(ParseError::InvalidFunction {
                    reason: "Range disagrees with the number of outputs",
                });
            }
        }

        Ok(Self {
            domain,
            range,
            output_count,
            subtype,
        })
    }

    pub fn input_count(&self) -> usize {
        self.domain.len() / 2
    }

    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// The `(min, max)` interval of input `i`
    pub fn domain(&self, i: usize) -> Option<(f32, f32)> {
        Some((*self.domain.get(2 * i)?, *self.domain.get(2 * i + 1)?))
    }

    /// Evaluate the function, writing `output_count` values to the start of
    /// `results`. Returns the number of values written.
    ///
    /// Inputs are clipped to the domain and outputs to the range.
    pub fn call(&self, inputs: &[f32], results: &mut [f32]) -> PdfResult<usize> {
        let input_count = self.input_count();

        if inputs.len() != input_count {
            anyhow::bail!(ParseError::ArityMismatch {
                expected: input_count,
                found: inputs.len(),
            });
        }

        if results.len() < self.output_count {
            anyhow::bail!(ParseError::ArityMismatch {
                expected: self.output_count,
                found: results.len(),
            });
        }

        let mut clipped = [0.0; MAX_INPUTS];

        for (i, (clipped, &input)) in clipped.iter_mut().zip(inputs).enumerate() {
            let (min, max) = (self.domain[2 * i], self.domain[2 * i + 1]);
            *clipped = clip(input, min, max);
        }

        let results = &mut results[..self.output_count];

        self.subtype.call(&clipped[..input_count], results)?;

        if let Some(range) = &self.range {
            for (result, bounds) in results.iter_mut().zip(range.chunks_exact(2)) {
                *result = clip(*result, bounds[0], bounds[1]);
            }
        }

        Ok(self.output_count)
    }
}

#[derive(Debug, Clone)]
enum FunctionSubtype {
    Sampled(SampledFunction),
    ExponentialInterpolation(ExponentialInterpolationFunction),
    Stitching(StitchingFunction),
    PostScriptCalculator(PostScriptCalculatorFunction),
}

impl FunctionSubtype {
    /// The number of outputs implied by the function's own parameters, for the
    /// function types that do not need a `Range` to know it
    fn natural_output_count(&self) -> Option<usize> {
        match self {
            Self::ExponentialInterpolation(f) => Some(f.output_count()),
            Self::Stitching(f) => Some(f.output_count()),
            Self::Sampled(..) | Self::PostScriptCalculator(..) => None,
        }
    }

    fn call(&self, inputs: &[f32], results: &mut [f32]) -> PdfResult<()> {
        match self {
            Self::Sampled(f) => {
                f.call(inputs, results);
                Ok(())
            }
            Self::ExponentialInterpolation(f) => {
                f.call(inputs[0], results);
                Ok(())
            }
            Self::Stitching(f) => f.call(inputs[0], results),
            Self::PostScriptCalculator(f) => {
                f.call(inputs, results)
                    .map_err(|err| anyhow::Error::new(ParseError::from(err)))
            }
        }
    }
}

#[pdf_enum(Integer)]
enum FunctionType {
    Sampled = 0,
    ExponentialInterpolation = 2,
    Stitching = 3,
    PostScriptCalculator = 4,
}

/// Load a `Function` entry, which is either a single function or an array of
/// them. Array entries that fail to load are left as holes (`None`) and logged.
pub(crate) fn load_function_list(
    obj: Object,
    resolver: &mut dyn Resolve,
) -> PdfResult<Vec<Option<Arc<Function>>>> {
    match resolver.resolve(obj)? {
        Object::Array(arr) => Ok(arr
            .into_iter()
            .enumerate()
            .map(|(idx, obj)| match Function::from_obj(obj, resolver) {
                Ok(function) => Some(Arc::new(function)),
                Err(err) => {
                    log::warn!("ignoring function {} of function array: {}", idx, err);
                    None
                }
            })
            .collect()),
        obj => Ok(vec![Some(Arc::new(Function::from_obj(obj, resolver)?))]),
    }
}

/// Evaluate every present function against the same inputs, writing their
/// outputs one after the other. Holes take no slots, and a function that
/// fails gives its slots to the next function.
pub(crate) fn call_function_list(
    functions: &[Option<Arc<Function>>],
    inputs: &[f32],
    results: &mut [f32],
) {
    let mut offset = 0;

    for function in functions.iter().flatten() {
        let end = offset + function.output_count();

        let Some(slots) = results.get_mut(offset..end) else {
            break;
        };

        if let Err(err) = function.call(inputs, slots) {
            log::trace!("function evaluation failed: {}", err);
            continue;
        }

        offset = end;
    }
}

/// Total outputs of the present functions in a function list
pub(crate) fn total_output_count(functions: &[Option<Arc<Function>>]) -> usize {
    functions.iter().flatten().map(|f| f.output_count()).sum()
}

/// Map `x` from `[xmin, xmax]` onto `[ymin, ymax]`. An empty source interval
/// maps everything to `ymin`
pub fn interpolate(x: f32, xmin: f32, xmax: f32, ymin: f32, ymax: f32) -> f32 {
    if xmax == xmin {
        return ymin;
    }

    ymin + (x - xmin) * (ymax - ymin) / (xmax - xmin)
}

/// Like `f32::clamp`, but never panics on reversed or NaN bounds
fn clip(x: f32, min: f32, max: f32) -> f32 {
    if x < min {
        min
    } else if x > max {
        max
    } else {
        x
    }
}

fn validate_intervals(values: &[f32], reason: &'static str) -> PdfResult<()> {
    let valid = !values.is_empty()
        && values.len() % 2 == 0
        && values.chunks_exact(2).all(|pair| pair[0] <= pair[1]);

    if !valid {
        anyhow::bail!(ParseError::InvalidFunction { reason });
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        resolve::ObjectStore,
        test_util::{dict, linear_function, numbers},
    };

    fn load(obj: Object) -> Function {
        Function::from_obj(obj, &mut ObjectStore::new()).unwrap()
    }

    fn call(function: &Function, inputs: &[f32]) -> Vec<f32> {
        let mut results = vec![0.0; function.output_count()];
        function.call(inputs, &mut results).unwrap();
        results
    }

    fn assert_close(a: &[f32], b: &[f32]) {
        assert_eq!(a.len(), b.len());
        for (a, b) in a.iter().zip(b) {
            assert!((a - b).abs() < 1e-5, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn interpolate_endpoints_are_exact() {
        assert_eq!(interpolate(2.0, 2.0, 6.0, -1.0, 3.0), -1.0);
        assert_eq!(interpolate(6.0, 2.0, 6.0, -1.0, 3.0), 3.0);
        assert_eq!(interpolate(4.0, 2.0, 6.0, -1.0, 3.0), 1.0);
    }

    #[test]
    fn interpolate_is_monotonic() {
        let mut previous = f32::NEG_INFINITY;

        for i in 0..=100 {
            let y = interpolate(i as f32 / 100.0, 0.0, 1.0, 10.0, 20.0);
            assert!(y >= previous);
            previous = y;
        }
    }

    #[test]
    fn interpolate_empty_interval_is_ymin() {
        assert_eq!(interpolate(5.0, 1.0, 1.0, 7.0, 9.0), 7.0);
    }

    #[test]
    fn exponential_linear_endpoints_and_midpoint() {
        let f = load(linear_function(&[1.0, 0.0, 0.0], &[0.0, 0.0, 1.0]));

        assert_eq!(f.input_count(), 1);
        assert_eq!(f.output_count(), 3);
        assert_close(&call(&f, &[0.0]), &[1.0, 0.0, 0.0]);
        assert_close(&call(&f, &[1.0]), &[0.0, 0.0, 1.0]);
        assert_close(&call(&f, &[0.5]), &[0.5, 0.0, 0.5]);
    }

    #[test]
    fn inputs_are_clipped_to_domain() {
        let f = load(linear_function(&[0.0], &[1.0]));

        assert_close(&call(&f, &[-3.0]), &[0.0]);
        assert_close(&call(&f, &[3.0]), &[1.0]);
    }

    #[test]
    fn outputs_are_clipped_to_range() {
        let f = load(Object::Dictionary(dict([
            ("FunctionType", Object::Integer(2)),
            ("Domain", numbers(&[0.0, 1.0])),
            ("Range", numbers(&[0.0, 0.5])),
            ("N", Object::Integer(1)),
        ])));

        assert_close(&call(&f, &[1.0]), &[0.5]);
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        let f = load(linear_function(&[0.0], &[1.0]));
        let mut results = [0.0; 1];

        let err = f.call(&[0.0, 1.0], &mut results).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ParseError>(),
            Some(ParseError::ArityMismatch {
                expected: 1,
                found: 2
            })
        ));

        let mut no_room: [f32; 0] = [];
        assert!(f.call(&[0.0], &mut no_room).is_err());
    }

    #[test]
    fn odd_length_domain_is_rejected() {
        let obj = Object::Dictionary(dict([
            ("FunctionType", Object::Integer(2)),
            ("Domain", numbers(&[0.0, 1.0, 2.0])),
            ("N", Object::Integer(1)),
        ]));

        assert!(Function::from_obj(obj, &mut ObjectStore::new()).is_err());
    }

    #[test]
    fn unknown_function_type() {
        let obj = Object::Dictionary(dict([
            ("FunctionType", Object::Integer(1)),
            ("Domain", numbers(&[0.0, 1.0])),
        ]));

        let err = Function::from_obj(obj, &mut ObjectStore::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ParseError>(),
            Some(ParseError::UnrecognizedVariant { .. })
        ));
    }

    #[test]
    fn self_referential_stitching_function_is_cyclic() {
        let mut store = ObjectStore::new();
        let reference = store.reserve();

        store.insert_at(
            reference,
            Object::Dictionary(dict([
                ("FunctionType", Object::Integer(3)),
                ("Domain", numbers(&[0.0, 1.0])),
                ("Functions", Object::Array(vec![Object::Reference(reference)])),
                ("Bounds", Object::Array(Vec::new())),
                ("Encode", numbers(&[0.0, 1.0])),
            ])),
        );

        let err = Function::from_obj(Object::Reference(reference), &mut store).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ParseError>(),
            Some(ParseError::CyclicReference { reference: r }) if *r == reference
        ));
    }

    #[test]
    fn shared_subfunction_is_not_a_cycle() {
        let mut store = ObjectStore::new();
        let shared = store.insert(linear_function(&[0.0], &[1.0]));

        let obj = Object::Dictionary(dict([
            ("FunctionType", Object::Integer(3)),
            ("Domain", numbers(&[0.0, 1.0])),
            (
                "Functions",
                Object::Array(vec![Object::Reference(shared), Object::Reference(shared)]),
            ),
            ("Bounds", numbers(&[0.5])),
            ("Encode", numbers(&[0.0, 1.0, 0.0, 1.0])),
        ]));

        let f = Function::from_obj(obj, &mut store).unwrap();
        assert_eq!(f.output_count(), 1);
    }

    #[test]
    fn function_list_leaves_holes() {
        crate::test_util::init_logging();

        let mut store = ObjectStore::new();
        let list = Object::Array(vec![
            linear_function(&[0.0], &[1.0]),
            Object::Integer(3),
            linear_function(&[1.0], &[0.0]),
        ]);

        let functions = load_function_list(list, &mut store).unwrap();
        assert_eq!(functions.len(), 3);
        assert!(functions[1].is_none());
        assert_eq!(total_output_count(&functions), 2);

        let mut results = [0.0; 2];
        call_function_list(&functions, &[0.25], &mut results);
        assert_close(&results, &[0.25, 0.75]);
    }

    #[test]
    fn failed_function_gives_up_its_slots() {
        let mut store = ObjectStore::new();

        let two_inputs = Object::Stream(crate::stream::Stream::new(
            dict([
                ("FunctionType", Object::Integer(4)),
                ("Domain", numbers(&[0.0, 1.0, 0.0, 1.0])),
                ("Range", numbers(&[0.0, 1.0])),
            ]),
            b"{ add }".to_vec(),
        ));

        let list = Object::Array(vec![two_inputs, linear_function(&[0.0], &[1.0])]);
        let functions = load_function_list(list, &mut store).unwrap();

        let mut results = [9.0; 2];
        call_function_list(&functions, &[0.25], &mut results);
        assert_close(&results, &[0.25, 9.0]);
    }

    #[test]
    fn single_function_failure_is_an_error() {
        assert!(load_function_list(Object::Integer(3), &mut ObjectStore::new()).is_err());
    }
}
