use std::sync::Arc;

use crate::{
    color::ColorSpace,
    function::{call_function_list, Function},
};

use super::SHADING_STEPS;

/// Sample the function chain across `[t_min, t_max]` into a color lookup table.
///
/// Entry `i` holds the color at `t_min + (t_max - t_min) * i / 256`, so the last
/// entry falls just short of `t_max`. `results_count` must be at least the
/// number of outputs of `functions` and the number of components of
/// `color_space`.
pub(crate) fn shading_steps(
    t_min: f32,
    t_max: f32,
    functions: &[Option<Arc<Function>>],
    color_space: &ColorSpace,
    alpha: u8,
    results_count: usize,
) -> [u32; SHADING_STEPS] {
    let mut steps = [0; SHADING_STEPS];
    let mut results = vec![0.0; results_count];

    let diff = t_max - t_min;

    for (i, step) in steps.iter_mut().enumerate() {
        let t = diff * i as f32 / SHADING_STEPS as f32 + t_min;

        results.fill(0.0);
        call_function_list(functions, &[t], &mut results);

        *step = color_space.rgb_or_black(&results).to_argb(alpha);
    }

    steps
}

#[cfg(test)]
mod test {
    use crate::{
        color::Color,
        objects::Object,
        resolve::ObjectStore,
        stream::Stream,
        test_util::{dict, linear_function, numbers},
        FromObj,
    };

    use super::*;

    fn function(obj: Object) -> Option<Arc<Function>> {
        Some(Arc::new(Function::from_obj(obj, &mut ObjectStore::new()).unwrap()))
    }

    #[test]
    fn first_and_last_steps() {
        let functions = [function(linear_function(&[1.0, 0.0, 0.0], &[0.0, 0.0, 1.0]))];

        let steps = shading_steps(0.0, 1.0, &functions, &ColorSpace::DeviceRGB, 255, 3);

        assert_eq!(steps.len(), 256);
        assert_eq!(steps[0], Color::RED);

        // t = 255 / 256
        assert_eq!(steps[255], 0xff_01_00_fe);
    }

    #[test]
    fn one_function_per_component() {
        let functions = [
            function(linear_function(&[0.0], &[1.0])),
            function(linear_function(&[1.0], &[1.0])),
            function(linear_function(&[0.0], &[0.0])),
        ];

        let steps = shading_steps(0.0, 1.0, &functions, &ColorSpace::DeviceRGB, 0x80, 3);

        assert_eq!(steps[0], 0x80_00_ff_00);
        assert_eq!(steps[128], 0x80_80_ff_00);
    }

    #[test]
    fn holes_leave_components_at_zero() {
        let functions = [
            function(linear_function(&[1.0], &[1.0])),
            None,
            function(linear_function(&[1.0], &[1.0])),
        ];

        let steps = shading_steps(0.0, 1.0, &functions, &ColorSpace::DeviceRGB, 255, 3);

        // outputs are packed, so the second function fills the green slot
        assert_eq!(steps[10], 0xff_ff_ff_00);
    }

    #[test]
    fn domain_is_sampled_from_t_min() {
        let functions = [function(linear_function(&[0.0], &[1.0]))];

        let steps = shading_steps(0.5, 1.0, &functions, &ColorSpace::DeviceGray, 255, 1);

        assert_eq!(steps[0], 0xff_80_80_80);
    }

    #[test]
    fn failed_sample_is_black() {
        // divides by zero at t = 0.5
        let program = Stream::new(
            dict([
                ("FunctionType", Object::Integer(4)),
                ("Domain", numbers(&[0.0, 1.0])),
                ("Range", numbers(&[0.0, 1.0])),
            ]),
            b"{ 0.5 sub 1 exch div pop 1 }".to_vec(),
        );
        let functions = [function(Object::Stream(program))];

        let steps = shading_steps(0.0, 1.0, &functions, &ColorSpace::DeviceGray, 255, 1);

        assert_eq!(steps[127], Color::WHITE);
        assert_eq!(steps[128], Color::BLACK);
        assert_eq!(steps[129], Color::WHITE);
    }
}
