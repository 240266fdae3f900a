mod bitmap;

pub use bitmap::Bitmap;

use crate::{
    data_structures::{IntRect, Matrix},
    pattern::ShadingPattern,
};

/// How the rendered shading is turned into device pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Colors as the shading computes them
    #[default]
    Normal,

    /// Every color channel is replaced by the pixel's coverage, for rendering
    /// soft masks
    Alpha,

    /// Colors are converted to their luminance
    Gray,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub color_mode: ColorMode,

    /// Fill patch pieces by pixel centre only, rather than painting every
    /// pixel they touch
    pub no_path_smooth: bool,
}

/// Paint `pattern` onto `device`
///
/// `matrix` maps the pattern's coordinate space onto device pixels, and is
/// applied after the pattern's own matrix. Nothing outside `clip_rect`, or
/// outside the shading's `BBox`, is touched. The shading is rendered into its
/// own buffer first and then blended over `device`.
pub fn render_shading(
    device: &mut Bitmap,
    pattern: &ShadingPattern,
    matrix: Matrix,
    clip_rect: IntRect,
    alpha: u8,
    options: RenderOptions,
) {
    let shading = pattern.shading();
    let matrix = pattern.matrix() * matrix;

    let background = shading
        .background()
        .filter(|_| !pattern.is_shading_object())
        .filter(|background| background.len() >= shading.color_space().component_count())
        .map(|background| shading.color_space().rgb_or_black(background).to_argb(255));

    let mut clip = clip_rect.intersect(&IntRect::from_size(device.width(), device.height()));

    if let Some(bbox) = shading.bbox() {
        clip = clip.intersect(&matrix.transform_rect(&bbox).outer_rect());
    }

    if clip.is_empty() {
        log::debug!("skipping shading outside of the clip rectangle");
        return;
    }

    let mut buffer = Bitmap::new(clip.width(), clip.height());

    if let Some(background) = background {
        buffer.clear(background);
    }

    let to_buffer = matrix * Matrix::new_translation(-clip.left as f32, -clip.top as f32);

    shading.draw(&mut buffer, to_buffer, alpha, options);

    match options.color_mode {
        ColorMode::Normal => {}
        ColorMode::Alpha => buffer.set_color_from_alpha(),
        ColorMode::Gray => buffer.convert_to_gray(),
    }

    device.composite(&buffer, clip.left, clip.top);
}

#[cfg(test)]
mod test {
    use crate::{
        color::Color,
        objects::{Dictionary, Object},
        resolve::ObjectStore,
        shading::Shading,
        test_util::{dict, linear_function, numbers},
        FromObj,
    };

    use super::*;

    const LAST_STEP: u32 = 0xff_01_00_fe;

    fn red_to_blue(coords: &[f32]) -> Dictionary {
        dict([
            ("ShadingType", Object::Integer(2)),
            ("ColorSpace", Object::name("DeviceRGB")),
            ("Coords", numbers(coords)),
            ("Function", linear_function(&[1.0, 0.0, 0.0], &[0.0, 0.0, 1.0])),
        ])
    }

    fn pattern(shading: Dictionary) -> ShadingPattern {
        ShadingPattern::from_obj(
            Object::Dictionary(dict([
                ("PatternType", Object::Integer(2)),
                ("Shading", Object::Dictionary(shading)),
            ])),
            &mut ObjectStore::new(),
        )
        .unwrap()
    }

    fn shading_object(shading: Dictionary) -> ShadingPattern {
        let shading =
            Shading::from_obj(Object::Dictionary(shading), &mut ObjectStore::new()).unwrap();

        ShadingPattern::from_shading(shading, Matrix::identity())
    }

    fn render(pattern: &ShadingPattern, device: &mut Bitmap, options: RenderOptions) {
        let clip = IntRect::from_size(device.width(), device.height());

        render_shading(device, pattern, Matrix::identity(), clip, 255, options);
    }

    #[test]
    fn red_to_blue_axial() {
        crate::test_util::init_logging();

        let pattern = pattern(red_to_blue(&[0.0, 0.0, 99.0, 0.0]));

        let mut device = Bitmap::new(110, 10);
        device.clear(Color::WHITE);

        render(&pattern, &mut device, RenderOptions::default());

        for y in 0..10 {
            assert_eq!(device.pixel(0, y), Some(Color::RED));
            assert_eq!(device.pixel(99, y), Some(LAST_STEP));
            assert_eq!(device.pixel(100, y), Some(Color::WHITE));
            assert_eq!(device.pixel(109, y), Some(Color::WHITE));
        }
    }

    #[test]
    fn red_to_blue_across_whole_bitmap() {
        let pattern = pattern(red_to_blue(&[0.0, 0.0, 100.0, 0.0]));

        let mut device = Bitmap::new(100, 10);
        render(&pattern, &mut device, RenderOptions::default());

        for y in 0..10 {
            assert_eq!(device.pixel(0, y), Some(Color::RED));

            let last = device.pixel(99, y).unwrap();
            assert_eq!(last >> 24, 0xff);
            assert!((last >> 16) & 0xff <= 8);
            assert_eq!((last >> 8) & 0xff, 0);
            assert!(last & 0xff >= 0xf7);
        }
    }

    #[test]
    fn matrix_moves_shading() {
        let pattern = pattern(red_to_blue(&[0.0, 0.0, 9.0, 0.0]));

        let mut device = Bitmap::new(40, 1);
        render_shading(
            &mut device,
            &pattern,
            Matrix::new_translation(20.0, 0.0),
            IntRect::from_size(40, 1),
            255,
            RenderOptions::default(),
        );

        assert_eq!(device.pixel(19, 0), Some(0));
        assert_eq!(device.pixel(20, 0), Some(Color::RED));
        assert_eq!(device.pixel(29, 0), Some(LAST_STEP));
    }

    #[test]
    fn background_fills_outside_of_shading() {
        let mut shading = red_to_blue(&[0.0, 0.0, 4.0, 0.0]);
        shading.insert("Background", numbers(&[0.0, 1.0, 0.0]));

        let mut device = Bitmap::new(10, 1);
        render(&pattern(shading.clone()), &mut device, RenderOptions::default());

        assert_eq!(device.pixel(0, 0), Some(Color::RED));
        assert_eq!(device.pixel(8, 0), Some(Color::GREEN));

        // shadings painted directly ignore their background
        let mut device = Bitmap::new(10, 1);
        render(&shading_object(shading), &mut device, RenderOptions::default());

        assert_eq!(device.pixel(8, 0), Some(0));
    }

    #[test]
    fn short_background_is_ignored() {
        let mut shading = red_to_blue(&[0.0, 0.0, 4.0, 0.0]);
        shading.insert("Background", numbers(&[0.0, 1.0]));

        let mut device = Bitmap::new(10, 1);
        render(&pattern(shading), &mut device, RenderOptions::default());

        assert_eq!(device.pixel(8, 0), Some(0));
    }

    #[test]
    fn clip_rect_limits_painting() {
        let pattern = pattern(red_to_blue(&[0.0, 0.0, 9.0, 0.0]));

        let mut device = Bitmap::new(10, 4);
        render_shading(
            &mut device,
            &pattern,
            Matrix::identity(),
            IntRect::new(2, 1, 5, 3),
            255,
            RenderOptions::default(),
        );

        assert_eq!(device.pixel(1, 1), Some(0));
        assert_eq!(device.pixel(2, 0), Some(0));
        assert_ne!(device.pixel(2, 1), Some(0));
        assert_ne!(device.pixel(4, 2), Some(0));
        assert_eq!(device.pixel(5, 2), Some(0));
        assert_eq!(device.pixel(4, 3), Some(0));
    }

    #[test]
    fn bbox_limits_painting() {
        let mut shading = red_to_blue(&[0.0, 0.0, 9.0, 0.0]);
        shading.insert("BBox", numbers(&[0.0, 0.0, 3.0, 1.0]));

        let mut device = Bitmap::new(10, 1);
        render(&pattern(shading), &mut device, RenderOptions::default());

        assert_eq!(device.pixel(0, 0), Some(Color::RED));
        assert_ne!(device.pixel(2, 0), Some(0));
        assert_eq!(device.pixel(3, 0), Some(0));
    }

    #[test]
    fn empty_clip_paints_nothing() {
        let pattern = pattern(red_to_blue(&[0.0, 0.0, 9.0, 0.0]));

        let mut device = Bitmap::new(10, 1);
        render_shading(
            &mut device,
            &pattern,
            Matrix::identity(),
            IntRect::new(20, 0, 30, 1),
            255,
            RenderOptions::default(),
        );

        assert!(device.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn gray_mode() {
        let pattern = pattern(red_to_blue(&[0.0, 0.0, 9.0, 0.0]));

        let mut device = Bitmap::new(10, 1);
        render(
            &pattern,
            &mut device,
            RenderOptions {
                color_mode: ColorMode::Gray,
                ..Default::default()
            },
        );

        assert_eq!(device.pixel(0, 0), Some(0xff_4c_4c_4c));
    }

    #[test]
    fn alpha_mode() {
        let pattern = pattern(red_to_blue(&[0.0, 0.0, 4.0, 0.0]));

        let mut device = Bitmap::new(10, 1);
        render(
            &pattern,
            &mut device,
            RenderOptions {
                color_mode: ColorMode::Alpha,
                ..Default::default()
            },
        );

        assert_eq!(device.pixel(0, 0), Some(Color::WHITE));
        assert_eq!(device.pixel(8, 0), Some(0));
    }
}
