mod color_space;

pub use color_space::{ColorSpace, ColorSpaceName};

/// Named ARGB values, `0xAARRGGBB`
pub struct Color;

impl Color {
    pub const TRANSPARENT: u32 = 0x00_00_00_00;
    pub const BLACK: u32 = 0xff_00_00_00;
    pub const WHITE: u32 = 0xff_ff_ff_ff;
    pub const RED: u32 = 0xff_ff_00_00;
    pub const GREEN: u32 = 0xff_00_ff_00;
    pub const BLUE: u32 = 0xff_00_00_ff;
}

/// An RGB color with each channel in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    /// Pack into `0xAARRGGBB`, rounding each channel to the nearest byte
    pub fn to_argb(self, alpha: u8) -> u32 {
        argb(
            alpha,
            unit_to_byte(self.red),
            unit_to_byte(self.green),
            unit_to_byte(self.blue),
        )
    }
}

fn unit_to_byte(n: f32) -> u8 {
    // NaN becomes 0
    (n.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

pub fn alpha(argb: u32) -> u8 {
    (argb >> 24) as u8
}

pub fn red(argb: u32) -> u8 {
    (argb >> 16) as u8
}

pub fn green(argb: u32) -> u8 {
    (argb >> 8) as u8
}

pub fn blue(argb: u32) -> u8 {
    argb as u8
}
