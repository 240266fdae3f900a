use std::io::Write;

use crate::{
    color::{self, argb},
    error::PdfResult,
    geometry::Path,
};

/// A 32-bit ARGB pixel buffer
///
/// Pixels are stored row by row as `0xAARRGGBB`, which in little-endian memory
/// is B, G, R, A. A pixel of `0` is fully transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    buffer: Vec<u32>,
}

impl Bitmap {
    /// A fully transparent bitmap
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: vec![color::Color::TRANSPARENT; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.buffer
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width {
            return None;
        }

        self.buffer.get(y * self.width + x).copied()
    }

    /// The pixels of row `y`
    ///
    /// Panics if `y` is out of bounds.
    pub fn scanline_mut(&mut self, y: usize) -> &mut [u32] {
        let start = y * self.width;
        &mut self.buffer[start..start + self.width]
    }

    pub fn clear(&mut self, color: u32) {
        self.buffer.fill(color);
    }

    /// Call `f` with the index and pixels of each row. Rows are processed in
    /// parallel when the `parallel` feature is enabled.
    pub fn for_each_row<F>(&mut self, f: F)
    where
        F: Fn(usize, &mut [u32]) + Send + Sync,
    {
        if self.width == 0 {
            return;
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            self.buffer
                .par_chunks_mut(self.width)
                .enumerate()
                .for_each(|(y, row)| f(y, row));
        }

        #[cfg(not(feature = "parallel"))]
        {
            self.buffer
                .chunks_mut(self.width)
                .enumerate()
                .for_each(|(y, row)| f(y, row));
        }
    }

    /// Fill `path` using the non-zero winding rule, blending `color` over the
    /// existing pixels.
    ///
    /// With `full_cover`, every pixel the path touches is painted. Otherwise
    /// only pixels whose centre lies inside the path are.
    pub fn fill_path(&mut self, path: &Path, color: u32, full_cover: bool) {
        let bbox = path.bounding_box();

        if !bbox.is_finite() || self.width == 0 {
            return;
        }

        let lines = path.flatten();

        let sample_offsets: &[f32] = if full_cover { &[0.0, 0.5, 1.0] } else { &[0.5] };

        let first_row = bbox.min.y.floor().max(0.0) as usize;
        let last_row = (bbox.max.y.ceil().max(0.0) as usize).min(self.height);

        let mut covered = vec![false; self.width];
        let mut crossings = Vec::new();

        for y in first_row..last_row {
            covered.fill(false);

            for &offset in sample_offsets {
                let sample_y = y as f32 + offset;

                crossings.clear();
                crossings.extend(
                    lines
                        .iter()
                        .filter_map(|line| Some((line.x_at_y(sample_y)?, line.winding()))),
                );
                crossings.sort_by(|a: &(f32, i32), b| a.0.total_cmp(&b.0));

                self.cover_spans(&crossings, &mut covered, full_cover);
            }

            let row = self.scanline_mut(y);

            for (pixel, _) in row.iter_mut().zip(&covered).filter(|(_, covered)| **covered) {
                *pixel = blend_source_over(*pixel, color);
            }
        }
    }

    fn cover_spans(&self, crossings: &[(f32, i32)], covered: &mut [bool], full_cover: bool) {
        let mut winding = 0;
        let mut span_start = 0.0;

        for &(x, direction) in crossings {
            let was_inside = winding != 0;
            winding += direction;

            if !was_inside && winding != 0 {
                span_start = x;
            } else if was_inside && winding == 0 {
                let (start, end) = if full_cover {
                    (span_start.floor(), x.ceil())
                } else {
                    ((span_start - 0.5).ceil(), (x - 0.5).ceil())
                };

                let start = start.clamp(0.0, self.width as f32) as usize;
                let end = end.clamp(0.0, self.width as f32) as usize;

                if start < end {
                    covered[start..end].fill(true);
                }
            }
        }
    }

    /// Blend `src` over this bitmap with its top-left corner at `(left, top)`
    pub fn composite(&mut self, src: &Bitmap, left: i32, top: i32) {
        for src_y in 0..src.height {
            let Some(y) = offset(top, src_y).filter(|&y| y < self.height) else {
                continue;
            };

            let dst_row = self.scanline_mut(y);
            let src_row = &src.buffer[src_y * src.width..(src_y + 1) * src.width];

            for (src_x, &pixel) in src_row.iter().enumerate() {
                let Some(dst) = offset(left, src_x).and_then(|x| dst_row.get_mut(x)) else {
                    continue;
                };

                *dst = blend_source_over(*dst, pixel);
            }
        }
    }

    /// Replace every color channel with the alpha channel
    pub fn set_color_from_alpha(&mut self) {
        for pixel in &mut self.buffer {
            let a = color::alpha(*pixel);
            *pixel = argb(a, a, a, a);
        }
    }

    /// Replace every color channel with the pixel's luminance
    pub fn convert_to_gray(&mut self) {
        for pixel in &mut self.buffer {
            let gray = (0.299 * f32::from(color::red(*pixel))
                + 0.587 * f32::from(color::green(*pixel))
                + 0.114 * f32::from(color::blue(*pixel)))
            .round() as u8;

            *pixel = argb(color::alpha(*pixel), gray, gray, gray);
        }
    }

    /// Encode as an 8-bit RGBA PNG
    pub fn write_png<W: Write>(&self, w: W) -> PdfResult<()> {
        let width = u32::try_from(self.width)?;
        let height = u32::try_from(self.height)?;

        let mut encoder = png::Encoder::new(w, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;

        let data = self
            .buffer
            .iter()
            .flat_map(|&pixel| {
                [
                    color::red(pixel),
                    color::green(pixel),
                    color::blue(pixel),
                    color::alpha(pixel),
                ]
            })
            .collect::<Vec<u8>>();

        writer.write_image_data(&data)?;
        writer.finish()?;

        Ok(())
    }
}

fn offset(origin: i32, delta: usize) -> Option<usize> {
    let delta = i64::try_from(delta).ok()?;
    usize::try_from(i64::from(origin) + delta).ok()
}

/// Porter-Duff source-over of two unpremultiplied ARGB colors
pub(crate) fn blend_source_over(dst: u32, src: u32) -> u32 {
    match color::alpha(src) {
        0 => return dst,
        255 => return src,
        _ => {}
    }

    let src_alpha = f32::from(color::alpha(src)) / 255.0;
    let dst_alpha = f32::from(color::alpha(dst)) / 255.0;

    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);

    let channel = |s: u8, d: u8| {
        let c = (f32::from(s) * src_alpha + f32::from(d) * dst_alpha * (1.0 - src_alpha))
            / out_alpha;
        c.round() as u8
    };

    argb(
        (out_alpha * 255.0).round() as u8,
        channel(color::red(src), color::red(dst)),
        channel(color::green(src), color::green(dst)),
        channel(color::blue(src), color::blue(dst)),
    )
}

#[cfg(test)]
mod test {
    use crate::{color::Color, geometry::Point};

    use super::*;

    fn polygon(points: &[(f32, f32)]) -> Path {
        let mut path = Path::new(Point::new(points[0].0, points[0].1));

        for &(x, y) in &points[1..] {
            path.line_to(Point::new(x, y));
        }

        path.close_path();
        path
    }

    fn count(bitmap: &Bitmap, color: u32) -> usize {
        bitmap.pixels().iter().filter(|&&p| p == color).count()
    }

    #[test]
    fn new_bitmap_is_transparent() {
        let bitmap = Bitmap::new(3, 2);

        assert_eq!(bitmap.pixels(), &[0; 6]);
        assert_eq!(bitmap.pixel(3, 0), None);
    }

    #[test]
    fn fill_pixel_aligned_square() {
        let mut bitmap = Bitmap::new(10, 10);
        bitmap.fill_path(
            &polygon(&[(2.0, 2.0), (6.0, 2.0), (6.0, 6.0), (2.0, 6.0)]),
            Color::RED,
            false,
        );

        assert_eq!(count(&bitmap, Color::RED), 16);
        assert_eq!(bitmap.pixel(2, 2), Some(Color::RED));
        assert_eq!(bitmap.pixel(5, 5), Some(Color::RED));
        assert_eq!(bitmap.pixel(6, 5), Some(0));
    }

    #[test]
    fn full_cover_grows_to_touched_pixels() {
        let mut bitmap = Bitmap::new(10, 10);
        bitmap.fill_path(
            &polygon(&[(2.25, 2.25), (5.75, 2.25), (5.75, 5.75), (2.25, 5.75)]),
            Color::BLUE,
            true,
        );

        assert_eq!(count(&bitmap, Color::BLUE), 16);

        let mut centered = Bitmap::new(10, 10);
        centered.fill_path(
            &polygon(&[(2.25, 2.25), (5.75, 2.25), (5.75, 5.75), (2.25, 5.75)]),
            Color::BLUE,
            false,
        );

        assert_eq!(count(&centered, Color::BLUE), 16);
        assert_eq!(centered.pixel(2, 2), Some(Color::BLUE));

        let mut thin = Bitmap::new(10, 10);
        thin.fill_path(
            &polygon(&[(2.6, 2.6), (3.4, 2.6), (3.4, 3.4), (2.6, 3.4)]),
            Color::BLUE,
            false,
        );
        assert_eq!(count(&thin, Color::BLUE), 0);

        thin.fill_path(
            &polygon(&[(2.6, 2.6), (3.4, 2.6), (3.4, 3.4), (2.6, 3.4)]),
            Color::BLUE,
            true,
        );
        assert_eq!(count(&thin, Color::BLUE), 4);
    }

    #[test]
    fn fill_is_clipped_to_bitmap() {
        let mut bitmap = Bitmap::new(4, 4);
        bitmap.fill_path(
            &polygon(&[(-10.0, -10.0), (10.0, -10.0), (10.0, 10.0), (-10.0, 10.0)]),
            Color::GREEN,
            true,
        );

        assert_eq!(count(&bitmap, Color::GREEN), 16);
    }

    #[test]
    fn composite_source_over() {
        let mut dst = Bitmap::new(4, 4);
        dst.clear(Color::WHITE);

        let mut src = Bitmap::new(2, 2);
        src.clear(Color::RED);
        src.scanline_mut(1)[1] = 0x80_00_00_00;

        dst.composite(&src, 3, -1);

        assert_eq!(dst.pixel(3, 0), Some(Color::RED));
        assert_eq!(dst.pixel(2, 0), Some(Color::WHITE));
        assert_eq!(dst.pixel(3, 1), Some(Color::WHITE));
    }

    #[test]
    fn half_transparent_black_over_white() {
        assert_eq!(blend_source_over(Color::WHITE, 0x80_00_00_00), 0xff_7f_7f_7f);
        assert_eq!(blend_source_over(0, 0x80_ff_00_00), 0x80_ff_00_00);
    }

    #[test]
    fn gray_and_alpha_modes() {
        let mut bitmap = Bitmap::new(1, 1);
        bitmap.clear(0x80_ff_00_00);

        let mut gray = bitmap.clone();
        gray.convert_to_gray();
        assert_eq!(gray.pixel(0, 0), Some(0x80_4c_4c_4c));

        bitmap.set_color_from_alpha();
        assert_eq!(bitmap.pixel(0, 0), Some(0x80_80_80_80));
    }

    #[test]
    fn rows_are_visited_once() {
        let mut bitmap = Bitmap::new(3, 5);
        bitmap.for_each_row(|y, row| row.fill(y as u32));

        for y in 0..5 {
            assert_eq!(bitmap.pixel(2, y), Some(y as u32));
        }
    }

    #[test]
    fn png_signature() {
        let mut bitmap = Bitmap::new(2, 2);
        bitmap.clear(Color::RED);

        let mut out = Vec::new();
        bitmap.write_png(&mut out).unwrap();

        assert_eq!(&out[..8], b"\x89PNG\r\n\x1a\n");
    }
}
