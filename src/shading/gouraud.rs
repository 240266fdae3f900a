use crate::{color::Rgb, geometry::Line, render::Bitmap};

use super::MeshVertex;

fn channels(rgb: Rgb) -> [f32; 3] {
    [rgb.red, rgb.green, rgb.blue]
}

/// Fill a triangle, interpolating the vertex colors first along the edges and
/// then across each scanline
pub(crate) fn draw_gouraud(bitmap: &mut Bitmap, alpha: u8, triangle: &[MeshVertex; 3]) {
    let min_y = triangle
        .iter()
        .map(|v| v.position.y)
        .fold(f32::INFINITY, f32::min);
    let max_y = triangle
        .iter()
        .map(|v| v.position.y)
        .fold(f32::NEG_INFINITY, f32::max);

    if min_y == max_y || !min_y.is_finite() || !max_y.is_finite() {
        return;
    }

    let height = bitmap.height() as i64;
    let width = bitmap.width() as i64;

    let first_row = (min_y.floor() as i64).max(0);
    let last_row = (max_y.ceil() as i64).min(height - 1);

    for y in first_row..=last_row {
        let y_pos = y as f32;

        let mut crossings = [(0.0_f32, [0.0_f32; 3]); 3];
        let mut crossing_count = 0;

        for i in 0..3 {
            let from = triangle[i];
            let to = triangle[(i + 1) % 3];

            let Some(x) = Line::new(from.position, to.position).x_at_y(y_pos) else {
                continue;
            };

            let y_dist = (y_pos - from.position.y) / (to.position.y - from.position.y);

            let from_color = channels(from.rgb);
            let to_color = channels(to.rgb);

            let mut color = [0.0; 3];
            for c in 0..3 {
                color[c] = from_color[c] + y_dist * (to_color[c] - from_color[c]);
            }

            crossings[crossing_count] = (x, color);
            crossing_count += 1;
        }

        if crossing_count != 2 {
            continue;
        }

        let (start, end) = if crossings[0].0 < crossings[1].0 {
            (crossings[0], crossings[1])
        } else {
            (crossings[1], crossings[0])
        };

        let min_x = start.0.floor() as i64;
        let max_x = end.0.ceil() as i64;

        let range_x = max_x.saturating_sub(min_x);
        if range_x <= 0 {
            continue;
        }

        let start_x = min_x.clamp(0, width);
        let end_x = max_x.clamp(0, width);

        let mut unit = [0.0; 3];
        for c in 0..3 {
            unit[c] = (end.1[c] - start.1[c]) / range_x as f32;
        }

        let scanline = bitmap.scanline_mut(y as usize);

        for x in start_x..end_x {
            let offset = x.saturating_sub(min_x) as f32;

            let rgb = Rgb::new(
                start.1[0] + offset * unit[0],
                start.1[1] + offset * unit[1],
                start.1[2] + offset * unit[2],
            );

            scanline[x as usize] = rgb.to_argb(alpha);
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{color::Color, geometry::Point};

    use super::*;

    fn vertex(x: f32, y: f32, rgb: Rgb) -> MeshVertex {
        MeshVertex {
            position: Point::new(x, y),
            rgb,
        }
    }

    #[test]
    fn solid_triangle() {
        let red = Rgb::new(1.0, 0.0, 0.0);
        let triangle = [
            vertex(0.0, 0.0, red),
            vertex(10.0, 0.0, red),
            vertex(0.0, 10.0, red),
        ];

        let mut bitmap = Bitmap::new(10, 10);
        draw_gouraud(&mut bitmap, 255, &triangle);

        assert_eq!(bitmap.pixel(1, 1), Some(Color::RED));
        assert_eq!(bitmap.pixel(0, 9), Some(Color::RED));
        assert_eq!(bitmap.pixel(9, 9), Some(0));
    }

    #[test]
    fn colors_interpolate_across_rows() {
        let triangle = [
            vertex(0.0, 0.0, Rgb::new(0.0, 0.0, 0.0)),
            vertex(10.0, 0.0, Rgb::new(1.0, 1.0, 1.0)),
            vertex(0.0, 10.0, Rgb::new(0.0, 0.0, 0.0)),
        ];

        let mut bitmap = Bitmap::new(10, 10);
        draw_gouraud(&mut bitmap, 255, &triangle);

        // the scanline at y = 0 runs from black at x = 0 to white at x = 10
        assert_eq!(bitmap.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(bitmap.pixel(5, 0), Some(0xff_80_80_80));
    }

    #[test]
    fn flat_triangle_draws_nothing() {
        let triangle = [
            vertex(0.0, 2.0, Rgb::BLACK),
            vertex(5.0, 2.0, Rgb::BLACK),
            vertex(9.0, 2.0, Rgb::BLACK),
        ];

        let mut bitmap = Bitmap::new(10, 10);
        draw_gouraud(&mut bitmap, 255, &triangle);

        assert!(bitmap.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn triangle_is_clipped() {
        let triangle = [
            vertex(-20.0, -20.0, Rgb::BLACK),
            vertex(40.0, -20.0, Rgb::BLACK),
            vertex(-20.0, 40.0, Rgb::BLACK),
        ];

        let mut bitmap = Bitmap::new(4, 4);
        draw_gouraud(&mut bitmap, 128, &triangle);

        assert!(bitmap.pixels().iter().all(|&p| p == 0x80_00_00_00));
    }

    #[test]
    fn huge_coordinates_do_not_overflow() {
        let red = Rgb::new(1.0, 0.0, 0.0);
        let triangle = [
            vertex(-1e30, 0.0, red),
            vertex(1e30, 0.0, red),
            vertex(0.0, 5.0, red),
        ];

        let mut bitmap = Bitmap::new(10, 10);
        draw_gouraud(&mut bitmap, 255, &triangle);

        assert_eq!(bitmap.pixel(5, 2), Some(Color::RED));
        assert_eq!(bitmap.pixel(5, 8), Some(0));
    }
}
