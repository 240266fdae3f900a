use crate::{
    color::argb,
    data_structures::Matrix,
    error::PdfResult,
    geometry::{BoundingBox, Path, Point},
    objects::Dictionary,
    render::Bitmap,
    Resolve,
};

use super::{
    mesh_stream::{MeshParams, MeshStream},
    Shading,
};

/// Largest per-channel difference between adjacent corners of a patch piece
/// that is still filled with a single color
const COLOR_THRESHOLD: u32 = 4;

/// Type 6 shadings (Coons patch meshes) are constructed from one or more colour patches,
/// each bounded by four cubic Bézier curves. Degenerate Bézier curves are allowed and are
/// useful for certain graphical effects. At least one complete patch shall be specified.
///
/// A Coons patch generally has two independent aspects:
///   * Colours are specified for each corner of the unit square, and bilinear interpolation
///     is used to fill in colours over the entire unit square
///   * Coordinates are mapped from the unit square into a four-sided patch whose sides are
///     not necessarily linear. The mapping is continuous: the corners of the unit square map
///     to corners of the patch and the sides of the unit square map to sides of the patch
#[derive(Debug, Clone)]
pub(crate) struct CoonsPatchMeshShading {
    mesh: MeshParams,
}

impl CoonsPatchMeshShading {
    pub fn from_dict(
        dict: &mut Dictionary,
        data: Vec<u8>,
        component_count: usize,
        resolver: &mut dyn Resolve,
    ) -> PdfResult<Self> {
        let mesh = MeshParams::from_dict(dict, data, component_count, true, resolver)?;

        Ok(Self { mesh })
    }

    pub fn draw(
        &self,
        shading: &Shading,
        bitmap: &mut Bitmap,
        matrix: Matrix,
        alpha: u8,
        full_cover: bool,
    ) {
        draw_patch_mesh(shading, &self.mesh, bitmap, matrix, alpha, full_cover, 12);
    }
}

/// One coordinate of a cubic Bézier curve in power form,
/// `a t³ + b t² + c t + d`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BezierCoefficients {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
}

impl BezierCoefficients {
    fn from_points(p0: f32, p1: f32, p2: f32, p3: f32) -> Self {
        Self {
            a: -p0 + 3.0 * p1 - 3.0 * p2 + p3,
            b: 3.0 * p0 - 6.0 * p1 + 3.0 * p2,
            c: -3.0 * p0 + 3.0 * p1,
            d: p0,
        }
    }

    /// The curve running through the middle of the patch bounded by `c1` and
    /// `c2` on two opposite sides, and `d1` and `d2` on the other two
    fn midline(c1: Self, c2: Self, d1: Self, d2: Self) -> Self {
        Self {
            a: (d1.a + d2.a) / 2.0,
            b: (d1.b + d2.b) / 2.0,
            c: (d1.c + d2.c) / 2.0 - (c1.a / 8.0 + c1.b / 4.0 + c1.c / 2.0)
                + (c2.a / 8.0 + c2.b / 4.0)
                + (-c1.d + d2.d) / 2.0
                - (c2.a + c2.b) / 2.0,
            d: c1.a / 8.0 + c1.b / 4.0 + c1.c / 2.0 + c1.d,
        }
    }

    /// The curve over `t` in `[0, 0.5]`, reparameterized onto `[0, 1]`
    fn first_half(self) -> Self {
        Self {
            a: self.a / 8.0,
            b: self.b / 4.0,
            c: self.c / 2.0,
            d: self.d,
        }
    }

    /// The curve over `t` in `[0.5, 1]`, reparameterized onto `[0, 1]`
    fn second_half(self) -> Self {
        let Self { a, b, c, d } = self;

        Self {
            a: a / 8.0,
            b: 3.0 * a / 8.0 + b / 4.0,
            c: 3.0 * a / 8.0 + b / 2.0 + c / 2.0,
            d: a / 8.0 + b / 4.0 + c / 2.0 + d,
        }
    }

    /// Back to the four Bézier control values
    fn points(self) -> [f32; 4] {
        let p0 = self.d;
        let p1 = self.c / 3.0 + p0;
        let p2 = self.b / 3.0 - p0 + 2.0 * p1;
        let p3 = self.a + p0 - 3.0 * p1 + 3.0 * p2;

        [p0, p1, p2, p3]
    }

    /// How far the end of the curve is from its start
    fn distance(self) -> f32 {
        (self.a + self.b + self.c).abs()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct CoonsBezier {
    x: BezierCoefficients,
    y: BezierCoefficients,
}

impl CoonsBezier {
    fn from_points(points: [Point; 4]) -> Self {
        let [p0, p1, p2, p3] = points;

        Self {
            x: BezierCoefficients::from_points(p0.x, p1.x, p2.x, p3.x),
            y: BezierCoefficients::from_points(p0.y, p1.y, p2.y, p3.y),
        }
    }

    fn midline(c1: Self, c2: Self, d1: Self, d2: Self) -> Self {
        Self {
            x: BezierCoefficients::midline(c1.x, c2.x, d1.x, d2.x),
            y: BezierCoefficients::midline(c1.y, c2.y, d1.y, d2.y),
        }
    }

    fn first_half(self) -> Self {
        Self {
            x: self.x.first_half(),
            y: self.y.first_half(),
        }
    }

    fn second_half(self) -> Self {
        Self {
            x: self.x.second_half(),
            y: self.y.second_half(),
        }
    }

    fn points(self) -> [Point; 4] {
        let xs = self.x.points();
        let ys = self.y.points();

        [
            Point::new(xs[0], ys[0]),
            Point::new(xs[1], ys[1]),
            Point::new(xs[2], ys[2]),
            Point::new(xs[3], ys[3]),
        ]
    }

    fn distance(self) -> f32 {
        self.x.distance() + self.y.distance()
    }
}

/// A corner color with 8 bit channels, kept as integers so interpolation
/// matches between neighbouring pieces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PatchColor([i32; 3]);

/// `p1 + (p2 - p1) * delta1 / delta2`, in integer arithmetic
fn interpolate(p1: i32, p2: i32, delta1: i32, delta2: i32) -> Option<i32> {
    p2.checked_sub(p1)?
        .checked_mul(delta1)?
        .checked_div(delta2)?
        .checked_add(p1)
}

impl PatchColor {
    fn from_rgb(red: f32, green: f32, blue: f32) -> Self {
        // `as` saturates, and maps NaN to 0
        Self([
            (red * 255.0) as i32,
            (green * 255.0) as i32,
            (blue * 255.0) as i32,
        ])
    }

    /// The color at `(x / x_scale, y / y_scale)` in the unit square whose
    /// corners are `colors`
    fn bilinear(
        colors: &[PatchColor; 4],
        x: i32,
        y: i32,
        x_scale: i32,
        y_scale: i32,
    ) -> Option<Self> {
        let mut result = [0; 3];

        for (i, channel) in result.iter_mut().enumerate() {
            let bottom = interpolate(colors[0].0[i], colors[3].0[i], x, x_scale)?;
            let top = interpolate(colors[1].0[i], colors[2].0[i], x, x_scale)?;

            *channel = interpolate(bottom, top, y, y_scale)?;
        }

        Some(Self(result))
    }

    fn distance(self, other: Self) -> u32 {
        self.0
            .iter()
            .zip(other.0)
            .map(|(&a, b)| a.abs_diff(b))
            .max()
            .unwrap_or(0)
    }

    fn average(colors: &[PatchColor]) -> Self {
        let mut result = [0; 3];

        if colors.is_empty() {
            return Self(result);
        }

        for (i, channel) in result.iter_mut().enumerate() {
            let sum = colors.iter().map(|c| i64::from(c.0[i])).sum::<i64>();
            *channel = (sum / colors.len() as i64) as i32;
        }

        Self(result)
    }

    fn to_argb(self, alpha: u8) -> u32 {
        let [r, g, b] = self.0.map(|c| c.clamp(0, 255) as u8);

        argb(alpha, r, g, b)
    }
}

/// A piece of a patch still to be drawn. The piece covers
/// `[left, left + 1] x [bottom, bottom + 1]` of the unit square scaled by
/// `x_scale` and `y_scale`
#[derive(Debug, Clone, Copy)]
struct PatchTask {
    x_scale: i32,
    y_scale: i32,
    left: i32,
    bottom: i32,
    c1: CoonsBezier,
    c2: CoonsBezier,
    d1: CoonsBezier,
    d2: CoonsBezier,
}

impl PatchTask {
    /// Split the scale and position along x. `None` if the piece is too small
    /// to represent
    fn split_x(self) -> Option<Self> {
        Some(Self {
            x_scale: self.x_scale.checked_mul(2)?,
            left: self.left.checked_mul(2)?,
            ..self
        })
    }

    fn split_y(self) -> Option<Self> {
        Some(Self {
            y_scale: self.y_scale.checked_mul(2)?,
            bottom: self.bottom.checked_mul(2)?,
            ..self
        })
    }

    /// The outline of the piece: `c1` forward, `d2` forward, `c2` backward,
    /// then `d1` backward
    fn outline(&self) -> Path {
        let c1 = self.c1.points();
        let d2 = self.d2.points();
        let c2 = self.c2.points();
        let d1 = self.d1.points();

        let mut path = Path::new(c1[0]);

        path.cubic_curve_to(c1[1], c1[2], d2[0]);
        path.cubic_curve_to(d2[1], d2[2], c2[3]);
        path.cubic_curve_to(c2[2], c2[1], d1[3]);
        path.cubic_curve_to(d1[2], d1[1], d1[0]);
        path.close_path();

        path
    }
}

/// Subdivides patches until the colors across each piece are close enough to
/// fill it with a single color
struct PatchDrawer<'a> {
    bitmap: &'a mut Bitmap,
    alpha: u8,
    full_cover: bool,
    colors: [PatchColor; 4],
    tasks: Vec<PatchTask>,
}

impl<'a> PatchDrawer<'a> {
    fn new(bitmap: &'a mut Bitmap, alpha: u8, full_cover: bool) -> Self {
        Self {
            bitmap,
            alpha,
            full_cover,
            colors: [PatchColor::default(); 4],
            tasks: Vec::new(),
        }
    }

    fn draw(&mut self, c1: CoonsBezier, c2: CoonsBezier, d1: CoonsBezier, d2: CoonsBezier) {
        self.tasks.push(PatchTask {
            x_scale: 1,
            y_scale: 1,
            left: 0,
            bottom: 0,
            c1,
            c2,
            d1,
            d2,
        });

        while let Some(task) = self.tasks.pop() {
            if self.draw_piece(task).is_none() {
                log::trace!(
                    "dropping patch piece at {}x{} subdivisions",
                    task.x_scale,
                    task.y_scale
                );
            }
        }
    }

    fn fill_piece(&mut self, task: &PatchTask, color: PatchColor) {
        let color = color.to_argb(self.alpha);
        self.bitmap.fill_path(&task.outline(), color, self.full_cover);
    }

    /// Fill the piece, or queue its subdivisions. `None` on integer overflow
    fn draw_piece(&mut self, task: PatchTask) -> Option<()> {
        let PatchTask {
            x_scale,
            y_scale,
            left,
            bottom,
            c1,
            c2,
            d1,
            d2,
        } = task;

        let is_small = c1.distance() < 2.0
            && c2.distance() < 2.0
            && d1.distance() < 2.0
            && d2.distance() < 2.0;

        let corner = |x: i32, y: i32| -> Option<PatchColor> {
            PatchColor::bilinear(&self.colors, x, y, x_scale, y_scale)
        };

        let bottom_left = corner(left, bottom)?;

        let right = left.checked_add(1);
        let top = bottom.checked_add(1);

        let top_left = top.and_then(|top| corner(left, top));
        let top_right = right.zip(top).and_then(|(right, top)| corner(right, top));
        let bottom_right = right.and_then(|right| corner(right, bottom));

        // small pieces are filled with whichever corners could be computed
        if is_small {
            let corners = [Some(bottom_left), top_left, top_right, bottom_right];
            let corners = corners.into_iter().flatten().collect::<Vec<_>>();

            self.fill_piece(&task, PatchColor::average(&corners));

            return Some(());
        }

        let (top_left, top_right, bottom_right) = (top_left?, top_right?, bottom_right?);

        let d_bottom = bottom_right.distance(bottom_left);
        let d_left = top_left.distance(bottom_left);
        let d_top = top_left.distance(top_right);
        let d_right = top_right.distance(bottom_right);

        if d_bottom < COLOR_THRESHOLD
            && d_left < COLOR_THRESHOLD
            && d_top < COLOR_THRESHOLD
            && d_right < COLOR_THRESHOLD
        {
            let color = PatchColor::average(&[bottom_left, top_left, top_right, bottom_right]);
            self.fill_piece(&task, color);

            return Some(());
        }

        // pieces are queued in reverse, so the first one is drawn first
        if d_bottom < COLOR_THRESHOLD && d_top < COLOR_THRESHOLD {
            let m1 = CoonsBezier::midline(d1, d2, c1, c2);
            let base = task.split_y()?;

            self.tasks.push(PatchTask {
                bottom: base.bottom + 1,
                c1: m1,
                c2,
                d1: d1.second_half(),
                d2: d2.second_half(),
                ..base
            });
            self.tasks.push(PatchTask {
                c1,
                c2: m1,
                d1: d1.first_half(),
                d2: d2.first_half(),
                ..base
            });
        } else if d_left < COLOR_THRESHOLD && d_right < COLOR_THRESHOLD {
            let m2 = CoonsBezier::midline(c1, c2, d1, d2);
            let base = task.split_x()?;

            self.tasks.push(PatchTask {
                left: base.left + 1,
                c1: c1.second_half(),
                c2: c2.second_half(),
                d1: m2,
                d2,
                ..base
            });
            self.tasks.push(PatchTask {
                c1: c1.first_half(),
                c2: c2.first_half(),
                d1,
                d2: m2,
                ..base
            });
        } else {
            let m1 = CoonsBezier::midline(d1, d2, c1, c2);
            let m2 = CoonsBezier::midline(c1, c2, d1, d2);

            let (m1f, m1s) = (m1.first_half(), m1.second_half());
            let (m2f, m2s) = (m2.first_half(), m2.second_half());

            let base = task.split_x()?.split_y()?;
            let (left, bottom) = (base.left, base.bottom);

            self.tasks.push(PatchTask {
                left: left + 1,
                bottom: bottom + 1,
                c1: m1s,
                c2: c2.second_half(),
                d1: m2s,
                d2: d2.second_half(),
                ..base
            });
            self.tasks.push(PatchTask {
                left: left + 1,
                c1: c1.second_half(),
                c2: m1s,
                d1: m2f,
                d2: d2.first_half(),
                ..base
            });
            self.tasks.push(PatchTask {
                bottom: bottom + 1,
                c1: m1f,
                c2: c2.first_half(),
                d1: d1.second_half(),
                d2: m2s,
                ..base
            });
            self.tasks.push(PatchTask {
                c1: c1.first_half(),
                c2: m1f,
                d1: d1.first_half(),
                d2: m2f,
                ..base
            });
        }

        Some(())
    }
}

/// Read and draw every patch of a type 6 or type 7 shading. `point_count` is
/// 12 for Coons patches and 16 for tensor-product patches, whose 4 interior
/// control points only shape the patch slightly and are not used
pub(super) fn draw_patch_mesh(
    shading: &Shading,
    mesh: &MeshParams,
    bitmap: &mut Bitmap,
    matrix: Matrix,
    alpha: u8,
    full_cover: bool,
    point_count: usize,
) {
    let mut stream = MeshStream::new(
        mesh,
        shading.functions(),
        shading.color_space(),
        shading.results_count(),
    );

    let (width, height) = (bitmap.width() as f32, bitmap.height() as f32);

    let mut drawer = PatchDrawer::new(bitmap, alpha, full_cover);
    let mut coords = [Point::origin(); 16];

    while !stream.is_eof() {
        let Some(flag) = stream.read_flag() else {
            break;
        };

        let (first_point, first_color) = if flag == 0 {
            (0, 0)
        } else {
            // the new patch shares an edge, and the two colors along it, with
            // the previous one
            let flag = flag as usize;

            let shared = [
                coords[flag * 3 % 12],
                coords[(flag * 3 + 1) % 12],
                coords[(flag * 3 + 2) % 12],
                coords[(flag * 3 + 3) % 12],
            ];
            coords[..4].copy_from_slice(&shared);

            drawer.colors = [
                drawer.colors[flag],
                drawer.colors[(flag + 1) % 4],
                drawer.colors[2],
                drawer.colors[3],
            ];

            (4, 2)
        };

        let mut complete = true;

        for coord in &mut coords[first_point..point_count] {
            match stream.read_coords() {
                Some(p) => *coord = matrix * p,
                None => {
                    complete = false;
                    break;
                }
            }
        }

        for color in &mut drawer.colors[first_color..] {
            if !complete {
                break;
            }

            match stream.read_color() {
                Some(rgb) => *color = PatchColor::from_rgb(rgb.red, rgb.green, rgb.blue),
                None => complete = false,
            }
        }

        if !complete {
            log::trace!("dropping truncated patch");
            break;
        }

        let bbox = BoundingBox::from_points(&coords[..point_count]);

        if !bbox.is_finite()
            || bbox.max.x <= 0.0
            || bbox.min.x >= width
            || bbox.max.y <= 0.0
            || bbox.min.y >= height
        {
            continue;
        }

        let c1 = CoonsBezier::from_points([coords[0], coords[11], coords[10], coords[9]]);
        let c2 = CoonsBezier::from_points([coords[3], coords[4], coords[5], coords[6]]);
        let d1 = CoonsBezier::from_points([coords[0], coords[1], coords[2], coords[3]]);
        let d2 = CoonsBezier::from_points([coords[9], coords[8], coords[7], coords[6]]);

        drawer.draw(c1, c2, d1, d2);
    }
}
