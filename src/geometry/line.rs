use super::point::Point;

#[derive(Debug, Clone, Copy)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Where the line crosses the horizontal line at `y`.
    ///
    /// The lower endpoint is included and the upper one is not, so a scanline
    /// through a shared vertex only crosses one of the two edges meeting there.
    /// Horizontal lines never cross.
    pub fn x_at_y(&self, y: f32) -> Option<f32> {
        let (top, bottom) = if self.start.y < self.end.y {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };

        if top.y == bottom.y || y < top.y || y >= bottom.y {
            return None;
        }

        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;

        Some(self.start.x + (y - self.start.y) * dx / dy)
    }

    /// `1` when the line points down the y axis, `-1` when it points up
    pub fn winding(&self) -> i32 {
        if self.end.y > self.start.y {
            1
        } else {
            -1
        }
    }
}
