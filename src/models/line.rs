use super::point::Point;

/// Where a scanline crosses an edge, and which way the edge winds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub x: f64,
    pub winding: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

impl Line {
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    pub fn min_y(&self) -> f64 {
        self.a.y.min(self.b.y)
    }

    pub fn max_y(&self) -> f64 {
        self.a.y.max(self.b.y)
    }

    /// Half-open in y so a vertex shared by two edges is counted once.
    /// Horizontal edges never cross.
    pub fn crossing(&self, y: f64) -> Option<Crossing> {
        let (a, b) = (self.a, self.b);
        let downward = a.y <= y && b.y > y;
        let upward = b.y <= y && a.y > y;
        if !downward && !upward {
            return None;
        }
        // x = a.x + (y - a.y) / slope, slope can't be 0 here
        let x = a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);
        Some(Crossing {
            x,
            winding: if downward { 1 } else { -1 },
        })
    }
}

/// Returns all lines looping back to the first one
/// [A, B, C] -> [AB, BC, CA]
pub fn sides(points: &[Point]) -> impl Iterator<Item = Line> + '_ {
    let l = points.len();
    (0..l).map(move |i| Line::new(points[i], points[(i + 1) % l]))
}
