use rand::Rng;

use crate::{
    canvas::Canvas,
    models::{
        line::{sides, Crossing},
        polygon::Polygon,
    },
};

/// Uniform index in [0, max). Panics if `max` is 0.
pub fn random_index<R: Rng + ?Sized>(rng: &mut R, max: usize) -> usize {
    rng.gen_range(0..max)
}

/// Uniform value in [0, max).
pub fn random_f64<R: Rng + ?Sized>(rng: &mut R, max: f64) -> f64 {
    rng.gen_range(0.0..max)
}

/// Uniform value in [0, 1].
pub fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(0.0..=1.0)
}

/// Unlike `f64::clamp` this never panics, `min` wins if the bounds cross.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Non-zero winding scanline fill sampled at pixel centers, no anti-aliasing.
/// Holds the crossing buffer so filling doesn't allocate once it has warmed up.
#[derive(Debug, Default)]
pub struct Rasterizer {
    crossings: Vec<Crossing>,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_polygon(&mut self, canvas: &mut Canvas, polygon: &Polygon) {
        let points = &polygon.points;
        let color = polygon.color;
        if points.len() < 3 || color.a <= 0.0 {
            return;
        }

        let (w, h) = (canvas.width(), canvas.height());
        let (min_y, max_y) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        // rows whose center y + 0.5 falls in [min_y, max_y)
        let first_row = pixel_start(min_y, h);
        let last_row = pixel_start(max_y, h);

        let alpha = color.a.min(1.0);
        let src = [
            color.r * 255.0 * alpha,
            color.g * 255.0 * alpha,
            color.b * 255.0 * alpha,
            255.0 * alpha,
        ];

        for row in first_row..last_row {
            let center = row as f64 + 0.5;
            self.crossings.clear();
            self.crossings
                .extend(sides(points).filter_map(|line| line.crossing(center)));
            self.crossings.sort_by(|a, b| a.x.total_cmp(&b.x));

            let mut winding = 0;
            for pair in self.crossings.windows(2) {
                winding += pair[0].winding;
                if winding == 0 {
                    continue;
                }
                let start = pixel_start(pair[0].x, w);
                let end = pixel_start(pair[1].x, w);
                for x in start..end {
                    fill_pixel(canvas.pixel_mut(x, row), src, alpha);
                }
            }
        }
    }
}

/// First pixel index whose center lies at or past `coord`, clipped to [0, limit].
fn pixel_start(coord: f64, limit: usize) -> usize {
    let start = (coord - 0.5).ceil();
    if start <= 0.0 {
        0
    } else {
        (start as usize).min(limit)
    }
}

/// Source-over onto `px`, `src` is already premultiplied by `alpha`.
pub fn fill_pixel(px: &mut [u8], src: [f64; 4], alpha: f64) {
    let keep = 1.0 - alpha;
    for (dst, s) in px.iter_mut().zip(src) {
        *dst = (*dst as f64 * keep + s).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{color::Color, point::Point};

    fn square(x0: f64, y0: f64, x1: f64, y1: f64, color: Color) -> Polygon {
        Polygon {
            color,
            points: vec![
                Point { x: x0, y: y0 },
                Point { x: x1, y: y0 },
                Point { x: x1, y: y1 },
                Point { x: x0, y: y1 },
            ],
        }
    }

    const RED: Color = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    #[test]
    fn clamp_is_inclusive() {
        assert_eq!(clamp(-1.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(2.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(0.5, 0.0, 1.0), 0.5);
        assert_eq!(clamp(5.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn opaque_square_covers_exactly_its_pixels() {
        let mut canvas = Canvas::new(4, 4);
        let mut r = Rasterizer::new();
        r.fill_polygon(&mut canvas, &square(1.0, 1.0, 3.0, 3.0, RED));
        for y in 0..4 {
            for x in 0..4 {
                let inside = (1..3).contains(&x) && (1..3).contains(&y);
                let expected = if inside {
                    [255, 0, 0, 255]
                } else {
                    [255, 255, 255, 255]
                };
                assert_eq!(canvas.pixel(x, y), expected, "pixel {x},{y}");
            }
        }
    }

    #[test]
    fn fill_is_clipped_to_the_canvas() {
        let mut canvas = Canvas::new(3, 2);
        let mut r = Rasterizer::new();
        r.fill_polygon(&mut canvas, &square(-50.0, -50.0, 50.0, 50.0, RED));
        assert!(canvas.data().chunks_exact(4).all(|p| p == [255, 0, 0, 255]));
    }

    #[test]
    fn half_alpha_blends_over_white() {
        let mut canvas = Canvas::new(2, 2);
        let mut r = Rasterizer::new();
        let color = Color {
            r: 0.0,
            g: 0.0,
            b: 0.0,
            a: 0.5,
        };
        r.fill_polygon(&mut canvas, &square(0.0, 0.0, 2.0, 2.0, color));
        // 255 * 0.5 = 127.5 rounds away from zero
        assert_eq!(canvas.pixel(0, 0), [128, 128, 128, 255]);
    }

    #[test]
    fn transparent_and_degenerate_polygons_paint_nothing() {
        let mut canvas = Canvas::new(4, 4);
        let mut r = Rasterizer::new();
        let mut clear = square(0.0, 0.0, 4.0, 4.0, RED);
        clear.color.a = 0.0;
        r.fill_polygon(&mut canvas, &clear);
        let mut line = square(0.0, 0.0, 4.0, 4.0, RED);
        line.points.truncate(2);
        r.fill_polygon(&mut canvas, &line);
        assert_eq!(canvas, Canvas::new(4, 4));
    }

    #[test]
    fn self_intersecting_paths_use_non_zero_winding() {
        // pentagram: the center is wound twice and still filled
        let mut canvas = Canvas::new(20, 20);
        let mut r = Rasterizer::new();
        let star = [(10.0, 0.0), (16.0, 19.0), (0.0, 7.0), (20.0, 7.0), (4.0, 19.0)];
        let polygon = Polygon {
            color: RED,
            points: star.iter().map(|&(x, y)| Point { x, y }).collect(),
        };
        r.fill_polygon(&mut canvas, &polygon);
        assert_eq!(canvas.pixel(10, 10), [255, 0, 0, 255]);
        assert_eq!(canvas.pixel(0, 19), [255, 255, 255, 255]);
    }
}
