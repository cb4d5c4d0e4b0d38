use std::{fs, path::Path};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    canvas::Canvas,
    error::{Error, Result},
    settings::{
        CATEGORY_SPAN, COLOR_CATEGORY_LIMIT, MAGNITUDE_SPAN, POINT_CATEGORY_LIMIT, REFINE_LIMIT,
        X_AXIS_THRESHOLD,
    },
    utils::{random_f64, random_index, Rasterizer},
};

use super::{
    color::{Channel, Color, WHITE},
    point::{Axis, Point},
    polygon::Polygon,
    Mode,
};

/// The genome: polygons in painter's order, index 0 is painted first.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    pub polygons: Vec<Polygon>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Color(Channel),
    Point { vertex: usize, axis: Axis },
    Swap,
}

/// Polygon slots changed by a mutation. Nothing outside them may differ afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Touched {
    One(usize),
    Two(usize, usize),
}

impl Touched {
    pub fn indices(self) -> impl Iterator<Item = usize> {
        let (first, second) = match self {
            Touched::One(i) => (i, None),
            Touched::Two(i, j) => (i, Some(j)),
        };
        std::iter::once(first).chain(second)
    }

    pub fn len(self) -> usize {
        match self {
            Touched::One(_) => 1,
            Touched::Two(..) => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    pub kind: MutationKind,
    pub touched: Touched,
}

impl Drawing {
    pub fn new_random<R: Rng + ?Sized>(
        rng: &mut R,
        num_polygons: usize,
        num_points: usize,
        width: usize,
        height: usize,
    ) -> Drawing {
        let (w, h) = (width as f64, height as f64);
        Drawing {
            polygons: (0..num_polygons)
                .map(|_| Polygon::new_random(rng, num_points, w, h))
                .collect(),
        }
    }

    /// Paints white, then every polygon back to front.
    pub fn draw(&self, canvas: &mut Canvas, rasterizer: &mut Rasterizer) {
        canvas.fill(WHITE);
        for polygon in &self.polygons {
            rasterizer.fill_polygon(canvas, polygon);
        }
    }

    pub fn num_points(&self) -> usize {
        self.polygons
            .iter()
            .fold(0, |sum, polygon| sum + polygon.num_points())
    }

    /// Applies exactly one change and reports which slots it touched.
    ///
    /// Three draws per call: the target slot, a category in [0, 2.8) and a magnitude
    /// in [0, 2). Category below 1 mutates a color channel (the category doubles as the
    /// channel roulette), below 2 mutates a vertex coordinate (x below 1.5, y above),
    /// and the rest swaps the target with another slot. Magnitude below 1 refines,
    /// otherwise the value is redrawn.
    ///
    /// Panics if the drawing has no polygons.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R, width: f64, height: f64) -> Mutation {
        let target = random_index(rng, self.polygons.len());
        let category = random_f64(rng, CATEGORY_SPAN);
        let magnitude = random_f64(rng, MAGNITUDE_SPAN);
        let mode = if magnitude < REFINE_LIMIT {
            Mode::Refine
        } else {
            Mode::Randomize
        };

        if category < COLOR_CATEGORY_LIMIT {
            let channel = self.polygons[target].color.mutate(rng, category, mode);
            Mutation {
                kind: MutationKind::Color(channel),
                touched: Touched::One(target),
            }
        } else if category < POINT_CATEGORY_LIMIT {
            let axis = if category < X_AXIS_THRESHOLD {
                Axis::X
            } else {
                Axis::Y
            };
            let vertex = self.polygons[target].mutate_point(rng, axis, mode, width, height);
            Mutation {
                kind: MutationKind::Point { vertex, axis },
                touched: Touched::One(target),
            }
        } else {
            let destination = random_index(rng, self.polygons.len());
            self.polygons.swap(target, destination);
            Mutation {
                kind: MutationKind::Swap,
                touched: Touched::Two(target, destination),
            }
        }
    }

    /// Copies the touched slots from `source`, leaving every other slot alone.
    pub fn copy_slots_from(&mut self, source: &Drawing, touched: Touched) {
        for i in touched.indices() {
            self.polygons[i].clone_from(&source.polygons[i]);
        }
    }

    pub fn check_shape(&self, num_polygons: usize, num_points: usize) -> Result<()> {
        if self.polygons.len() != num_polygons {
            return Err(Error::genome(format!(
                "expected {num_polygons} polygons, found {}",
                self.polygons.len()
            )));
        }
        if let Some((i, p)) = self
            .polygons
            .iter()
            .enumerate()
            .find(|(_, p)| p.num_points() != num_points)
        {
            return Err(Error::genome(format!(
                "polygon {i} has {} points, expected {num_points}",
                p.num_points()
            )));
        }
        Ok(())
    }

    /// Flat records: color (4 x f64) then every point (2 x f64), native endianness.
    pub fn to_raw_bytes(&self) -> Vec<u8> {
        let record = record_size(self.polygons.first().map_or(0, Polygon::num_points));
        let mut bytes = Vec::with_capacity(record * self.polygons.len());
        for polygon in &self.polygons {
            bytes.extend_from_slice(bytemuck::bytes_of(&polygon.color));
            bytes.extend_from_slice(bytemuck::cast_slice(&polygon.points));
        }
        bytes
    }

    pub fn from_raw_bytes(bytes: &[u8], num_points: usize) -> Result<Drawing> {
        let record = record_size(num_points);
        if bytes.len() % record != 0 {
            return Err(Error::genome(format!(
                "{} bytes is not a whole number of {record}-byte polygon records",
                bytes.len()
            )));
        }
        let color_size = std::mem::size_of::<Color>();
        let point_size = std::mem::size_of::<Point>();
        let polygons = bytes
            .chunks_exact(record)
            .map(|chunk| {
                let (color, points) = chunk.split_at(color_size);
                Polygon {
                    color: bytemuck::pod_read_unaligned(color),
                    points: points
                        .chunks_exact(point_size)
                        .map(bytemuck::pod_read_unaligned::<Point>)
                        .collect(),
                }
            })
            .collect();
        Ok(Drawing { polygons })
    }

    /// JSON when the extension is `.json`, flat records otherwise.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if is_json(path) {
            fs::write(path, serde_json::to_string(self)?)?;
        } else {
            fs::write(path, self.to_raw_bytes())?;
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>, num_points: usize) -> Result<Drawing> {
        let path = path.as_ref();
        if is_json(path) {
            let json = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&json)?)
        } else {
            Drawing::from_raw_bytes(&fs::read(path)?, num_points)
        }
    }
}

fn record_size(num_points: usize) -> usize {
    std::mem::size_of::<Color>() + num_points * std::mem::size_of::<Point>()
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
