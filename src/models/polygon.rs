use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::utils::random_index;

use super::{
    color::Color,
    point::{Axis, Point},
    Mode,
};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Polygon {
    pub color: Color,
    pub points: Vec<Point>,
}

// clone_from reuses the points allocation; accept/rollback copies slots every generation
impl Clone for Polygon {
    fn clone(&self) -> Self {
        Polygon {
            color: self.color,
            points: self.points.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.color = source.color;
        self.points.clone_from(&source.points);
    }
}

impl Polygon {
    pub fn new_random<R: Rng + ?Sized>(
        rng: &mut R,
        num_points: usize,
        width: f64,
        height: f64,
    ) -> Polygon {
        let points = (0..num_points)
            .map(|_| Point::new_random(rng, width, height))
            .collect();
        Polygon {
            color: Color::new_random(rng),
            points,
        }
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Returns the index of the moved vertex.
    pub fn mutate_point<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        axis: Axis,
        mode: Mode,
        width: f64,
        height: f64,
    ) -> usize {
        let index = random_index(rng, self.points.len());
        self.points[index].mutate(rng, axis, mode, width, height);
        index
    }
}
