use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::settings::POINT_NUDGE_DIVISOR;
use crate::utils::{clamp, random_f64};

use super::Mode;

/// A vertex in canvas pixel space. Not bounded to the canvas; the rasterizer clips.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable,
)]
#[repr(C)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Point {
    pub fn new_random<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64) -> Point {
        Point {
            x: random_f64(rng, width),
            y: random_f64(rng, height),
        }
    }

    /// Refine adds a whole-pixel offset in [0, width / 10) and clamps to [0, height - 1]
    /// on both axes. Randomize draws from [0, width) on both axes.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        axis: Axis,
        mode: Mode,
        width: f64,
        height: f64,
    ) {
        let coord = match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        };
        *coord = match mode {
            Mode::Refine => {
                let offset = random_f64(rng, width / POINT_NUDGE_DIVISOR).trunc();
                clamp(*coord + offset, 0.0, height - 1.0)
            }
            Mode::Randomize => random_f64(rng, width),
        };
    }
}
