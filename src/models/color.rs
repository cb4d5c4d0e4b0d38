use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::settings::{
    ALPHA_THRESHOLD, COLOR_NUDGE, GREEN_THRESHOLD, MIN_VISIBLE_ALPHA, RED_THRESHOLD,
};
use crate::utils::{clamp, random_f64, random_unit};

use super::Mode;

/// Straight (non-premultiplied) RGBA, each channel in [0, 1].
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable,
)]
#[repr(C)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Alpha,
}

pub const WHITE: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};

impl Color {
    pub fn new_random<R: Rng + ?Sized>(rng: &mut R) -> Color {
        Color {
            r: random_unit(rng),
            g: random_unit(rng),
            b: random_unit(rng),
            a: random_unit(rng),
        }
    }

    /// Picks the channel from the roulette value left over by the category draw.
    /// Nearly invisible polygons always get their alpha mutated first.
    pub fn select_channel(&self, roulette: f64) -> Channel {
        if self.a < MIN_VISIBLE_ALPHA || roulette < ALPHA_THRESHOLD {
            Channel::Alpha
        } else if roulette < RED_THRESHOLD {
            Channel::Red
        } else if roulette < GREEN_THRESHOLD {
            Channel::Green
        } else {
            Channel::Blue
        }
    }

    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R, roulette: f64, mode: Mode) -> Channel {
        let channel = self.select_channel(roulette);
        let value = self.channel_mut(channel);
        *value = match mode {
            Mode::Refine => clamp(*value + random_f64(rng, COLOR_NUDGE), 0.0, 1.0),
            Mode::Randomize => random_unit(rng),
        };
        channel
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut f64 {
        match channel {
            Channel::Red => &mut self.r,
            Channel::Green => &mut self.g,
            Channel::Blue => &mut self.b,
            Channel::Alpha => &mut self.a,
        }
    }

    pub fn is_normalized(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn grey(a: f64) -> Color {
        Color {
            r: 0.5,
            g: 0.5,
            b: 0.5,
            a,
        }
    }

    #[test]
    fn channel_follows_roulette_thresholds() {
        let c = grey(0.5);
        assert_eq!(c.select_channel(0.0), Channel::Alpha);
        assert_eq!(c.select_channel(0.24), Channel::Alpha);
        assert_eq!(c.select_channel(0.25), Channel::Red);
        assert_eq!(c.select_channel(0.5), Channel::Green);
        assert_eq!(c.select_channel(0.75), Channel::Blue);
        assert_eq!(c.select_channel(0.99), Channel::Blue);
    }

    #[test]
    fn invisible_polygons_mutate_alpha() {
        let c = grey(0.005);
        assert_eq!(c.select_channel(0.9), Channel::Alpha);
    }

    #[test]
    fn refine_clamps_to_unit_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut c = Color {
            r: 1.0,
            g: 1.0,
            b: 1.0,
            a: 1.0,
        };
        for i in 0..200 {
            let roulette = (i % 100) as f64 / 100.0;
            c.mutate(&mut rng, roulette, Mode::Refine);
            assert!(c.is_normalized(), "{c:?}");
        }
        assert_eq!(c, WHITE);
    }

    #[test]
    fn refine_only_touches_the_selected_channel() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut c = grey(0.5);
        let channel = c.mutate(&mut rng, 0.6, Mode::Refine);
        assert_eq!(channel, Channel::Green);
        assert!(c.g >= 0.5 && c.g < 0.6);
        assert_eq!((c.r, c.b, c.a), (0.5, 0.5, 0.5));
    }

    #[test]
    fn randomize_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut c = grey(0.5);
        for _ in 0..100 {
            c.mutate(&mut rng, 0.3, Mode::Randomize);
            assert!(c.is_normalized());
        }
    }
}
