//! Single color wipe
//!
//! Paints the strip one pixel per step from the first to the last pixel.

use embassy_time::Instant;
use serde::{Deserialize, Serialize};

use super::{Effect, EffectContext};
use crate::{
    color::{Rgb, packed},
    strip::LedStrip,
};

const DEFAULT_COLOR: Rgb = Rgb { r: 255, g: 0, b: 0 };

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorWipeEffect {
    #[serde(with = "packed")]
    color: Rgb,
    #[serde(skip)]
    cursor: usize,
}

impl Default for ColorWipeEffect {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR)
    }
}

impl ColorWipeEffect {
    pub const fn new(color: Rgb) -> Self {
        Self { color, cursor: 0 }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Index of the next pixel to paint
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Effect for ColorWipeEffect {
    fn reset_counters(&mut self, _now: Instant) {
        self.cursor = 0;
    }

    fn step<S: LedStrip + ?Sized>(&mut self, _ctx: &EffectContext, strip: &mut S) -> bool {
        if self.cursor >= strip.len() {
            return true;
        }

        strip.set_pixel(self.cursor, self.color);
        strip.show();
        self.cursor += 1;
        self.cursor >= strip.len()
    }
}
