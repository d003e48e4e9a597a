//! Theater-style chasing lights
//!
//! Every `step`-th pixel is lit, shown and blanked again in the buffer, so
//! the next step starts from a dark strip. Successive steps move the lit set
//! by one pixel.

use embassy_time::Instant;
use serde::{Deserialize, Serialize};

use super::{Effect, EffectContext};
use crate::{
    color::{BLACK, Rgb, packed, wheel},
    strip::LedStrip,
};

const DEFAULT_COLOR: Rgb = Rgb { r: 255, g: 0, b: 0 };
const DEFAULT_STEP: u8 = 5;
const WHEEL_STEPS: u16 = 256;

/// Light every `spacing`-th pixel starting at `phase`, flush, then blank them
fn flash<S, F>(strip: &mut S, phase: usize, spacing: usize, mut color_at: F)
where
    S: LedStrip + ?Sized,
    F: FnMut(usize) -> Rgb,
{
    let len = strip.len();
    for k in (0..len).step_by(spacing) {
        strip.set_pixel(k + phase, color_at(k));
    }
    strip.show();
    for k in (0..len).step_by(spacing) {
        strip.set_pixel(k + phase, BLACK);
    }
}

/// Single color chase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TheaterChaseEffect {
    #[serde(with = "packed")]
    color: Rgb,
    step: u8,
    #[serde(skip)]
    phase: u8,
}

impl Default for TheaterChaseEffect {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR, DEFAULT_STEP)
    }
}

impl TheaterChaseEffect {
    /// Create a chase lighting every `step`-th pixel (0 is treated as 1)
    pub const fn new(color: Rgb, step: u8) -> Self {
        Self {
            color,
            step,
            phase: 0,
        }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn step_size(&self) -> u8 {
        self.step
    }
}

impl Effect for TheaterChaseEffect {
    fn reset_counters(&mut self, _now: Instant) {
        self.phase = 0;
    }

    fn step<S: LedStrip + ?Sized>(&mut self, _ctx: &EffectContext, strip: &mut S) -> bool {
        let spacing = self.step.max(1);
        if self.phase >= spacing {
            return true;
        }

        let color = self.color;
        flash(strip, usize::from(self.phase), usize::from(spacing), |_| color);
        self.phase += 1;
        self.phase >= spacing
    }
}

/// Chase with rainbow colored particles
///
/// One pass walks all 256 wheel offsets, each through `step` phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TheaterChaseRainbowEffect {
    step: u8,
    #[serde(skip)]
    hue: u16,
    #[serde(skip)]
    phase: u8,
}

impl Default for TheaterChaseRainbowEffect {
    fn default() -> Self {
        Self::new(DEFAULT_STEP)
    }
}

impl TheaterChaseRainbowEffect {
    pub const fn new(step: u8) -> Self {
        Self {
            step,
            hue: 0,
            phase: 0,
        }
    }

    pub fn step_size(&self) -> u8 {
        self.step
    }
}

impl Effect for TheaterChaseRainbowEffect {
    fn reset_counters(&mut self, _now: Instant) {
        self.hue = 0;
        self.phase = 0;
    }

    #[allow(clippy::cast_possible_truncation)]
    fn step<S: LedStrip + ?Sized>(&mut self, _ctx: &EffectContext, strip: &mut S) -> bool {
        let spacing = self.step.max(1);
        if self.hue >= WHEEL_STEPS {
            return true;
        }

        let hue = usize::from(self.hue);
        flash(strip, usize::from(self.phase), usize::from(spacing), |k| {
            wheel(((k + hue) % 255) as u8)
        });

        self.phase += 1;
        if self.phase >= spacing {
            self.phase = 0;
            self.hue += 1;
        }
        self.hue >= WHEEL_STEPS
    }
}
