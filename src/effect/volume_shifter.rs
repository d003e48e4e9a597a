//! Loudness-following scroller
//!
//! Every step scrolls the strip by one pixel and feeds a new pixel whose hue
//! follows the current loudness relative to its average. Loud peaks light
//! up at full brightness.

use embassy_time::{Duration, Instant};
use serde::{Deserialize, Serialize};

use super::{Effect, EffectContext};
use crate::{
    color::{hsv_from_unit, hsv2rgb},
    strip::LedStrip,
};

/// Length value meaning the pass never ends
pub const ENDLESS: u32 = u32::MAX;

const DEFAULT_LENGTH_MS: u32 = 30_000;
const BASE_HUE: f32 = 0.6;
const HUE_SPAN: f32 = 0.4;
const PEAK_RATIO: f32 = 1.5;
const PEAK_BRIGHTNESS: f32 = 1.0;
const IDLE_BRIGHTNESS: f32 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeShifterEffect {
    #[serde(rename = "tEffectLength")]
    length_ms: u32,
    #[serde(skip)]
    deadline: Option<Instant>,
}

impl Default for VolumeShifterEffect {
    fn default() -> Self {
        Self::new(DEFAULT_LENGTH_MS)
    }
}

impl VolumeShifterEffect {
    /// Create a shifter whose pass lasts `length_ms` ([`ENDLESS`] never ends)
    pub const fn new(length_ms: u32) -> Self {
        Self {
            length_ms,
            deadline: None,
        }
    }

    pub const fn endless() -> Self {
        Self::new(ENDLESS)
    }

    pub fn length_ms(&self) -> u32 {
        self.length_ms
    }

    /// End of the current pass, `None` when endless or not started
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl Effect for VolumeShifterEffect {
    fn reset_counters(&mut self, now: Instant) {
        self.deadline = (self.length_ms != ENDLESS)
            .then(|| now + Duration::from_millis(u64::from(self.length_ms)));
    }

    fn step<S: LedStrip + ?Sized>(&mut self, ctx: &EffectContext, strip: &mut S) -> bool {
        if self.deadline.is_some_and(|deadline| ctx.now >= deadline) {
            return true;
        }

        let current = ctx.loudness.current;
        let average = ctx.loudness.average;
        let ratio = if average > 0.0 {
            current / (2.0 * average)
        } else {
            0.0
        };
        let brightness = if current > PEAK_RATIO * average {
            PEAK_BRIGHTNESS
        } else {
            IDLE_BRIGHTNESS
        };

        strip.shift_right(1);
        strip.set_pixel(0, hsv2rgb(hsv_from_unit(BASE_HUE + HUE_SPAN * ratio, 1.0, brightness)));
        strip.show();
        false
    }
}
