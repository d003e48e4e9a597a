//! Rainbow effects driven by the classic color wheel
//!
//! Provides two variants sharing one cursor over the 256 wheel positions:
//! - `Uniform`: the whole strip shows a narrow band of neighbouring hues
//! - `Cycle`: one full wheel is spread along the strip

use embassy_time::Instant;
use serde::{Deserialize, Serialize};

use super::{Effect, EffectContext};
use crate::{color::wheel, strip::LedStrip};

/// Wheel positions in one pass
const WHEEL_STEPS: u16 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RainbowVariant {
    #[default]
    Uniform,
    Cycle,
}

/// Rainbow effect rotating the wheel by one position per step
///
/// Carries no persisted parameters; the variant is implied by the record
/// name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RainbowEffect {
    #[serde(skip)]
    variant: RainbowVariant,
    #[serde(skip)]
    offset: u16,
}

impl RainbowEffect {
    pub const fn new(variant: RainbowVariant) -> Self {
        Self { variant, offset: 0 }
    }

    #[must_use]
    pub fn with_variant(mut self, variant: RainbowVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn variant(&self) -> RainbowVariant {
        self.variant
    }

    /// Wheel position of the next step
    pub fn offset(&self) -> u16 {
        self.offset
    }
}

impl Effect for RainbowEffect {
    fn reset_counters(&mut self, _now: Instant) {
        self.offset = 0;
    }

    #[allow(clippy::cast_possible_truncation)]
    fn step<S: LedStrip + ?Sized>(&mut self, _ctx: &EffectContext, strip: &mut S) -> bool {
        if self.offset >= WHEEL_STEPS {
            return true;
        }

        let len = strip.len();
        let offset = self.offset as usize;
        for j in 0..len {
            let position = match self.variant {
                RainbowVariant::Uniform => offset + j,
                RainbowVariant::Cycle => j * 256 / len + offset,
            };
            strip.set_pixel(j, wheel((position & 0xFF) as u8));
        }
        strip.show();

        self.offset += 1;
        self.offset >= WHEEL_STEPS
    }
}
