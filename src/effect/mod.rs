//! Effect system with compile-time known pattern variants
//!
//! All patterns are stored in an enum to avoid heap allocations.
//! Each pattern implements the `Effect` trait; [`EffectRunner`] adds the
//! timing and loop bookkeeping shared by all of them.

mod color_wipe;
mod rainbow;
mod record;
mod runner;
mod theater_chase;
mod volume_shifter;

use core::fmt;

use embassy_time::{Duration, Instant};
use serde::Serialize;

pub use color_wipe::ColorWipeEffect;
pub use rainbow::{RainbowEffect, RainbowVariant};
pub use runner::{EVERY_CALL_MS, EffectRunner, MAX_NUM_LOOPS, TickInterval};
pub use theater_chase::{TheaterChaseEffect, TheaterChaseRainbowEffect};
pub use volume_shifter::{ENDLESS, VolumeShifterEffect};

use crate::{loudness::LoudnessState, strip::LedStrip};

const EFFECT_NAME_COLOR_WIPE: &str = "ClrWipe";
const EFFECT_NAME_RAINBOW: &str = "Rbow";
const EFFECT_NAME_RAINBOW_CYCLE: &str = "RbowCyc";
const EFFECT_NAME_THEATER_CHASE: &str = "Chase";
const EFFECT_NAME_THEATER_CHASE_RAINBOW: &str = "ChaseRbow";
const EFFECT_NAME_VOLUME_SHIFTER: &str = "VolShift";

/// Read-only data handed to every pattern step
#[derive(Debug, Clone, Copy)]
pub struct EffectContext {
    /// Current time of the foreground cycle
    pub now: Instant,
    /// Loudness of the latest processed frame
    pub loudness: LoudnessState,
}

impl EffectContext {
    pub fn new(now: Instant, loudness: LoudnessState) -> Self {
        Self { now, loudness }
    }
}

pub trait Effect {
    /// Rewind the pattern cursors to the start of one pass
    fn reset_counters(&mut self, now: Instant);

    /// Perform one bounded visual update
    ///
    /// Returns `true` once the pass is complete.
    fn step<S: LedStrip + ?Sized>(&mut self, ctx: &EffectContext, strip: &mut S) -> bool;
}

/// Effect slot - enum containing all possible patterns
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EffectSlot {
    ColorWipe(ColorWipeEffect),
    Rainbow(RainbowEffect),
    RainbowCycle(RainbowEffect),
    TheaterChase(TheaterChaseEffect),
    TheaterChaseRainbow(TheaterChaseRainbowEffect),
    VolumeShifter(VolumeShifterEffect),
}

/// Known pattern ids, addressable by their compressed persisted name
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectId {
    ColorWipe,
    Rainbow,
    RainbowCycle,
    TheaterChase,
    TheaterChaseRainbow,
    VolumeShifter,
}

impl EffectId {
    pub const ALL: [Self; 6] = [
        Self::ColorWipe,
        Self::Rainbow,
        Self::RainbowCycle,
        Self::TheaterChase,
        Self::TheaterChaseRainbow,
        Self::VolumeShifter,
    ];

    /// Pattern with its default parameters
    pub fn to_slot(self) -> EffectSlot {
        match self {
            Self::ColorWipe => EffectSlot::ColorWipe(ColorWipeEffect::default()),
            Self::Rainbow => EffectSlot::Rainbow(RainbowEffect::new(RainbowVariant::Uniform)),
            Self::RainbowCycle => EffectSlot::RainbowCycle(RainbowEffect::new(RainbowVariant::Cycle)),
            Self::TheaterChase => EffectSlot::TheaterChase(TheaterChaseEffect::default()),
            Self::TheaterChaseRainbow => {
                EffectSlot::TheaterChaseRainbow(TheaterChaseRainbowEffect::default())
            }
            Self::VolumeShifter => EffectSlot::VolumeShifter(VolumeShifterEffect::default()),
        }
    }

    /// Compressed name used in persisted records
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ColorWipe => EFFECT_NAME_COLOR_WIPE,
            Self::Rainbow => EFFECT_NAME_RAINBOW,
            Self::RainbowCycle => EFFECT_NAME_RAINBOW_CYCLE,
            Self::TheaterChase => EFFECT_NAME_THEATER_CHASE,
            Self::TheaterChaseRainbow => EFFECT_NAME_THEATER_CHASE_RAINBOW,
            Self::VolumeShifter => EFFECT_NAME_VOLUME_SHIFTER,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            EFFECT_NAME_COLOR_WIPE => Some(Self::ColorWipe),
            EFFECT_NAME_RAINBOW => Some(Self::Rainbow),
            EFFECT_NAME_RAINBOW_CYCLE => Some(Self::RainbowCycle),
            EFFECT_NAME_THEATER_CHASE => Some(Self::TheaterChase),
            EFFECT_NAME_THEATER_CHASE_RAINBOW => Some(Self::TheaterChaseRainbow),
            EFFECT_NAME_VOLUME_SHIFTER => Some(Self::VolumeShifter),
            _ => None,
        }
    }

    pub const fn readable_name(self) -> &'static str {
        match self {
            Self::ColorWipe => "Color wipe",
            Self::Rainbow => "Rainbow",
            Self::RainbowCycle => "Rainbow cycle",
            Self::TheaterChase => "Theater chase",
            Self::TheaterChaseRainbow => "Rainbow theater chase",
            Self::VolumeShifter => "Volume shifter",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::ColorWipe => "Fills the strip with one color, one pixel at a time from start to end",
            Self::Rainbow => "Paints the whole strip in one rainbow color and slowly rotates it",
            Self::RainbowCycle => "Spreads the rainbow along the strip and slowly rotates it",
            Self::TheaterChase => "Particles of one color chasing each other around the strip",
            Self::TheaterChaseRainbow => "Rainbow colored particles chasing each other around the strip",
            Self::VolumeShifter => "Follows the music volume by changing color and intensity",
        }
    }

    pub const fn default_tick_interval(self) -> TickInterval {
        match self {
            Self::ColorWipe | Self::Rainbow | Self::RainbowCycle => {
                TickInterval::Every(Duration::from_millis(20))
            }
            Self::TheaterChase | Self::TheaterChaseRainbow => {
                TickInterval::Every(Duration::from_millis(50))
            }
            Self::VolumeShifter => TickInterval::EveryCall,
        }
    }

    pub const fn default_num_loops(self) -> u8 {
        match self {
            Self::RainbowCycle => 3,
            Self::TheaterChase => 5,
            _ => 1,
        }
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.readable_name())
    }
}

impl EffectSlot {
    /// Get the pattern id for persistence and observation
    pub fn id(&self) -> EffectId {
        match self {
            Self::ColorWipe(_) => EffectId::ColorWipe,
            Self::Rainbow(_) => EffectId::Rainbow,
            Self::RainbowCycle(_) => EffectId::RainbowCycle,
            Self::TheaterChase(_) => EffectId::TheaterChase,
            Self::TheaterChaseRainbow(_) => EffectId::TheaterChaseRainbow,
            Self::VolumeShifter(_) => EffectId::VolumeShifter,
        }
    }

    pub fn reset_counters(&mut self, now: Instant) {
        match self {
            Self::ColorWipe(effect) => effect.reset_counters(now),
            Self::Rainbow(effect) | Self::RainbowCycle(effect) => effect.reset_counters(now),
            Self::TheaterChase(effect) => effect.reset_counters(now),
            Self::TheaterChaseRainbow(effect) => effect.reset_counters(now),
            Self::VolumeShifter(effect) => effect.reset_counters(now),
        }
    }

    pub fn step<S: LedStrip + ?Sized>(&mut self, ctx: &EffectContext, strip: &mut S) -> bool {
        match self {
            Self::ColorWipe(effect) => effect.step(ctx, strip),
            Self::Rainbow(effect) | Self::RainbowCycle(effect) => effect.step(ctx, strip),
            Self::TheaterChase(effect) => effect.step(ctx, strip),
            Self::TheaterChaseRainbow(effect) => effect.step(ctx, strip),
            Self::VolumeShifter(effect) => effect.step(ctx, strip),
        }
    }

    /// Write the pattern parameters as `key:value; ` pairs
    pub(crate) fn fmt_params(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColorWipe(effect) => {
                let c = effect.color();
                write!(f, "c:[{},{},{}]; ", c.r, c.g, c.b)
            }
            Self::TheaterChase(effect) => {
                let c = effect.color();
                write!(f, "c:[{},{},{}]; step:{}; ", c.r, c.g, c.b, effect.step_size())
            }
            Self::TheaterChaseRainbow(effect) => write!(f, "step:{}; ", effect.step_size()),
            Self::VolumeShifter(effect) => match effect.length_ms() {
                ENDLESS => f.write_str("length:endless; "),
                ms => write!(f, "length:{ms}ms; "),
            },
            Self::Rainbow(_) | Self::RainbowCycle(_) => Ok(()),
        }
    }
}

impl Default for EffectSlot {
    fn default() -> Self {
        EffectId::VolumeShifter.to_slot()
    }
}

impl From<ColorWipeEffect> for EffectSlot {
    fn from(effect: ColorWipeEffect) -> Self {
        Self::ColorWipe(effect)
    }
}

impl From<TheaterChaseEffect> for EffectSlot {
    fn from(effect: TheaterChaseEffect) -> Self {
        Self::TheaterChase(effect)
    }
}

impl From<TheaterChaseRainbowEffect> for EffectSlot {
    fn from(effect: TheaterChaseRainbowEffect) -> Self {
        Self::TheaterChaseRainbow(effect)
    }
}

impl From<VolumeShifterEffect> for EffectSlot {
    fn from(effect: VolumeShifterEffect) -> Self {
        Self::VolumeShifter(effect)
    }
}

impl From<RainbowEffect> for EffectSlot {
    fn from(effect: RainbowEffect) -> Self {
        match effect.variant() {
            RainbowVariant::Uniform => Self::Rainbow(effect),
            RainbowVariant::Cycle => Self::RainbowCycle(effect),
        }
    }
}
