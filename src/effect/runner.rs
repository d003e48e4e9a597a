use core::fmt;

use embassy_time::{Duration, Instant};
use log::debug;

use super::{EffectContext, EffectId, EffectSlot};
use crate::{color::BLACK, strip::LedStrip};

/// Persisted tick interval value meaning "once per run call"
pub const EVERY_CALL_MS: u16 = u16::MAX;

/// Upper bound of the loop target
pub const MAX_NUM_LOOPS: u8 = 254;

/// How often a pattern steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickInterval {
    /// At most one step per [`EffectRunner::run`] call
    EveryCall,
    /// One step whenever the interval has elapsed
    Every(Duration),
}

impl TickInterval {
    /// Decode the persisted millisecond form
    ///
    /// `65535` means [`TickInterval::EveryCall`]; zero is raised to 1 ms.
    pub fn from_millis(ms: u16) -> Self {
        match ms {
            EVERY_CALL_MS => Self::EveryCall,
            ms => Self::Every(Duration::from_millis(u64::from(ms.max(1)))),
        }
    }

    /// Encode into the persisted millisecond form
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_millis(self) -> u16 {
        match self {
            Self::EveryCall => EVERY_CALL_MS,
            Self::Every(interval) => interval.as_millis().clamp(1, u64::from(EVERY_CALL_MS - 1)) as u16,
        }
    }

    fn next_due(self, now: Instant) -> Instant {
        match self {
            Self::EveryCall => now + Duration::from_ticks(1),
            Self::Every(interval) => now + interval,
        }
    }
}

impl fmt::Display for TickInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EveryCall => f.write_str("every call"),
            Self::Every(interval) => write!(f, "{}ms", interval.as_millis()),
        }
    }
}

/// A pattern together with its pacing and loop bookkeeping
///
/// A run starts with [`EffectRunner::pre_effect_reset`] and ends when
/// [`EffectRunner::run`] reports that `num_loops` passes are complete.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectRunner {
    pub(super) slot: EffectSlot,
    pub(super) tick_interval: TickInterval,
    pub(super) num_loops: u8,
    pub(super) loop_count: u8,
    next_due: Instant,
}

impl EffectRunner {
    /// Wrap a pattern with its default pacing
    pub fn new(slot: impl Into<EffectSlot>) -> Self {
        let slot = slot.into();
        let id = slot.id();
        Self {
            slot,
            tick_interval: id.default_tick_interval(),
            num_loops: id.default_num_loops(),
            loop_count: 0,
            next_due: Instant::from_ticks(0),
        }
    }

    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: TickInterval) -> Self {
        self.set_tick_interval(tick_interval);
        self
    }

    /// Set the loop target, clamped to `1..=254`
    #[must_use]
    pub fn with_num_loops(mut self, num_loops: u8) -> Self {
        self.set_num_loops(num_loops);
        self
    }

    /// Set the pacing, snapped to whole milliseconds in `1..=65534`
    pub fn set_tick_interval(&mut self, tick_interval: TickInterval) {
        self.tick_interval = TickInterval::from_millis(tick_interval.as_millis());
    }

    pub fn set_num_loops(&mut self, num_loops: u8) {
        self.num_loops = num_loops.clamp(1, MAX_NUM_LOOPS);
    }

    /// Step the pattern as often as it is due
    ///
    /// Returns `true` once the configured number of passes is complete.
    pub fn run<S: LedStrip + ?Sized>(&mut self, ctx: &EffectContext, strip: &mut S) -> bool {
        while ctx.now >= self.next_due {
            self.next_due = self.tick_interval.next_due(ctx.now);

            if self.slot.step(ctx, strip) {
                self.loop_count = self.loop_count.saturating_add(1);
                debug!(
                    "{} finished pass {}/{}",
                    self.id(),
                    self.loop_count,
                    self.num_loops
                );
                if self.loop_count >= self.num_loops {
                    return true;
                }
                self.slot.reset_counters(ctx.now);
            }
        }
        false
    }

    /// Prepare a fresh pass
    ///
    /// Blanks the strip buffer, makes the next [`run`](Self::run) step
    /// immediately and rewinds the pattern. The loop counter is only zeroed
    /// when `reset_loops` is set.
    pub fn pre_effect_reset<S: LedStrip + ?Sized>(
        &mut self,
        reset_loops: bool,
        now: Instant,
        strip: &mut S,
    ) {
        strip.clear(BLACK);
        self.next_due = now;
        self.slot.reset_counters(now);
        if reset_loops {
            self.loop_count = 0;
        }
        debug!(
            "About to start pass {}/{} of {}",
            u16::from(self.loop_count) + 1,
            self.num_loops,
            self
        );
    }

    pub fn id(&self) -> EffectId {
        self.slot.id()
    }

    pub fn slot(&self) -> &EffectSlot {
        &self.slot
    }

    pub fn slot_mut(&mut self) -> &mut EffectSlot {
        &mut self.slot
    }

    pub fn tick_interval(&self) -> TickInterval {
        self.tick_interval
    }

    pub fn num_loops(&self) -> u8 {
        self.num_loops
    }

    /// Passes completed in the current run
    pub fn loop_count(&self) -> u8 {
        self.loop_count
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }
}

impl fmt::Display for EffectRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.id().readable_name())?;
        self.slot.fmt_params(f)?;
        write!(f, "tick:{}; loops:{})", self.tick_interval, self.num_loops)
    }
}
