//! Rotating list of effect runners
//!
//! Exactly one runner is active at a time. When it reports its run finished
//! the list advances to the next entry, wrapping around at the end.

use alloc::{format, string::String};

use embassy_time::{Duration, Instant};
use heapless::Vec;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    MAX_RECORD_LEN,
    color::Rgb,
    effect::{
        ColorWipeEffect, EffectContext, EffectId, EffectRunner, RainbowEffect, RainbowVariant,
        TheaterChaseRainbowEffect, TickInterval, VolumeShifterEffect,
    },
    error::ConfigError,
    store::ConfigStore,
    strip::LedStrip,
};

/// Length of the shifter in the fallback list
pub const DEFAULT_SHIFTER_LENGTH_MS: u32 = 30_000;

/// Where the list lives in a [`ConfigStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLayout {
    /// Prefix shared by every key the list owns
    pub directory: &'static str,
    /// Key of the record holding the effect count
    pub root_key: &'static str,
    /// Per-effect keys are `{record_prefix}{index}{record_suffix}`
    pub record_prefix: &'static str,
    pub record_suffix: &'static str,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            directory: "/ledEffects/",
            root_key: "/ledEffects/numEffects.json",
            record_prefix: "/ledEffects/effect",
            record_suffix: ".json",
        }
    }
}

impl StoreLayout {
    pub fn record_key(&self, index: usize) -> String {
        format!("{}{}{}", self.record_prefix, index, self.record_suffix)
    }
}

#[derive(Serialize, Deserialize)]
struct ListRoot {
    #[serde(rename = "numEffects")]
    num_effects: usize,
}

pub struct EffectList<const CAP: usize> {
    effects: Vec<EffectRunner, CAP>,
    current: usize,
}

impl<const CAP: usize> Default for EffectList<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> EffectList<CAP> {
    pub const fn new() -> Self {
        Self {
            effects: Vec::new(),
            current: 0,
        }
    }

    /// The fallback list: a single volume shifter
    pub fn with_defaults() -> Self {
        let mut list = Self::new();
        list.load_default();
        list
    }

    /// The demo rotation of the firmware
    ///
    /// Entries beyond `CAP` are dropped.
    pub fn showcase() -> Self {
        const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
        const GREEN: Rgb = Rgb { r: 0, g: 255, b: 0 };
        const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };

        let wipe = |color, ms| {
            EffectRunner::new(ColorWipeEffect::new(color))
                .with_tick_interval(TickInterval::Every(Duration::from_millis(ms)))
        };

        let mut list = Self::new();
        for runner in [
            EffectRunner::new(VolumeShifterEffect::new(15_000)),
            wipe(RED, 30),
            EffectRunner::new(RainbowEffect::new(RainbowVariant::Uniform)),
            wipe(GREEN, 20),
            EffectRunner::new(RainbowEffect::new(RainbowVariant::Cycle)),
            wipe(BLUE, 10),
            EffectRunner::new(TheaterChaseRainbowEffect::new(3)),
        ] {
            if list.add_effect(runner).is_err() {
                break;
            }
        }
        list
    }

    /// Append a runner, handing it back when the list is full
    pub fn add_effect(&mut self, effect: EffectRunner) -> Result<(), EffectRunner> {
        self.effects.push(effect)
    }

    /// Remove the runner at `index`
    ///
    /// The active index stays in range; callers restart the list to begin a
    /// fresh run.
    pub fn remove_effect(&mut self, index: usize) -> Option<EffectRunner> {
        if index >= self.effects.len() {
            return None;
        }
        let removed = self.effects.remove(index);
        if self.current >= self.effects.len() {
            self.current = 0;
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.effects.clear();
        self.current = 0;
    }

    /// Replace the list with the fallback list
    pub fn load_default(&mut self) {
        self.clear();
        let shifter = EffectRunner::new(VolumeShifterEffect::new(DEFAULT_SHIFTER_LENGTH_MS));
        if self.add_effect(shifter).is_err() {
            warn!("Effect list has no room for the default effect");
        }
    }

    /// Start over with a fresh run of the first entry
    pub fn restart<S: LedStrip + ?Sized>(&mut self, now: Instant, strip: &mut S) {
        self.current = 0;
        if let Some(effect) = self.effects.first_mut() {
            effect.pre_effect_reset(true, now, strip);
        }
    }

    /// Advance to the next entry, wrapping around
    ///
    /// No-op on an empty list.
    pub fn next_effect<S: LedStrip + ?Sized>(&mut self, now: Instant, strip: &mut S) {
        if self.effects.is_empty() {
            self.current = 0;
            return;
        }
        self.current = (self.current + 1) % self.effects.len();
        if let Some(effect) = self.effects.get_mut(self.current) {
            effect.pre_effect_reset(true, now, strip);
        }
    }

    /// Run the active entry
    ///
    /// Returns `true` when it finished and the list rotated.
    pub fn run<S: LedStrip + ?Sized>(&mut self, ctx: &EffectContext, strip: &mut S) -> bool {
        let Some(effect) = self.effects.get_mut(self.current) else {
            return false;
        };
        if !effect.run(ctx, strip) {
            return false;
        }
        self.next_effect(ctx.now, strip);
        true
    }

    /// Replace the list with the one persisted in `store`
    ///
    /// Any read or parse failure installs the fallback list and returns the
    /// error. Records naming unknown patterns are skipped.
    pub fn load_config<C: ConfigStore + ?Sized>(
        &mut self,
        store: &C,
        layout: &StoreLayout,
    ) -> Result<usize, ConfigError> {
        info!("Loading effect list from {}", layout.root_key);
        match Self::read_list(store, layout) {
            Ok(effects) => {
                self.effects = effects;
                self.current = 0;
                info!("Loaded {} effects from {}", self.effects.len(), layout.root_key);
                Ok(self.effects.len())
            }
            Err(err) => {
                error!(
                    "Failed to load effect list from {}: {}, using defaults",
                    layout.root_key, err
                );
                self.load_default();
                Err(err)
            }
        }
    }

    fn read_list<C: ConfigStore + ?Sized>(
        store: &C,
        layout: &StoreLayout,
    ) -> Result<Vec<EffectRunner, CAP>, ConfigError> {
        let root = store.read_value(layout.root_key, MAX_RECORD_LEN)?;
        let root: ListRoot = serde_json::from_slice(&root)?;
        if root.num_effects > CAP {
            return Err(ConfigError::TooManyEffects {
                count: root.num_effects,
                capacity: CAP,
            });
        }

        let mut effects = Vec::new();
        for index in 0..root.num_effects {
            let key = layout.record_key(index);
            match EffectRunner::load_from_store(store, &key)? {
                Some(effect) => {
                    if effects.push(effect).is_err() {
                        return Err(ConfigError::TooManyEffects {
                            count: root.num_effects,
                            capacity: CAP,
                        });
                    }
                }
                None => warn!("Skipping {}: unknown effect", key),
            }
        }
        Ok(effects)
    }

    /// Persist the list into `store`
    ///
    /// Writes the root record, then one record per entry, then deletes any
    /// other key left under the layout directory. The in-memory list is
    /// unaffected by failures.
    pub fn save_config<C: ConfigStore + ?Sized>(
        &self,
        store: &mut C,
        layout: &StoreLayout,
    ) -> Result<(), ConfigError> {
        match self.write_list(store, layout) {
            Ok(()) => {
                info!("Saved {} effects to {}", self.effects.len(), layout.root_key);
                Ok(())
            }
            Err(err) => {
                error!("Failed to save effect list to {}: {}", layout.root_key, err);
                Err(err)
            }
        }
    }

    fn write_list<C: ConfigStore + ?Sized>(
        &self,
        store: &mut C,
        layout: &StoreLayout,
    ) -> Result<(), ConfigError> {
        let root = serde_json::to_vec(&ListRoot {
            num_effects: self.effects.len(),
        })?;
        store.write(layout.root_key, &root)?;

        for (index, effect) in self.effects.iter().enumerate() {
            effect.save_config(store, &layout.record_key(index))?;
        }

        for key in store.keys(layout.directory)? {
            if !self.is_current_key(&key, layout) {
                info!("Removing stale record {}", key);
                store.remove(&key)?;
            }
        }
        Ok(())
    }

    fn is_current_key(&self, key: &str, layout: &StoreLayout) -> bool {
        key == layout.root_key
            || (0..self.effects.len()).any(|index| layout.record_key(index) == key)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Index of the active entry (0 when empty)
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&EffectRunner> {
        self.effects.get(self.current)
    }

    pub fn get(&self, index: usize) -> Option<&EffectRunner> {
        self.effects.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut EffectRunner> {
        self.effects.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectRunner> {
        self.effects.iter()
    }

    /// Ids of the entries, in order
    pub fn ids(&self) -> impl Iterator<Item = EffectId> + '_ {
        self.effects.iter().map(EffectRunner::id)
    }
}
