//! Persisted form of an [`EffectRunner`]
//!
//! A record is a flat JSON object:
//!
//! ```json
//! {"effectName":"ClrWipe","tickInterval":20,"numLoops":1,"color":255}
//! ```
//!
//! Pattern parameters sit next to the common fields. Cursors and loop
//! progress are never stored, a loaded pattern always starts from the
//! beginning. Missing timing fields fall back to the pattern defaults.

use alloc::{string::String, vec::Vec};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{
    EVERY_CALL_MS, EffectId, EffectRunner, EffectSlot, MAX_NUM_LOOPS, RainbowEffect,
    RainbowVariant, TickInterval,
};
use crate::{MAX_RECORD_LEN, error::ConfigError, store::ConfigStore};

#[derive(Serialize)]
struct RecordOut<'a> {
    #[serde(rename = "effectName")]
    effect_name: &'static str,
    #[serde(rename = "tickInterval")]
    tick_interval: u16,
    #[serde(rename = "numLoops")]
    num_loops: u8,
    #[serde(flatten)]
    params: &'a EffectSlot,
}

#[derive(Deserialize)]
struct RecordHeader {
    #[serde(rename = "effectName")]
    effect_name: String,
    #[serde(rename = "tickInterval", default)]
    tick_interval: Option<u32>,
    #[serde(rename = "numLoops", default)]
    num_loops: Option<u32>,
}

impl RecordHeader {
    fn tick_interval(&self, id: EffectId) -> TickInterval {
        self.tick_interval.map_or(id.default_tick_interval(), |ms| {
            TickInterval::from_millis(u16::try_from(ms).unwrap_or(EVERY_CALL_MS - 1))
        })
    }

    fn num_loops(&self, id: EffectId) -> u8 {
        self.num_loops.map_or(id.default_num_loops(), |loops| {
            u8::try_from(loops).unwrap_or(MAX_NUM_LOOPS)
        })
    }
}

fn parse_slot(id: EffectId, bytes: &[u8]) -> Result<EffectSlot, serde_json::Error> {
    let slot = match id {
        EffectId::ColorWipe => EffectSlot::ColorWipe(serde_json::from_slice(bytes)?),
        EffectId::Rainbow => EffectSlot::Rainbow(
            serde_json::from_slice::<RainbowEffect>(bytes)?.with_variant(RainbowVariant::Uniform),
        ),
        EffectId::RainbowCycle => EffectSlot::RainbowCycle(
            serde_json::from_slice::<RainbowEffect>(bytes)?.with_variant(RainbowVariant::Cycle),
        ),
        EffectId::TheaterChase => EffectSlot::TheaterChase(serde_json::from_slice(bytes)?),
        EffectId::TheaterChaseRainbow => {
            EffectSlot::TheaterChaseRainbow(serde_json::from_slice(bytes)?)
        }
        EffectId::VolumeShifter => EffectSlot::VolumeShifter(serde_json::from_slice(bytes)?),
    };
    Ok(slot)
}

impl EffectRunner {
    /// Build a runner from a persisted record
    ///
    /// Returns `Ok(None)` when the record names an unknown pattern; callers
    /// skip such entries.
    pub fn from_record(bytes: &[u8]) -> Result<Option<Self>, ConfigError> {
        let header: RecordHeader = serde_json::from_slice(bytes)?;
        let Some(id) = EffectId::parse_from_str(&header.effect_name) else {
            warn!("Unknown effect {:?} in record, skipping", header.effect_name);
            return Ok(None);
        };

        let runner = Self::new(parse_slot(id, bytes)?)
            .with_tick_interval(header.tick_interval(id))
            .with_num_loops(header.num_loops(id));
        Ok(Some(runner))
    }

    /// Read and build a runner from `key`
    pub fn load_from_store<C: ConfigStore + ?Sized>(
        store: &C,
        key: &str,
    ) -> Result<Option<Self>, ConfigError> {
        let bytes = store.read_value(key, MAX_RECORD_LEN)?;
        Self::from_record(&bytes)
    }

    /// Replace parameters and pacing with those of a record for the same
    /// pattern
    ///
    /// Progress restarts from the beginning of the run.
    pub fn load_config(&mut self, bytes: &[u8]) -> Result<(), ConfigError> {
        let header: RecordHeader = serde_json::from_slice(bytes)?;
        let id = EffectId::parse_from_str(&header.effect_name)
            .ok_or_else(|| ConfigError::UnknownEffect(header.effect_name.clone()))?;
        if id != self.id() {
            return Err(ConfigError::EffectMismatch {
                expected: self.id().as_str(),
                found: header.effect_name,
            });
        }

        self.slot = parse_slot(id, bytes)?;
        self.set_tick_interval(header.tick_interval(id));
        self.set_num_loops(header.num_loops(id));
        self.loop_count = 0;
        Ok(())
    }

    /// Encode the runner as a record
    pub fn to_record(&self) -> Result<Vec<u8>, ConfigError> {
        let record = RecordOut {
            effect_name: self.id().as_str(),
            tick_interval: self.tick_interval.as_millis(),
            num_loops: self.num_loops,
            params: &self.slot,
        };
        Ok(serde_json::to_vec(&record)?)
    }

    /// Write the record to `key`
    pub fn save_config<C: ConfigStore + ?Sized>(
        &self,
        store: &mut C,
        key: &str,
    ) -> Result<(), ConfigError> {
        let record = self.to_record()?;
        store.write(key, &record)?;
        debug!("Saved {} to {}", self, key);
        Ok(())
    }
}
