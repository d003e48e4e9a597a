#![no_std]

extern crate alloc;

pub mod color;
pub mod controller;
pub mod effect;
pub mod effect_list;
pub mod error;
pub mod exchange;
pub mod loudness;
pub mod sampler;
pub mod store;
pub mod strip;

pub use controller::{Controller, ControllerConfig, TickReport};
pub use effect::{EffectContext, EffectId, EffectRunner, EffectSlot, TickInterval};
pub use effect_list::{EffectList, StoreLayout};
pub use error::ConfigError;
pub use exchange::{SampleConsumer, SampleExchange, SampleProducer};
pub use loudness::{DcRemoval, LoudnessPipeline, LoudnessState, MicroFft, PipelineConfig};
pub use sampler::{SampleSource, Sampler};
pub use store::{ConfigStore, MemoryStore, StoreError};
pub use strip::{LedStrip, Strip};

pub use color::{Hsv, Rgb};
pub use embassy_time::{Duration, Instant};

/// Audio sampling rate of the interrupt producer
pub const SAMPLE_RATE_HZ: u32 = 10_000;

/// Period of the sampling timer
pub const SAMPLE_PERIOD: Duration = Duration::from_micros(1_000_000 / SAMPLE_RATE_HZ as u64);

/// Samples per exchange buffer
pub const SAMPLE_BUFFER_LEN: usize = 1000;

/// Points per loudness transform
pub const FFT_SIZE: usize = loudness::MICROFFT_SIZE;

/// Pixels on the strip
pub const STRIP_LEN: usize = 450;

/// Capacity of the effect list
pub const MAX_EFFECTS: usize = 16;

/// Largest persisted value accepted when loading
pub const MAX_RECORD_LEN: usize = 2048;

/// Pipeline with the stock transform and buffer sizes
pub type DefaultPipeline = LoudnessPipeline<MicroFft, SAMPLE_BUFFER_LEN, FFT_SIZE>;

/// Abstract LED driver trait
///
/// Implement this trait to support different hardware platforms.
/// [`Strip`] is generic over this trait.
pub trait OutputDriver {
    /// Write colors to the LED strip
    fn write(&mut self, colors: &[Rgb]);
}
