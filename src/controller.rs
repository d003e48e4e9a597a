//! Foreground cycle of the controller
//!
//! Portable: no async, no platform timers. The caller supplies the current
//! time on every call and decides how long to wait in between.

use embassy_time::Instant;
use log::{info, warn};

use crate::{
    effect::{EffectContext, EffectRunner},
    effect_list::{EffectList, StoreLayout},
    error::ConfigError,
    exchange::SampleConsumer,
    loudness::{DcRemoval, LoudnessPipeline, LoudnessState, PipelineConfig, Transform},
    store::ConfigStore,
    strip::LedStrip,
};

/// Configuration for the controller
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerConfig {
    pub pipeline: PipelineConfig,
    pub dc_removal: DcRemoval,
    pub layout: StoreLayout,
}

/// Outcome of one [`Controller::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// A sample buffer was turned into a new loudness value
    pub frame_processed: bool,
    /// The active effect finished and the list moved on
    pub effect_rotated: bool,
}

/// Owns everything the foreground touches
///
/// # Usage
///
/// ```ignore
/// static SAMPLES: SampleExchange<SAMPLE_BUFFER_LEN> = SampleExchange::new();
///
/// let mut controller = Controller::new(
///     SAMPLES.consumer(),
///     MicroFft,
///     Strip::<_, STRIP_LEN>::new(driver),
///     ControllerConfig::default(),
/// );
/// controller.start(&store, Instant::now()).ok();
///
/// loop {
///     controller.tick(Instant::now());
///     // network and other cooperative work
/// }
/// ```
pub struct Controller<
    'a,
    T: Transform<M>,
    S: LedStrip,
    const N: usize,
    const M: usize,
    const CAP: usize,
> {
    samples: SampleConsumer<'a, N>,
    pipeline: LoudnessPipeline<T, N, M>,
    effects: EffectList<CAP>,
    strip: S,
    config: ControllerConfig,
}

impl<'a, T: Transform<M>, S: LedStrip, const N: usize, const M: usize, const CAP: usize>
    Controller<'a, T, S, N, M, CAP>
{
    /// Create a controller with an empty effect list
    pub fn new(
        samples: SampleConsumer<'a, N>,
        transform: T,
        strip: S,
        config: ControllerConfig,
    ) -> Self {
        Self {
            samples,
            pipeline: LoudnessPipeline::new(transform, config.pipeline),
            effects: EffectList::new(),
            strip,
            config,
        }
    }

    /// Load the persisted list and start its first entry
    ///
    /// On failure the fallback list is started and the error returned.
    pub fn start<C: ConfigStore + ?Sized>(
        &mut self,
        store: &C,
        now: Instant,
    ) -> Result<(), ConfigError> {
        let loaded = self.effects.load_config(store, &self.config.layout);
        self.effects.restart(now, &mut self.strip);
        info!("Controller started with {} effects", self.effects.len());
        loaded.map(|_| ())
    }

    /// Run one foreground cycle
    ///
    /// Processes at most one ready sample buffer, then runs the active
    /// effect once.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let frame_processed = self.pipeline.poll(&self.samples, self.config.dc_removal);
        let ctx = EffectContext::new(now, self.pipeline.loudness());
        let effect_rotated = self.effects.run(&ctx, &mut self.strip);
        TickReport {
            frame_processed,
            effect_rotated,
        }
    }

    /// Persist the current list
    pub fn save<C: ConfigStore + ?Sized>(&self, store: &mut C) -> Result<(), ConfigError> {
        self.effects.save_config(store, &self.config.layout)
    }

    /// Append an effect, handing it back when the list is full
    pub fn add_effect(&mut self, effect: EffectRunner) -> Result<(), EffectRunner> {
        self.effects.add_effect(effect).inspect_err(|rejected| {
            warn!("Effect list full, dropping {}", rejected);
        })
    }

    /// Remove an effect and restart the list from its first entry
    pub fn remove_effect(&mut self, index: usize, now: Instant) -> Option<EffectRunner> {
        let removed = self.effects.remove_effect(index)?;
        self.effects.restart(now, &mut self.strip);
        Some(removed)
    }

    pub fn restart(&mut self, now: Instant) {
        self.effects.restart(now, &mut self.strip);
    }

    pub fn set_dc_removal(&mut self, mode: DcRemoval) {
        self.config.dc_removal = mode;
    }

    pub fn dc_removal(&self) -> DcRemoval {
        self.config.dc_removal
    }

    pub fn loudness(&self) -> LoudnessState {
        self.pipeline.loudness()
    }

    pub fn pipeline(&self) -> &LoudnessPipeline<T, N, M> {
        &self.pipeline
    }

    pub fn effects(&self) -> &EffectList<CAP> {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut EffectList<CAP> {
        &mut self.effects
    }

    pub fn strip(&self) -> &S {
        &self.strip
    }

    pub fn strip_mut(&mut self) -> &mut S {
        &mut self.strip
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}
