//! Loudness analysis of completed sample buffers
//!
//! Each frame removes the DC bias of the raw samples, optionally applies a
//! Hamming window, runs the spectral transform and sums the magnitudes into
//! one loudness value plus a smoothed average.

mod transform;
mod window;

use log::trace;

pub use transform::{MICROFFT_SIZE, MicroFft, SpectralFrame, Transform};

use crate::exchange::SampleConsumer;

/// Default decay of the running DC estimate
pub const DEFAULT_DC_ALPHA: f32 = 0.9;

/// Default smoothing of the average loudness
pub const DEFAULT_SMOOTHING: f32 = 0.95;

/// How the DC bias is estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DcRemoval {
    /// Exponential moving average kept across frames, subtracted per sample
    #[default]
    RunningAverage,
    /// Exact mean of the analysed samples, recomputed every frame
    Arithmetic,
}

/// Configuration of the loudness pipeline
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Apply a Hamming window before the transform
    pub windowing: bool,
    /// Decay factor of the running DC estimate
    pub dc_alpha: f32,
    /// Decay factor of the average loudness
    pub smoothing: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            windowing: true,
            dc_alpha: DEFAULT_DC_ALPHA,
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

/// Loudness shared with the effects
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoudnessState {
    /// Loudness of the latest frame
    pub current: f32,
    /// Exponentially smoothed loudness
    pub average: f32,
}

/// Foreground consumer turning sample buffers into loudness
///
/// `N` is the sample buffer length, `M` the transform size; only the first
/// `M` samples of a buffer are analysed.
pub struct LoudnessPipeline<T: Transform<M>, const N: usize, const M: usize> {
    transform: T,
    config: PipelineConfig,
    window: Option<[f32; M]>,
    frame: SpectralFrame<M>,
    running_mean: Option<f32>,
    loudness: LoudnessState,
}

impl<T: Transform<M>, const N: usize, const M: usize> LoudnessPipeline<T, N, M> {
    pub fn new(transform: T, config: PipelineConfig) -> Self {
        const { assert!(M <= N, "transform size must fit in the sample buffer") };
        const { assert!(M > 0, "transform size must not be zero") };
        Self {
            transform,
            config,
            window: config.windowing.then(window::hamming::<M>),
            frame: SpectralFrame::new(),
            running_mean: None,
            loudness: LoudnessState::default(),
        }
    }

    /// Process the freshest completed buffer, if one is ready
    ///
    /// Returns `true` when a frame was processed.
    pub fn poll(&mut self, samples: &SampleConsumer<'_, N>, mode: DcRemoval) -> bool {
        let Some(buffer) = samples.try_take() else {
            return false;
        };
        self.process(buffer.iter(), mode);
        true
    }

    /// Analyse one buffer worth of samples
    ///
    /// The first `M` samples feed the transform. In running-average mode the
    /// remaining samples still advance the DC estimate.
    pub fn process<I>(&mut self, samples: I, mode: DcRemoval)
    where
        I: IntoIterator<Item = u16>,
    {
        let mut samples = samples.into_iter();
        match mode {
            DcRemoval::Arithmetic => self.load_arithmetic(&mut samples),
            DcRemoval::RunningAverage => self.load_running(&mut samples),
        }

        if let Some(window) = &self.window {
            for (value, weight) in self.frame.real.iter_mut().zip(window.iter()) {
                *value *= weight;
            }
        }

        self.transform.forward(&mut self.frame);
        self.transform.complex_to_magnitude(&mut self.frame);

        let current: f32 = self.frame.magnitudes().iter().sum();
        let smoothing = self.config.smoothing;
        self.loudness.current = current;
        self.loudness.average = smoothing * self.loudness.average + (1.0 - smoothing) * current;

        trace!(
            "frame processed: current={} average={} dc={:?}",
            self.loudness.current, self.loudness.average, self.running_mean
        );
    }

    fn load_arithmetic(&mut self, samples: &mut impl Iterator<Item = u16>) {
        // Switching back drops the running estimate entirely
        self.running_mean = None;

        // Exact integer sum: M * u16::MAX stays well inside u32
        let mut sum = 0_u32;
        for (real, imag) in self.frame.real.iter_mut().zip(self.frame.imag.iter_mut()) {
            let value = samples.next().unwrap_or(0);
            *real = f32::from(value);
            *imag = 0.0;
            sum += u32::from(value);
        }

        #[allow(clippy::cast_possible_truncation)]
        let mean = (f64::from(sum) / M as f64) as f32;
        for real in &mut self.frame.real {
            *real -= mean;
        }
    }

    fn load_running(&mut self, samples: &mut impl Iterator<Item = u16>) {
        let alpha = self.config.dc_alpha;
        let mut samples = samples.map(f32::from).peekable();
        let Some(mut mean) = self.running_mean.or_else(|| samples.peek().copied()) else {
            self.frame = SpectralFrame::new();
            return;
        };

        for (real, imag) in self.frame.real.iter_mut().zip(self.frame.imag.iter_mut()) {
            let value = samples.next().unwrap_or(mean);
            mean += (1.0 - alpha) * (value - mean);
            *real = value - mean;
            *imag = 0.0;
        }

        for value in samples.take(N - M) {
            mean += (1.0 - alpha) * (value - mean);
        }
        self.running_mean = Some(mean);
    }

    /// Latest loudness values
    pub fn loudness(&self) -> LoudnessState {
        self.loudness
    }

    /// Running DC estimate, `None` until a running-average frame seeds it
    pub fn running_mean(&self) -> Option<f32> {
        self.running_mean
    }

    /// Spectrum of the latest frame (magnitudes in `real`)
    pub fn frame(&self) -> &SpectralFrame<M> {
        &self.frame
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
