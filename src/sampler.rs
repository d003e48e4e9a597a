//! Interrupt-context sample acquisition

use crate::exchange::SampleProducer;

/// Hardware source of one unsigned audio sample per call
///
/// The call may block for the duration of one conversion. Wire framing and
/// bit-order fixes belong to the implementation.
pub trait SampleSource {
    fn read_sample(&mut self) -> u16;
}

/// Producer driven by the sampling timer
///
/// Call [`Sampler::sample`] once per timer tick (every
/// [`SAMPLE_PERIOD`](crate::SAMPLE_PERIOD)). It never allocates, logs or waits
/// on the foreground.
pub struct Sampler<'a, S: SampleSource, const N: usize> {
    source: S,
    producer: SampleProducer<'a, N>,
}

impl<'a, S: SampleSource, const N: usize> Sampler<'a, S, N> {
    pub const fn new(source: S, producer: SampleProducer<'a, N>) -> Self {
        Self { source, producer }
    }

    /// Read one sample and append it to the active buffer
    ///
    /// Returns `true` when the sample completed a buffer.
    #[inline]
    pub fn sample(&mut self) -> bool {
        let value = self.source.read_sample();
        self.producer.push(value)
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
