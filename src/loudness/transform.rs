//! Spectral transform seam
//!
//! The pipeline only prepares a [`SpectralFrame`] and reads magnitudes back;
//! the transform itself is pluggable. [`MicroFft`] is the stock
//! implementation for 512-point frames.

use microfft::real::rfft_512;

/// Real and imaginary sequences of one frame
///
/// After [`Transform::complex_to_magnitude`] the real sequence holds the
/// per-bin magnitudes. Bins `0..=M/2` are unique, the rest mirror them.
#[derive(Debug, Clone)]
pub struct SpectralFrame<const M: usize> {
    pub real: [f32; M],
    pub imag: [f32; M],
}

impl<const M: usize> SpectralFrame<M> {
    pub const fn new() -> Self {
        Self {
            real: [0.0; M],
            imag: [0.0; M],
        }
    }

    /// Magnitudes of the unique half of the spectrum (DC to Nyquist)
    pub fn magnitudes(&self) -> &[f32] {
        &self.real[..=M / 2]
    }
}

impl<const M: usize> Default for SpectralFrame<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-size forward transform working in place on a frame
pub trait Transform<const M: usize> {
    /// Forward transform of `frame.real + j*frame.imag`, in place
    fn forward(&mut self, frame: &mut SpectralFrame<M>);

    /// Replace `frame.real` with `|real + j*imag|` per bin
    fn complex_to_magnitude(&mut self, frame: &mut SpectralFrame<M>) {
        for (re, im) in frame.real.iter_mut().zip(frame.imag.iter()) {
            *re = libm::sqrtf(*re * *re + *im * *im);
        }
    }
}

/// Number of points [`MicroFft`] transforms
pub const MICROFFT_SIZE: usize = 512;

/// Real-input FFT backed by `microfft`
///
/// Ignores the imaginary input (the pipeline always feeds zeros) and
/// expands the packed half spectrum into a full, mirrored one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroFft;

impl Transform<MICROFFT_SIZE> for MicroFft {
    fn forward(&mut self, frame: &mut SpectralFrame<MICROFFT_SIZE>) {
        const HALF: usize = MICROFFT_SIZE / 2;

        let mut input = frame.real;
        let spectrum = rfft_512(&mut input);

        // microfft packs the (real) Nyquist bin into the imaginary part of DC
        let nyquist = spectrum[0].im;
        frame.real[0] = spectrum[0].re;
        frame.imag[0] = 0.0;
        for (k, bin) in spectrum.iter().enumerate().skip(1) {
            frame.real[k] = bin.re;
            frame.imag[k] = bin.im;
            frame.real[MICROFFT_SIZE - k] = bin.re;
            frame.imag[MICROFFT_SIZE - k] = -bin.im;
        }
        frame.real[HALF] = nyquist;
        frame.imag[HALF] = 0.0;
    }
}
