//! Addressable strip frame buffer
//!
//! Effects draw into a [`LedStrip`] and decide themselves when to flush it.
//! [`Strip`] keeps the pixels in memory and hands them to an
//! [`OutputDriver`] on [`LedStrip::show`].

use crate::OutputDriver;
use crate::color::{BLACK, Rgb};

/// Pixel sequence the effects draw on
pub trait LedStrip {
    /// Number of pixels
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set pixel `index` to `color`; out-of-range indices are ignored
    fn set_pixel(&mut self, index: usize, color: Rgb);

    /// Read back pixel `index`
    fn pixel(&self, index: usize) -> Option<Rgb>;

    /// Move every pixel `count` positions towards the end of the strip
    ///
    /// The first `count` pixels keep their previous value.
    fn shift_right(&mut self, count: usize);

    /// Fill the whole buffer with `color` without flushing
    fn clear(&mut self, color: Rgb);

    /// Flush the buffer to the hardware
    fn show(&mut self);
}

/// In-memory strip of `N` pixels backed by an output driver
pub struct Strip<D: OutputDriver, const N: usize> {
    driver: D,
    pixels: [Rgb; N],
}

impl<D: OutputDriver, const N: usize> Strip<D, N> {
    /// Create a blank strip
    pub const fn new(driver: D) -> Self {
        Self {
            driver,
            pixels: [BLACK; N],
        }
    }

    /// Current (not necessarily flushed) pixel values
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

impl<D: OutputDriver, const N: usize> LedStrip for Strip<D, N> {
    fn len(&self) -> usize {
        N
    }

    fn set_pixel(&mut self, index: usize, color: Rgb) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    fn pixel(&self, index: usize) -> Option<Rgb> {
        self.pixels.get(index).copied()
    }

    fn shift_right(&mut self, count: usize) {
        if count == 0 || count >= N {
            return;
        }
        self.pixels.copy_within(0..N - count, count);
    }

    fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    fn show(&mut self) {
        self.driver.write(&self.pixels);
    }
}
