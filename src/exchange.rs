//! Lock-free double buffer between the sampling interrupt and the foreground.
//!
//! One producer (the timer interrupt) fills the *active* buffer one sample at
//! a time. When it fills up the producer flips the active buffer and raises
//! the ready flag. The single consumer takes the other, completed buffer.
//!
//! Nothing here blocks or takes a critical section. The handoff is only sound
//! while the consumer finishes reading a buffer faster than the producer
//! fills the next one (N sample periods). An unread ready signal is
//! overwritten by the next one: the consumer always gets the freshest buffer.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU16, AtomicUsize, Ordering};

/// Which of the two sample buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BufferId {
    First = 0,
    Second = 1,
}

impl BufferId {
    /// The other buffer
    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    /// Position of the buffer in the exchange storage
    pub const fn index(self) -> usize {
        self as usize
    }

    const fn from_raw(raw: u8) -> Self {
        if raw == 0 { Self::First } else { Self::Second }
    }
}

/// Double-buffered sample storage shared by the sampler and the foreground
///
/// Const-constructible so it can live in a `static`.
pub struct SampleExchange<const N: usize> {
    buffers: [[AtomicU16; N]; 2],
    active: AtomicU8,
    cursor: AtomicUsize,
    ready: AtomicBool,
}

impl<const N: usize> SampleExchange<N> {
    /// Create an empty exchange; the first buffer starts active
    pub const fn new() -> Self {
        Self {
            buffers: [
                [const { AtomicU16::new(0) }; N],
                [const { AtomicU16::new(0) }; N],
            ],
            active: AtomicU8::new(0),
            cursor: AtomicUsize::new(0),
            ready: AtomicBool::new(false),
        }
    }

    /// Get the producer handle for the interrupt context
    ///
    /// Only one producer may push at a time.
    pub const fn producer(&self) -> SampleProducer<'_, N> {
        SampleProducer { exchange: self }
    }

    /// Get the consumer handle for the foreground
    pub const fn consumer(&self) -> SampleConsumer<'_, N> {
        SampleConsumer { exchange: self }
    }

    /// Buffer currently being filled
    pub fn active_buffer(&self) -> BufferId {
        BufferId::from_raw(self.active.load(Ordering::Acquire))
    }

    /// Write position inside the active buffer
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    /// Whether a completed buffer is waiting
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Capacity of each buffer
    pub const fn capacity(&self) -> usize {
        N
    }

    fn push(&self, sample: u16) -> bool {
        let active = self.active_buffer();
        let cursor = self.cursor.load(Ordering::Relaxed);
        if let Some(slot) = self.buffers[active.index()].get(cursor) {
            slot.store(sample, Ordering::Relaxed);
        }

        let cursor = cursor + 1;
        if cursor >= N {
            self.cursor.store(0, Ordering::Relaxed);
            self.active.store(active.other() as u8, Ordering::Release);
            self.ready.store(true, Ordering::Release);
            return true;
        }
        self.cursor.store(cursor, Ordering::Relaxed);
        false
    }

    fn take(&self) -> Option<ReadyBuffer<'_, N>> {
        if !self.ready.swap(false, Ordering::AcqRel) {
            return None;
        }
        let id = self.active_buffer().other();
        Some(ReadyBuffer {
            id,
            samples: &self.buffers[id.index()],
        })
    }
}

impl<const N: usize> Default for SampleExchange<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Interrupt-side handle of a [`SampleExchange`]
#[derive(Clone, Copy)]
pub struct SampleProducer<'a, const N: usize> {
    exchange: &'a SampleExchange<N>,
}

impl<const N: usize> SampleProducer<'_, N> {
    /// Append one sample to the active buffer
    ///
    /// Returns `true` when this sample completed the buffer, which flips the
    /// active buffer and raises the ready flag.
    #[inline]
    pub fn push(&self, sample: u16) -> bool {
        self.exchange.push(sample)
    }
}

/// Foreground-side handle of a [`SampleExchange`]
#[derive(Clone, Copy)]
pub struct SampleConsumer<'a, const N: usize> {
    exchange: &'a SampleExchange<N>,
}

impl<'a, const N: usize> SampleConsumer<'a, N> {
    /// Take the most recently completed buffer, if any
    ///
    /// Clears the ready flag. The returned view must be fully read before the
    /// producer wraps back around to it.
    pub fn try_take(&self) -> Option<ReadyBuffer<'a, N>> {
        self.exchange.take()
    }

    /// Whether a completed buffer is waiting
    pub fn is_ready(&self) -> bool {
        self.exchange.is_ready()
    }

    /// The shared exchange this handle reads from
    pub fn exchange(&self) -> &'a SampleExchange<N> {
        self.exchange
    }
}

/// Read view over a completed sample buffer
pub struct ReadyBuffer<'a, const N: usize> {
    id: BufferId,
    samples: &'a [AtomicU16; N],
}

impl<const N: usize> ReadyBuffer<'_, N> {
    /// Which of the two buffers this view covers
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Number of samples in the buffer
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Sample at `index`, if in range
    pub fn get(&self, index: usize) -> Option<u16> {
        self.samples.get(index).map(|s| s.load(Ordering::Relaxed))
    }

    /// Iterate the samples in acquisition order
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.samples.iter().map(|s| s.load(Ordering::Relaxed))
    }
}
