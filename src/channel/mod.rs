// src/channel/mod.rs

//! Bounded FIFO hand-off of [`Sample`]s from the acquisition loop to consumers.
//!
//! One producer publishes, any number of consumers take samples out; each
//! sample is delivered to exactly one consumer. The queue lives behind a
//! `critical_section::Mutex`, so a channel can be declared as a `static` and
//! shared between tasks without further coordination.
//!
//! Publishing never blocks. When the queue is full the configured
//! [`OverflowPolicy`] decides which sample is lost.

use crate::common::{error::ChannelClosed, hal_traits::AcquisitionTimer, types::Sample};
use core::cell::RefCell;
use critical_section::Mutex;
use heapless::Deque;
use log::trace;

/// Default number of queued samples.
pub const DEFAULT_CAPACITY: usize = 8;

/// What happens to a sample published into a full channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Evict the oldest queued sample to make room for the new one.
    #[default]
    DropOldest,
    /// Keep the queue as is and discard the new sample.
    DropNewest,
}

/// Result of [`SampleChannel::publish`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PublishOutcome {
    /// Queued without loss.
    Accepted,
    /// Queued; the returned oldest sample was evicted.
    DisplacedOldest(Sample),
    /// The channel was full (or closed) and the new sample was discarded.
    Rejected,
}

/// Channel counters, read with [`SampleChannel::stats`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ChannelStats {
    /// Samples accepted into the queue.
    pub published: u32,
    /// Samples handed to consumers.
    pub consumed: u32,
    /// Samples lost to the overflow policy or a closed channel.
    pub dropped: u32,
    /// Highest queue depth seen.
    pub high_water: u32,
}

struct Inner<const N: usize> {
    queue: Deque<Sample, N>,
    closed: bool,
    stats: ChannelStats,
}

pub struct SampleChannel<const N: usize = DEFAULT_CAPACITY> {
    inner: Mutex<RefCell<Inner<N>>>,
    policy: OverflowPolicy,
}

impl<const N: usize> SampleChannel<N> {
    /// Empty channel using [`OverflowPolicy::DropOldest`].
    pub const fn new() -> Self {
        Self::with_policy(OverflowPolicy::DropOldest)
    }

    pub const fn with_policy(policy: OverflowPolicy) -> Self {
        SampleChannel {
            inner: Mutex::new(RefCell::new(Inner {
                queue: Deque::new(),
                closed: false,
                stats: ChannelStats {
                    published: 0,
                    consumed: 0,
                    dropped: 0,
                    high_water: 0,
                },
            })),
            policy,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Queues `sample` without blocking, applying the overflow policy when full.
    pub fn publish(&self, sample: Sample) -> PublishOutcome {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);

            if inner.closed {
                inner.stats.dropped = inner.stats.dropped.wrapping_add(1);
                return PublishOutcome::Rejected;
            }

            let mut outcome = PublishOutcome::Accepted;
            if inner.queue.is_full() {
                match self.policy {
                    OverflowPolicy::DropNewest => {
                        inner.stats.dropped = inner.stats.dropped.wrapping_add(1);
                        return PublishOutcome::Rejected;
                    }
                    OverflowPolicy::DropOldest => match inner.queue.pop_front() {
                        Some(evicted) => {
                            inner.stats.dropped = inner.stats.dropped.wrapping_add(1);
                            outcome = PublishOutcome::DisplacedOldest(evicted);
                        }
                        None => {
                            inner.stats.dropped = inner.stats.dropped.wrapping_add(1);
                            return PublishOutcome::Rejected;
                        }
                    },
                }
            }

            if inner.queue.push_back(sample).is_err() {
                inner.stats.dropped = inner.stats.dropped.wrapping_add(1);
                return PublishOutcome::Rejected;
            }

            inner.stats.published = inner.stats.published.wrapping_add(1);
            let depth = inner.queue.len() as u32;
            if depth > inner.stats.high_water {
                inner.stats.high_water = depth;
            }
            outcome
        })
    }

    /// Takes the oldest sample if one is queued.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` while empty, and
    /// `Err(nb::Error::Other(ChannelClosed))` once the channel is closed and drained.
    pub fn try_consume(&self) -> nb::Result<Sample, ChannelClosed> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            match inner.queue.pop_front() {
                Some(sample) => {
                    inner.stats.consumed = inner.stats.consumed.wrapping_add(1);
                    Ok(sample)
                }
                None if inner.closed => Err(nb::Error::Other(ChannelClosed)),
                None => Err(nb::Error::WouldBlock),
            }
        })
    }

    /// Waits for the next sample, suspending on `timer` for `poll_ms` between checks.
    ///
    /// Returns `Err(ChannelClosed)` when the channel is closed and holds no
    /// more samples; closing the channel is how a waiting consumer is cancelled.
    pub fn consume<T: AcquisitionTimer>(&self, timer: &mut T, poll_ms: u32) -> Result<Sample, ChannelClosed> {
        loop {
            match self.try_consume() {
                Ok(sample) => return Ok(sample),
                Err(nb::Error::Other(closed)) => return Err(closed),
                Err(nb::Error::WouldBlock) => {
                    trace!("sample channel empty, waiting {} ms", poll_ms);
                    timer.delay_ms(poll_ms.max(1));
                }
            }
        }
    }

    /// Stops accepting samples. Queued samples can still be consumed.
    pub fn close(&self) {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).closed = true);
    }

    pub fn is_closed(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).closed)
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).queue.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> ChannelStats {
        critical_section::with(|cs| self.inner.borrow_ref(cs).stats)
    }
}

impl<const N: usize> Default for SampleChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}
