use core::time::Duration;

use crate::{
    error::Result,
    generator::{GeneratorConfig, Poll},
    id::{IdLayout, SnowflakeId},
    time::TimeSource,
};

/// A minimal interface for generating Snowflake IDs.
///
/// Implementations keep the last committed timestamp and sequence as one unit
/// of state, so concurrent callers never observe the same pair.
pub trait SnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the layout does not fit or
    /// the worker id is out of range.
    ///
    /// [`Error::InvalidConfiguration`]: crate::Error::InvalidConfiguration
    fn new(config: GeneratorConfig, time: T) -> Result<Self>
    where
        Self: Sized;

    /// The bit layout of every id this generator mints.
    fn layout(&self) -> IdLayout;

    /// The worker id encoded into every id.
    fn worker_id(&self) -> u64;

    /// The origin of the timestamp field.
    fn epoch(&self) -> Duration;

    /// Attempts to generate the next available ID without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockRegression`] if the clock reads earlier than the
    /// last committed timestamp. The generator state is left untouched.
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    fn try_poll_id(&self) -> Result<Poll>;

    /// Generates the next ID, calling `backoff` with the suggested wait (in
    /// milliseconds) each time the generator is pending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockRegression`] as soon as one is observed; it is
    /// never retried here.
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    fn next_id_with(&self, mut backoff: impl FnMut(u64)) -> Result<SnowflakeId> {
        loop {
            match self.try_poll_id()? {
                Poll::Ready { id } => break Ok(id),
                Poll::Pending { yield_for } => backoff(yield_for),
            }
        }
    }

    /// Generates the next ID.
    ///
    /// When the sequence is exhausted this spins, re-reading the clock, until
    /// the next millisecond. It never sleeps, so the added latency stays
    /// within about a millisecond.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockRegression`] if the clock moved backwards.
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    fn next_id(&self) -> Result<SnowflakeId> {
        self.next_id_with(|_| core::hint::spin_loop())
    }
}
