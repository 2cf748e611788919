use core::time::Duration;

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Result,
    generator::{GeneratorConfig, Poll, SnowflakeGenerator, minter::Minter},
    id::{IdLayout, SnowflakeId},
    time::TimeSource,
};

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// The last emitted ID (which carries both the last timestamp and the
/// sequence) lives behind a single [`Mutex`]. The lock is held across the
/// clock read, the comparison and the update, so exactly one caller runs the
/// read-modify-write at a time.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Fair access across threads
/// - ✅ Works on targets without 64-bit atomics
///
/// ## See Also
/// - [`AtomicSnowflakeGenerator`]
///
/// [`AtomicSnowflakeGenerator`]: crate::AtomicSnowflakeGenerator
pub struct LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<Option<SnowflakeId>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<Option<SnowflakeId>>,
    minter: Minter,
    time: T,
}

impl<T> LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new [`LockSnowflakeGenerator`] that has not emitted any ID
    /// yet.
    ///
    /// # Parameters
    ///
    /// - `config`: worker id, epoch and field widths.
    /// - `time`: A [`TimeSource`] implementation (e.g., [`SystemClock`]) that
    ///   determines how timestamps are read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the layout does not fit or
    /// the worker id is out of range.
    ///
    /// # Example
    /// ```
    /// use flakeid::{GeneratorConfig, LockSnowflakeGenerator, SystemClock};
    ///
    /// let generator = LockSnowflakeGenerator::new(GeneratorConfig::new(3), SystemClock)?;
    /// let id = generator.next_id()?;
    /// assert_eq!(generator.layout().decompose(id).worker_id, 3);
    /// # Ok::<(), flakeid::Error>(())
    /// ```
    ///
    /// [`SystemClock`]: crate::SystemClock
    /// [`Error::InvalidConfiguration`]: crate::Error::InvalidConfiguration
    pub fn new(config: GeneratorConfig, time: T) -> Result<Self> {
        let minter = Minter::new(&config)?;
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(None)),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(None),
            minter,
            time,
        })
    }

    /// The bit layout of every id this generator mints.
    pub const fn layout(&self) -> IdLayout {
        self.minter.layout()
    }

    /// Attempts to generate the next available ID.
    ///
    /// # Returns
    /// - `Ok(Poll::Ready { id })`: A new ID is available
    /// - `Ok(Poll::Pending { yield_for })`: the sequence is exhausted; retry
    ///   after `yield_for` milliseconds
    ///
    /// # Errors
    /// - [`Error::ClockRegression`] if the clock is behind the last emitted
    ///   ID. Nothing is committed.
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll> {
        let mut last = self.state.lock();
        let now = self.time.current_millis();

        match self.minter.advance(*last, now)? {
            Some(id) => {
                *last = Some(id);
                Ok(Poll::Ready { id })
            }
            None => Ok(Poll::Pending { yield_for: 1 }),
        }
    }

    /// Generates the next ID, spinning through sequence exhaustion.
    ///
    /// # Errors
    /// - [`Error::ClockRegression`] if the clock moved backwards.
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    pub fn next_id(&self) -> Result<SnowflakeId> {
        <Self as SnowflakeGenerator<T>>::next_id(self)
    }

    /// Generates the next ID, calling `backoff` while pending.
    ///
    /// # Errors
    /// - [`Error::ClockRegression`] if the clock moved backwards.
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    pub fn next_id_with(&self, backoff: impl FnMut(u64)) -> Result<SnowflakeId> {
        <Self as SnowflakeGenerator<T>>::next_id_with(self, backoff)
    }
}

impl<T> SnowflakeGenerator<T> for LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    fn new(config: GeneratorConfig, time: T) -> Result<Self> {
        Self::new(config, time)
    }

    fn layout(&self) -> IdLayout {
        self.minter.layout()
    }

    fn worker_id(&self) -> u64 {
        self.minter.worker_id()
    }

    fn epoch(&self) -> Duration {
        self.minter.epoch()
    }

    fn try_poll_id(&self) -> Result<Poll> {
        self.try_poll_id()
    }
}
