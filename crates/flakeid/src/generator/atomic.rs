use core::time::Duration;

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Result,
    generator::{GeneratorConfig, Poll, SnowflakeGenerator, minter::Minter},
    id::{IdLayout, SnowflakeId},
    time::TimeSource,
};

/// State word before the first ID is emitted. Real IDs never set the sign
/// bit, so this can't collide with one.
const UNSET: u64 = u64::MAX;

/// A lock-free Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// The last emitted ID is stored in a single [`AtomicU64`]. Since an ID packs
/// the timestamp, worker id and sequence into one word, a successful
/// compare-and-swap commits the timestamp and the sequence together. A lost
/// race reports [`Poll::Pending`] with `yield_for: 0` and the caller retries.
///
/// ## Features
/// - ✅ Thread-safe
/// - ❌ Fair access across threads (throughput is favored instead)
///
/// ## See Also
/// - [`LockSnowflakeGenerator`]
///
/// [`LockSnowflakeGenerator`]: crate::LockSnowflakeGenerator
pub struct AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    minter: Minter,
    time: T,
}

impl<T> AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new [`AtomicSnowflakeGenerator`] that has not emitted any ID
    /// yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the layout does not fit or
    /// the worker id is out of range.
    ///
    /// # Example
    /// ```
    /// use flakeid::{AtomicSnowflakeGenerator, GeneratorConfig, SystemClock};
    ///
    /// let generator = AtomicSnowflakeGenerator::new(GeneratorConfig::new(1), SystemClock)?;
    /// let a = generator.next_id()?;
    /// let b = generator.next_id()?;
    /// assert!(a < b);
    /// # Ok::<(), flakeid::Error>(())
    /// ```
    ///
    /// [`Error::InvalidConfiguration`]: crate::Error::InvalidConfiguration
    pub fn new(config: GeneratorConfig, time: T) -> Result<Self> {
        let minter = Minter::new(&config)?;
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(UNSET)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(UNSET),
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
    /// - `Ok(Poll::Pending { yield_for: 1 })`: the sequence is exhausted
    /// - `Ok(Poll::Pending { yield_for: 0 })`: CAS lost to another thread;
    ///   retry immediately
    ///
    /// # Errors
    /// - [`Error::ClockRegression`] if the clock is behind the last emitted
    ///   ID. Nothing is committed.
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll> {
        // Load the state before reading the clock: whoever committed it read
        // the clock earlier, so a healthy clock can't appear to be behind.
        let current_raw = self.state.load(Ordering::Acquire);
        let last = (current_raw != UNSET).then(|| SnowflakeId::from_raw(current_raw));
        let now = self.time.current_millis();

        let Some(next_id) = self.minter.advance(last, now)? else {
            return Ok(Poll::Pending { yield_for: 1 });
        };

        if self
            .state
            .compare_exchange(
                current_raw,
                next_id.to_raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            Ok(Poll::Ready { id: next_id })
        } else {
            // CAS failed - another thread won the race. Yield 0 to retry
            // immediately.
            Ok(Poll::Pending { yield_for: 0 })
        }
    }

    /// Generates the next ID, spinning through sequence exhaustion and lost
    /// CAS races.
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

impl<T> SnowflakeGenerator<T> for AtomicSnowflakeGenerator<T>
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
