use crate::id::SnowflakeId;

/// Represents the result of attempting to generate a new Snowflake ID.
///
/// This type models the outcome of [`SnowflakeGenerator::try_poll_id`]:
///
/// - [`Poll::Ready`] indicates a new ID was successfully generated.
/// - [`Poll::Pending`] means the generator cannot produce a new ID right now
///   and the caller should retry after `yield_for` milliseconds.
///
/// This allows non-blocking generation loops and custom backoff strategies.
///
/// # Example
///
/// ```
/// use flakeid::{GeneratorConfig, LockSnowflakeGenerator, Poll, SystemClock};
///
/// let generator = LockSnowflakeGenerator::new(GeneratorConfig::new(1), SystemClock)?;
/// match generator.try_poll_id()? {
///     Poll::Ready { id } => println!("ID: {id}"),
///     Poll::Pending { yield_for } => println!("Back off for {yield_for} ms"),
/// }
/// # Ok::<(), flakeid::Error>(())
/// ```
///
/// [`SnowflakeGenerator::try_poll_id`]: crate::SnowflakeGenerator::try_poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated Snowflake ID.
        id: SnowflakeId,
    },
    /// No ID could be generated.
    ///
    /// `yield_for` is `1` when the sequence is exhausted for the current
    /// millisecond, and `0` when another thread won a compare-and-swap race
    /// and an immediate retry is expected to succeed.
    Pending {
        /// Milliseconds to wait before polling again.
        yield_for: u64,
    },
}
