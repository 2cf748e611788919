use core::time::Duration;

use crate::{
    CUSTOM_EPOCH,
    error::ConfigError,
    id::{DEFAULT_SEQUENCE_BITS, DEFAULT_WORKER_ID_BITS, IdLayout},
};

/// Latest epoch a generator accepts: the 41-bit timestamp added to it must
/// still fit in a `u64` of Unix milliseconds.
pub const MAX_EPOCH_MILLIS: u64 = u64::MAX - IdLayout::TIMESTAMP_MASK;

/// Construction-time settings for a Snowflake generator.
///
/// The worker id must be unique among all live generators sharing the same
/// epoch and layout. How that uniqueness is arranged (a static assignment
/// table, an environment variable per deployment, a coordination service
/// lease) is up to the deployment; generators only check the range.
///
/// The epoch and bit widths are fixed for a generator's lifetime. Changing
/// either after ids have been handed out breaks ordering against those ids.
///
/// # Example
///
/// ```
/// use flakeid::{GeneratorConfig, TWITTER_EPOCH};
///
/// let config = GeneratorConfig::new(7)
///     .with_epoch(TWITTER_EPOCH)
///     .with_bits(10, 12);
/// assert_eq!(config.layout().unwrap().max_worker_id(), 1023);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorConfig {
    /// Identity of this generator, encoded into every id.
    pub worker_id: u64,
    /// Origin of the timestamp field, in milliseconds since the Unix epoch.
    pub epoch_millis: u64,
    /// Width of the worker id field.
    pub worker_id_bits: u8,
    /// Width of the sequence field.
    pub sequence_bits: u8,
}

impl Default for GeneratorConfig {
    /// Worker `0`, [`CUSTOM_EPOCH`], and the 5/12 bit split.
    #[allow(clippy::cast_possible_truncation)]
    fn default() -> Self {
        Self {
            worker_id: 0,
            epoch_millis: CUSTOM_EPOCH.as_millis() as u64,
            worker_id_bits: DEFAULT_WORKER_ID_BITS,
            sequence_bits: DEFAULT_SEQUENCE_BITS,
        }
    }
}

impl GeneratorConfig {
    /// Default settings for the given worker id.
    pub fn new(worker_id: u64) -> Self {
        Self {
            worker_id,
            ..Self::default()
        }
    }

    /// Replaces the epoch.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn with_epoch(mut self, epoch: Duration) -> Self {
        self.epoch_millis = epoch.as_millis() as u64;
        self
    }

    /// Replaces the worker id and sequence widths.
    #[must_use]
    pub const fn with_bits(mut self, worker_id_bits: u8, sequence_bits: u8) -> Self {
        self.worker_id_bits = worker_id_bits;
        self.sequence_bits = sequence_bits;
        self
    }

    /// The epoch as a duration since the Unix epoch.
    pub const fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch_millis)
    }

    /// The validated layout described by the two widths.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LayoutTooWide`] if the widths do not fit.
    pub fn layout(&self) -> Result<IdLayout, ConfigError> {
        IdLayout::new(self.worker_id_bits, self.sequence_bits)
    }

    /// Validates the epoch, the layout and the worker id against it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EpochOutOfRange`],
    /// [`ConfigError::LayoutTooWide`] or [`ConfigError::WorkerIdOutOfRange`].
    pub fn validate(&self) -> Result<IdLayout, ConfigError> {
        if self.epoch_millis > MAX_EPOCH_MILLIS {
            return Err(ConfigError::EpochOutOfRange {
                epoch_millis: self.epoch_millis,
                max: MAX_EPOCH_MILLIS,
            });
        }
        let layout = self.layout()?;
        layout.check_worker_id(self.worker_id)?;
        Ok(layout)
    }
}
