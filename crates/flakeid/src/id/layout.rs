use core::time::Duration;

use crate::{
    error::{ConfigError, Result},
    id::SnowflakeId,
};

/// Width of the timestamp field. Fixed for every layout.
pub const TIMESTAMP_BITS: u8 = 41;

/// Combined width available to the worker id and sequence fields once the
/// reserved sign bit and the timestamp are accounted for.
pub const MAX_WORKER_AND_SEQUENCE_BITS: u8 = 63 - TIMESTAMP_BITS;

/// Default width of the worker id field (32 workers).
pub const DEFAULT_WORKER_ID_BITS: u8 = 5;

/// Default width of the sequence field (4096 ids per millisecond per worker).
pub const DEFAULT_SEQUENCE_BITS: u8 = 12;

/// The field widths of a [`SnowflakeId`] together with the masks and shifts
/// derived from them.
///
/// ```text
///  | reserved (1) | timestamp (41) | worker id (worker_id_bits) | sequence (sequence_bits) |
/// ```
///
/// An `IdLayout` can only be obtained through [`IdLayout::new`], so every
/// instance is guaranteed to fit below the reserved sign bit.
///
/// # Example
///
/// ```
/// use flakeid::IdLayout;
///
/// let layout = IdLayout::default();
/// let id = layout.compose(5, 3, 1);
/// assert_eq!(id.to_raw(), (5 << 17) | (3 << 12) | 1);
///
/// let parts = layout.decompose(id);
/// assert_eq!((parts.timestamp, parts.worker_id, parts.sequence), (5, 3, 1));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdLayout {
    worker_id_bits: u8,
    sequence_bits: u8,
}

impl Default for IdLayout {
    /// The classic 41/5/12 split.
    fn default() -> Self {
        Self {
            worker_id_bits: DEFAULT_WORKER_ID_BITS,
            sequence_bits: DEFAULT_SEQUENCE_BITS,
        }
    }
}

impl IdLayout {
    /// Bitmask for the 41-bit timestamp field, after shifting it down.
    pub const TIMESTAMP_MASK: u64 = (1 << TIMESTAMP_BITS) - 1;

    /// Builds a layout from the worker id and sequence widths.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LayoutTooWide`] when the two widths together
    /// exceed [`MAX_WORKER_AND_SEQUENCE_BITS`].
    pub fn new(worker_id_bits: u8, sequence_bits: u8) -> Result<Self, ConfigError> {
        let total = u16::from(worker_id_bits) + u16::from(sequence_bits);
        if total > u16::from(MAX_WORKER_AND_SEQUENCE_BITS) {
            return Err(ConfigError::LayoutTooWide {
                worker_id_bits,
                sequence_bits,
                max_total: MAX_WORKER_AND_SEQUENCE_BITS,
            });
        }
        Ok(Self {
            worker_id_bits,
            sequence_bits,
        })
    }

    /// Width of the worker id field.
    pub const fn worker_id_bits(&self) -> u8 {
        self.worker_id_bits
    }

    /// Width of the sequence field.
    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    /// Largest encodable worker id, `2^worker_id_bits - 1`.
    pub const fn max_worker_id(&self) -> u64 {
        (1 << self.worker_id_bits) - 1
    }

    /// Largest sequence value, `2^sequence_bits - 1`.
    pub const fn max_sequence(&self) -> u64 {
        (1 << self.sequence_bits) - 1
    }

    /// Largest timestamp delta, `2^41 - 1` milliseconds.
    pub const fn max_timestamp(&self) -> u64 {
        Self::TIMESTAMP_MASK
    }

    /// Number of ids one worker can mint per millisecond.
    pub const fn ids_per_millisecond(&self) -> u64 {
        self.max_sequence() + 1
    }

    /// Position of the timestamp field, `worker_id_bits + sequence_bits`.
    pub const fn timestamp_shift(&self) -> u32 {
        self.worker_id_bits as u32 + self.sequence_bits as u32
    }

    /// Position of the worker id field, `sequence_bits`.
    pub const fn worker_id_shift(&self) -> u32 {
        self.sequence_bits as u32
    }

    /// Checks that `worker_id` fits in this layout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WorkerIdOutOfRange`] otherwise.
    pub fn check_worker_id(&self, worker_id: u64) -> Result<(), ConfigError> {
        let max = self.max_worker_id();
        if worker_id > max {
            return Err(ConfigError::WorkerIdOutOfRange { worker_id, max });
        }
        Ok(())
    }

    /// Packs the three fields into an id.
    ///
    /// Each field is masked to its width; a timestamp delta past
    /// [`Self::max_timestamp`] wraps around (see [`Self::horizon`]).
    pub const fn compose(&self, timestamp: u64, worker_id: u64, sequence: u64) -> SnowflakeId {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << self.timestamp_shift();
        let worker_id = (worker_id & self.max_worker_id()) << self.worker_id_shift();
        let sequence = sequence & self.max_sequence();
        SnowflakeId::from_raw(timestamp | worker_id | sequence)
    }

    /// Splits an id back into its fields.
    pub const fn decompose(&self, id: SnowflakeId) -> IdParts {
        let raw = id.to_raw();
        IdParts {
            timestamp: (raw >> self.timestamp_shift()) & Self::TIMESTAMP_MASK,
            worker_id: (raw >> self.worker_id_shift()) & self.max_worker_id(),
            sequence: raw & self.max_sequence(),
        }
    }

    /// The last instant, as a duration since the Unix epoch, whose delta from
    /// `epoch` still fits the 41-bit timestamp field.
    ///
    /// Ids minted after this instant wrap around to small timestamps and break
    /// ordering against everything minted before. With any epoch the horizon
    /// is roughly 69.7 years out; for [`CUSTOM_EPOCH`] it falls in September
    /// 2094.
    ///
    /// Saturates at `u64::MAX` milliseconds for epochs that late.
    ///
    /// [`CUSTOM_EPOCH`]: crate::CUSTOM_EPOCH
    pub const fn horizon(&self, epoch: Duration) -> Duration {
        Duration::from_millis(unix_millis(epoch).saturating_add(Self::TIMESTAMP_MASK))
    }
}

/// The decoded fields of a [`SnowflakeId`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IdParts {
    /// Milliseconds since the generator's epoch.
    pub timestamp: u64,
    /// The worker that minted the id.
    pub worker_id: u64,
    /// Position within the millisecond.
    pub sequence: u64,
}

impl IdParts {
    /// The wall-clock instant the id was minted at, as a duration since the
    /// Unix epoch.
    pub const fn unix_time(&self, epoch: Duration) -> Duration {
        Duration::from_millis(unix_millis(epoch).saturating_add(self.timestamp))
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn unix_millis(epoch: Duration) -> u64 {
    let millis = epoch.as_millis();
    if millis > u64::MAX as u128 {
        u64::MAX
    } else {
        millis as u64
    }
}
