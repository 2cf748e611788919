use core::{cmp::Ordering, time::Duration};

use crate::{
    error::{ConfigError, Error, Result},
    generator::GeneratorConfig,
    id::{IdLayout, SnowflakeId},
};

/// The immutable half of a generator: layout, worker id and epoch, plus the
/// pure state transition every generator runs inside its critical section.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Minter {
    layout: IdLayout,
    worker_id: u64,
    epoch_millis: u64,
}

impl Minter {
    pub(crate) fn new(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        let layout = config.validate()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            worker_id = config.worker_id,
            epoch_millis = config.epoch_millis,
            worker_id_bits = layout.worker_id_bits(),
            sequence_bits = layout.sequence_bits(),
            "snowflake generator configured"
        );

        Ok(Self {
            layout,
            worker_id: config.worker_id,
            epoch_millis: config.epoch_millis,
        })
    }

    pub(crate) const fn layout(&self) -> IdLayout {
        self.layout
    }

    pub(crate) const fn worker_id(&self) -> u64 {
        self.worker_id
    }

    pub(crate) const fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch_millis)
    }

    /// Computes the id that follows `last` at wall-clock time `now`.
    ///
    /// - `Ok(Some(id))`: commit `id` as the new state and hand it out.
    /// - `Ok(None)`: the sequence is exhausted for this millisecond.
    /// - `Err(ClockRegression)`: `now` is behind the last committed timestamp
    ///   or the epoch. The caller must leave its state untouched.
    ///
    /// Timestamps are compared as the 41-bit values stored in the id. A
    /// generator that lives across its horizon sees the wrapped timestamp as a
    /// regression and stops minting.
    pub(crate) fn advance(
        &self,
        last: Option<SnowflakeId>,
        now: u64,
    ) -> Result<Option<SnowflakeId>> {
        let Some(elapsed) = now.checked_sub(self.epoch_millis) else {
            return Err(self.cold_clock_behind(self.epoch_millis, now));
        };
        let elapsed = elapsed & IdLayout::TIMESTAMP_MASK;

        let Some(last) = last else {
            return Ok(Some(self.layout.compose(elapsed, self.worker_id, 0)));
        };

        let current = self.layout.decompose(last);
        match elapsed.cmp(&current.timestamp) {
            Ordering::Equal => {
                if current.sequence < self.layout.max_sequence() {
                    Ok(Some(self.layout.compose(
                        elapsed,
                        self.worker_id,
                        current.sequence + 1,
                    )))
                } else {
                    Ok(None)
                }
            }
            Ordering::Greater => Ok(Some(self.layout.compose(elapsed, self.worker_id, 0))),
            Ordering::Less => Err(self.cold_clock_behind(
                self.epoch_millis + current.timestamp,
                self.epoch_millis + elapsed,
            )),
        }
    }

    #[cold]
    #[inline(never)]
    #[allow(clippy::unused_self)]
    fn cold_clock_behind(&self, last_millis: u64, now_millis: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            worker_id = self.worker_id,
            last_millis,
            now_millis,
            behind_by = last_millis - now_millis,
            "clock moved backwards, refusing to generate ids"
        );
        Error::ClockRegression {
            last_millis,
            now_millis,
        }
    }
}
