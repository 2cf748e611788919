/// A result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `flakeid` can emit.
///
/// Generation only ever fails with [`Error::ClockRegression`]. Every other
/// problem is a misconfiguration and surfaces from a generator constructor as
/// [`Error::InvalidConfiguration`], never from `next_id`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The clock reported a time earlier than the last timestamp this
    /// generator committed to (or earlier than the configured epoch).
    ///
    /// The generator refuses to mint rather than emit a duplicate or
    /// misordered id. It does not retry; the caller decides whether to wait,
    /// alert, or fail the surrounding request.
    #[error(
        "clock moved backwards: refusing to generate ids for {} ms (last = {last_millis}, now = {now_millis})",
        regression_millis(.last_millis, .now_millis)
    )]
    ClockRegression {
        /// The last committed timestamp, in milliseconds since the Unix epoch.
        last_millis: u64,
        /// The offending clock reading, in milliseconds since the Unix epoch.
        now_millis: u64,
    },

    /// The generator could not be constructed from the given configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
}

impl Error {
    /// Magnitude of a clock regression in milliseconds, or `None` for any
    /// other error.
    pub const fn behind_by(&self) -> Option<u64> {
        match self {
            Self::ClockRegression {
                last_millis,
                now_millis,
            } => Some(last_millis.saturating_sub(*now_millis)),
            Self::InvalidConfiguration(_) => None,
        }
    }
}

fn regression_millis(last_millis: &u64, now_millis: &u64) -> u64 {
    last_millis.saturating_sub(*now_millis)
}

/// Construction-time validation failures.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The worker id does not fit in the configured worker id field.
    #[error("worker id {worker_id} is out of range (expected 0..={max})")]
    WorkerIdOutOfRange {
        /// The rejected worker id.
        worker_id: u64,
        /// The largest worker id the layout can encode.
        max: u64,
    },

    /// The worker id and sequence fields leave no room for the 41-bit
    /// timestamp below the reserved sign bit.
    #[error(
        "worker id bits ({worker_id_bits}) + sequence bits ({sequence_bits}) exceed {max_total}"
    )]
    LayoutTooWide {
        /// Requested worker id width.
        worker_id_bits: u8,
        /// Requested sequence width.
        sequence_bits: u8,
        /// The largest allowed combined width.
        max_total: u8,
    },

    /// The epoch is so late that adding a 41-bit timestamp to it overflows.
    #[error("epoch {epoch_millis} ms is out of range (expected 0..={max})")]
    EpochOutOfRange {
        /// The rejected epoch, in milliseconds since the Unix epoch.
        epoch_millis: u64,
        /// The latest accepted epoch.
        max: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_regression_reports_magnitude() {
        let err = Error::ClockRegression {
            last_millis: 1_000,
            now_millis: 993,
        };
        assert_eq!(err.behind_by(), Some(7));
        assert!(err.to_string().contains("7 ms"));
    }

    #[test]
    fn config_error_converts() {
        let err: Error = ConfigError::WorkerIdOutOfRange {
            worker_id: 32,
            max: 31,
        }
        .into();
        assert_eq!(err.behind_by(), None);
        assert_eq!(
            err.to_string(),
            "invalid configuration: worker id 32 is out of range (expected 0..=31)"
        );
    }
}
