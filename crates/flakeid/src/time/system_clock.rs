use std::time::{SystemTime, UNIX_EPOCH};

use crate::TimeSource;

/// The operating system's wall clock.
///
/// Every call reads [`SystemTime::now`], so NTP step-backs and other
/// adjustments are visible to the generator, which then refuses to mint with
/// [`Error::ClockRegression`] instead of risking a duplicate.
///
/// [`Error::ClockRegression`]: crate::Error::ClockRegression
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    /// Milliseconds since the Unix epoch, or `0` if the clock reads earlier
    /// than 1970.
    #[allow(clippy::cast_possible_truncation)]
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CUSTOM_EPOCH;

    #[test]
    fn system_clock_is_past_custom_epoch() {
        let now = SystemClock.current_millis();
        assert!(u128::from(now) > CUSTOM_EPOCH.as_millis());
    }
}
