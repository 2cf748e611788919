//! Well-known epochs, as offsets from 1970-01-01T00:00:00Z.
//!
//! Any of these can be passed to [`GeneratorConfig::with_epoch`]. Ids are only
//! comparable with ids minted against the same epoch.
//!
//! [`GeneratorConfig::with_epoch`]: crate::GeneratorConfig::with_epoch

use core::time::Duration;

/// 2025-01-01T00:00:00Z. The default for [`GeneratorConfig`].
///
/// [`GeneratorConfig`]: crate::GeneratorConfig
pub const CUSTOM_EPOCH: Duration = Duration::from_millis(1_735_689_600_000);

/// 2010-11-04T01:42:54.657Z, used by Twitter.
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// 2015-01-01T00:00:00Z, used by Discord.
pub const DISCORD_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// 2011-01-01T00:00:00Z, used by Instagram.
pub const INSTAGRAM_EPOCH: Duration = Duration::from_millis(1_293_840_000_000);

/// 1970-01-01T00:00:00Z, used by Mastodon. The horizon lands in 2039.
pub const MASTODON_EPOCH: Duration = Duration::from_millis(0);
