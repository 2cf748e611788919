use core::fmt;

/// A 63-bit Snowflake identifier stored in a `u64` whose top bit is always
/// zero.
///
/// ```text
///  Bit Index:  63           63 62            S+W S+W-1       S S-1          0
///              +--------------+----------------+--------------+--------------+
///  Field:      | reserved (1) | timestamp (41) | worker (W)   | sequence (S) |
///              +--------------+----------------+--------------+--------------+
///              |<----------- MSB ---------- 64 bits ----------- LSB -------->|
/// ```
///
/// The id itself does not know its field widths; use the [`IdLayout`] it was
/// minted with to pull the fields back out.
///
/// Because the sign bit is reserved, every id converts losslessly into an
/// [`i64`] for storage in signed columns.
///
/// [`IdLayout`]: crate::IdLayout
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId(u64);

impl SnowflakeId {
    /// Mask of every bit except the reserved sign bit.
    pub const VALUE_MASK: u64 = (1 << 63) - 1;

    /// Wraps a raw value, clearing the reserved sign bit.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw & Self::VALUE_MASK)
    }

    /// Returns the raw integer.
    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// Returns the id as a signed integer. Always non-negative.
    #[allow(clippy::cast_possible_wrap)]
    pub const fn to_i64(self) -> i64 {
        self.0 as i64
    }

    /// Returns the ID as a zero-padded 19-digit string, which sorts
    /// lexicographically in the same order as the numeric value.
    pub fn to_padded_string(self) -> String {
        format!("{:019}", self.0)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl From<SnowflakeId> for i64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_i64()
    }
}

impl TryFrom<i64> for SnowflakeId {
    type Error = core::num::TryFromIntError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value).map(Self)
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl core::str::FromStr for SnowflakeId {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The signed parse rejects values using the reserved bit, the unsigned
        // parse rejects negatives.
        s.parse::<i64>()?;
        s.parse::<u64>().map(Self)
    }
}
