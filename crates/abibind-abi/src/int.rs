//! Signed 256-bit integers

use std::fmt;

use abibind_primitives::U256;

/// Signed 256-bit integer, kept as a magnitude and a sign.
///
/// The ABI word form is two's complement; see [`I256::to_word`] and
/// [`I256::from_word`]. Zero is never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct I256 {
    magnitude: U256,
    negative: bool,
}

impl I256 {
    /// Zero
    pub const ZERO: I256 = I256 {
        magnitude: U256::zero(),
        negative: false,
    };

    /// Build from a magnitude and a sign
    pub fn new(magnitude: U256, negative: bool) -> Self {
        Self {
            negative: negative && !magnitude.is_zero(),
            magnitude,
        }
    }

    /// Widen an `i128`
    pub fn from_i128(value: i128) -> Self {
        Self::new(U256::from(value.unsigned_abs()), value.is_negative())
    }

    /// Magnitude
    pub fn abs(&self) -> U256 {
        self.magnitude
    }

    /// Sign
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Zero test
    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    /// Narrow to `i128` when the value is in range
    pub fn to_i128(&self) -> Option<i128> {
        if self.magnitude.bits() > 128 {
            return None;
        }
        let magnitude = self.magnitude.low_u128();
        if self.negative {
            0i128.checked_sub_unsigned(magnitude)
        } else {
            i128::try_from(magnitude).ok()
        }
    }

    /// Lowest `intN` value, `-2^(N-1)`
    pub fn min_value(bits: usize) -> Self {
        Self::new(half_range(bits), true)
    }

    /// Highest `intN` value, `2^(N-1) - 1`
    pub fn max_value(bits: usize) -> Self {
        Self::new(half_range(bits) - U256::one(), false)
    }

    /// Range check against `intN`
    pub fn fits(&self, bits: usize) -> bool {
        let bound = half_range(bits);
        match self.negative {
            true => self.magnitude <= bound,
            false => self.magnitude < bound,
        }
    }

    /// Two's complement word
    pub fn to_word(&self) -> U256 {
        match self.negative {
            true => negate(self.magnitude),
            false => self.magnitude,
        }
    }

    /// Interpret a two's complement word
    pub fn from_word(word: U256) -> Self {
        match word.bit(255) {
            true => Self::new(negate(word), true),
            false => Self::new(word, false),
        }
    }
}

fn half_range(bits: usize) -> U256 {
    U256::one() << (bits - 1)
}

fn negate(value: U256) -> U256 {
    (!value).overflowing_add(U256::one()).0
}

macro_rules! widen_from {
    ($($native:ty),*) => {$(
        impl From<$native> for I256 {
            fn from(value: $native) -> Self {
                Self::from_i128(i128::from(value))
            }
        }
    )*};
}

widen_from!(i8, i16, i32, i64, i128);

impl TryFrom<I256> for i64 {
    type Error = I256;

    fn try_from(value: I256) -> Result<Self, Self::Error> {
        match value.to_i128().map(i64::try_from) {
            Some(Ok(narrow)) => Ok(narrow),
            _ => Err(value),
        }
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negative { "-" } else { "" };
        write!(f, "{}{}", sign, self.magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_zero_collapses() {
        assert_eq!(I256::new(U256::zero(), true), I256::ZERO);
        assert!(!I256::from_i128(0).is_negative());
    }

    #[test]
    fn test_i128_round_trip_at_edges() {
        for value in [i128::MIN, i128::MIN + 1, -1, 0, 1, i128::MAX] {
            assert_eq!(I256::from_i128(value).to_i128(), Some(value));
        }
        assert_eq!(I256::new(U256::one() << 127, false).to_i128(), None);
        assert_eq!(I256::max_value(256).to_i128(), None);
    }

    #[test]
    fn test_narrowing_to_i64() {
        assert_eq!(i64::try_from(I256::from(-7i8)), Ok(-7));
        let wide = I256::from_i128(i128::from(i64::MAX) + 1);
        assert_eq!(i64::try_from(wide), Err(wide));
    }

    #[test]
    fn test_word_form() {
        assert_eq!(I256::from(-1i32).to_word(), U256::MAX);
        assert_eq!(I256::from_word(U256::MAX), I256::from(-1i32));
        assert_eq!(I256::from_word(U256::from(5)), I256::from(5i32));
        let lowest = I256::min_value(256);
        assert_eq!(lowest.to_word(), U256::one() << 255);
        assert_eq!(I256::from_word(lowest.to_word()), lowest);
    }

    #[test]
    fn test_bounds() {
        assert!(I256::from(127i16).fits(8));
        assert!(!I256::from(128i16).fits(8));
        assert!(I256::from(-128i16).fits(8));
        assert!(!I256::from(-129i16).fits(8));
        assert_eq!(I256::min_value(8), I256::from(-128i16));
        assert_eq!(I256::max_value(24).to_string(), "8388607");
        assert!(I256::min_value(256).fits(256));
    }
}
