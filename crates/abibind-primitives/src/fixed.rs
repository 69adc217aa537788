//! Fixed-width byte strings: account addresses and 32-byte words

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Failure to build a fixed-width value from text or a slice
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The text is not hexadecimal
    #[error("not a hex string: {0}")]
    Hex(String),
    /// The input decodes to the wrong number of bytes
    #[error("expected {expected} bytes, found {found}")]
    Width {
        /// Width of the target type
        expected: usize,
        /// Bytes actually supplied
        found: usize,
    },
}

macro_rules! fixed_width {
    ($(#[$meta:meta])* $name:ident, $width:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name([u8; $width]);

        impl $name {
            /// Width in bytes
            pub const LEN: usize = $width;

            /// All-zero value
            pub const ZERO: $name = $name([0u8; $width]);

            /// Wrap an owned array
            pub const fn from_bytes(bytes: [u8; $width]) -> Self {
                $name(bytes)
            }

            /// Copy from a slice of exactly [`Self::LEN`] bytes
            pub fn from_slice(slice: &[u8]) -> Result<Self, ParseError> {
                <[u8; $width]>::try_from(slice)
                    .map($name)
                    .map_err(|_| ParseError::Width { expected: $width, found: slice.len() })
            }

            /// Parse hex text; the `0x` prefix is optional and case is ignored
            pub fn from_hex(text: &str) -> Result<Self, ParseError> {
                let digits = text.strip_prefix("0x").unwrap_or(text);
                let raw = hex::decode(digits).map_err(|e| ParseError::Hex(e.to_string()))?;
                Self::from_slice(&raw)
            }

            /// Borrow the underlying array
            pub fn as_bytes(&self) -> &[u8; $width] {
                &self.0
            }

            /// True when every byte is zero
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// `0x`-prefixed lowercase hex
            pub fn to_hex(&self) -> String {
                let mut out = String::with_capacity(2 + 2 * $width);
                out.push_str("0x");
                out.push_str(&hex::encode(self.0));
                out
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&format_args!("{}", self)).finish()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(text: &str) -> Result<Self, Self::Err> {
                Self::from_hex(text)
            }
        }

        impl From<[u8; $width]> for $name {
            fn from(bytes: [u8; $width]) -> Self {
                $name(bytes)
            }
        }

        impl From<$name> for [u8; $width] {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }
    };
}

fixed_width!(
    /// 20-byte account address.
    ///
    /// Formats as lowercase hex. Checksummed output lives in
    /// `abibind_crypto::to_checksum`.
    Address,
    20
);

fixed_width!(
    /// 32-byte word: keccak digests, log topics and transaction hashes.
    H256,
    32
);

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d";

    #[test]
    fn test_address_prefix_optional() {
        let with: Address = SAMPLE.parse().unwrap();
        let without = Address::from_hex(&SAMPLE[2..]).unwrap();
        assert_eq!(with, without);
        assert!(!with.is_zero());
    }

    #[test]
    fn test_address_renders_lowercase() {
        let addr = Address::from_hex(SAMPLE).unwrap();
        assert_eq!(addr.to_string(), SAMPLE.to_lowercase());
        assert_eq!(format!("{:?}", addr), format!("Address({})", SAMPLE.to_lowercase()));
        assert_eq!(
            Address::ZERO.to_hex(),
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn test_width_mismatch() {
        assert_eq!(
            Address::from_hex("0x"),
            Err(ParseError::Width { expected: 20, found: 0 })
        );
        assert_eq!(
            Address::from_hex(&SAMPLE[..40]),
            Err(ParseError::Width { expected: 20, found: 19 })
        );
        assert_eq!(
            H256::from_slice(&[7u8; 33]),
            Err(ParseError::Width { expected: 32, found: 33 })
        );
    }

    #[test]
    fn test_non_hex_input() {
        assert!(matches!(Address::from_hex("0xzz"), Err(ParseError::Hex(_))));
        assert!(matches!(H256::from_hex(&"g".repeat(64)), Err(ParseError::Hex(_))));
    }

    #[test]
    fn test_word_case_insensitive() {
        let lower = "0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae";
        let word = H256::from_hex(&lower.to_uppercase().replacen("0X", "0x", 1)).unwrap();
        assert_eq!(word.to_hex(), lower);
        assert_eq!(word.as_bytes()[0], 0x93);
    }

    #[test]
    fn test_array_conversions() {
        let raw = [0xabu8; 20];
        let back: [u8; 20] = Address::from(raw).into();
        assert_eq!(back, raw);
        assert_eq!(H256::from_bytes([1u8; 32]).as_ref().len(), H256::LEN);
    }
}
