//! Conversions between Rust values and ABI tokens.
//!
//! Generated bindings call these helpers instead of going through a trait, so
//! every Solidity type has exactly one spelled-out conversion in the emitted
//! source.

use abibind_abi::{DecodeError, Token, I256};
use abibind_primitives::{Address, H256, U256};
use bytes::Bytes;

use crate::BindError;

/// Unsigned integer token
pub fn uint(value: impl Into<U256>) -> Token {
    Token::Uint(value.into())
}

/// Signed integer token
pub fn int(value: impl Into<I256>) -> Token {
    Token::Int(value.into())
}

/// Fixed-size bytes token (`bytesN`, `function`)
pub fn fixed_bytes(value: &[u8]) -> Token {
    Token::FixedBytes(value.to_vec())
}

fn mismatch(expected: &str, token: &Token) -> DecodeError {
    DecodeError::TypeMismatch {
        expected: expected.to_string(),
        got: token.kind_name().to_string(),
    }
}

/// Address value
pub fn into_address(token: Token) -> Result<Address, DecodeError> {
    match token {
        Token::Address(address) => Ok(address),
        other => Err(mismatch("address", &other)),
    }
}

/// Boolean value
pub fn into_bool(token: Token) -> Result<bool, DecodeError> {
    match token {
        Token::Bool(value) => Ok(value),
        other => Err(mismatch("bool", &other)),
    }
}

/// Native unsigned integer (`u8` ..= `u64`)
pub fn into_uint<T: TryFrom<u64>>(token: Token) -> Result<T, DecodeError> {
    let value = into_u256(token)?;
    if value > U256::from(u64::MAX) {
        return Err(DecodeError::OutOfRange(std::any::type_name::<T>().to_string()));
    }
    T::try_from(value.low_u64())
        .map_err(|_| DecodeError::OutOfRange(std::any::type_name::<T>().to_string()))
}

/// 256-bit unsigned integer
pub fn into_u256(token: Token) -> Result<U256, DecodeError> {
    match token {
        Token::Uint(value) => Ok(value),
        other => Err(mismatch("uint", &other)),
    }
}

/// Native signed integer (`i8` ..= `i64`)
pub fn into_int<T: TryFrom<i64>>(token: Token) -> Result<T, DecodeError> {
    let value = into_i256(token)?;
    let out_of_range = || DecodeError::OutOfRange(std::any::type_name::<T>().to_string());
    let narrow = i64::try_from(value).map_err(|_| out_of_range())?;
    T::try_from(narrow).map_err(|_| out_of_range())
}

/// 256-bit signed integer
pub fn into_i256(token: Token) -> Result<I256, DecodeError> {
    match token {
        Token::Int(value) => Ok(value),
        other => Err(mismatch("int", &other)),
    }
}

/// UTF-8 string
pub fn into_string(token: Token) -> Result<String, DecodeError> {
    match token {
        Token::String(value) => Ok(value),
        other => Err(mismatch("string", &other)),
    }
}

/// Dynamic bytes
pub fn into_bytes(token: Token) -> Result<Bytes, DecodeError> {
    match token {
        Token::Bytes(value) => Ok(Bytes::from(value)),
        other => Err(mismatch("bytes", &other)),
    }
}

/// Fixed-size bytes of exactly `N` bytes
pub fn into_fixed_bytes<const N: usize>(token: Token) -> Result<[u8; N], DecodeError> {
    match token {
        Token::FixedBytes(value) => {
            let got = value.len();
            value
                .try_into()
                .map_err(|_| DecodeError::LengthMismatch { expected: N, got })
        }
        other => Err(mismatch("fixed bytes", &other)),
    }
}

/// 32-byte hash, used for indexed dynamic event parameters
pub fn into_h256(token: Token) -> Result<H256, DecodeError> {
    into_fixed_bytes::<32>(token).map(H256::from)
}

/// Dynamic array, converting each element with `element`
pub fn into_array<T, F>(token: Token, element: F) -> Result<Vec<T>, DecodeError>
where
    F: FnMut(Token) -> Result<T, DecodeError>,
{
    match token {
        Token::Array(items) => items.into_iter().map(element).collect(),
        other => Err(mismatch("array", &other)),
    }
}

/// Fixed-size array of exactly `N` elements
pub fn into_fixed_array<T, F, const N: usize>(token: Token, element: F) -> Result<[T; N], DecodeError>
where
    F: FnMut(Token) -> Result<T, DecodeError>,
{
    match token {
        Token::FixedArray(items) => {
            let items = items.into_iter().map(element).collect::<Result<Vec<T>, _>>()?;
            let got = items.len();
            items
                .try_into()
                .map_err(|_| DecodeError::LengthMismatch { expected: N, got })
        }
        other => Err(mismatch("fixed array", &other)),
    }
}

/// Tuple components, checked against the expected count
pub fn into_tuple(token: Token, len: usize) -> Result<Vec<Token>, DecodeError> {
    match token {
        Token::Tuple(items) if items.len() == len => Ok(items),
        Token::Tuple(items) => Err(DecodeError::LengthMismatch {
            expected: len,
            got: items.len(),
        }),
        other => Err(mismatch("tuple", &other)),
    }
}

/// Reads decoded values in order, attaching the function or event context
/// and the value position to any failure.
#[derive(Debug)]
pub struct TokenReader {
    context: String,
    tokens: std::vec::IntoIter<Token>,
    index: usize,
}

impl TokenReader {
    /// Create a reader over decoded values
    pub fn new(context: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            context: context.into(),
            tokens: tokens.into_iter(),
            index: 0,
        }
    }

    /// Convert the next value with `convert`
    pub fn read<T, F>(&mut self, convert: F) -> Result<T, BindError>
    where
        F: FnOnce(Token) -> Result<T, DecodeError>,
    {
        let index = self.index;
        self.index += 1;
        let token = self
            .tokens
            .next()
            .ok_or_else(|| BindError::decoding(self.context.as_str(), index, DecodeError::MissingValue))?;
        convert(token).map_err(|source| BindError::decoding(self.context.as_str(), index, source))
    }
}

/// Reads the components of a struct token
#[derive(Debug)]
pub struct TupleReader {
    tokens: std::vec::IntoIter<Token>,
}

impl TupleReader {
    /// Open a tuple token with `len` components
    pub fn new(token: Token, len: usize) -> Result<Self, DecodeError> {
        Ok(Self {
            tokens: into_tuple(token, len)?.into_iter(),
        })
    }

    /// Convert the next component
    pub fn read<T, F>(&mut self, convert: F) -> Result<T, DecodeError>
    where
        F: FnOnce(Token) -> Result<T, DecodeError>,
    {
        convert(self.tokens.next().ok_or(DecodeError::MissingValue)?)
    }
}
