//! ABI decoding

use abibind_primitives::{Address, U256};

use crate::types::{ParamType, Token};
use crate::I256;
use crate::DecodeError;

/// Decode data according to the given parameter types.
///
/// Decoding is strict: integer words outside the declared width, non-zero
/// padding and booleans other than 0/1 are rejected. Offsets are resolved
/// relative to the start of the enclosing tuple.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, DecodeError> {
    decode_params(types, data, 0)
}

/// Decode a sequence laid out as head/tail starting at `base`
fn decode_params(types: &[ParamType], data: &[u8], base: usize) -> Result<Vec<Token>, DecodeError> {
    let mut tokens = Vec::with_capacity(types.len());
    let mut pos = base;

    for param_type in types {
        let token = if param_type.is_dynamic() {
            let offset = read_usize(data, pos)?;
            let at = base.checked_add(offset).ok_or(DecodeError::OffsetOverflow)?;
            decode_token(param_type, data, at)?
        } else {
            decode_token(param_type, data, pos)?
        };
        tokens.push(token);
        pos = pos
            .checked_add(param_type.head_length())
            .ok_or(DecodeError::OffsetOverflow)?;
    }

    Ok(tokens)
}

/// Decode a single token whose encoding starts at `at`
fn decode_token(param_type: &ParamType, data: &[u8], at: usize) -> Result<Token, DecodeError> {
    match param_type {
        ParamType::Address => {
            let word = read_word(data, at)?;
            if word[..12].iter().any(|b| *b != 0) {
                return Err(DecodeError::DirtyPadding(param_type.to_string()));
            }
            // 12 leading bytes checked above
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&word[12..]);
            Ok(Token::Address(Address::from_bytes(bytes)))
        }
        ParamType::Uint(bits) => {
            let value = U256::from_big_endian(read_word(data, at)?);
            if value.bits() > *bits {
                return Err(DecodeError::OutOfRange(param_type.to_string()));
            }
            Ok(Token::Uint(value))
        }
        ParamType::Int(bits) => {
            let value = I256::from_word(U256::from_big_endian(read_word(data, at)?));
            if !value.fits(*bits) {
                return Err(DecodeError::OutOfRange(param_type.to_string()));
            }
            Ok(Token::Int(value))
        }
        ParamType::Bool => {
            let word = read_word(data, at)?;
            if word[..31].iter().any(|b| *b != 0) || word[31] > 1 {
                return Err(DecodeError::InvalidBool);
            }
            Ok(Token::Bool(word[31] == 1))
        }
        ParamType::FixedBytes(size) => decode_fixed_bytes(param_type, *size, data, at),
        ParamType::Function => decode_fixed_bytes(param_type, 24, data, at),
        ParamType::Bytes => Ok(Token::Bytes(decode_bytes(param_type, data, at)?)),
        ParamType::String => {
            let bytes = decode_bytes(param_type, data, at)?;
            let s = String::from_utf8(bytes).map_err(|e| DecodeError::InvalidUtf8(e.to_string()))?;
            Ok(Token::String(s))
        }
        ParamType::Array(inner) => {
            let len = read_usize(data, at)?;
            let start = at + 32;
            // Each element needs at least one head slot; refuse lengths the data cannot hold
            let element_size = inner.head_length().max(1);
            let needed = len
                .checked_mul(element_size)
                .and_then(|n| n.checked_add(start))
                .ok_or(DecodeError::OffsetOverflow)?;
            if needed > data.len() {
                return Err(DecodeError::InsufficientData {
                    needed,
                    available: data.len(),
                });
            }
            let inner_types = vec![(**inner).clone(); len];
            Ok(Token::Array(decode_params(&inner_types, data, start)?))
        }
        ParamType::FixedArray(inner, size) => {
            let needed = size
                .checked_mul(inner.head_length().max(1))
                .and_then(|n| n.checked_add(at))
                .ok_or(DecodeError::OffsetOverflow)?;
            if needed > data.len() {
                return Err(DecodeError::InsufficientData {
                    needed,
                    available: data.len(),
                });
            }
            let inner_types = vec![(**inner).clone(); *size];
            Ok(Token::FixedArray(decode_params(&inner_types, data, at)?))
        }
        ParamType::Tuple(types) => Ok(Token::Tuple(decode_params(types, data, at)?)),
    }
}

fn decode_fixed_bytes(
    param_type: &ParamType,
    size: usize,
    data: &[u8],
    at: usize,
) -> Result<Token, DecodeError> {
    let word = read_word(data, at)?;
    if word[size..].iter().any(|b| *b != 0) {
        return Err(DecodeError::DirtyPadding(param_type.to_string()));
    }
    Ok(Token::FixedBytes(word[..size].to_vec()))
}

/// Length-prefixed payload padded to a word boundary
fn decode_bytes(param_type: &ParamType, data: &[u8], at: usize) -> Result<Vec<u8>, DecodeError> {
    let len = read_usize(data, at)?;
    let start = at + 32;
    let padded_len = len
        .checked_add(31)
        .map(|n| n / 32 * 32)
        .ok_or(DecodeError::OffsetOverflow)?;
    let end = start.checked_add(padded_len).ok_or(DecodeError::OffsetOverflow)?;
    if end > data.len() {
        return Err(DecodeError::InsufficientData {
            needed: end,
            available: data.len(),
        });
    }
    if data[start + len..end].iter().any(|b| *b != 0) {
        return Err(DecodeError::DirtyPadding(param_type.to_string()));
    }
    Ok(data[start..start + len].to_vec())
}

fn read_word(data: &[u8], at: usize) -> Result<&[u8], DecodeError> {
    let end = at.checked_add(32).ok_or(DecodeError::OffsetOverflow)?;
    if end > data.len() {
        return Err(DecodeError::InsufficientData {
            needed: end,
            available: data.len(),
        });
    }
    Ok(&data[at..end])
}

/// Read an offset or length word
fn read_usize(data: &[u8], at: usize) -> Result<usize, DecodeError> {
    let value = U256::from_big_endian(read_word(data, at)?);
    if value > U256::from(data.len()) {
        return Err(DecodeError::OffsetOverflow);
    }
    Ok(value.low_u64() as usize)
}
