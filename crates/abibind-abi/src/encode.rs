//! ABI encoding

use abibind_primitives::U256;

use crate::types::{ParamType, Token};
use crate::{EncodeError, WORD_SIZE};

type Word = [u8; WORD_SIZE];

/// Encode `tokens` as the argument list described by `types`.
///
/// Tokens are checked against their types, never coerced: an integer wider
/// than its declared width, fixed bytes of the wrong size or a fixed array of
/// the wrong length is an error. Failures name the offending argument.
pub fn encode(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, EncodeError> {
    if types.len() != tokens.len() {
        return Err(EncodeError::ArgumentCount {
            expected: types.len(),
            got: tokens.len(),
        });
    }
    let mut encoded = Vec::with_capacity(types.len());
    for (index, (ty, token)) in types.iter().zip(tokens).enumerate() {
        let value = encode_value(ty, token).map_err(|source| EncodeError::Param {
            index,
            source: Box::new(source),
        })?;
        encoded.push((ty, value));
    }
    Ok(lay_out(encoded))
}

/// Selector followed by the encoded arguments
pub fn encode_function_call(
    selector: [u8; 4],
    types: &[ParamType],
    tokens: &[Token],
) -> Result<Vec<u8>, EncodeError> {
    let body = encode(types, tokens)?;
    let mut calldata = Vec::with_capacity(4 + body.len());
    calldata.extend_from_slice(&selector);
    calldata.extend(body);
    Ok(calldata)
}

/// Join encoded members into head and tail sections. Static members sit in
/// the head; dynamic ones leave an offset there, measured from the start of
/// this sequence, and append their body to the tail.
fn lay_out(members: Vec<(&ParamType, Vec<u8>)>) -> Vec<u8> {
    let head_len: usize = members.iter().map(|(ty, _)| ty.head_length()).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for (ty, body) in members {
        if ty.is_dynamic() {
            head.extend_from_slice(&uint_word(U256::from(head_len + tail.len())));
            tail.extend(body);
        } else {
            head.extend(body);
        }
    }
    head.extend(tail);
    head
}

fn encode_sequence(types: Vec<&ParamType>, tokens: &[Token]) -> Result<Vec<u8>, EncodeError> {
    if types.len() != tokens.len() {
        return Err(EncodeError::LengthMismatch {
            expected: types.len(),
            got: tokens.len(),
        });
    }
    let members = types
        .into_iter()
        .zip(tokens)
        .map(|(ty, token)| encode_value(ty, token).map(|body| (ty, body)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lay_out(members))
}

fn encode_value(ty: &ParamType, token: &Token) -> Result<Vec<u8>, EncodeError> {
    let word = match (ty, token) {
        (ParamType::Address, Token::Address(address)) => {
            let mut word = [0u8; WORD_SIZE];
            word[WORD_SIZE - 20..].copy_from_slice(address.as_bytes());
            word
        }
        (ParamType::Bool, Token::Bool(flag)) => uint_word(U256::from(u8::from(*flag))),
        (ParamType::Uint(bits), Token::Uint(value)) => {
            if value.bits() > *bits {
                return Err(EncodeError::Overflow(ty.to_string()));
            }
            uint_word(*value)
        }
        (ParamType::Int(bits), Token::Int(value)) => {
            if !value.fits(*bits) {
                return Err(EncodeError::Overflow(ty.to_string()));
            }
            uint_word(value.to_word())
        }
        (ParamType::FixedBytes(size), Token::FixedBytes(data)) => fixed_word(*size, data)?,
        (ParamType::Function, Token::FixedBytes(data)) => fixed_word(24, data)?,
        (ParamType::Bytes, Token::Bytes(data)) => return Ok(length_prefixed(data)),
        (ParamType::String, Token::String(text)) => return Ok(length_prefixed(text.as_bytes())),
        (ParamType::Array(inner), Token::Array(items)) => {
            let mut out = uint_word(U256::from(items.len())).to_vec();
            out.extend(encode_sequence(vec![&**inner; items.len()], items)?);
            return Ok(out);
        }
        (ParamType::FixedArray(inner, len), Token::FixedArray(items)) => {
            if items.len() != *len {
                return Err(EncodeError::LengthMismatch {
                    expected: *len,
                    got: items.len(),
                });
            }
            return encode_sequence(vec![&**inner; *len], items);
        }
        (ParamType::Tuple(members), Token::Tuple(items)) => {
            return encode_sequence(members.iter().collect(), items);
        }
        _ => {
            return Err(EncodeError::TypeMismatch {
                expected: ty.to_string(),
                got: token.kind_name().to_string(),
            })
        }
    };
    Ok(word.to_vec())
}

fn uint_word(value: U256) -> Word {
    let mut word = [0u8; WORD_SIZE];
    value.to_big_endian(&mut word);
    word
}

/// Left-aligned fixed bytes; the length must be exactly `size`
fn fixed_word(size: usize, data: &[u8]) -> Result<Word, EncodeError> {
    if data.len() != size {
        return Err(EncodeError::FixedBytesSize {
            expected: size,
            got: data.len(),
        });
    }
    let mut word = [0u8; WORD_SIZE];
    word[..size].copy_from_slice(data);
    Ok(word)
}

fn length_prefixed(data: &[u8]) -> Vec<u8> {
    let padded = data.len().div_ceil(WORD_SIZE) * WORD_SIZE;
    let mut out = Vec::with_capacity(WORD_SIZE + padded);
    out.extend_from_slice(&uint_word(U256::from(data.len())));
    out.extend_from_slice(data);
    out.resize(WORD_SIZE + padded, 0);
    out
}
