//! Typed contract events and topic encoding

use abibind_abi::{decode, encode, DecodeError, EncodeError, ParamType, Token};
use abibind_crypto::keccak256;
use abibind_primitives::H256;

use crate::types::Log;
use crate::BindError;

/// A decoded event record produced by generated bindings
pub trait ContractEvent: Sized + Send + 'static {
    /// Event name
    const NAME: &'static str;
    /// Canonical signature, e.g. `NewOwner(bytes32,bytes32,address)`
    const SIGNATURE: &'static str;
    /// Anonymous events carry no signature topic
    const ANONYMOUS: bool;

    /// Topic 0 of non-anonymous logs
    fn signature_topic() -> H256 {
        keccak256(Self::SIGNATURE)
    }

    /// Decode a raw log into this event
    fn decode_log(log: &Log) -> Result<Self, BindError>;
}

/// Split a log into decoded indexed values and decoded data values.
///
/// `indexed` holds the topic types in order; indexed dynamic parameters must
/// be passed as `bytes32` since only their hash is stored.
pub fn decode_log(
    log: &Log,
    name: &str,
    signature_topic: Option<H256>,
    indexed: &[ParamType],
    data: &[ParamType],
) -> Result<(Vec<Token>, Vec<Token>), BindError> {
    let mut topics = log.topics.iter();

    if let Some(expected) = signature_topic {
        match topics.next() {
            Some(topic) if *topic == expected => {}
            other => {
                return Err(BindError::decoding(
                    name,
                    0,
                    DecodeError::TypeMismatch {
                        expected: format!("topic {}", expected),
                        got: other.map_or_else(|| "no topics".to_string(), |t| format!("topic {}", t)),
                    },
                ))
            }
        }
    }

    let remaining = topics.len();
    if remaining != indexed.len() {
        return Err(BindError::decoding(
            name,
            0,
            DecodeError::LengthMismatch {
                expected: indexed.len(),
                got: remaining,
            },
        ));
    }

    let mut indexed_tokens = Vec::with_capacity(indexed.len());
    for (index, (param_type, topic)) in indexed.iter().zip(topics).enumerate() {
        let mut token = decode(std::slice::from_ref(param_type), topic.as_bytes())
            .map_err(|source| BindError::decoding(name, index, source))?;
        indexed_tokens.push(token.remove(0));
    }

    let data_tokens = decode(data, &log.data)
        .map_err(|source| BindError::decoding(name, indexed.len(), source))?;

    Ok((indexed_tokens, data_tokens))
}

/// Topic for one candidate value of an indexed parameter declared as `kind`.
///
/// Value types are encoded as a single ABI word and checked against the
/// declared width. `string` and `bytes` candidates are hashed. Arrays and
/// tuples are only stored as their hash, so candidates are that 32-byte hash.
pub fn encode_topic(kind: &ParamType, token: Token) -> Result<H256, BindError> {
    let encoding = |source| BindError::Encoding {
        context: format!("topic {}", kind),
        source,
    };
    match (kind, token) {
        (ParamType::String, Token::String(s)) => Ok(keccak256(s.as_bytes())),
        (ParamType::Bytes, Token::Bytes(b)) => Ok(keccak256(&b)),
        (ParamType::String | ParamType::Bytes, other) => {
            Err(encoding(EncodeError::TypeMismatch {
                expected: kind.to_string(),
                got: other.kind_name().to_string(),
            }))
        }
        (ParamType::Array(_) | ParamType::FixedArray(..) | ParamType::Tuple(_), hash) => {
            one_word(&ParamType::FixedBytes(32), hash).map_err(encoding)
        }
        (_, value) => one_word(kind, value).map_err(encoding),
    }
}

fn one_word(kind: &ParamType, token: Token) -> Result<H256, EncodeError> {
    let word = encode(std::slice::from_ref(kind), &[token])?;
    let mut topic = [0u8; 32];
    topic.copy_from_slice(&word[..32]);
    Ok(H256::from(topic))
}

/// Encode the candidates for one topic position
pub fn encode_topics<I>(kind: &ParamType, candidates: I) -> Result<Vec<H256>, BindError>
where
    I: IntoIterator<Item = Token>,
{
    candidates
        .into_iter()
        .map(|token| encode_topic(kind, token))
        .collect()
}
