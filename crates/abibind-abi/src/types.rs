//! Solidity types and the values that inhabit them

use std::fmt;
use std::str::FromStr;

use abibind_primitives::{Address, H256, U256};

use crate::{AbiError, I256, WORD_SIZE};

/// A decoded (or to-be-encoded) ABI value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `address`
    Address(Address),
    /// `uintN`, zero-extended to 256 bits
    Uint(U256),
    /// `intN`
    Int(I256),
    /// `bool`
    Bool(bool),
    /// `bytes`
    Bytes(Vec<u8>),
    /// `bytesN` and `function`; the length must equal the declared size
    FixedBytes(Vec<u8>),
    /// `string`
    String(String),
    /// `T[]`
    Array(Vec<Token>),
    /// `T[k]`
    FixedArray(Vec<Token>),
    /// Tuples and structs, members in declaration order
    Tuple(Vec<Token>),
}

/// A resolved Solidity type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// `address`
    Address,
    /// `uintN`; N is a multiple of 8 up to 256
    Uint(usize),
    /// `intN`
    Int(usize),
    /// `bool`
    Bool,
    /// `bytes`
    Bytes,
    /// `bytesN`, 1 to 32
    FixedBytes(usize),
    /// `function`: an address followed by a selector
    Function,
    /// `string`
    String,
    /// `T[]`
    Array(Box<ParamType>),
    /// `T[k]`
    FixedArray(Box<ParamType>, usize),
    /// `(T1,...,Tn)`
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Whether values of this type are encoded out of line, behind an offset
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(element, _) => element.is_dynamic(),
            ParamType::Tuple(members) => members.iter().any(ParamType::is_dynamic),
            ParamType::Address
            | ParamType::Uint(_)
            | ParamType::Int(_)
            | ParamType::Bool
            | ParamType::FixedBytes(_)
            | ParamType::Function => false,
        }
    }

    /// Bytes this type occupies in the head of an enclosing sequence
    pub fn head_length(&self) -> usize {
        if self.is_dynamic() {
            return WORD_SIZE;
        }
        match self {
            ParamType::FixedArray(element, len) => element.head_length().saturating_mul(*len),
            ParamType::Tuple(members) => members.iter().map(ParamType::head_length).sum(),
            _ => WORD_SIZE,
        }
    }
}

impl fmt::Display for ParamType {
    /// Canonical spelling, as used in signatures
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::Int(bits) => write!(f, "int{}", bits),
            ParamType::FixedBytes(size) => write!(f, "bytes{}", size),
            ParamType::Array(element) => write!(f, "{}[]", element),
            ParamType::FixedArray(element, len) => write!(f, "{}[{}]", element, len),
            ParamType::Tuple(members) => {
                let inner: Vec<String> = members.iter().map(ToString::to_string).collect();
                write!(f, "({})", inner.join(","))
            }
            ParamType::Address => f.write_str("address"),
            ParamType::Bool => f.write_str("bool"),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::Function => f.write_str("function"),
            ParamType::String => f.write_str("string"),
        }
    }
}

impl FromStr for ParamType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type(s)
    }
}

impl Token {
    /// `bytes32` value from a hash
    pub fn bytes32(word: H256) -> Self {
        Token::FixedBytes(word.as_bytes().to_vec())
    }

    /// What kind of value this is, for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Address(_) => "address",
            Token::Uint(_) => "uint",
            Token::Int(_) => "int",
            Token::Bool(_) => "bool",
            Token::Bytes(_) => "bytes",
            Token::FixedBytes(_) => "fixed bytes",
            Token::String(_) => "string",
            Token::Array(_) => "array",
            Token::FixedArray(_) => "fixed array",
            Token::Tuple(_) => "tuple",
        }
    }
}

/// Parse a Solidity type string (e.g. `uint256`, `bytes32[]`, `(address,uint8)[2]`)
pub fn parse_type(s: &str) -> Result<ParamType, AbiError> {
    let unsupported = || AbiError::UnsupportedType(s.to_string());
    let s = s.trim();

    if let Some(rest) = s.strip_suffix(']') {
        let open = rest.rfind('[').ok_or_else(unsupported)?;
        let inner = parse_type(&rest[..open]).map_err(|_| unsupported())?;
        let size = &rest[open + 1..];
        if size.is_empty() {
            return Ok(ParamType::Array(Box::new(inner)));
        }
        let size = parse_size(size).ok_or_else(unsupported)?;
        return Ok(ParamType::FixedArray(Box::new(inner), size));
    }

    if let Some(body) = s.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        let parts = split_top_level(body).ok_or_else(unsupported)?;
        let types = parts
            .into_iter()
            .map(parse_type)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| unsupported())?;
        return Ok(ParamType::Tuple(types));
    }

    match s {
        "address" => return Ok(ParamType::Address),
        "bool" => return Ok(ParamType::Bool),
        "string" => return Ok(ParamType::String),
        "bytes" => return Ok(ParamType::Bytes),
        "function" => return Ok(ParamType::Function),
        "uint" => return Ok(ParamType::Uint(256)),
        "int" => return Ok(ParamType::Int(256)),
        _ => {}
    }

    // uint<N> / int<N>
    if let Some(rest) = s.strip_prefix("uint") {
        return int_bits(rest).map(ParamType::Uint).ok_or_else(unsupported);
    }
    if let Some(rest) = s.strip_prefix("int") {
        return int_bits(rest).map(ParamType::Int).ok_or_else(unsupported);
    }

    // bytes<N>
    if let Some(rest) = s.strip_prefix("bytes") {
        return parse_size(rest)
            .filter(|size| *size <= 32)
            .map(ParamType::FixedBytes)
            .ok_or_else(unsupported);
    }

    Err(unsupported())
}

/// Positive decimal without leading zeros
fn parse_size(s: &str) -> Option<usize> {
    if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().filter(|n| *n > 0)
}

fn int_bits(s: &str) -> Option<usize> {
    parse_size(s).filter(|bits| *bits <= 256 && bits % 8 == 0)
}

/// Split `a,(b,c),d` on commas that are not nested in parentheses
fn split_top_level(body: &str) -> Option<Vec<&str>> {
    if body.is_empty() {
        return None;
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&body[start..]);
    Some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_classification() {
        let cases = [
            ("address", false),
            ("bytes32", false),
            ("function", false),
            ("(uint8,bool)[3]", false),
            ("bytes", true),
            ("string", true),
            ("uint64[]", true),
            ("string[2]", true),
            ("(address,bytes)", true),
        ];
        for (ty, dynamic) in cases {
            assert_eq!(parse_type(ty).unwrap().is_dynamic(), dynamic, "{ty}");
        }
    }

    #[test]
    fn test_head_length() {
        assert_eq!(ParamType::Uint(8).head_length(), 32);
        assert_eq!(ParamType::FixedArray(Box::new(ParamType::Bool), 3).head_length(), 96);
        assert_eq!(
            ParamType::Tuple(vec![ParamType::Address, ParamType::Uint(256)]).head_length(),
            64
        );
        assert_eq!(ParamType::Tuple(vec![ParamType::Bytes]).head_length(), 32);
    }

    #[test]
    fn test_elementary_names() {
        let cases = [
            ("address", ParamType::Address),
            ("uint", ParamType::Uint(256)),
            ("uint64", ParamType::Uint(64)),
            ("int", ParamType::Int(256)),
            ("int24", ParamType::Int(24)),
            ("bool", ParamType::Bool),
            ("bytes", ParamType::Bytes),
            ("bytes4", ParamType::FixedBytes(4)),
            ("string", ParamType::String),
            ("function", ParamType::Function),
        ];
        for (name, expected) in cases {
            assert_eq!(name.parse::<ParamType>(), Ok(expected));
        }
    }

    #[test]
    fn test_parse_type_arrays_and_tuples() {
        assert_eq!(
            parse_type("uint256[2][]").unwrap(),
            ParamType::Array(Box::new(ParamType::FixedArray(Box::new(ParamType::Uint(256)), 2)))
        );
        assert_eq!(
            parse_type("(bytes,bytes)[]").unwrap(),
            ParamType::Array(Box::new(ParamType::Tuple(vec![ParamType::Bytes, ParamType::Bytes])))
        );
        assert_eq!(
            parse_type("(address,(uint8,bool))").unwrap(),
            ParamType::Tuple(vec![
                ParamType::Address,
                ParamType::Tuple(vec![ParamType::Uint(8), ParamType::Bool]),
            ])
        );
    }

    #[test]
    fn test_parse_type_rejects_unknown() {
        for bad in [
            "unknownfoo",
            "uint7",
            "uint264",
            "uint08",
            "bytes0",
            "bytes33",
            "fixed128x18",
            "uint256[0]",
            "(",
            "()",
            "uint256[",
            "[]",
        ] {
            assert_eq!(
                parse_type(bad),
                Err(AbiError::UnsupportedType(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_display_is_canonical() {
        for s in ["uint256", "bytes32[]", "(address,uint8)[2]", "(bytes,(bool,string))", "function"] {
            assert_eq!(parse_type(s).unwrap().to_string(), s);
        }
    }
}
