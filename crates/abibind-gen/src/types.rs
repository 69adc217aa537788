//! Solidity type -> Rust type mapping
//!
//! Every [`ParamType`] has exactly one [`TypeBinding`]. A binding knows the
//! Rust type it stands for, how to turn a value of that type into a `Token`
//! and which `tokens::` conversion reads it back.

use abibind_abi::ParamType;
use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};

/// Rust representation chosen for one Solidity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeBinding {
    /// `address` -> `Address`
    Address,
    /// `bool` -> `bool`
    Bool,
    /// `string` -> `String`
    String,
    /// `bytes` -> `Bytes`
    Bytes,
    /// `bytesN` / `function` -> `[u8; N]`
    FixedBytes(usize),
    /// `uintN`, N <= 64 -> smallest native unsigned integer
    Uint {
        /// Width of the native integer in bits
        native: usize,
    },
    /// `intN`, N <= 64 -> smallest native signed integer
    Int {
        /// Width of the native integer in bits
        native: usize,
    },
    /// `uintN`, N > 64 -> `U256`
    BigUint,
    /// `intN`, N > 64 -> `I256`
    BigInt,
    /// `T[]` -> `Vec<T>`
    Array(Box<TypeBinding>),
    /// `T[N]` -> `[T; N]`
    FixedArray(Box<TypeBinding>, usize),
    /// Tuple -> generated struct
    Tuple(String),
    /// Indexed dynamic event parameter, only its hash is known -> `H256`
    Hash,
}

/// Native width for an `N`-bit integer, `None` above 64 bits
pub fn native_width(bits: usize) -> Option<usize> {
    match bits {
        0..=8 => Some(8),
        9..=16 => Some(16),
        17..=32 => Some(32),
        33..=64 => Some(64),
        _ => None,
    }
}

impl TypeBinding {
    /// Bind `kind`. Tuples (at any array depth) take their struct name from
    /// `tuple_name`, which is called once per tuple reached.
    pub fn resolve<E>(
        kind: &ParamType,
        tuple_name: &mut dyn FnMut() -> Result<String, E>,
    ) -> Result<Self, E> {
        Ok(match kind {
            ParamType::Address => TypeBinding::Address,
            ParamType::Bool => TypeBinding::Bool,
            ParamType::String => TypeBinding::String,
            ParamType::Bytes => TypeBinding::Bytes,
            ParamType::FixedBytes(size) => TypeBinding::FixedBytes(*size),
            ParamType::Function => TypeBinding::FixedBytes(24),
            ParamType::Uint(bits) => match native_width(*bits) {
                Some(native) => TypeBinding::Uint { native },
                None => TypeBinding::BigUint,
            },
            ParamType::Int(bits) => match native_width(*bits) {
                Some(native) => TypeBinding::Int { native },
                None => TypeBinding::BigInt,
            },
            ParamType::Array(inner) => TypeBinding::Array(Box::new(Self::resolve(inner, tuple_name)?)),
            ParamType::FixedArray(inner, size) => {
                TypeBinding::FixedArray(Box::new(Self::resolve(inner, tuple_name)?), *size)
            }
            ParamType::Tuple(_) => TypeBinding::Tuple(tuple_name()?),
        })
    }

    /// Rust type
    pub fn rust_type(&self) -> TokenStream {
        match self {
            TypeBinding::Address => quote!(Address),
            TypeBinding::Bool => quote!(bool),
            TypeBinding::String => quote!(String),
            TypeBinding::Bytes => quote!(Bytes),
            TypeBinding::FixedBytes(size) => {
                let size = Literal::usize_unsuffixed(*size);
                quote!([u8; #size])
            }
            TypeBinding::Uint { native } => {
                let ident = format_ident!("u{}", native);
                quote!(#ident)
            }
            TypeBinding::Int { native } => {
                let ident = format_ident!("i{}", native);
                quote!(#ident)
            }
            TypeBinding::BigUint => quote!(U256),
            TypeBinding::BigInt => quote!(I256),
            TypeBinding::Array(inner) => {
                let inner = inner.rust_type();
                quote!(Vec<#inner>)
            }
            TypeBinding::FixedArray(inner, size) => {
                let inner = inner.rust_type();
                let size = Literal::usize_unsuffixed(*size);
                quote!([#inner; #size])
            }
            TypeBinding::Tuple(name) => {
                let ident = format_ident!("{}", name);
                quote!(#ident)
            }
            TypeBinding::Hash => quote!(H256),
        }
    }

    /// Expression turning the owned value `value` into a `Token`
    pub fn encode_expr(&self, value: TokenStream) -> TokenStream {
        self.encode_at(value, 0)
    }

    fn encode_at(&self, value: TokenStream, depth: usize) -> TokenStream {
        match self {
            TypeBinding::Address => quote!(Token::Address(#value)),
            TypeBinding::Bool => quote!(Token::Bool(#value)),
            TypeBinding::String => quote!(Token::String(#value)),
            TypeBinding::Bytes => quote!(Token::Bytes(#value.to_vec())),
            TypeBinding::FixedBytes(_) => quote!(tokens::fixed_bytes(&#value)),
            TypeBinding::Uint { .. } | TypeBinding::BigUint => quote!(tokens::uint(#value)),
            TypeBinding::Int { .. } | TypeBinding::BigInt => quote!(tokens::int(#value)),
            TypeBinding::Array(inner) => {
                let element = format_ident!("e{}", depth);
                let inner = inner.encode_at(quote!(#element), depth + 1);
                quote!(Token::Array(#value.into_iter().map(|#element| #inner).collect()))
            }
            TypeBinding::FixedArray(inner, _) => {
                let element = format_ident!("e{}", depth);
                let inner = inner.encode_at(quote!(#element), depth + 1);
                quote!(Token::FixedArray(#value.into_iter().map(|#element| #inner).collect()))
            }
            TypeBinding::Tuple(_) => quote!(#value.into_token()),
            TypeBinding::Hash => quote!(Token::FixedBytes(#value.as_bytes().to_vec())),
        }
    }

    /// Callable taking a `Token` and returning `Result<T, DecodeError>`
    pub fn decode_fn(&self) -> TokenStream {
        match self {
            TypeBinding::Address => quote!(tokens::into_address),
            TypeBinding::Bool => quote!(tokens::into_bool),
            TypeBinding::String => quote!(tokens::into_string),
            TypeBinding::Bytes => quote!(tokens::into_bytes),
            TypeBinding::FixedBytes(size) => {
                let size = Literal::usize_unsuffixed(*size);
                quote!(tokens::into_fixed_bytes::<#size>)
            }
            TypeBinding::Uint { .. } => {
                let ty = self.rust_type();
                quote!(tokens::into_uint::<#ty>)
            }
            TypeBinding::Int { .. } => {
                let ty = self.rust_type();
                quote!(tokens::into_int::<#ty>)
            }
            TypeBinding::BigUint => quote!(tokens::into_u256),
            TypeBinding::BigInt => quote!(tokens::into_i256),
            TypeBinding::Array(inner) => {
                let inner = inner.decode_fn();
                quote!(|t| tokens::into_array(t, #inner))
            }
            TypeBinding::FixedArray(inner, size) => {
                let inner = inner.decode_fn();
                let size = Literal::usize_unsuffixed(*size);
                quote!(|t| tokens::into_fixed_array::<_, _, #size>(t, #inner))
            }
            TypeBinding::Tuple(name) => {
                let ident = format_ident!("{}", name);
                quote!(#ident::from_token)
            }
            TypeBinding::Hash => quote!(tokens::into_h256),
        }
    }
}

/// Expression constructing `kind` at runtime
pub fn param_type_expr(kind: &ParamType) -> TokenStream {
    match kind {
        ParamType::Address => quote!(ParamType::Address),
        ParamType::Bool => quote!(ParamType::Bool),
        ParamType::String => quote!(ParamType::String),
        ParamType::Bytes => quote!(ParamType::Bytes),
        ParamType::Function => quote!(ParamType::Function),
        ParamType::FixedBytes(size) => {
            let size = Literal::usize_unsuffixed(*size);
            quote!(ParamType::FixedBytes(#size))
        }
        ParamType::Uint(bits) => {
            let bits = Literal::usize_unsuffixed(*bits);
            quote!(ParamType::Uint(#bits))
        }
        ParamType::Int(bits) => {
            let bits = Literal::usize_unsuffixed(*bits);
            quote!(ParamType::Int(#bits))
        }
        ParamType::Array(inner) => {
            let inner = param_type_expr(inner);
            quote!(ParamType::Array(Box::new(#inner)))
        }
        ParamType::FixedArray(inner, size) => {
            let inner = param_type_expr(inner);
            let size = Literal::usize_unsuffixed(*size);
            quote!(ParamType::FixedArray(Box::new(#inner), #size))
        }
        ParamType::Tuple(members) => {
            let members = members.iter().map(param_type_expr);
            quote!(ParamType::Tuple(vec![#(#members),*]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abibind_abi::parse_type;

    fn bind(ty: &str) -> TypeBinding {
        TypeBinding::resolve(&parse_type(ty).unwrap(), &mut || Ok::<_, ()>("Item".to_string())).unwrap()
    }

    fn rust(ty: &str) -> String {
        bind(ty).rust_type().to_string().replace(' ', "")
    }

    #[test]
    fn test_integer_widths() {
        assert_eq!(rust("uint8"), "u8");
        assert_eq!(rust("uint24"), "u32");
        assert_eq!(rust("uint64"), "u64");
        assert_eq!(rust("uint72"), "U256");
        assert_eq!(rust("uint"), "U256");
        assert_eq!(rust("int40"), "i64");
        assert_eq!(rust("int128"), "I256");
    }

    #[test]
    fn test_value_types() {
        assert_eq!(rust("address"), "Address");
        assert_eq!(rust("bool"), "bool");
        assert_eq!(rust("string"), "String");
        assert_eq!(rust("bytes"), "Bytes");
        assert_eq!(rust("bytes4"), "[u8;4]");
        assert_eq!(rust("function"), "[u8;24]");
    }

    #[test]
    fn test_arrays() {
        assert_eq!(rust("address[]"), "Vec<Address>");
        assert_eq!(rust("uint16[3]"), "[u16;3]");
        assert_eq!(rust("bytes32[2][]"), "Vec<[[u8;32];2]>");
    }

    #[test]
    fn test_tuple_names_per_level() {
        let kind = parse_type("(uint256,bool)[]").unwrap();
        let mut calls = 0;
        let binding = TypeBinding::resolve(&kind, &mut || {
            calls += 1;
            Ok::<_, ()>("Pair".to_string())
        })
        .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(binding, TypeBinding::Array(Box::new(TypeBinding::Tuple("Pair".into()))));
    }

    #[test]
    fn test_nested_encode_uses_distinct_bindings() {
        let expr = bind("uint8[][]").encode_expr(quote!(value)).to_string();
        assert!(expr.contains("e0"));
        assert!(expr.contains("e1"));
    }

    #[test]
    fn test_decode_fn() {
        assert_eq!(
            bind("uint32").decode_fn().to_string().replace(' ', ""),
            "tokens::into_uint::<u32>"
        );
        assert_eq!(
            bind("address[2]").decode_fn().to_string().replace(' ', ""),
            "|t|tokens::into_fixed_array::<_,_,2>(t,tokens::into_address)"
        );
    }

    #[test]
    fn test_param_type_expr() {
        let expr = param_type_expr(&parse_type("(uint256,bytes)[]").unwrap());
        assert_eq!(
            expr.to_string().replace(' ', ""),
            "ParamType::Array(Box::new(ParamType::Tuple(vec![ParamType::Uint(256),ParamType::Bytes])))"
        );
    }
}
