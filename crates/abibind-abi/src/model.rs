//! Parsed contract ABI

use std::str::FromStr;

use abibind_primitives::H256;

use crate::signature::{event_topic, function_selector};
use crate::types::{parse_type, ParamType};
use crate::AbiError;

/// Function state mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StateMutability {
    /// Reads nothing from chain state
    Pure,
    /// Reads but never writes chain state
    View,
    /// Writes state, rejects value transfers
    #[default]
    NonPayable,
    /// Writes state, accepts value transfers
    Payable,
}

impl StateMutability {
    /// Whether calls can be executed locally without a transaction
    pub fn is_constant(&self) -> bool {
        matches!(self, StateMutability::Pure | StateMutability::View)
    }

    /// Name as written in ABI JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            StateMutability::Pure => "pure",
            StateMutability::View => "view",
            StateMutability::NonPayable => "nonpayable",
            StateMutability::Payable => "payable",
        }
    }
}

impl FromStr for StateMutability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pure" => Ok(StateMutability::Pure),
            "view" => Ok(StateMutability::View),
            "nonpayable" => Ok(StateMutability::NonPayable),
            "payable" => Ok(StateMutability::Payable),
            other => Err(format!("unknown stateMutability `{}`", other)),
        }
    }
}

/// A function, event, error or constructor parameter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Param {
    /// Parameter name (may be empty)
    pub name: String,
    /// Declared type string, verbatim (`uint256`, `tuple[]`, ...)
    pub ty: String,
    /// Compiler `internalType`, when present
    pub internal_type: Option<String>,
    /// Tuple components, in declared order
    pub components: Vec<Param>,
    /// Whether this is an indexed event parameter
    pub indexed: bool,
}

impl Param {
    /// Create a parameter with no internal type and no components
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            ..Default::default()
        }
    }

    /// Resolve the declared type string into the codec grammar
    pub fn kind(&self) -> Result<ParamType, AbiError> {
        match self.ty.strip_prefix("tuple") {
            Some(suffix) => {
                let inner = self
                    .components
                    .iter()
                    .map(Param::kind)
                    .collect::<Result<Vec<_>, _>>()?;
                wrap_array_suffix(ParamType::Tuple(inner), suffix)
                    .ok_or_else(|| AbiError::UnsupportedType(self.ty.clone()))
            }
            None => parse_type(&self.ty),
        }
    }

    /// Canonical type as used in signatures. Falls back to the declared
    /// string when it cannot be resolved.
    pub fn canonical_type(&self) -> String {
        match self.kind() {
            Ok(kind) => kind.to_string(),
            Err(_) => self.ty.clone(),
        }
    }

    /// Whether this parameter is a tuple or an array of tuples
    pub fn is_tuple(&self) -> bool {
        self.ty.starts_with("tuple")
    }

    /// Qualified struct path from `internalType` (`struct Lib.Name[]` -> `Lib.Name`)
    pub fn struct_path(&self) -> Option<&str> {
        let internal = self.internal_type.as_deref()?.strip_prefix("struct ")?;
        let path = internal.split('[').next().unwrap_or(internal).trim();
        (!path.is_empty()).then_some(path)
    }

    /// Struct name from `internalType` (`struct Lib.Name[]` -> `Name`)
    pub fn struct_name(&self) -> Option<&str> {
        let path = self.struct_path()?;
        let name = path.rsplit('.').next().unwrap_or(path);
        (!name.is_empty()).then_some(name)
    }
}

/// Apply `[]` / `[N]` suffixes left to right
fn wrap_array_suffix(mut ty: ParamType, mut suffix: &str) -> Option<ParamType> {
    while !suffix.is_empty() {
        let rest = suffix.strip_prefix('[')?;
        let close = rest.find(']')?;
        let size = &rest[..close];
        ty = if size.is_empty() {
            ParamType::Array(Box::new(ty))
        } else {
            if size.starts_with('0') || !size.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            ParamType::FixedArray(Box::new(ty), size.parse().ok()?)
        };
        suffix = &rest[close + 1..];
    }
    Some(ty)
}

fn signature_of(name: &str, params: &[Param]) -> String {
    let types: Vec<String> = params.iter().map(Param::canonical_type).collect();
    format!("{}({})", name, types.join(","))
}

fn kinds_of(params: &[Param]) -> Result<Vec<ParamType>, AbiError> {
    params.iter().map(Param::kind).collect()
}

/// Contract function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Input parameters
    pub inputs: Vec<Param>,
    /// Output parameters
    pub outputs: Vec<Param>,
    /// State mutability
    pub state_mutability: StateMutability,
}

impl Function {
    /// Canonical signature, e.g. `setAddr(bytes32,uint256,bytes)`
    pub fn signature(&self) -> String {
        signature_of(&self.name, &self.inputs)
    }

    /// 4-byte selector
    pub fn selector(&self) -> [u8; 4] {
        function_selector(&self.signature())
    }

    /// Whether this function is `view` or `pure`
    pub fn is_constant(&self) -> bool {
        self.state_mutability.is_constant()
    }

    /// Resolved input types
    pub fn input_types(&self) -> Result<Vec<ParamType>, AbiError> {
        kinds_of(&self.inputs)
    }

    /// Resolved output types
    pub fn output_types(&self) -> Result<Vec<ParamType>, AbiError> {
        kinds_of(&self.outputs)
    }
}

/// Contract event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name
    pub name: String,
    /// All parameters in declared order
    pub inputs: Vec<Param>,
    /// Anonymous events carry no signature topic
    pub anonymous: bool,
}

impl Event {
    /// Canonical signature, e.g. `Transfer(bytes32,address)`
    pub fn signature(&self) -> String {
        signature_of(&self.name, &self.inputs)
    }

    /// keccak256 of the signature, topic 0 of non-anonymous logs
    pub fn topic(&self) -> H256 {
        event_topic(&self.signature())
    }

    /// Indexed parameters, in declared order
    pub fn indexed_inputs(&self) -> impl Iterator<Item = &Param> {
        self.inputs.iter().filter(|p| p.indexed)
    }

    /// Parameters carried in the data section
    pub fn data_inputs(&self) -> impl Iterator<Item = &Param> {
        self.inputs.iter().filter(|p| !p.indexed)
    }
}

/// Custom error declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomError {
    /// Error name
    pub name: String,
    /// Error parameters
    pub inputs: Vec<Param>,
}

impl CustomError {
    /// Canonical signature
    pub fn signature(&self) -> String {
        signature_of(&self.name, &self.inputs)
    }

    /// 4-byte selector prefixed to revert data
    pub fn selector(&self) -> [u8; 4] {
        function_selector(&self.signature())
    }
}

/// Contract constructor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Constructor {
    /// Constructor parameters
    pub inputs: Vec<Param>,
    /// State mutability
    pub state_mutability: StateMutability,
}

/// Immutable model of one contract ABI
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContractAbi {
    /// Constructor, if declared
    pub constructor: Option<Constructor>,
    /// Functions in declaration order
    pub functions: Vec<Function>,
    /// Events in declaration order
    pub events: Vec<Event>,
    /// Custom errors in declaration order
    pub errors: Vec<CustomError>,
    /// A `fallback` entry is present
    pub has_fallback: bool,
    /// A `receive` entry is present
    pub has_receive: bool,
}

impl ContractAbi {
    /// Parse ABI JSON (a bare array or an artifact with an `abi` field)
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        crate::json::parse(json)
    }
}

impl FromStr for ContractAbi {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}
