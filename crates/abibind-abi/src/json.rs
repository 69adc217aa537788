//! ABI JSON parsing

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use crate::model::{Constructor, ContractAbi, CustomError, Event, Function, Param, StateMutability};
use crate::{AbiError, AbiLocation};

/// Deepest tuple nesting accepted in a parameter
pub const MAX_TUPLE_DEPTH: usize = 32;

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "type")]
    kind: Option<String>,
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(rename = "stateMutability")]
    state_mutability: Option<String>,
    constant: Option<bool>,
    payable: Option<bool>,
    #[serde(default)]
    anonymous: bool,
}

#[derive(Debug, Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(rename = "internalType")]
    internal_type: Option<String>,
    #[serde(default)]
    components: Vec<RawParam>,
    #[serde(default)]
    indexed: bool,
}

/// Parse an ABI document into a [`ContractAbi`]
pub(crate) fn parse(json: &str) -> Result<ContractAbi, AbiError> {
    let document: Value = serde_json::from_str(json)
        .map_err(|e| AbiError::malformed(AbiLocation::Document, e.to_string()))?;
    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(mut artifact) => match artifact.remove("abi") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(AbiError::malformed(
                    AbiLocation::Document,
                    "artifact object has no `abi` array",
                ))
            }
        },
        _ => {
            return Err(AbiError::malformed(
                AbiLocation::Document,
                "expected an array of ABI entries",
            ))
        }
    };

    let mut builder = Builder::default();
    for (index, value) in entries.into_iter().enumerate() {
        let location = AbiLocation::Entry(index);
        let raw: RawEntry =
            serde_json::from_value(value).map_err(|e| AbiError::malformed(location, e.to_string()))?;
        builder.add(raw, location)?;
    }
    Ok(builder.abi)
}

#[derive(Default)]
struct Builder {
    abi: ContractAbi,
    function_keys: HashSet<String>,
    event_keys: HashSet<String>,
    error_keys: HashSet<String>,
}

impl Builder {
    fn add(&mut self, raw: RawEntry, location: AbiLocation) -> Result<(), AbiError> {
        let kind = raw.kind.as_deref().unwrap_or("function");
        match kind {
            "function" => {
                let function = Function {
                    name: required_name(&raw, location)?,
                    inputs: convert_params(raw.inputs, location)?,
                    outputs: convert_params(raw.outputs, location)?,
                    state_mutability: mutability(&raw.state_mutability, raw.constant, raw.payable, location)?,
                };
                claim(&mut self.function_keys, function.signature(), "function", location)?;
                self.abi.functions.push(function);
            }
            "event" => {
                let event = Event {
                    name: required_name(&raw, location)?,
                    inputs: convert_params(raw.inputs, location)?,
                    anonymous: raw.anonymous,
                };
                claim(&mut self.event_keys, event.signature(), "event", location)?;
                self.abi.events.push(event);
            }
            "error" => {
                let error = CustomError {
                    name: required_name(&raw, location)?,
                    inputs: convert_params(raw.inputs, location)?,
                };
                claim(&mut self.error_keys, error.signature(), "error", location)?;
                self.abi.errors.push(error);
            }
            "constructor" => {
                if self.abi.constructor.is_some() {
                    return Err(AbiError::malformed(location, "duplicate constructor"));
                }
                self.abi.constructor = Some(Constructor {
                    state_mutability: mutability(&raw.state_mutability, raw.constant, raw.payable, location)?,
                    inputs: convert_params(raw.inputs, location)?,
                });
            }
            "fallback" => {
                if self.abi.has_fallback {
                    return Err(AbiError::malformed(location, "duplicate fallback"));
                }
                self.abi.has_fallback = true;
            }
            "receive" => {
                if self.abi.has_receive {
                    return Err(AbiError::malformed(location, "duplicate receive"));
                }
                self.abi.has_receive = true;
            }
            other => {
                return Err(AbiError::malformed(
                    location,
                    format!("unknown entry type `{}`", other),
                ))
            }
        }
        Ok(())
    }
}

fn required_name(raw: &RawEntry, location: AbiLocation) -> Result<String, AbiError> {
    raw.name
        .clone()
        .ok_or_else(|| AbiError::malformed(location, "missing field `name`"))
}

fn claim(
    keys: &mut HashSet<String>,
    signature: String,
    what: &str,
    location: AbiLocation,
) -> Result<(), AbiError> {
    if keys.contains(&signature) {
        return Err(AbiError::malformed(
            location,
            format!("duplicate {} `{}`", what, signature),
        ));
    }
    keys.insert(signature);
    Ok(())
}

/// `stateMutability` wins; otherwise the pre-0.5 `constant` / `payable` flags
fn mutability(
    declared: &Option<String>,
    constant: Option<bool>,
    payable: Option<bool>,
    location: AbiLocation,
) -> Result<StateMutability, AbiError> {
    if let Some(declared) = declared {
        return declared
            .parse()
            .map_err(|reason: String| AbiError::malformed(location, reason));
    }
    Ok(match (constant, payable) {
        (Some(true), _) => StateMutability::View,
        (_, Some(true)) => StateMutability::Payable,
        _ => StateMutability::NonPayable,
    })
}

fn convert_params(raw: Vec<RawParam>, location: AbiLocation) -> Result<Vec<Param>, AbiError> {
    let mut open_structs = Vec::new();
    raw.into_iter()
        .map(|p| convert_param(p, location, &mut open_structs, 0))
        .collect()
}

fn convert_param(
    raw: RawParam,
    location: AbiLocation,
    open_structs: &mut Vec<String>,
    depth: usize,
) -> Result<Param, AbiError> {
    let mut param = Param {
        name: raw.name,
        ty: raw.ty,
        internal_type: raw.internal_type,
        components: Vec::new(),
        indexed: raw.indexed,
    };
    if !param.is_tuple() {
        return Ok(param);
    }

    if depth >= MAX_TUPLE_DEPTH {
        return Err(AbiError::malformed(
            location,
            format!("tuple nesting deeper than {} levels", MAX_TUPLE_DEPTH),
        ));
    }
    if raw.components.is_empty() {
        return Err(AbiError::malformed(
            location,
            format!("tuple parameter `{}` has no components", param.name),
        ));
    }

    let struct_name = param.struct_path().map(str::to_string);
    if let Some(name) = &struct_name {
        if open_structs.contains(name) {
            return Err(AbiError::malformed(
                location,
                format!("self-referential tuple `{}`", name),
            ));
        }
        open_structs.push(name.clone());
    }
    let components = raw
        .components
        .into_iter()
        .map(|c| convert_param(c, location, open_structs, depth + 1))
        .collect::<Result<Vec<_>, _>>();
    if struct_name.is_some() {
        open_structs.pop();
    }
    param.components = components?;
    Ok(param)
}
