//! Binding plan: the fully resolved shape of a generated module.
//!
//! Planning resolves every type, names every method, struct and field, and
//! fails before any code is emitted.

use std::collections::HashMap;

use abibind_abi::{
    AbiError, AbiLocation, ContractAbi, Event, Function, Param, ParamType, StateMutability,
};
use tracing::debug;

use crate::naming::{camel_ident, snake_ident, Namespace};
use crate::types::TypeBinding;
use crate::GenError;

/// Names the generated module imports or defines for itself
const RESERVED_TYPES: &[&str] = &[
    "Address", "Arc", "Backend", "BindError", "BoundContract", "Box", "Bytes", "CallOpts",
    "ContractEvent", "DecodeError", "EventWatch", "FilterOpts", "H256", "I256", "Log",
    "LogIterator", "Option", "ParamType", "PendingTransaction", "Result", "Self", "String",
    "Token", "TokenReader", "TransactOpts", "TupleReader", "U256", "Vec", "WatchOpts",
];

/// Method names used by the generated wrapper types themselves
const RESERVED_METHODS: &[&str] = &["new", "from_bound", "address", "session"];

/// Local names used inside generated method bodies
const RESERVED_LOCALS: &[&str] = &["opts", "out", "reader", "topics", "raw"];

/// One parameter, field or return value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamPlan {
    /// Rust identifier
    pub name: String,
    /// Codec type
    pub kind: ParamType,
    /// Rust type and conversions
    pub binding: TypeBinding,
}

/// A generated struct for a tuple type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructPlan {
    /// Rust type name
    pub name: String,
    /// Canonical tuple type, e.g. `(uint256,uint256)`
    pub canonical: String,
    /// Fields in component order
    pub fields: Vec<ParamPlan>,
}

/// A contract function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionPlan {
    /// Solidity name
    pub name: String,
    /// Rust method name after overload resolution
    pub method: String,
    /// Canonical signature
    pub signature: String,
    /// 4-byte selector
    pub selector: [u8; 4],
    /// Declared mutability
    pub mutability: StateMutability,
    /// Inputs in declared order
    pub inputs: Vec<ParamPlan>,
    /// Outputs in declared order
    pub outputs: Vec<ParamPlan>,
    /// Struct wrapping the outputs when there is more than one
    pub output_struct: Option<String>,
}

impl FunctionPlan {
    /// Read-only functions get call wrappers, the rest transact wrappers
    pub fn is_constant(&self) -> bool {
        self.mutability.is_constant()
    }
}

/// One event parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFieldPlan {
    /// Field and filter argument name
    pub name: String,
    /// Declared codec type
    pub kind: ParamType,
    /// Whether the value lives in a topic
    pub indexed: bool,
    /// Type of the record field
    pub binding: TypeBinding,
    /// Type of filter candidates, for indexed parameters
    pub topic: Option<TypeBinding>,
}

impl EventFieldPlan {
    /// Indexed reference types only store their keccak256 hash
    pub fn is_hashed(&self) -> bool {
        self.indexed && is_hashed_in_topic(&self.kind)
    }

    /// Type to decode the stored value with
    pub fn stored_kind(&self) -> ParamType {
        if self.is_hashed() {
            ParamType::FixedBytes(32)
        } else {
            self.kind.clone()
        }
    }
}

/// A contract event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPlan {
    /// Solidity name
    pub name: String,
    /// Snake-case stem of the filterer methods
    pub method: String,
    /// Record struct name
    pub record: String,
    /// Canonical signature
    pub signature: String,
    /// Whether topic 0 is omitted
    pub anonymous: bool,
    /// Parameters in declared order
    pub fields: Vec<EventFieldPlan>,
}

/// Everything the emitter needs for one contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingPlan {
    /// Contract type name
    pub contract: String,
    /// Module name
    pub module: String,
    /// ABI as given, canonically re-serialized
    pub abi_json: String,
    /// Functions in declaration order
    pub functions: Vec<FunctionPlan>,
    /// Events in declaration order
    pub events: Vec<EventPlan>,
    /// Tuple structs in discovery order
    pub structs: Vec<StructPlan>,
    /// Whether the ABI declares a fallback function
    pub has_fallback: bool,
    /// Whether the ABI declares a receive function
    pub has_receive: bool,
}

impl BindingPlan {
    /// Parse `json` and resolve the whole ABI
    pub fn from_json(name: &str, json: &str, module: Option<&str>) -> Result<Self, GenError> {
        let abi = ContractAbi::from_json(json)?;
        let abi_json = canonical_json(json)?;
        Self::build(name, &abi, abi_json, module)
    }

    /// Resolve an already parsed ABI
    pub fn build(
        name: &str,
        abi: &ContractAbi,
        abi_json: String,
        module: Option<&str>,
    ) -> Result<Self, GenError> {
        let contract = camel_ident(name, "Contract");
        let module = match module {
            Some(module) => snake_ident(module, "contract"),
            None => snake_ident(name, "contract"),
        };

        let mut planner = Planner::new(&contract);
        if abi.has_fallback {
            planner.methods.reserve("fallback");
        }
        if abi.has_receive {
            planner.methods.reserve("receive");
        }

        if let Some(constructor) = &abi.constructor {
            planner.validate(&constructor.inputs, "constructor")?;
        }
        let functions = abi
            .functions
            .iter()
            .map(|f| planner.function(f))
            .collect::<Result<Vec<_>, _>>()?;
        let events = abi
            .events
            .iter()
            .map(|e| planner.event(e))
            .collect::<Result<Vec<_>, _>>()?;
        for error in &abi.errors {
            planner.validate(&error.inputs, &format!("error {}", error.name))?;
        }

        Ok(Self {
            contract,
            module,
            abi_json,
            functions,
            events,
            structs: planner.structs,
            has_fallback: abi.has_fallback,
            has_receive: abi.has_receive,
        })
    }

    /// Look up a planned function by Solidity signature
    pub fn function(&self, signature: &str) -> Option<&FunctionPlan> {
        self.functions.iter().find(|f| f.signature == signature)
    }

    /// Look up a generated struct by name
    pub fn struct_named(&self, name: &str) -> Option<&StructPlan> {
        self.structs.iter().find(|s| s.name == name)
    }
}

struct Planner {
    types: Namespace,
    methods: Namespace,
    events: Namespace,
    /// tuple shape -> struct name
    shapes: HashMap<String, String>,
    structs: Vec<StructPlan>,
}

impl Planner {
    fn new(contract: &str) -> Self {
        let mut types = Namespace::with_reserved(RESERVED_TYPES.iter().copied());
        for suffix in [
            "", "Caller", "CallerSession", "Transactor", "TransactorSession", "Filterer", "Session",
        ] {
            types.reserve(format!("{}{}", contract, suffix));
        }
        Self {
            types,
            methods: Namespace::with_reserved(RESERVED_METHODS.iter().copied()),
            events: Namespace::default(),
            shapes: HashMap::new(),
            structs: Vec::new(),
        }
    }

    fn function(&mut self, function: &Function) -> Result<FunctionPlan, GenError> {
        let item = format!("function {}", function.name);
        let method = self.methods.claim(&snake_ident(&function.name, "call"));

        let mut locals = Namespace::with_reserved(RESERVED_LOCALS.iter().copied());
        let mut inputs = Vec::with_capacity(function.inputs.len());
        for (i, param) in function.inputs.iter().enumerate() {
            let (kind, binding) = self.bind(param, &function.name, &item)?;
            let name = locals.claim(&snake_ident(&param.name, &format!("arg{}", i)));
            inputs.push(ParamPlan { name, kind, binding });
        }

        let mut fields = Namespace::default();
        let mut outputs = Vec::with_capacity(function.outputs.len());
        for (i, param) in function.outputs.iter().enumerate() {
            let (kind, binding) = self.bind(param, &function.name, &item)?;
            let name = fields.claim(&snake_ident(&param.name, &format!("field{}", i)));
            outputs.push(ParamPlan { name, kind, binding });
        }
        let output_struct = (outputs.len() > 1)
            .then(|| self.types.claim(&format!("{}Output", camel_ident(&method, "Call"))));

        let signature = function.signature();
        debug!(function = %signature, method = %method, "planned function");
        Ok(FunctionPlan {
            name: function.name.clone(),
            method,
            selector: function.selector(),
            signature,
            mutability: function.state_mutability,
            inputs,
            outputs,
            output_struct,
        })
    }

    fn event(&mut self, event: &Event) -> Result<EventPlan, GenError> {
        let item = format!("event {}", event.name);
        let method = self.events.claim(&snake_ident(&event.name, "event"));
        let record = self.types.claim(&format!("{}Event", camel_ident(&method, "Log")));

        let mut locals = Namespace::with_reserved(RESERVED_LOCALS.iter().copied());
        let mut fields = Vec::with_capacity(event.inputs.len());
        for (i, param) in event.inputs.iter().enumerate() {
            let kind = param.kind().map_err(|e| GenError::resolving(e, &item))?;
            let (binding, topic) = if param.indexed && is_hashed_in_topic(&kind) {
                let topic = match kind {
                    ParamType::String => TypeBinding::String,
                    ParamType::Bytes => TypeBinding::Bytes,
                    _ => TypeBinding::Hash,
                };
                (TypeBinding::Hash, Some(topic))
            } else {
                let (_, binding) = self.bind(param, &event.name, &item)?;
                let topic = param.indexed.then(|| binding.clone());
                (binding, topic)
            };
            let name = locals.claim(&snake_ident(&param.name, &format!("param{}", i)));
            fields.push(EventFieldPlan {
                name,
                kind,
                indexed: param.indexed,
                binding,
                topic,
            });
        }

        let signature = event.signature();
        debug!(event = %signature, record = %record, "planned event");
        Ok(EventPlan {
            name: event.name.clone(),
            method,
            record,
            signature,
            anonymous: event.anonymous,
            fields,
        })
    }

    fn validate(&self, params: &[Param], item: &str) -> Result<(), GenError> {
        for param in params {
            param.kind().map_err(|e| GenError::resolving(e, item))?;
        }
        Ok(())
    }

    fn bind(
        &mut self,
        param: &Param,
        owner: &str,
        item: &str,
    ) -> Result<(ParamType, TypeBinding), GenError> {
        let kind = param.kind().map_err(|e| GenError::resolving(e, item))?;
        let binding = TypeBinding::resolve(&kind, &mut || self.tuple_struct(param, owner, item))?;
        Ok((kind, binding))
    }

    /// Name of the struct for the tuple in `param`, generating it on first sight
    fn tuple_struct(&mut self, param: &Param, owner: &str, item: &str) -> Result<String, GenError> {
        let kind = param.kind().map_err(|e| GenError::resolving(e, item))?;
        let canonical = tuple_core(&kind).to_string();
        let names: Vec<&str> = param.components.iter().map(|c| c.name.as_str()).collect();
        let shape = format!("{}{:?}", canonical, names);
        if let Some(name) = self.shapes.get(&shape) {
            return Ok(name.clone());
        }

        let base = match param.struct_name() {
            Some(name) => camel_ident(name, "Tuple"),
            None => format!(
                "{}{}",
                camel_ident(owner, "Tuple"),
                camel_ident(&param.name, "Tuple")
            ),
        };
        let name = self.types.claim(&base);
        self.shapes.insert(shape, name.clone());

        let mut names = Namespace::default();
        let mut fields = Vec::with_capacity(param.components.len());
        for (i, component) in param.components.iter().enumerate() {
            let (kind, binding) = self.bind(component, &name, item)?;
            let field = names.claim(&snake_ident(&component.name, &format!("field{}", i)));
            fields.push(ParamPlan {
                name: field,
                kind,
                binding,
            });
        }

        debug!(name = %name, tuple = %canonical, "planned struct");
        self.structs.push(StructPlan {
            name: name.clone(),
            canonical,
            fields,
        });
        Ok(name)
    }
}

/// Reference types are replaced by their hash when indexed
fn is_hashed_in_topic(kind: &ParamType) -> bool {
    matches!(
        kind,
        ParamType::String
            | ParamType::Bytes
            | ParamType::Array(_)
            | ParamType::FixedArray(..)
            | ParamType::Tuple(_)
    )
}

/// Strip array wrappers down to the tuple itself
fn tuple_core(kind: &ParamType) -> &ParamType {
    match kind {
        ParamType::Array(inner) | ParamType::FixedArray(inner, _) => tuple_core(inner),
        other => other,
    }
}

/// Re-serialize an ABI document (or the `abi` of an artifact) with sorted keys
pub fn canonical_json(json: &str) -> Result<String, GenError> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| AbiError::MalformedAbi {
        location: AbiLocation::Document,
        reason: e.to_string(),
    })?;
    let abi = match value {
        serde_json::Value::Object(mut map) if map.contains_key("abi") => {
            map.remove("abi").unwrap_or_default()
        }
        other => other,
    };
    Ok(sorted(abi).to_string())
}

fn sorted(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            serde_json::Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(sorted).collect())
        }
        other => other,
    }
}
