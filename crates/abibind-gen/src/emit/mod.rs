//! Rust source emission from a [`BindingPlan`]

mod calls;
mod events;
mod structs;

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};

use crate::config::GeneratorConfig;
use crate::plan::BindingPlan;
use crate::GenError;

/// First line of every generated file
pub const HEADER: &str = "// Code generated by abibind. DO NOT EDIT.";

/// Render the plan into formatted Rust source
pub fn render(plan: &BindingPlan, config: &GeneratorConfig) -> Result<String, GenError> {
    let tokens = Emitter::new(plan, config)?.module();
    let file: syn::File = syn::parse2(tokens)?;
    Ok(format!("{}\n\n{}", HEADER, prettyplease::unparse(&file)))
}

pub(crate) struct Emitter<'a> {
    plan: &'a BindingPlan,
    runtime: syn::Path,
    derives: Vec<syn::Path>,
    docs: bool,
}

impl<'a> Emitter<'a> {
    fn new(plan: &'a BindingPlan, config: &GeneratorConfig) -> Result<Self, GenError> {
        Ok(Self {
            plan,
            runtime: config.runtime_path()?,
            derives: config.derive_paths()?,
            docs: config.docs,
        })
    }

    /// `#[doc]` attribute, or nothing when docs are disabled
    fn doc(&self, text: impl AsRef<str>) -> TokenStream {
        if !self.docs {
            return TokenStream::new();
        }
        let text = format!(" {}", text.as_ref());
        quote!(#[doc = #text])
    }

    /// Derives for plain data types
    fn data_derives(&self) -> TokenStream {
        let extra = &self.derives;
        quote!(#[derive(Debug, Clone, PartialEq, Eq #(, #extra)*)])
    }

    fn contract_ident(&self, suffix: &str) -> Ident {
        format_ident!("{}{}", self.plan.contract, suffix)
    }

    fn module(&self) -> TokenStream {
        let runtime = &self.runtime;
        let module = format_ident!("{}", self.plan.module);
        let module_doc = self.doc(format!("Bindings for the `{}` contract.", self.plan.contract));
        let abi = &self.plan.abi_json;
        let abi_doc = self.doc("ABI the bindings were generated from");

        let structs = self.plan.structs.iter().map(|s| self.expand_struct(s));
        let outputs = self.plan.functions.iter().filter_map(|f| self.expand_output(f));
        let records = self.plan.events.iter().map(|e| self.expand_record(e));
        let composite = self.expand_composite();
        let caller = self.expand_caller();
        let transactor = self.expand_transactor();
        let filterer = self.expand_filterer();

        quote! {
            #module_doc
            #[allow(
                dead_code,
                unused_imports,
                unused_mut,
                unused_variables,
                clippy::all,
                clippy::too_many_arguments
            )]
            pub mod #module {
                use std::sync::Arc;
                use #runtime::tokens::{self, TokenReader, TupleReader};
                use #runtime::{
                    decode_log, encode_topics, Address, Backend, BindError, BoundContract, Bytes,
                    CallOpts, ContractEvent, DecodeError, EventWatch, FilterOpts, Log, LogIterator,
                    ParamType, PendingTransaction, Token, TransactOpts, WatchOpts, H256, I256, U256,
                };

                #abi_doc
                pub const ABI: &str = #abi;

                #(#structs)*
                #(#outputs)*
                #(#records)*
                #composite
                #caller
                #transactor
                #filterer
            }
        }
    }

    /// Composite type bundling caller, transactor and filterer, plus its session
    fn expand_composite(&self) -> TokenStream {
        let name = self.contract_ident("");
        let session = self.contract_ident("Session");
        let caller = self.contract_ident("Caller");
        let transactor = self.contract_ident("Transactor");
        let filterer = self.contract_ident("Filterer");

        let doc = self.doc(format!(
            "Read, write and event access to a deployed `{}`.",
            self.plan.contract
        ));
        let session_doc = self.doc(format!(
            "`{}` with call and transact options bound once.",
            self.plan.contract
        ));
        let methods = self.plan.functions.iter().map(|f| {
            if f.is_constant() {
                self.session_call(f, quote!(self.contract.caller), quote!(&self.call_opts))
            } else {
                self.session_transact(f, quote!(self.contract.transactor), quote!(&self.transact_opts))
            }
        });
        let raw = self.session_raw(quote!(self.contract.transactor), quote!(&self.transact_opts));

        quote! {
            #doc
            #[derive(Debug, Clone)]
            pub struct #name {
                pub caller: #caller,
                pub transactor: #transactor,
                pub filterer: #filterer,
            }

            impl #name {
                /// Bind the contract at `address`
                pub fn new(address: Address, backend: Arc<dyn Backend>) -> Result<Self, BindError> {
                    Ok(Self::from_bound(BoundContract::from_json(address, ABI, backend)?))
                }

                /// Wrap an existing bound contract
                pub fn from_bound(contract: BoundContract) -> Self {
                    Self {
                        caller: #caller { contract: contract.clone() },
                        transactor: #transactor { contract: contract.clone() },
                        filterer: #filterer { contract },
                    }
                }

                /// Contract address
                pub fn address(&self) -> Address {
                    self.caller.contract.address()
                }

                /// Bind call and transact options
                pub fn session(&self, call_opts: CallOpts, transact_opts: TransactOpts) -> #session {
                    #session {
                        contract: self.clone(),
                        call_opts,
                        transact_opts,
                    }
                }
            }

            #session_doc
            #[derive(Debug, Clone)]
            pub struct #session {
                pub contract: #name,
                pub call_opts: CallOpts,
                pub transact_opts: TransactOpts,
            }

            impl #session {
                #(#methods)*
                #raw
            }
        }
    }

    /// `new` / `address` shared by the caller, transactor and filterer
    fn wrapper_basics(&self) -> TokenStream {
        quote! {
            /// Bind the contract at `address`
            pub fn new(address: Address, backend: Arc<dyn Backend>) -> Result<Self, BindError> {
                Ok(Self {
                    contract: BoundContract::from_json(address, ABI, backend)?,
                })
            }

            /// Contract address
            pub fn address(&self) -> Address {
                self.contract.address()
            }
        }
    }
}
