//! Caller / transactor wrappers and their sessions

use abibind_abi::StateMutability;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::Emitter;
use crate::plan::{FunctionPlan, ParamPlan};

/// `name: Type` list for a method signature
fn arguments(inputs: &[ParamPlan]) -> Vec<TokenStream> {
    inputs
        .iter()
        .map(|p| {
            let name = format_ident!("{}", p.name);
            let ty = p.binding.rust_type();
            quote!(#name: #ty)
        })
        .collect()
}

/// Argument names, for forwarding
fn forwards(inputs: &[ParamPlan]) -> Vec<TokenStream> {
    inputs
        .iter()
        .map(|p| {
            let name = format_ident!("{}", p.name);
            quote!(#name)
        })
        .collect()
}

/// `vec![token, ...]` built from the arguments
fn encode_args(inputs: &[ParamPlan]) -> TokenStream {
    let tokens = inputs.iter().map(|p| {
        let name = format_ident!("{}", p.name);
        p.binding.encode_expr(quote!(#name))
    });
    quote!(vec![#(#tokens),*])
}

fn selector_hex(function: &FunctionPlan) -> String {
    format!("0x{}", hex::encode(function.selector))
}

impl Emitter<'_> {
    fn return_type(&self, function: &FunctionPlan) -> TokenStream {
        match (&function.output_struct, function.outputs.as_slice()) {
            (Some(name), _) => {
                let ident = format_ident!("{}", name);
                quote!(#ident)
            }
            (None, [single]) => single.binding.rust_type(),
            _ => quote!(()),
        }
    }

    /// `{Method}Output` for functions with more than one return value
    pub(super) fn expand_output(&self, function: &FunctionPlan) -> Option<TokenStream> {
        let name = format_ident!("{}", function.output_struct.as_ref()?);
        let doc = self.doc(format!("Return values of `{}`", function.signature));
        let derives = self.data_derives();
        let fields = function.outputs.iter().map(|p| {
            let field = format_ident!("{}", p.name);
            let ty = p.binding.rust_type();
            quote!(pub #field: #ty)
        });
        Some(quote! {
            #doc
            #derives
            pub struct #name {
                #(#fields),*
            }
        })
    }

    fn call_method(&self, function: &FunctionPlan) -> TokenStream {
        let method = format_ident!("{}", function.method);
        let signature = &function.signature;
        let args = arguments(&function.inputs);
        let encoded = encode_args(&function.inputs);
        let ret = self.return_type(function);
        let doc = self.doc(format!(
            "Calls `{}` (selector `{}`).",
            signature,
            selector_hex(function)
        ));

        let body = match (&function.output_struct, function.outputs.as_slice()) {
            (Some(name), outputs) => {
                let name = format_ident!("{}", name);
                let fields = outputs.iter().map(|p| {
                    let field = format_ident!("{}", p.name);
                    let decode = p.binding.decode_fn();
                    quote!(#field: reader.read(#decode)?)
                });
                quote! {
                    let out = self.contract.call(opts, #signature, #encoded).await?;
                    let mut reader = TokenReader::new(#signature, out);
                    Ok(#name { #(#fields),* })
                }
            }
            (None, [single]) => {
                let decode = single.binding.decode_fn();
                quote! {
                    let out = self.contract.call(opts, #signature, #encoded).await?;
                    TokenReader::new(#signature, out).read(#decode)
                }
            }
            _ => quote! {
                self.contract.call(opts, #signature, #encoded).await?;
                Ok(())
            },
        };

        quote! {
            #doc
            pub async fn #method(&self, opts: &CallOpts #(, #args)*) -> Result<#ret, BindError> {
                #body
            }
        }
    }

    fn transact_method(&self, function: &FunctionPlan) -> TokenStream {
        let method = format_ident!("{}", function.method);
        let signature = &function.signature;
        let args = arguments(&function.inputs);
        let encoded = encode_args(&function.inputs);
        let payable = if function.mutability == StateMutability::Payable {
            " Payable: attach value through `opts.value`."
        } else {
            ""
        };
        let doc = self.doc(format!(
            "Sends `{}` (selector `{}`).{}",
            signature,
            selector_hex(function),
            payable
        ));

        quote! {
            #doc
            pub async fn #method(&self, opts: &TransactOpts #(, #args)*) -> Result<PendingTransaction, BindError> {
                self.contract.transact(opts, #signature, #encoded).await
            }
        }
    }

    /// Session method forwarding to a caller with bound options
    pub(super) fn session_call(
        &self,
        function: &FunctionPlan,
        target: TokenStream,
        opts: TokenStream,
    ) -> TokenStream {
        let method = format_ident!("{}", function.method);
        let args = arguments(&function.inputs);
        let names = forwards(&function.inputs);
        let ret = self.return_type(function);
        let doc = self.doc(format!("Calls `{}` with the session's call options.", function.signature));
        quote! {
            #doc
            pub async fn #method(&self #(, #args)*) -> Result<#ret, BindError> {
                #target.#method(#opts #(, #names)*).await
            }
        }
    }

    /// Session method forwarding to a transactor with bound options
    pub(super) fn session_transact(
        &self,
        function: &FunctionPlan,
        target: TokenStream,
        opts: TokenStream,
    ) -> TokenStream {
        let method = format_ident!("{}", function.method);
        let args = arguments(&function.inputs);
        let names = forwards(&function.inputs);
        let doc = self.doc(format!(
            "Sends `{}` with the session's transact options.",
            function.signature
        ));
        quote! {
            #doc
            pub async fn #method(&self #(, #args)*) -> Result<PendingTransaction, BindError> {
                #target.#method(#opts #(, #names)*).await
            }
        }
    }

    /// `fallback` / `receive` session wrappers, when the ABI declares them
    pub(super) fn session_raw(&self, target: TokenStream, opts: TokenStream) -> TokenStream {
        let fallback = self.plan.has_fallback.then(|| {
            quote! {
                /// Sends raw calldata to the fallback function
                pub async fn fallback(&self, calldata: Vec<u8>) -> Result<PendingTransaction, BindError> {
                    #target.fallback(#opts, calldata).await
                }
            }
        });
        let receive = self.plan.has_receive.then(|| {
            quote! {
                /// Sends plain value to the receive function
                pub async fn receive(&self) -> Result<PendingTransaction, BindError> {
                    #target.receive(#opts).await
                }
            }
        });
        quote!(#fallback #receive)
    }

    /// Read-only wrapper and its session
    pub(super) fn expand_caller(&self) -> TokenStream {
        let caller = self.contract_ident("Caller");
        let session = self.contract_ident("CallerSession");
        let basics = self.wrapper_basics();
        let constant: Vec<_> = self.plan.functions.iter().filter(|f| f.is_constant()).collect();
        let methods = constant.iter().map(|f| self.call_method(f));
        let session_methods = constant
            .iter()
            .map(|f| self.session_call(f, quote!(self.contract), quote!(&self.call_opts)));
        let doc = self.doc(format!("Read-only calls on `{}`.", self.plan.contract));
        let session_doc = self.doc(format!("`{}` with call options bound once.", caller));

        quote! {
            #doc
            #[derive(Debug, Clone)]
            pub struct #caller {
                contract: BoundContract,
            }

            impl #caller {
                #basics

                /// Bind call options
                pub fn session(&self, call_opts: CallOpts) -> #session {
                    #session {
                        contract: self.clone(),
                        call_opts,
                    }
                }

                #(#methods)*
            }

            #session_doc
            #[derive(Debug, Clone)]
            pub struct #session {
                pub contract: #caller,
                pub call_opts: CallOpts,
            }

            impl #session {
                #(#session_methods)*
            }
        }
    }

    /// State-mutating wrapper and its session
    pub(super) fn expand_transactor(&self) -> TokenStream {
        let transactor = self.contract_ident("Transactor");
        let session = self.contract_ident("TransactorSession");
        let basics = self.wrapper_basics();
        let mutating: Vec<_> = self.plan.functions.iter().filter(|f| !f.is_constant()).collect();
        let methods = mutating.iter().map(|f| self.transact_method(f));
        let session_methods = mutating
            .iter()
            .map(|f| self.session_transact(f, quote!(self.contract), quote!(&self.transact_opts)));
        let session_raw = self.session_raw(quote!(self.contract), quote!(&self.transact_opts));
        let doc = self.doc(format!("Transactions on `{}`.", self.plan.contract));
        let session_doc = self.doc(format!("`{}` with transact options bound once.", transactor));

        let fallback = self.plan.has_fallback.then(|| {
            quote! {
                /// Sends raw calldata to the fallback function
                pub async fn fallback(&self, opts: &TransactOpts, calldata: Vec<u8>) -> Result<PendingTransaction, BindError> {
                    self.contract.raw_transact(opts, calldata).await
                }
            }
        });
        let receive = self.plan.has_receive.then(|| {
            quote! {
                /// Sends plain value to the receive function
                pub async fn receive(&self, opts: &TransactOpts) -> Result<PendingTransaction, BindError> {
                    self.contract.raw_transact(opts, Vec::new()).await
                }
            }
        });

        quote! {
            #doc
            #[derive(Debug, Clone)]
            pub struct #transactor {
                contract: BoundContract,
            }

            impl #transactor {
                #basics

                /// Bind transact options
                pub fn session(&self, transact_opts: TransactOpts) -> #session {
                    #session {
                        contract: self.clone(),
                        transact_opts,
                    }
                }

                #(#methods)*
                #fallback
                #receive
            }

            #session_doc
            #[derive(Debug, Clone)]
            pub struct #session {
                pub contract: #transactor,
                pub transact_opts: TransactOpts,
            }

            impl #session {
                #(#session_methods)*
                #session_raw
            }
        }
    }
}
