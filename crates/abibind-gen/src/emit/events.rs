//! Event records and the filterer

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::Emitter;
use crate::plan::EventPlan;
use crate::types::param_type_expr;

impl Emitter<'_> {
    /// `{Event}Event` record implementing `ContractEvent`
    pub(super) fn expand_record(&self, event: &EventPlan) -> TokenStream {
        let record = format_ident!("{}", event.record);
        let name = &event.name;
        let signature = &event.signature;
        let anonymous = event.anonymous;
        let derives = self.data_derives();
        let doc = self.doc(format!(
            "`{}` event{}",
            signature,
            if anonymous { " (anonymous)" } else { "" }
        ));

        let fields = event.fields.iter().map(|f| {
            let field = format_ident!("{}", f.name);
            let ty = f.binding.rust_type();
            let doc = f.is_hashed().then(|| self.doc("Keccak-256 hash of the indexed value"));
            quote! {
                #doc
                pub #field: #ty
            }
        });

        let signature_topic = if anonymous {
            quote!(None)
        } else {
            quote!(Some(Self::signature_topic()))
        };
        let indexed_types = event
            .fields
            .iter()
            .filter(|f| f.indexed)
            .map(|f| param_type_expr(&f.stored_kind()));
        let data_types = event
            .fields
            .iter()
            .filter(|f| !f.indexed)
            .map(|f| param_type_expr(&f.kind));

        let has_indexed = event.fields.iter().any(|f| f.indexed);
        let has_data = event.fields.iter().any(|f| !f.indexed);
        let indexed_pat = if has_indexed { quote!(indexed) } else { quote!(_) };
        let data_pat = if has_data { quote!(data) } else { quote!(_) };
        let indexed_reader = has_indexed.then(|| quote!(let mut indexed = TokenReader::new(Self::SIGNATURE, indexed);));
        let data_reader = has_data.then(|| quote!(let mut data = TokenReader::new(Self::SIGNATURE, data);));

        let reads = event.fields.iter().map(|f| {
            let field = format_ident!("{}", f.name);
            let decode = f.binding.decode_fn();
            let reader = if f.indexed { quote!(indexed) } else { quote!(data) };
            quote!(#field: #reader.read(#decode)?)
        });

        quote! {
            #doc
            #derives
            pub struct #record {
                #(#fields,)*
                /// Log the event was decoded from
                pub raw: Log,
            }

            impl ContractEvent for #record {
                const NAME: &'static str = #name;
                const SIGNATURE: &'static str = #signature;
                const ANONYMOUS: bool = #anonymous;

                fn decode_log(log: &Log) -> Result<Self, BindError> {
                    let (#indexed_pat, #data_pat) = decode_log(
                        log,
                        Self::NAME,
                        #signature_topic,
                        &[#(#indexed_types),*],
                        &[#(#data_types),*],
                    )?;
                    #indexed_reader
                    #data_reader
                    Ok(Self {
                        #(#reads,)*
                        raw: log.clone(),
                    })
                }
            }
        }
    }

    fn filter_methods(&self, event: &EventPlan) -> TokenStream {
        let record = format_ident!("{}", event.record);
        let filter = format_ident!("filter_{}", event.method);
        let watch = format_ident!("watch_{}", event.method);
        let parse = format_ident!("parse_{}", event.method);

        let indexed: Vec<_> = event.fields.iter().filter(|f| f.indexed).collect();
        let args: Vec<_> = indexed
            .iter()
            .filter_map(|f| {
                let name = format_ident!("{}", f.name);
                let ty = f.topic.as_ref()?.rust_type();
                Some(quote!(#name: Vec<#ty>))
            })
            .collect();
        let positions = indexed.iter().filter_map(|f| {
            let name = format_ident!("{}", f.name);
            let encode = f.topic.as_ref()?.encode_expr(quote!(v));
            let kind = param_type_expr(&f.kind);
            Some(quote!(encode_topics(&#kind, #name.into_iter().map(|v| #encode))?))
        });
        let topics = quote!(let topics: Vec<Vec<H256>> = vec![#(#positions),*];);

        let filter_doc = self.doc(format!(
            "Historical `{}` logs. Each argument lists accepted values for that indexed parameter; an empty list accepts any.",
            event.signature
        ));
        let watch_doc = self.doc(format!(
            "Live `{}` logs, filtered like `{}`.",
            event.signature, filter
        ));
        let parse_doc = self.doc(format!("Decode a raw log as `{}`.", event.signature));

        quote! {
            #filter_doc
            pub async fn #filter(&self, opts: &FilterOpts #(, #args)*) -> Result<LogIterator<#record>, BindError> {
                #topics
                self.contract.filter_logs::<#record>(opts, topics).await
            }

            #watch_doc
            pub async fn #watch(&self, opts: &WatchOpts #(, #args)*) -> Result<EventWatch<#record>, BindError> {
                #topics
                self.contract.watch_logs::<#record>(opts, topics).await
            }

            #parse_doc
            pub fn #parse(&self, log: &Log) -> Result<#record, BindError> {
                #record::decode_log(log)
            }
        }
    }

    /// Event access wrapper
    pub(super) fn expand_filterer(&self) -> TokenStream {
        let filterer = self.contract_ident("Filterer");
        let basics = self.wrapper_basics();
        let methods = self.plan.events.iter().map(|e| self.filter_methods(e));
        let doc = self.doc(format!("Event filtering and watching on `{}`.", self.plan.contract));

        quote! {
            #doc
            #[derive(Debug, Clone)]
            pub struct #filterer {
                contract: BoundContract,
            }

            impl #filterer {
                #basics
                #(#methods)*
            }
        }
    }
}
