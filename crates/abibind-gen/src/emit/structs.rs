//! Structs for tuple types

use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};

use super::Emitter;
use crate::plan::StructPlan;

impl Emitter<'_> {
    pub(super) fn expand_struct(&self, plan: &StructPlan) -> TokenStream {
        let name = format_ident!("{}", plan.name);
        let doc = self.doc(format!("Solidity tuple `{}`", plan.canonical));
        let derives = self.data_derives();
        let len = Literal::usize_unsuffixed(plan.fields.len());

        let fields = plan.fields.iter().map(|f| {
            let field = format_ident!("{}", f.name);
            let ty = f.binding.rust_type();
            quote!(pub #field: #ty)
        });
        let encode = plan.fields.iter().map(|f| {
            let field = format_ident!("{}", f.name);
            f.binding.encode_expr(quote!(self.#field))
        });
        let decode = plan.fields.iter().map(|f| {
            let field = format_ident!("{}", f.name);
            let convert = f.binding.decode_fn();
            quote!(#field: reader.read(#convert)?)
        });

        quote! {
            #doc
            #derives
            pub struct #name {
                #(#fields),*
            }

            impl #name {
                /// Encode as a tuple token
                pub fn into_token(self) -> Token {
                    Token::Tuple(vec![#(#encode),*])
                }

                /// Decode from a tuple token
                pub fn from_token(token: Token) -> Result<Self, DecodeError> {
                    let mut reader = TupleReader::new(token, #len)?;
                    Ok(Self {
                        #(#decode),*
                    })
                }
            }
        }
    }
}
