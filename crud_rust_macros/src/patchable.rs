use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr};

use crate::fields::to_camel_case;

pub fn derive_patchable(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    name,
                    "Patchable derive only supports structs with named fields",
                )
                .to_compile_error()
                .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "Patchable derive only supports structs")
                .to_compile_error()
                .into()
        }
    };

    let camel_case = input.attrs.iter().any(|attr| {
        if !attr.path().is_ident("patchable") {
            return false;
        }
        let mut camel = false;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                let value: LitStr = meta.value()?.parse()?;
                camel = value.value() == "camelCase";
            }
            Ok(())
        });
        camel
    });

    let mut allowlist = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        for attr in &field.attrs {
            if !attr.path().is_ident("patchable") {
                continue;
            }

            // Bare `#[patchable]` or `#[patchable(rename = "...")]`
            let mut rename = None;
            if !matches!(attr.meta, syn::Meta::Path(_)) {
                let _ = attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        let value: LitStr = meta.value()?.parse()?;
                        rename = Some(value.value());
                    }
                    Ok(())
                });
            }

            let public_name = rename.unwrap_or_else(|| {
                if camel_case {
                    to_camel_case(&ident.to_string())
                } else {
                    ident.to_string()
                }
            });
            allowlist.push(public_name);
        }
    }

    let expanded = quote! {
        impl crud_rust::Patchable for #name {
            const PATCHABLE_FIELDS: &'static [&'static str] = &[#(#allowlist),*];
        }
    };

    TokenStream::from(expanded)
}
