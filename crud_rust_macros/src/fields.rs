use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr};

pub fn derive_field_access(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    name,
                    "FieldAccess derive only supports structs with named fields",
                )
                .to_compile_error()
                .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "FieldAccess derive only supports structs")
                .to_compile_error()
                .into()
        }
    };

    let camel_case = rename_all_camel(&input.attrs);

    // (public name, struct field)
    let mut table = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let options = field_options(&field.attrs);
        if options.skip {
            continue;
        }
        let public_name = options.rename.unwrap_or_else(|| {
            let raw = ident.to_string();
            if camel_case {
                to_camel_case(&raw)
            } else {
                raw
            }
        });
        table.push((public_name, ident.clone()));
    }

    let names: Vec<_> = table.iter().map(|(n, _)| n.as_str()).collect();

    let read_arms = table.iter().map(|(n, ident)| {
        quote! { #n => crud_rust::read_field(&self.#ident), }
    });

    let write_arms = table.iter().map(|(n, ident)| {
        quote! {
            #n => {
                self.#ident = crud_rust::write_field(field, value)?;
                ::core::result::Result::Ok(())
            }
        }
    });

    let clear_arms = table.iter().map(|(n, ident)| {
        quote! {
            #n => {
                self.#ident = ::core::default::Default::default();
                ::core::result::Result::Ok(())
            }
        }
    });

    let expanded = quote! {
        impl crud_rust::FieldAccess for #name {
            const FIELDS: &'static [&'static str] = &[#(#names),*];

            fn field_value(&self, field: &str) -> ::core::option::Option<crud_rust::Value> {
                match field {
                    #(#read_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn set_field(
                &mut self,
                field: &str,
                value: &crud_rust::Value,
            ) -> ::core::result::Result<(), crud_rust::CrudError> {
                match field {
                    #(#write_arms)*
                    _ => ::core::result::Result::Err(crud_rust::CrudError::unknown_field(field)),
                }
            }

            fn clear_field(&mut self, field: &str) -> ::core::result::Result<(), crud_rust::CrudError> {
                match field {
                    #(#clear_arms)*
                    _ => ::core::result::Result::Err(crud_rust::CrudError::unknown_field(field)),
                }
            }
        }
    };

    TokenStream::from(expanded)
}

#[derive(Default)]
struct FieldOptions {
    skip: bool,
    rename: Option<String>,
}

fn field_options(attrs: &[Attribute]) -> FieldOptions {
    let mut options = FieldOptions::default();
    for attr in attrs {
        if !attr.path().is_ident("field") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
            } else if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                options.rename = Some(value.value());
            }
            Ok(())
        });
    }
    options
}

/// Struct-level `#[field(rename_all = "camelCase")]`.
fn rename_all_camel(attrs: &[Attribute]) -> bool {
    let mut camel = false;
    for attr in attrs {
        if !attr.path().is_ident("field") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                let value: LitStr = meta.value()?.parse()?;
                camel = value.value() == "camelCase";
            }
            Ok(())
        });
    }
    camel
}

pub(crate) fn to_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut upper_next = false;
    for ch in s.chars() {
        if ch == '_' {
            upper_next = !result.is_empty();
        } else if upper_next {
            result.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}
