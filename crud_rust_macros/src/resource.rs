use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, GenericArgument, LitStr, PathArguments, Type};

pub fn derive_resource(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    // #[resource(name = "...")] on the struct, defaulting to the struct name
    let resource_type = extract_resource_type(&input);

    let (id_field, id_type) = match extract_id_field(&input) {
        Ok(found) => found,
        Err(err) => return err.to_compile_error().into(),
    };

    let expanded = quote! {
        impl crud_rust::Resource for #name {
            type Id = #id_type;

            const RESOURCE_TYPE: &'static str = #resource_type;

            fn id(&self) -> ::core::option::Option<&Self::Id> {
                self.#id_field.as_ref()
            }

            fn set_id(&mut self, id: Self::Id) {
                self.#id_field = ::core::option::Option::Some(id);
            }
        }
    };

    TokenStream::from(expanded)
}

fn extract_resource_type(input: &DeriveInput) -> String {
    for attr in &input.attrs {
        if !attr.path().is_ident("resource") {
            continue;
        }

        let mut resource_type = None;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                resource_type = Some(value.value());
            }
            Ok(())
        });

        if let Some(r) = resource_type {
            return r;
        }
    }

    input.ident.to_string()
}

fn extract_id_field(input: &DeriveInput) -> syn::Result<(syn::Ident, Type)> {
    let fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Resource derive only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Resource derive only supports structs",
            ))
        }
    };

    let marked = fields.iter().find(|field| {
        field.attrs.iter().any(|attr| {
            if !attr.path().is_ident("resource") {
                return false;
            }
            let mut is_id = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    is_id = true;
                }
                Ok(())
            });
            is_id
        })
    });

    // Default: a field named `id`
    let field = marked
        .or_else(|| {
            fields
                .iter()
                .find(|field| field.ident.as_ref().is_some_and(|ident| ident == "id"))
        })
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &input.ident,
                "Resource derive: no field marked with #[resource(id)] and no field named `id`",
            )
        })?;

    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new_spanned(field, "identifier field must be named"))?;
    let id_type = option_inner(&field.ty).ok_or_else(|| {
        syn::Error::new_spanned(
            &field.ty,
            "Resource derive: the identifier field must be an `Option<_>`",
        )
    })?;

    Ok((ident, id_type))
}

/// `Option<T>` -> `T`
fn option_inner(ty: &Type) -> Option<Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner.clone()),
        _ => None,
    }
}
