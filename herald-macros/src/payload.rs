//! `#[derive(Payload)]`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, parse_macro_input};

/// Implementation of `#[derive(Payload)]`.
pub fn derive_payload_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Payload cannot be derived for generic types; use `impl_payload!` for each instantiation",
        ));
    }

    let opaque = has_flag(&input.attrs, "opaque")?;
    let supertypes = supertypes(input)?;

    let to_value = if opaque {
        quote! {
            ::std::result::Result::Ok(::herald::__private::serde_json::Value::String(
                ::std::format!("{:?}", self),
            ))
        }
    } else {
        quote! {
            ::herald::__private::serde_json::to_value(self)
        }
    };

    let views = supertypes.iter().map(|(field, ty)| {
        quote! {
            ::herald::Supertype::new::<#ty>(|value| {
                value
                    .downcast_ref::<#name>()
                    .map(|derived| &derived.#field as &dyn ::std::any::Any)
            })
        }
    });

    Ok(quote! {
        impl ::herald::Describe for #name {
            fn descriptor() -> ::herald::TypeDescriptor {
                ::herald::TypeDescriptor::with_supertypes::<Self>(|| ::std::vec![#(#views),*])
            }
        }

        impl ::herald::Payload for #name {
            fn payload_type(&self) -> ::herald::TypeDescriptor {
                <Self as ::herald::Describe>::descriptor()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn to_value(
                &self,
            ) -> ::std::result::Result<
                ::herald::__private::serde_json::Value,
                ::herald::__private::serde_json::Error,
            > {
                #to_value
            }
        }
    })
}

/// Fields marked `#[payload(extends)]`, with their types.
fn supertypes(input: &DeriveInput) -> syn::Result<Vec<(Ident, syn::Type)>> {
    let Data::Struct(data) = &input.data else {
        return Ok(Vec::new());
    };
    let mut supertypes = Vec::new();
    for field in &data.fields {
        if !has_flag(&field.attrs, "extends")? {
            continue;
        }
        let Fields::Named(_) = &data.fields else {
            return Err(syn::Error::new_spanned(
                field,
                "`#[payload(extends)]` requires a named field",
            ));
        };
        if let Some(ident) = &field.ident {
            supertypes.push((ident.clone(), field.ty.clone()));
        }
    }
    Ok(supertypes)
}

/// Returns `true` if `attrs` contain `#[payload(flag)]`.
fn has_flag(attrs: &[Attribute], flag: &str) -> syn::Result<bool> {
    let mut found = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("payload")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("extends") || meta.path.is_ident("opaque") {
                found |= meta.path.is_ident(flag);
                Ok(())
            } else {
                Err(meta.error("unknown payload attribute, expected `extends` or `opaque`"))
            }
        })?;
    }
    Ok(found)
}
