//! `#[emit_business_event]`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    FnArg, GenericArgument, Ident, ImplItemFn, LitStr, PathArguments, ReturnType, Token, Type,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Arguments for the `#[emit_business_event]` macro.
pub(crate) struct EmitArgs {
    pub action: Option<String>,
    pub action_expression: Option<String>,
    pub skip_unwrap: bool,
}

impl Parse for EmitArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut action = None;
        let mut action_expression = None;
        let mut skip_unwrap = false;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;

            match ident.to_string().as_str() {
                "action" => {
                    input.parse::<Token![=]>()?;
                    let lit: LitStr = input.parse()?;
                    action = Some(lit.value());
                }
                "action_expression" => {
                    input.parse::<Token![=]>()?;
                    let lit: LitStr = input.parse()?;
                    action_expression = Some(lit.value());
                }
                "skip_unwrap" => {
                    skip_unwrap = true;
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(EmitArgs {
            action,
            action_expression,
            skip_unwrap,
        })
    }
}

/// Implementation of the `#[emit_business_event]` attribute macro.
pub fn emit_business_event_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as EmitArgs);
    let method = parse_macro_input!(item as ImplItemFn);
    match expand(args, method) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand(args: EmitArgs, method: ImplItemFn) -> syn::Result<proc_macro2::TokenStream> {
    let sig = &method.sig;
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "#[emit_business_event] does not support async methods",
        ));
    }

    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => {
            return Err(syn::Error::new_spanned(
                sig,
                "#[emit_business_event] methods must take `&self`",
            ));
        }
    }

    let ReturnType::Type(_, return_type) = &sig.output else {
        return Err(syn::Error::new_spanned(
            sig,
            "#[emit_business_event] methods must return a value; `()` cannot be published",
        ));
    };
    let value_type = result_value_type(return_type)?;

    let method_name = sig.ident.to_string();
    let parameters = sig.inputs.iter().filter_map(|input| match input {
        FnArg::Typed(pat_type) => {
            let ty = &pat_type.ty;
            Some(quote!(#ty).to_string())
        }
        FnArg::Receiver(_) => None,
    });

    let action = args.action.map(|action| quote!(.action(#action)));
    let action_expression = args
        .action_expression
        .map(|expression| quote!(.action_expression(#expression)));
    let skip_unwrap = args.skip_unwrap.then(|| quote!(.skip_unwrap(true)));

    let attrs = &method.attrs;
    let vis = &method.vis;
    let defaultness = &method.defaultness;
    let block = &method.block;

    Ok(quote! {
        #(#attrs)*
        #vis #defaultness #sig {
            let __herald_signature = ::herald::MethodSignature::new(
                ::std::any::type_name::<Self>(),
                #method_name,
            )
            #(.parameter(#parameters))*
            .returning::<#value_type>();
            let __herald_config = ::herald::EmitConfig::default()
                #action
                #action_expression
                #skip_unwrap;
            let __herald_proceed = || -> #return_type #block;
            match ::herald::EmitsBusinessEvents::business_event_emitter(self) {
                ::std::option::Option::Some(__herald_emitter) => __herald_emitter.around(
                    ::herald::JoinPoint::new(self, &__herald_signature, &__herald_config),
                    __herald_proceed,
                ),
                ::std::option::Option::None => __herald_proceed(),
            }
        }
    })
}

/// The `T` of a `Result<T, E>` return type. Rejects `()`.
fn result_value_type(return_type: &Type) -> syn::Result<&Type> {
    let error = || {
        syn::Error::new_spanned(
            return_type,
            "#[emit_business_event] methods must return `Result<T, E>` with `E: From<EmissionError>`",
        )
    };

    let Type::Path(path) = return_type else {
        return Err(error());
    };
    let segment = path.path.segments.last().ok_or_else(error)?;
    if segment.ident != "Result" {
        return Err(error());
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return Err(error());
    };
    let Some(GenericArgument::Type(value_type)) = arguments.args.first() else {
        return Err(error());
    };

    if matches!(value_type, Type::Tuple(tuple) if tuple.elems.is_empty()) {
        return Err(syn::Error::new_spanned(
            value_type,
            "#[emit_business_event] methods must return a value; `()` cannot be published",
        ));
    }
    Ok(value_type)
}
