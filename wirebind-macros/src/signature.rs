//! `#[describe_fn]`

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{FnArg, GenericArgument, GenericParam, ItemFn, Pat, PathArguments, ReturnType, Type};

pub fn expand(function: ItemFn) -> syn::Result<TokenStream> {
    let sig = &function.sig;
    if let Some(param) = sig
        .generics
        .params
        .iter()
        .find(|p| !matches!(p, GenericParam::Lifetime(_)))
    {
        return Err(syn::Error::new_spanned(param, "generic functions cannot be described"));
    }

    let mut params = Vec::new();
    let mut names = Vec::new();
    for input in &sig.inputs {
        let typed = match input {
            FnArg::Typed(typed) => typed,
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new_spanned(
                    receiver,
                    "methods cannot be described; use a free function",
                ))
            }
        };
        let Pat::Ident(pat) = typed.pat.as_ref() else {
            return Err(syn::Error::new_spanned(
                &typed.pat,
                "parameters must be plain identifiers",
            ));
        };
        names.push(pat.ident.unraw().to_string());
        params.push(param_tokens(&typed.ty)?);
    }

    let results = result_tokens(&sig.output);
    let ident = &sig.ident;
    let name = ident.unraw().to_string();
    // Keep `r#` so the recorded path stays callable
    let path_name = ident.to_string();
    let descriptor = format_ident!("{}_descriptor", name);
    let vis = &function.vis;
    let is_async = sig.asyncness.is_some();
    let doc = format!(" Schema entry for [`{name}`]");

    Ok(quote! {
        #function

        #[doc = #doc]
        #vis fn #descriptor(schema: &mut ::wirebind::Schema) -> ::wirebind::FunctionDescriptor {
            let signature = ::wirebind::FunctionSig::new(::std::concat!(::std::module_path!(), "::", #path_name))
                .with_async(#is_async)
                #(.param(#params))*
                #(.result(#results))*;
            ::wirebind::FunctionDescriptor {
                signature,
                param_names: ::std::vec![#(::std::string::String::from(#names)),*],
            }
        }
    })
}

fn describe(ty: &Type) -> TokenStream {
    quote! { <#ty as ::wirebind::Describe>::describe(schema) }
}

fn param_tokens(ty: &Type) -> syn::Result<TokenStream> {
    let (passing, inner) = match ty {
        Type::Reference(reference) if reference.mutability.is_some() => {
            return Err(syn::Error::new_spanned(ty, "`&mut` parameters cannot be described"))
        }
        Type::Reference(reference) => (quote!(Borrowed), reference.elem.as_ref()),
        Type::ImplTrait(_) => {
            return Err(syn::Error::new_spanned(ty, "`impl Trait` parameters cannot be described"))
        }
        _ => match single_generic(ty, "Arc") {
            Some(inner) => (quote!(Shared), inner),
            None => (quote!(Owned), ty),
        },
    };
    let node = describe(inner);
    Ok(quote! { ::wirebind::Param::new(#node, ::wirebind::Passing::#passing) })
}

fn result_tokens(output: &ReturnType) -> Vec<TokenStream> {
    let ty = match output {
        ReturnType::Default => return Vec::new(),
        ReturnType::Type(_, ty) => ty.as_ref(),
    };
    match ty {
        Type::Tuple(tuple) => tuple.elems.iter().map(describe).collect(),
        Type::Paren(paren) => result_tokens(&ReturnType::Type(Default::default(), paren.elem.clone())),
        _ => match first_generic(ty, "Result") {
            Some(value) => vec![describe(value), quote! { ::wirebind::TypeNode::Error }],
            None => vec![describe(ty)],
        },
    }
}

/// The type arguments of `ty` when its last path segment is `name`
fn generics<'a>(ty: &'a Type, name: &str) -> Option<Vec<&'a Type>> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != name {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    Some(
        args.args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
    )
}

fn single_generic<'a>(ty: &'a Type, name: &str) -> Option<&'a Type> {
    match generics(ty, name)?.as_slice() {
        [inner] => Some(*inner),
        _ => None,
    }
}

/// `T` of `Result<T, E>`, and of single-argument aliases such as
/// `io::Result<T>`
fn first_generic<'a>(ty: &'a Type, name: &str) -> Option<&'a Type> {
    generics(ty, name)?.first().copied()
}
