//! `#[derive(Describe)]`
//!
//! For a record the expansion is roughly:
//!
//! ```ignore
//! impl ::wirebind::Describe for User {
//!     fn describe(schema: &mut ::wirebind::Schema) -> ::wirebind::TypeNode {
//!         let id = concat!(module_path!(), "::", "User");
//!         if schema.begin_type(id) {
//!             let fields = vec![
//!                 ::wirebind::Field::new("display_name", <String as ::wirebind::Describe>::describe(schema))
//!                     .with_wire_name("displayName"),
//!             ];
//!             schema.define_type(id, ::wirebind::TypeDecl::record(scope, "User", fields));
//!         }
//!         ::wirebind::TypeNode::named(id)
//!     }
//! }
//! ```
//!
//! `begin_type` returns false for a declaration already described or in
//! progress, which is what stops recursive types.
//!
//! Other shapes:
//!
//! - a newtype `struct UserId(u64)` describes exactly like its field, as
//!   serde encodes it
//! - enums, unit structs and wider tuple structs become value declarations,
//!   sent as `any` unless a custom type maps their identity
//! - `#[describe(opaque)]` makes an interface declaration, for services that
//!   never cross the wire

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToUpperCamelCase,
};
use proc_macro2::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::punctuated::Punctuated;
use syn::{
    Attribute, Data, DeriveInput, Fields, GenericArgument, LitStr, PathArguments, Token, Type,
};

pub fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "generic types cannot be described",
        ));
    }

    let options = ContainerOptions::parse(&input.attrs)?;
    let ident = &input.ident;
    let name = ident.to_string();

    let decl = match shape(&input, &options) {
        Shape::Interface => quote! { ::wirebind::TypeDecl::interface(scope, #name) },
        Shape::Value => quote! { ::wirebind::TypeDecl::value(scope, #name) },
        Shape::Newtype(ty) => {
            return Ok(quote! {
                impl ::wirebind::Describe for #ident {
                    fn describe(schema: &mut ::wirebind::Schema) -> ::wirebind::TypeNode {
                        <#ty as ::wirebind::Describe>::describe(schema)
                    }
                }
            })
        }
        Shape::Record(fields) => {
            let fields = record_fields(fields, &options)?;
            quote! {{
                let fields = ::std::vec![#(#fields),*];
                ::wirebind::TypeDecl::record(scope, #name, fields)
            }}
        }
    };

    Ok(quote! {
        impl ::wirebind::Describe for #ident {
            fn describe(schema: &mut ::wirebind::Schema) -> ::wirebind::TypeNode {
                let id = ::std::concat!(::std::module_path!(), "::", #name);
                if schema.begin_type(id) {
                    let scope = ::std::module_path!().rsplit("::").next();
                    let decl = #decl;
                    schema.define_type(id, decl);
                }
                ::wirebind::TypeNode::named(id)
            }
        }
    })
}

enum Shape<'a> {
    Record(&'a Punctuated<syn::Field, Token![,]>),
    Newtype(&'a Type),
    Value,
    Interface,
}

fn shape<'a>(input: &'a DeriveInput, options: &ContainerOptions) -> Shape<'a> {
    if options.opaque {
        return Shape::Interface;
    }
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => Shape::Record(&named.named),
            Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                Shape::Newtype(&unnamed.unnamed[0].ty)
            }
            _ => Shape::Value,
        },
        Data::Enum(_) | Data::Union(_) => Shape::Value,
    }
}

fn record_fields(
    fields: &Punctuated<syn::Field, Token![,]>,
    options: &ContainerOptions,
) -> syn::Result<Vec<TokenStream>> {
    let mut out = Vec::new();
    for field in fields {
        let field_options = FieldOptions::parse(&field.attrs)?;
        if field_options.skip {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };
        let name = syn::ext::IdentExt::unraw(ident).to_string();
        let wire_name = field_options
            .rename
            .or_else(|| options.rename_all.as_ref().map(|rule| rule.apply(&name)));
        let node = match &field_options.custom {
            Some(id) => custom_node(&field.ty, id),
            None => {
                let ty = &field.ty;
                quote! { <#ty as ::wirebind::Describe>::describe(schema) }
            }
        };
        let mut tokens = quote! {
            ::wirebind::Field::new(#name, #node)
        };
        if let Some(wire_name) = wire_name.filter(|w| *w != name) {
            tokens = quote! { #tokens.with_wire_name(#wire_name) };
        }
        out.push(tokens);
    }
    Ok(out)
}

/// `Option`, sequence and pointer layers of `ty` around the custom type `id`
///
/// Only the innermost type is replaced, so `Option<Vec<Uuid>>` with
/// `custom = "uuid::Uuid"` stays a nullable list.
fn custom_node(ty: &Type, id: &LitStr) -> TokenStream {
    let Type::Path(path) = ty else {
        return quote! { schema.custom_type(#id) };
    };
    let Some(segment) = path.path.segments.last() else {
        return quote! { schema.custom_type(#id) };
    };
    let inner = match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    };
    let Some(inner) = inner else {
        return quote! { schema.custom_type(#id) };
    };
    let node = custom_node(inner, id);
    match segment.ident.to_string().as_str() {
        "Option" => quote! { ::wirebind::TypeNode::nullable(#node) },
        "Vec" | "VecDeque" | "BTreeSet" | "HashSet" => quote! { ::wirebind::TypeNode::list(#node) },
        "Box" | "Arc" | "Rc" => node,
        _ => quote! { schema.custom_type(#id) },
    }
}

/// serde's `rename_all` rules
#[derive(Debug, Clone, Copy)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn parse(rule: &LitStr) -> syn::Result<Self> {
        Ok(match rule.value().as_str() {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "PascalCase" => RenameRule::Pascal,
            "camelCase" => RenameRule::Camel,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "kebab-case" => RenameRule::Kebab,
            "SCREAMING-KEBAB-CASE" => RenameRule::ScreamingKebab,
            other => {
                return Err(syn::Error::new_spanned(
                    rule,
                    format!("unknown rename rule `{other}`"),
                ))
            }
        })
    }

    fn apply(self, field: &str) -> String {
        match self {
            RenameRule::Lower => field.to_ascii_lowercase(),
            RenameRule::Upper => field.to_ascii_uppercase(),
            RenameRule::Pascal => field.to_upper_camel_case(),
            RenameRule::Camel => field.to_lower_camel_case(),
            RenameRule::Snake => field.to_snake_case(),
            RenameRule::ScreamingSnake => field.to_shouty_snake_case(),
            RenameRule::Kebab => field.to_kebab_case(),
            RenameRule::ScreamingKebab => field.to_shouty_kebab_case(),
        }
    }
}

#[derive(Default)]
struct ContainerOptions {
    opaque: bool,
    rename_all: Option<RenameRule>,
}

impl ContainerOptions {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut options = Self::default();
        for attr in attrs {
            if attr.path().is_ident("describe") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("opaque") {
                        options.opaque = true;
                        Ok(())
                    } else {
                        Err(meta.error("unknown describe option"))
                    }
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename_all") {
                        options.rename_all = Some(RenameRule::parse(&serialize_name(&meta)?)?);
                        Ok(())
                    } else {
                        skip_meta(&meta)
                    }
                })?;
            }
        }
        Ok(options)
    }
}

#[derive(Default)]
struct FieldOptions {
    rename: Option<String>,
    skip: bool,
    /// Identity the field's innermost type is described as
    custom: Option<LitStr>,
}

impl FieldOptions {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut options = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("describe")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("custom") {
                    options.custom = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("unknown describe field option"))
                }
            })?;
        }
        for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    options.rename = Some(serialize_name(&meta)?.value());
                    Ok(())
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    options.skip = true;
                    Ok(())
                } else if meta.path.is_ident("flatten") {
                    Err(meta.error("flattened fields cannot be described"))
                } else {
                    skip_meta(&meta)
                }
            })?;
        }
        Ok(options)
    }
}

/// Value of `name = ".."` or the `serialize` half of `name(serialize = "..")`
fn serialize_name(meta: &ParseNestedMeta) -> syn::Result<LitStr> {
    if meta.input.peek(Token![=]) {
        return meta.value()?.parse();
    }
    let mut name = None;
    meta.parse_nested_meta(|inner| {
        let value: LitStr = inner.value()?.parse()?;
        if inner.path.is_ident("serialize") {
            name = Some(value);
        }
        Ok(())
    })?;
    name.ok_or_else(|| meta.error("expected a serialize name"))
}

/// Consume a serde option this macro does not care about
fn skip_meta(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta(&inner))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(src: &str) -> syn::Result<String> {
        let input: DeriveInput = syn::parse_str(src)?;
        expand(input).map(|tokens| tokens.to_string())
    }

    #[test]
    fn test_rename_rules() {
        assert_eq!(RenameRule::Camel.apply("display_name"), "displayName");
        assert_eq!(RenameRule::Pascal.apply("display_name"), "DisplayName");
        assert_eq!(RenameRule::ScreamingSnake.apply("display_name"), "DISPLAY_NAME");
        assert_eq!(RenameRule::Kebab.apply("display_name"), "display-name");
        assert_eq!(RenameRule::Lower.apply("display_name"), "display_name");
    }

    #[test]
    fn test_record_expansion() {
        let out = expand_str(
            r#"
            #[serde(rename_all = "camelCase", deny_unknown_fields)]
            struct User {
                display_name: String,
                #[serde(rename = "mail")]
                email: String,
                #[serde(skip)]
                cache: u8,
                #[serde(default, skip_serializing_if = "Option::is_none")]
                age: Option<u8>,
            }
            "#,
        )
        .unwrap();
        assert!(out.contains("with_wire_name (\"displayName\")"));
        assert!(out.contains("with_wire_name (\"mail\")"));
        assert!(!out.contains("\"cache\""));
        assert!(out.contains("\"age\""));
        assert!(out.contains("TypeDecl :: record"));
    }

    #[test]
    fn test_opaque_expansion() {
        let out = expand_str("#[describe(opaque)] enum Store { A, B }").unwrap();
        assert!(out.contains("TypeDecl :: interface (scope , \"Store\")"));
    }

    #[test]
    fn test_enums_and_tuples_are_values() {
        let out = expand_str("#[serde(rename_all = \"lowercase\")] enum Role { Admin, Member }").unwrap();
        assert!(out.contains("TypeDecl :: value (scope , \"Role\")"));

        let pair = expand_str("struct Pair(u8, u8);").unwrap();
        assert!(pair.contains("TypeDecl :: value (scope , \"Pair\")"));
        let unit = expand_str("struct Marker;").unwrap();
        assert!(unit.contains("TypeDecl :: value"));
    }

    #[test]
    fn test_newtype_is_transparent() {
        let out = expand_str("struct UserId(u64);").unwrap();
        assert!(out.contains("< u64 as :: wirebind :: Describe > :: describe (schema)"));
        assert!(!out.contains("begin_type"));
    }

    #[test]
    fn test_custom_field() {
        let out = expand_str(
            r#"
            struct Event {
                #[describe(custom = "chrono::DateTime")]
                at: DateTime<Utc>,
                #[describe(custom = "uuid::Uuid")]
                seen_by: Option<Vec<Uuid>>,
            }
            "#,
        )
        .unwrap();
        assert!(out.contains("Field :: new (\"at\" , schema . custom_type (\"chrono::DateTime\"))"));
        assert!(out.contains(
            "TypeNode :: nullable (:: wirebind :: TypeNode :: list (schema . custom_type (\"uuid::Uuid\")))"
        ));
        assert!(!out.contains("< DateTime < Utc >"));
    }

    #[test]
    fn test_rejections() {
        assert!(expand_str("struct W<T> { t: T }").is_err());
        assert!(expand_str("struct S { #[describe(rename = \"x\")] a: u8 }").is_err());
        assert!(expand_str("#[serde(rename_all = \"Title Case\")] struct S { a: u8 }").is_err());
        assert!(expand_str("struct S { #[serde(flatten)] a: u8 }").is_err());
    }
}
