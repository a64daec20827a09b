//! Procedural macros for wirebind
//!
//! Rust has no runtime reflection, so the description of an API is produced
//! at compile time. These macros generate the code that fills a
//! `wirebind::Schema`:
//!
//! - `#[derive(Describe)]` describes a struct's fields, registers enums as
//!   value declarations, or with `#[describe(opaque)]` registers the type as
//!   an opaque service
//! - `#[describe_fn]` keeps a function as written and adds a
//!   `<name>_descriptor` function recording its signature and parameter
//!   names
//!
//! Generated code refers to the `wirebind` facade crate by absolute path,
//! so the consuming crate must depend on it.
//!
//! # Example
//!
//! ```ignore
//! use wirebind::{describe_fn, Describe, Schema};
//!
//! #[derive(Describe, serde::Serialize, serde::Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! pub struct User {
//!     pub display_name: String,
//!     pub friends: Vec<User>,
//! }
//!
//! #[describe_fn]
//! pub async fn get_user(id: u64) -> Result<User, UserError> {
//!     // ...
//! }
//!
//! let mut schema = Schema::new();
//! schema.add_function(get_user_descriptor);
//! ```

mod describe;
mod signature;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, ItemFn};

/// Implement `wirebind::Describe` for a struct or enum
///
/// The declaration is registered under `module_path!()::Name` with the last
/// module segment as its scope. Field wire names follow the struct's serde
/// attributes:
///
/// - `#[serde(rename = "..")]` on a field
/// - `#[serde(rename_all = "..")]` on the struct
/// - `#[serde(skip)]` and `#[serde(skip_serializing)]` drop the field
///
/// `#[describe(custom = "path::Type")]` on a field describes its innermost
/// type as that identity instead of calling its `Describe` impl, keeping
/// `Option`, `Vec` and pointer layers. Map the identity with a custom type
/// at generation time.
///
/// A newtype struct describes as its single field. Enums, unit structs and
/// wider tuple structs register a value declaration: `any` on the wire
/// unless a custom type is given for them.
///
/// `#[describe(opaque)]` registers an interface declaration instead, for
/// services that are injected as dependencies and never cross the wire.
///
/// Generic types are rejected.
#[proc_macro_derive(Describe, attributes(describe, serde))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    describe::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Record a function's signature for the code generator
///
/// Adds `fn <name>_descriptor(&mut Schema) -> FunctionDescriptor` next to
/// the function, with the same visibility. Parameter passing is read from
/// the written types: `&T` is borrowed, `Arc<T>` is shared, anything else
/// is owned. The return type becomes the result list: nothing for `()`,
/// the value and an error marker for `Result<T, E>`, one entry per element
/// for a tuple, otherwise the single value.
///
/// Parameters must be plain identifiers; methods and generic functions are
/// rejected.
#[proc_macro_attribute]
pub fn describe_fn(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let attr = proc_macro2::TokenStream::from(attr);
        return syn::Error::new_spanned(attr, "#[describe_fn] takes no arguments")
            .into_compile_error()
            .into();
    }
    let function = parse_macro_input!(item as ItemFn);
    signature::expand(function)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
