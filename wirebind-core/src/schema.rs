//! Serializable type-description schema
//!
//! The code generator never inspects live Rust types. It works from a
//! [`Schema`]: a plain data description of every declaration and function
//! signature reachable from the registered procedures. A schema is produced
//! by an external analysis step (the `#[derive(Describe)]` and
//! `#[describe_fn]` macros, or any tool emitting the JSON form) and consumed
//! by `wirebind-codegen`.
//!
//! # Identity
//!
//! Declarations are keyed by their identity, the fully qualified Rust path of
//! the declared type (for example `demo_api::model::User`). Type nodes refer
//! to declarations through [`TypeNode::Named`], which keeps the description
//! finite for self-referential and mutually recursive types.
//!
//! # JSON form
//!
//! ```rust
//! use wirebind_core::{Schema, TypeNode, Primitive};
//!
//! let json = r#"{
//!     "functions": {
//!         "app::math::add": {
//!             "path": "app::math::add",
//!             "params": [
//!                 {"ty": {"kind": "primitive", "type": "i32"}},
//!                 {"ty": {"kind": "primitive", "type": "i32"}}
//!             ],
//!             "results": [{"kind": "primitive", "type": "i32"}]
//!         }
//!     },
//!     "param_names": {"app::math::add": ["a", "b"]}
//! }"#;
//!
//! let schema: Schema = serde_json::from_str(json).unwrap();
//! let add = schema.function("app::math::add").unwrap();
//! assert_eq!(add.params[0].ty, TypeNode::primitive(Primitive::I32));
//! ```

use crate::describe::Describe;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Primitive host types with a fixed wire representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    String,
    Char,
    Bool,
    /// The unit type `()`
    Unit,
}

impl Primitive {
    /// True for every integer and floating point width
    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            Primitive::String | Primitive::Char | Primitive::Bool | Primitive::Unit
        )
    }
}

/// A node in the described type universe
///
/// Wrappers (`Nullable`, `List`) nest arbitrarily. Composite and
/// interface-like types are referenced by identity through `Named`.
///
/// The `Request`, `Error` and `Handler` variants never describe data. They
/// mark the special positions of a function signature: the inbound request
/// consumed by a context extractor, a trailing error result, and the
/// handler-like type that middleware takes and returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeNode {
    /// A primitive value
    Primitive {
        #[serde(rename = "type")]
        primitive: Primitive,
    },
    /// A value that may be absent (`Option<T>`)
    Nullable { element: Box<TypeNode> },
    /// An ordered sequence (`Vec<T>`, slices, sets)
    List { element: Box<TypeNode> },
    /// A reference to a declaration in the schema
    Named { id: String },
    /// A type without a structured description (maps, `serde_json::Value`)
    Unknown,
    /// The inbound request
    Request,
    /// A trailing error result
    Error,
    /// The handler-like type used by middleware
    Handler,
}

impl TypeNode {
    /// Shorthand for `TypeNode::Primitive { primitive }`
    pub fn primitive(primitive: Primitive) -> Self {
        TypeNode::Primitive { primitive }
    }

    /// Wrap `element` in a nullable layer
    pub fn nullable(element: TypeNode) -> Self {
        TypeNode::Nullable {
            element: Box::new(element),
        }
    }

    /// Wrap `element` in a list layer
    pub fn list(element: TypeNode) -> Self {
        TypeNode::List {
            element: Box::new(element),
        }
    }

    /// Reference the declaration with identity `id`
    pub fn named(id: impl Into<String>) -> Self {
        TypeNode::Named { id: id.into() }
    }

    /// The element of a nullable or list node
    pub fn element(&self) -> Option<&TypeNode> {
        match self {
            TypeNode::Nullable { element } | TypeNode::List { element } => Some(element),
            _ => None,
        }
    }

    /// The node left after removing every nullable and list layer
    pub fn innermost(&self) -> &TypeNode {
        let mut node = self;
        while let Some(element) = node.element() {
            node = element;
        }
        node
    }

    /// True for the `Request`, `Error` and `Handler` markers
    pub fn is_marker(&self) -> bool {
        matches!(self, TypeNode::Request | TypeNode::Error | TypeNode::Handler)
    }
}

/// One field of a record declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name as declared
    pub name: String,
    /// Explicit wire tag, if the declaration renames the field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wire_name: Option<String>,
    /// Field type
    pub ty: TypeNode,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeNode) -> Self {
        Self {
            name: name.into(),
            wire_name: None,
            ty,
        }
    }

    /// Set an explicit wire tag
    pub fn with_wire_name(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = Some(wire_name.into());
        self
    }

    /// The name this field carries on the wire
    pub fn wire_name(&self) -> &str {
        self.wire_name.as_deref().unwrap_or(&self.name)
    }
}

/// Shape of a declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclShape {
    /// A composite type with ordered, named fields
    Record { fields: Vec<Field> },
    /// An opaque service type with no wire representation
    Interface,
    /// A type whose wire form is not described field by field: enums,
    /// newtypes and foreign types. It crosses the wire as `any` unless a
    /// custom type names its contract form.
    Value,
}

/// A named declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Declaring scope (the enclosing module), if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Local type name
    pub name: String,
    pub shape: DeclShape,
}

impl TypeDecl {
    /// A record declaration
    pub fn record(scope: Option<&str>, name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            scope: scope.map(str::to_string),
            name: name.into(),
            shape: DeclShape::Record { fields },
        }
    }

    /// An interface-like declaration
    pub fn interface(scope: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.map(str::to_string),
            name: name.into(),
            shape: DeclShape::Interface,
        }
    }

    /// A value declaration
    pub fn value(scope: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.map(str::to_string),
            name: name.into(),
            shape: DeclShape::Value,
        }
    }

    /// Fields of a record, `None` otherwise
    pub fn fields(&self) -> Option<&[Field]> {
        match &self.shape {
            DeclShape::Record { fields } => Some(fields),
            DeclShape::Interface | DeclShape::Value => None,
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self.shape, DeclShape::Record { .. })
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.shape, DeclShape::Interface)
    }
}

/// How a function takes a parameter
///
/// Only affects the expressions the dispatcher generator passes at the call
/// site; the wire representation is the same for every mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Passing {
    /// `T`
    #[default]
    Owned,
    /// `&T`
    Borrowed,
    /// `Arc<T>`
    Shared,
}

/// One function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub ty: TypeNode,
    #[serde(default)]
    pub passing: Passing,
}

impl Param {
    pub fn new(ty: TypeNode, passing: Passing) -> Self {
        Self { ty, passing }
    }

    pub fn owned(ty: TypeNode) -> Self {
        Self::new(ty, Passing::Owned)
    }
}

/// A described function signature
///
/// `results` lists the return shape: `()` is empty, `T` is `[T]`,
/// `Result<T, E>` is `[T, Error]` and a tuple lists its elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSig {
    /// Fully qualified path used to call the function
    pub path: String,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub results: Vec<TypeNode>,
}

impl FunctionSig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_async: false,
            params: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn result(mut self, ty: TypeNode) -> Self {
        self.results.push(ty);
        self
    }

    /// True when the last result is the error marker
    pub fn has_trailing_error(&self) -> bool {
        matches!(self.results.last(), Some(TypeNode::Error))
    }

    /// Middleware shape: takes one handler and returns one handler
    pub fn is_middleware(&self) -> bool {
        self.params.len() == 1
            && self.params[0].ty == TypeNode::Handler
            && self.results.len() == 1
            && self.results[0] == TypeNode::Handler
    }
}

/// A signature together with its recovered parameter names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub signature: FunctionSig,
    pub param_names: Vec<String>,
}

/// The described type universe consumed by the code generator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Declarations keyed by identity
    #[serde(default)]
    pub types: BTreeMap<String, TypeDecl>,
    /// Function signatures keyed by path
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionSig>,
    /// Recovered parameter names keyed by function path
    #[serde(default)]
    pub param_names: BTreeMap<String, Vec<String>>,
    /// Declarations currently being described (recursion guard)
    #[serde(skip)]
    in_progress: BTreeSet<String>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe `T`, registering every declaration it reaches
    pub fn describe<T: Describe + ?Sized>(&mut self) -> TypeNode {
        T::describe(self)
    }

    /// Start describing the declaration `id`
    ///
    /// Returns `false` when `id` is already described or being described, in
    /// which case the caller must only return a reference to it.
    pub fn begin_type(&mut self, id: &str) -> bool {
        if self.types.contains_key(id) || self.in_progress.contains(id) {
            return false;
        }
        self.in_progress.insert(id.to_string());
        true
    }

    /// Finish describing `id`
    pub fn define_type(&mut self, id: impl Into<String>, decl: TypeDecl) {
        let id = id.into();
        self.in_progress.remove(&id);
        self.types.insert(id, decl);
    }

    /// Reference the externally described type `id`
    ///
    /// Registers a value declaration named after the last path segment
    /// unless `id` is already declared, so a custom type can target it.
    pub fn custom_type(&mut self, id: &str) -> TypeNode {
        if !self.types.contains_key(id) {
            let name = id.rsplit("::").next().unwrap_or(id);
            self.types.insert(id.to_string(), TypeDecl::value(None, name));
        }
        TypeNode::named(id)
    }

    /// Register a function from its descriptor
    pub fn add_function<F>(&mut self, describe: F) -> &mut Self
    where
        F: FnOnce(&mut Schema) -> FunctionDescriptor,
    {
        let FunctionDescriptor {
            signature,
            param_names,
        } = describe(self);
        self.param_names.insert(signature.path.clone(), param_names);
        self.functions.insert(signature.path.clone(), signature);
        self
    }

    /// Register a signature without going through a descriptor
    pub fn insert_function(&mut self, signature: FunctionSig, param_names: Vec<String>) {
        self.param_names.insert(signature.path.clone(), param_names);
        self.functions.insert(signature.path.clone(), signature);
    }

    pub fn decl(&self, id: &str) -> Option<&TypeDecl> {
        self.types.get(id)
    }

    pub fn function(&self, path: &str) -> Option<&FunctionSig> {
        self.functions.get(path)
    }

    pub fn names_of(&self, path: &str) -> Option<&[String]> {
        self.param_names.get(path).map(Vec::as_slice)
    }
}
