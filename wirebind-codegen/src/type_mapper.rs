//! Type Mapper: one type node to one contract type
//!
//! | node | contract type |
//! |---|---|
//! | integers, floats | `number` |
//! | `String`, `char` | `string` |
//! | `bool` | `boolean` |
//! | `()` | `null` |
//! | `Option<T>` | `(T \| null)` |
//! | `Vec<T>` and friends | `T[]` |
//! | record | its qualified name |
//! | interface, unknown, markers | `any` |
//!
//! An entry in the override table replaces the structural mapping of a
//! declaration outright, and the declaration is not traversed.

use crate::error::{Error, Result};
use heck::ToUpperCamelCase;
use std::collections::BTreeMap;
use wirebind_core::{Primitive, Schema, TypeDecl, TypeNode};

pub(crate) const ANY: &str = "any";

/// Result of mapping one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapped {
    /// Contract type, wrappers applied
    pub wire: String,
    /// Identity of the record reached through any wrappers, for traversal
    pub composite: Option<String>,
}

impl Mapped {
    fn terminal(wire: impl Into<String>) -> Self {
        Self {
            wire: wire.into(),
            composite: None,
        }
    }

    fn wrap(self, wrapper: Wrapper) -> Self {
        Self {
            wire: wrapper.apply(&self.wire),
            composite: self.composite,
        }
    }
}

/// A nullable or list layer around a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapper {
    Nullable,
    List,
}

impl Wrapper {
    pub fn apply(self, inner: &str) -> String {
        match self {
            Wrapper::Nullable => format!("({inner} | null)"),
            Wrapper::List => format!("{inner}[]"),
        }
    }

    /// Apply `wrappers` innermost first
    pub fn apply_all(wrappers: &[Wrapper], inner: &str) -> String {
        wrappers
            .iter()
            .fold(inner.to_string(), |wire, wrapper| wrapper.apply(&wire))
    }
}

pub fn primitive_wire(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::String | Primitive::Char => "string",
        Primitive::Bool => "boolean",
        Primitive::Unit => "null",
        _ => "number",
    }
}

/// Contract name of a record
///
/// A declaration with a scope is named `PascalCase(scope) + name`; one
/// without is named after its discovery context, `prefix + name`.
pub fn qualified_name(decl: &TypeDecl, prefix: &str) -> String {
    match &decl.scope {
        Some(scope) => format!("{}{}", scope.to_upper_camel_case(), decl.name),
        None => format!("{prefix}{}", decl.name),
    }
}

pub struct TypeMapper<'a> {
    schema: &'a Schema,
    overrides: &'a BTreeMap<String, String>,
}

impl<'a> TypeMapper<'a> {
    pub fn new(schema: &'a Schema, overrides: &'a BTreeMap<String, String>) -> Self {
        Self { schema, overrides }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn is_overridden(&self, id: &str) -> bool {
        self.overrides.contains_key(id)
    }

    /// Map `node` discovered under `prefix`
    ///
    /// # Errors
    ///
    /// `Error::UnknownType` when a named reference has no declaration and no
    /// override.
    pub fn map(&self, node: &TypeNode, prefix: &str) -> Result<Mapped> {
        self.map_with(node, &|_, decl| qualified_name(decl, prefix))
    }

    /// Map `node`, naming records with `name_of(id, decl)`
    pub fn map_with(
        &self,
        node: &TypeNode,
        name_of: &dyn Fn(&str, &TypeDecl) -> String,
    ) -> Result<Mapped> {
        match node {
            TypeNode::Primitive { primitive } => Ok(Mapped::terminal(primitive_wire(*primitive))),
            TypeNode::Nullable { element } => {
                let mut inner = element.as_ref();
                while let TypeNode::Nullable { element } = inner {
                    inner = element;
                }
                Ok(self.map_with(inner, name_of)?.wrap(Wrapper::Nullable))
            }
            TypeNode::List { element } => Ok(self.map_with(element, name_of)?.wrap(Wrapper::List)),
            TypeNode::Named { id } => {
                if let Some(literal) = self.overrides.get(id) {
                    return Ok(Mapped::terminal(literal.clone()));
                }
                let decl = self
                    .schema
                    .decl(id)
                    .ok_or_else(|| Error::UnknownType(id.clone()))?;
                if !decl.is_record() {
                    return Ok(Mapped::terminal(ANY));
                }
                Ok(Mapped {
                    wire: name_of(id, decl),
                    composite: Some(id.clone()),
                })
            }
            TypeNode::Unknown | TypeNode::Request | TypeNode::Error | TypeNode::Handler => {
                Ok(Mapped::terminal(ANY))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirebind_core::Field;

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema.define_type(
            "app::model::User",
            TypeDecl::record(
                Some("model"),
                "User",
                vec![Field::new("id", TypeNode::primitive(Primitive::U64))],
            ),
        );
        schema.define_type("app::store::Db", TypeDecl::interface(Some("store"), "Db"));
        schema.define_type("app::Stamp", TypeDecl::record(None, "Stamp", vec![]));
        schema.define_type("app::model::Role", TypeDecl::value(Some("model"), "Role"));
        schema
    }

    fn int() -> TypeNode {
        TypeNode::primitive(Primitive::I32)
    }

    #[test]
    fn test_primitives() {
        let schema = schema();
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);
        let wire = |p| mapper.map(&TypeNode::primitive(p), "").unwrap().wire;

        assert_eq!(wire(Primitive::U8), "number");
        assert_eq!(wire(Primitive::F64), "number");
        assert_eq!(wire(Primitive::Char), "string");
        assert_eq!(wire(Primitive::Bool), "boolean");
        assert_eq!(wire(Primitive::Unit), "null");
    }

    #[test]
    fn test_wrapper_order_is_preserved() {
        let schema = schema();
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);

        let nullable_list = TypeNode::nullable(TypeNode::list(int()));
        let list_of_nullable = TypeNode::list(TypeNode::nullable(int()));
        let nested = TypeNode::list(TypeNode::list(int()));

        assert_eq!(mapper.map(&nullable_list, "").unwrap().wire, "(number[] | null)");
        assert_eq!(mapper.map(&list_of_nullable, "").unwrap().wire, "(number | null)[]");
        assert_eq!(mapper.map(&nested, "").unwrap().wire, "number[][]");
    }

    #[test]
    fn test_nested_nullables_collapse() {
        let schema = schema();
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);

        let node = TypeNode::nullable(TypeNode::nullable(TypeNode::nullable(int())));
        assert_eq!(mapper.map(&node, "").unwrap().wire, "(number | null)");
    }

    #[test]
    fn test_record_reference() {
        let schema = schema();
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);

        let mapped = mapper
            .map(&TypeNode::list(TypeNode::named("app::model::User")), "Ignored")
            .unwrap();
        assert_eq!(mapped.wire, "ModelUser[]");
        assert_eq!(mapped.composite.as_deref(), Some("app::model::User"));
    }

    #[test]
    fn test_unscoped_record_uses_prefix() {
        let schema = schema();
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);

        let mapped = mapper.map(&TypeNode::named("app::Stamp"), "UserCreate").unwrap();
        assert_eq!(mapped.wire, "UserCreateStamp");
    }

    #[test]
    fn test_interface_and_unknown_are_any() {
        let schema = schema();
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);

        let db = mapper.map(&TypeNode::named("app::store::Db"), "").unwrap();
        assert_eq!(db.wire, "any");
        assert_eq!(db.composite, None);
        assert_eq!(mapper.map(&TypeNode::Unknown, "").unwrap().wire, "any");
    }

    #[test]
    fn test_value_declaration() {
        let schema = schema();
        let mut overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);
        let role = TypeNode::list(TypeNode::named("app::model::Role"));
        assert_eq!(mapper.map(&role, "").unwrap().wire, "any[]");

        overrides.insert("app::model::Role".to_string(), "RoleName".to_string());
        let mapper = TypeMapper::new(&schema, &overrides);
        assert_eq!(mapper.map(&role, "").unwrap().wire, "RoleName[]");
    }

    #[test]
    fn test_override_wins_and_is_terminal() {
        let schema = schema();
        let mut overrides = BTreeMap::new();
        overrides.insert("app::model::User".to_string(), "UserRef".to_string());
        overrides.insert("chrono::DateTime".to_string(), "string".to_string());
        let mapper = TypeMapper::new(&schema, &overrides);

        let user = mapper
            .map(&TypeNode::nullable(TypeNode::named("app::model::User")), "")
            .unwrap();
        assert_eq!(user.wire, "(UserRef | null)");
        assert_eq!(user.composite, None);

        // Overrides need no declaration
        let stamp = mapper.map(&TypeNode::named("chrono::DateTime"), "").unwrap();
        assert_eq!(stamp.wire, "string");
    }

    #[test]
    fn test_missing_declaration_is_fatal() {
        let schema = schema();
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);

        let err = mapper.map(&TypeNode::named("app::Missing"), "").unwrap_err();
        assert!(matches!(err, Error::UnknownType(id) if id == "app::Missing"));
    }
}
