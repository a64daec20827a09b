//! Type Graph Walker: emits each reachable record definition once
//!
//! Walking a node:
//!
//! 1. strip and record its nullable and list layers
//! 2. anything that is not a record goes to the mapper, re-wrapped
//! 3. a record already emitted under its qualified name yields only a
//!    reference
//! 4. otherwise the record is marked emitted, its fields are rendered in
//!    declaration order and its definition appended
//! 5. the records its fields reach are walked with this record's name as
//!    their discovery prefix
//!
//! Marking before descending is what makes self-referential and mutually
//! recursive records terminate.
//!
//! A record's contract name is fixed the first time it is reached. Records
//! without a scope are named after that first discovery context and keep the
//! name wherever else they appear.

use crate::code_writer::CodeWriter;
use crate::error::{Error, Result};
use crate::type_mapper::{qualified_name, Mapped, TypeMapper, Wrapper};
use std::collections::BTreeMap;
use wirebind_core::{Schema, TypeNode};

pub struct TypeWalker<'a> {
    mapper: TypeMapper<'a>,
    /// Declaration identity to its fixed contract name
    assigned: BTreeMap<String, String>,
    /// Contract name to the declaration emitted under it
    emitted: BTreeMap<String, String>,
    definitions: Vec<String>,
}

impl<'a> TypeWalker<'a> {
    pub fn new(mapper: TypeMapper<'a>) -> Self {
        Self {
            mapper,
            assigned: BTreeMap::new(),
            emitted: BTreeMap::new(),
            definitions: Vec::new(),
        }
    }

    pub fn schema(&self) -> &'a Schema {
        self.mapper.schema()
    }

    pub fn mapper(&self) -> &TypeMapper<'a> {
        &self.mapper
    }

    /// Definitions emitted so far, in walk order
    pub fn definitions(&self) -> &[String] {
        &self.definitions
    }

    /// Walk `node` discovered under `prefix` and return its contract type
    pub fn walk(&mut self, node: &TypeNode, prefix: &str) -> Result<String> {
        let mut wrappers = Vec::new();
        let mut inner = node;
        loop {
            match inner {
                TypeNode::Nullable { element } => {
                    if wrappers.last() != Some(&Wrapper::Nullable) {
                        wrappers.push(Wrapper::Nullable);
                    }
                    inner = element;
                }
                TypeNode::List { element } => {
                    wrappers.push(Wrapper::List);
                    inner = element;
                }
                _ => break,
            }
        }
        wrappers.reverse();

        let mapped = self.map(inner, prefix)?;
        let reference = Wrapper::apply_all(&wrappers, &mapped.wire);
        let Some(id) = mapped.composite else {
            return Ok(reference);
        };

        let name = mapped.wire;
        match self.emitted.get(&name) {
            Some(existing) if *existing == id => return Ok(reference),
            Some(existing) => {
                return Err(Error::NameCollision {
                    name,
                    first: existing.clone(),
                    second: id,
                })
            }
            None => {}
        }
        self.emitted.insert(name.clone(), id.clone());
        self.assigned.insert(id.clone(), name.clone());
        tracing::debug!(id = %id, name = %name, "Emitting contract type");

        let schema = self.mapper.schema();
        let fields = schema
            .decl(&id)
            .and_then(|decl| decl.fields())
            .ok_or_else(|| Error::UnknownType(id.clone()))?;

        let mut children = Vec::new();
        let mut lines = Vec::with_capacity(fields.len());
        for field in fields {
            let mapped = self.map(&field.ty, &name)?;
            if let Some(child) = mapped.composite {
                if !self.assigned.contains_key(&child) {
                    let child_name = self.map(&TypeNode::named(child.clone()), &name)?.wire;
                    self.assigned.insert(child.clone(), child_name);
                }
                children.push(child);
            }
            lines.push(format!("{}: {};", property_key(field.wire_name()), mapped.wire));
        }

        let mut w = CodeWriter::with_indent("  ");
        w.block_with(&format!("export type {name} ="), "};", |w| {
            lines.iter().try_for_each(|line| w.line(line))
        })?;
        self.definitions.push(w.finish());

        for child in children {
            self.walk(&TypeNode::named(child), &name)?;
        }
        Ok(reference)
    }

    /// Map through the mapper, honouring names already fixed
    fn map(&self, node: &TypeNode, prefix: &str) -> Result<Mapped> {
        let assigned = &self.assigned;
        self.mapper.map_with(node, &|id, decl| {
            assigned
                .get(id)
                .cloned()
                .unwrap_or_else(|| qualified_name(decl, prefix))
        })
    }
}

/// Quote a property name that is not a plain identifier
pub(crate) fn property_key(name: &str) -> String {
    let mut chars = name.chars();
    let is_ident = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };
    if is_ident {
        name.to_string()
    } else {
        format!("{name:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirebind_core::{Field, Primitive, TypeDecl};

    fn string() -> TypeNode {
        TypeNode::primitive(Primitive::String)
    }

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema.define_type(
            "app::model::User",
            TypeDecl::record(
                Some("model"),
                "User",
                vec![
                    Field::new("name", string()),
                    Field::new("email_address", string()).with_wire_name("emailAddress"),
                    Field::new("address", TypeNode::nullable(TypeNode::named("app::model::Address"))),
                    Field::new("friends", TypeNode::list(TypeNode::named("app::model::User"))),
                ],
            ),
        );
        schema.define_type(
            "app::model::Address",
            TypeDecl::record(Some("model"), "Address", vec![Field::new("city", string())]),
        );
        schema.define_type("app::model::Empty", TypeDecl::record(Some("model"), "Empty", vec![]));
        schema.define_type(
            "app::Tree",
            TypeDecl::record(
                None,
                "Tree",
                vec![Field::new("children", TypeNode::list(TypeNode::named("app::Tree")))],
            ),
        );
        schema.define_type(
            "other::model::Address",
            TypeDecl::record(Some("model"), "Address", vec![]),
        );
        schema
    }

    fn walk_all(schema: &Schema, nodes: &[TypeNode]) -> Result<(Vec<String>, Vec<String>)> {
        let overrides = BTreeMap::new();
        let mut walker = TypeWalker::new(TypeMapper::new(schema, &overrides));
        let refs = nodes
            .iter()
            .map(|node| walker.walk(node, "Root"))
            .collect::<Result<Vec<_>>>()?;
        Ok((refs, walker.definitions().to_vec()))
    }

    #[test]
    fn test_definition_text() {
        let schema = schema();
        let (refs, defs) = walk_all(&schema, &[TypeNode::named("app::model::User")]).unwrap();

        assert_eq!(refs, vec!["ModelUser"]);
        assert_eq!(defs.len(), 2);
        assert_eq!(
            defs[0],
            "export type ModelUser = {\n  name: string;\n  emailAddress: string;\n  \
             address: (ModelAddress | null);\n  friends: ModelUser[];\n};\n"
        );
        assert_eq!(defs[1], "export type ModelAddress = {\n  city: string;\n};\n");
    }

    #[test]
    fn test_each_record_emitted_once() {
        let schema = schema();
        let nodes = [
            TypeNode::named("app::model::Address"),
            TypeNode::list(TypeNode::named("app::model::User")),
            TypeNode::nullable(TypeNode::named("app::model::Address")),
        ];
        let (refs, defs) = walk_all(&schema, &nodes).unwrap();

        assert_eq!(refs, vec!["ModelAddress", "ModelUser[]", "(ModelAddress | null)"]);
        let address_defs = defs
            .iter()
            .filter(|d| d.starts_with("export type ModelAddress "))
            .count();
        assert_eq!(address_defs, 1);
        assert_eq!(defs.len(), 2);
    }

    #[test]
    fn test_self_reference_terminates() {
        let schema = schema();
        let (refs, defs) = walk_all(&schema, &[TypeNode::named("app::Tree")]).unwrap();

        assert_eq!(refs, vec!["RootTree"]);
        assert_eq!(defs, vec!["export type RootTree = {\n  children: RootTree[];\n};\n"]);
    }

    #[test]
    fn test_empty_record_has_empty_body() {
        let schema = schema();
        let (_, defs) = walk_all(&schema, &[TypeNode::named("app::model::Empty")]).unwrap();
        assert_eq!(defs, vec!["export type ModelEmpty = {\n};\n"]);
    }

    #[test]
    fn test_wrappers_reapplied_to_reference() {
        let schema = schema();
        let node = TypeNode::nullable(TypeNode::list(TypeNode::nullable(TypeNode::named(
            "app::model::Address",
        ))));
        let (refs, _) = walk_all(&schema, &[node]).unwrap();
        assert_eq!(refs, vec!["((ModelAddress | null)[] | null)"]);
    }

    #[test]
    fn test_qualified_name_collision() {
        let schema = schema();
        let nodes = [
            TypeNode::named("app::model::Address"),
            TypeNode::named("other::model::Address"),
        ];
        let err = walk_all(&schema, &nodes).unwrap_err();
        assert!(matches!(err, Error::NameCollision { name, .. } if name == "ModelAddress"));
    }

    #[test]
    fn test_property_key_quoting() {
        assert_eq!(property_key("emailAddress"), "emailAddress");
        assert_eq!(property_key("_id"), "_id");
        assert_eq!(property_key("first-name"), "\"first-name\"");
        assert_eq!(property_key("2fa"), "\"2fa\"");
    }
}
