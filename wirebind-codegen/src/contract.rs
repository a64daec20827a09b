//! Contract Emitter
//!
//! Collects one signature per method and every record definition the walker
//! reaches from wire arguments and return values, then renders them as a
//! TypeScript module:
//!
//! ```text
//! export type ModelUser = {
//!   name: string;
//! };
//!
//! export type WirebindContract = {
//!   "user.get": (id: number) => Promise<ModelUser>;
//! };
//! ```
//!
//! Contexts and dependencies never appear in the contract.

use crate::code_writer::CodeWriter;
use crate::cw_line;
use crate::dispatcher::HEADER;
use crate::error::Result;
use crate::procedure::{contract_prefix, Procedure};
use crate::type_mapper::TypeMapper;
use crate::walker::{property_key, TypeWalker};
use std::collections::BTreeMap;

pub struct ContractEmitter<'a> {
    walker: TypeWalker<'a>,
    /// Method name to rendered signature
    methods: BTreeMap<String, String>,
}

impl<'a> ContractEmitter<'a> {
    pub fn new(mapper: TypeMapper<'a>) -> Self {
        Self {
            walker: TypeWalker::new(mapper),
            methods: BTreeMap::new(),
        }
    }

    /// Add a procedure's signature, walking its argument types then its
    /// return type
    pub fn add(&mut self, procedure: &Procedure) -> Result<()> {
        let prefix = contract_prefix(&procedure.method);
        let mut args = Vec::new();
        for param in procedure.wire_params() {
            let wire = self.walker.walk(&param.ty, &prefix)?;
            let name = param.name.trim_start_matches("r#");
            args.push(format!("{name}: {wire}"));
        }
        let returns = match procedure.output.value() {
            Some(ty) => self.walker.walk(ty, &prefix)?,
            None => "null".to_string(),
        };

        let signature = format!("({}) => Promise<{returns}>", args.join(", "));
        tracing::debug!(method = %procedure.method, signature = %signature, "Contract entry");
        self.methods.insert(procedure.method.clone(), signature);
        Ok(())
    }

    pub fn definitions(&self) -> &[String] {
        self.walker.definitions()
    }

    /// Render the definitions followed by the `contract_name` method table
    pub fn render(&self, contract_name: &str) -> Result<String> {
        let mut out = String::new();
        out.push_str(HEADER);
        out.push_str("\n\n");
        for definition in self.walker.definitions() {
            out.push_str(definition);
            out.push('\n');
        }

        let mut w = CodeWriter::with_indent("  ");
        w.block_with(&format!("export type {contract_name} ="), "};", |w| {
            self.methods
                .iter()
                .try_for_each(|(method, signature)| cw_line!(w, "{}: {signature};", property_key(method)))
        })?;
        out.push_str(&w.finish());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Registry;
    use crate::procedure::plan;
    use wirebind_core::{Field, FunctionSig, Param, Passing, Primitive, Schema, TypeDecl, TypeNode};

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema.define_type(
            "app::model::User",
            TypeDecl::record(
                Some("model"),
                "User",
                vec![
                    Field::new("name", TypeNode::primitive(Primitive::String)),
                    Field::new("meta", TypeNode::named("app::Meta")),
                ],
            ),
        );
        schema.define_type(
            "app::Meta",
            TypeDecl::record(None, "Meta", vec![Field::new("tags", TypeNode::list(TypeNode::primitive(Primitive::String)))]),
        );
        schema.define_type("app::Db", TypeDecl::interface(Some("app"), "Db"));
        schema.insert_function(
            FunctionSig::new("app::user::create")
                .param(Param::new(TypeNode::named("app::Db"), Passing::Shared))
                .param(Param::owned(TypeNode::named("app::model::User")))
                .param(Param::owned(TypeNode::nullable(TypeNode::primitive(Primitive::Bool))))
                .result(TypeNode::list(TypeNode::named("app::model::User")))
                .result(TypeNode::Error),
            vec!["db".into(), "user".into(), "r#override".into()],
        );
        schema.insert_function(FunctionSig::new("app::ping"), vec![]);
        schema
    }

    fn emit(methods: &[(&str, &str)]) -> String {
        let schema = schema();
        let mut registry = Registry::new();
        registry.add_dependency(&schema, "app::Db").unwrap();
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);
        let mut emitter = ContractEmitter::new(TypeMapper::new(&schema, &overrides));
        for (method, path) in methods {
            let procedure = plan(method, &[path.to_string()], &registry, &mapper).unwrap();
            emitter.add(&procedure).unwrap();
        }
        emitter.render("WirebindContract").unwrap()
    }

    #[test]
    fn test_full_contract() {
        let out = emit(&[("user.create", "app::user::create"), ("ping", "app::ping")]);
        let expected = format!(
            "{HEADER}

export type ModelUser = {{
  name: string;
  meta: ModelUserMeta;
}};

export type ModelUserMeta = {{
  tags: string[];
}};

export type WirebindContract = {{
  ping: () => Promise<null>;
  \"user.create\": (user: ModelUser, override: (boolean | null)) => Promise<ModelUser[]>;
}};
"
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_no_methods() {
        let out = emit(&[]);
        assert!(out.ends_with("export type WirebindContract = {\n};\n"));
    }
}
