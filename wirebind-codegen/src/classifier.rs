//! Signature Classifier
//!
//! Every parameter of a procedure plays exactly one role:
//!
//! - **context**: its type is exactly the output of a registered extractor;
//!   the value is computed from the inbound request
//! - **dependency**: after stripping wrappers it names a registered
//!   dependency type; the value is held by the generated `Handler`
//! - **wire argument**: anything else, decoded positionally from `args`
//!
//! The checks run in that order, so a type registered both ways resolves
//! as context.

use crate::error::{Error, Result};
use crate::type_mapper::TypeMapper;
use heck::ToSnakeCase;
use wirebind_core::{FunctionSig, Passing, Schema, TypeNode};

/// A function computing a context value from the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextExtractor {
    pub path: String,
    pub output: TypeNode,
    /// Returns `Result<T, E>`
    pub fallible: bool,
    pub is_async: bool,
    pub passing: Passing,
}

impl ContextExtractor {
    /// Validate an extractor signature: one request parameter, and `[T]` or
    /// `[T, Error]` results.
    pub fn from_signature(sig: &FunctionSig) -> Result<Self> {
        let passing = match sig.params.as_slice() {
            [param] if param.ty == TypeNode::Request => param.passing,
            _ => {
                return Err(Error::InvalidExtractorParams {
                    function: sig.path.clone(),
                })
            }
        };

        let (output, fallible) = match sig.results.as_slice() {
            [output] if !output.is_marker() => (output, false),
            [output, TypeNode::Error] if !output.is_marker() => (output, true),
            _ => {
                return Err(Error::InvalidExtractorResults {
                    function: sig.path.clone(),
                })
            }
        };

        Ok(Self {
            path: sig.path.clone(),
            output: output.clone(),
            fallible,
            is_async: sig.is_async,
            passing,
        })
    }
}

/// A service type held by the generated `Handler`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Declaration identity, also the Rust path of the type
    pub id: String,
    /// Field name on `Handler`
    pub field: String,
}

/// The role of one parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Index into the registered extractors
    Context(usize),
    /// Index into the registered dependencies
    Dependency(usize),
    Wire,
}

/// Registered extractors and dependencies, in registration order
#[derive(Debug, Default)]
pub struct Registry {
    extractors: Vec<ContextExtractor>,
    dependencies: Vec<Dependency>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extractors(&self) -> &[ContextExtractor] {
        &self.extractors
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn add_extractor(&mut self, schema: &Schema, path: &str) -> Result<()> {
        let sig = schema
            .function(path)
            .ok_or_else(|| Error::UnknownFunction(path.to_string()))?;
        let extractor = ContextExtractor::from_signature(sig)?;
        if let Some(existing) = self.extractors.iter().find(|e| e.output == extractor.output) {
            return Err(Error::DuplicateExtractor {
                function: extractor.path,
                existing: existing.path.clone(),
            });
        }
        tracing::debug!(path = %path, fallible = extractor.fallible, "Registered context extractor");
        self.extractors.push(extractor);
        Ok(())
    }

    pub fn add_dependency(&mut self, schema: &Schema, id: &str) -> Result<()> {
        let decl = schema
            .decl(id)
            .ok_or_else(|| Error::UnknownType(id.to_string()))?;
        if self.dependencies.iter().any(|d| d.id == id) {
            return Err(Error::DuplicateDependency(id.to_string()));
        }
        let field = decl.name.to_snake_case();
        if let Some(other) = self.dependencies.iter().find(|d| d.field == field) {
            return Err(Error::DependencyCollision {
                field,
                first: other.id.clone(),
                second: id.to_string(),
            });
        }
        tracing::debug!(id = %id, field = %field, "Registered dependency");
        self.dependencies.push(Dependency {
            id: id.to_string(),
            field,
        });
        Ok(())
    }

    /// Classify a parameter type
    pub fn classify(&self, ty: &TypeNode) -> Role {
        if let Some(index) = self.extractors.iter().position(|e| e.output == *ty) {
            return Role::Context(index);
        }
        if let TypeNode::Named { id } = ty.innermost() {
            if let Some(index) = self.dependencies.iter().position(|d| d.id == *id) {
                return Role::Dependency(index);
            }
        }
        Role::Wire
    }
}

/// Whether a wire argument of type `ty` can be decoded from JSON
///
/// Markers and interface declarations have no wire form unless an override
/// names one. Records and value declarations always do.
pub fn is_wire_compatible(ty: &TypeNode, mapper: &TypeMapper<'_>) -> bool {
    match ty.innermost() {
        node if node.is_marker() => false,
        TypeNode::Named { id } if !mapper.is_overridden(id) => mapper
            .schema()
            .decl(id)
            .map_or(true, |decl| !decl.is_interface()),
        _ => true,
    }
}
