//! Route validation and planning
//!
//! A route binds a wire method name to an ordered list of function paths:
//! zero or more middleware followed by the terminal procedure. Planning
//! resolves each path against the schema, checks the route's shape and
//! assigns every parameter of the procedure its role. The dispatcher and
//! the contract are both rendered from the resulting [`Procedure`]s.

use crate::classifier::{is_wire_compatible, Registry, Role};
use crate::error::{Error, Result};
use crate::type_mapper::TypeMapper;
use heck::{ToSnakeCase, ToUpperCamelCase};
use std::collections::BTreeMap;
use wirebind_core::{FunctionSig, Passing, Schema, TypeNode};

/// What a procedure returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// No result; answers `null`
    Unit,
    Value(TypeNode),
    /// `Result<T, E>`; an error answers `Bad Request`
    Fallible(TypeNode),
}

impl Output {
    fn from_results(results: &[TypeNode]) -> Option<Self> {
        match results {
            [] => Some(Output::Unit),
            [value] if !value.is_marker() => Some(Output::Value(value.clone())),
            [value, TypeNode::Error] if !value.is_marker() => Some(Output::Fallible(value.clone())),
            _ => None,
        }
    }

    /// The success value type, `None` for `Unit`
    pub fn value(&self) -> Option<&TypeNode> {
        match self {
            Output::Unit => None,
            Output::Value(ty) | Output::Fallible(ty) => Some(ty),
        }
    }
}

/// Where a parameter's value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Index into the registry's extractors
    Context(usize),
    /// Index into the registry's dependencies
    Dependency(usize),
    /// Position among the wire arguments only
    Wire(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedParam {
    pub name: String,
    pub ty: TypeNode,
    pub passing: Passing,
    pub source: Source,
}

/// A validated route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    pub method: String,
    /// Name of the generated per-method handler
    pub handler: String,
    pub function: String,
    pub is_async: bool,
    /// Middleware paths in route order, outermost first
    pub middleware: Vec<String>,
    pub params: Vec<PlannedParam>,
    pub output: Output,
}

impl Procedure {
    pub fn wire_params(&self) -> impl Iterator<Item = &PlannedParam> {
        self.params
            .iter()
            .filter(|p| matches!(p.source, Source::Wire(_)))
    }
}

/// Check that every dot-separated segment of `method` yields Rust and
/// TypeScript identifiers once case-converted
pub fn validate_method(method: &str) -> Result<()> {
    for segment in method.split('.') {
        let mut chars = segment.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::InvalidMethodName {
                method: method.to_string(),
                segment: segment.to_string(),
            });
        }
    }
    Ok(())
}

/// `user.create` becomes `handle_user_create`
pub fn handler_name(method: &str) -> String {
    let segments: Vec<String> = method.split('.').map(|s| s.to_snake_case()).collect();
    format!("handle_{}", segments.join("_"))
}

/// `user.create` becomes `UserCreate`
pub fn contract_prefix(method: &str) -> String {
    method.split('.').map(|s| s.to_upper_camel_case()).collect()
}

fn lookup<'s>(schema: &'s Schema, path: &str) -> Result<&'s FunctionSig> {
    schema
        .function(path)
        .ok_or_else(|| Error::UnknownFunction(path.to_string()))
}

/// Validate one route and classify its procedure's parameters
pub fn plan(
    method: &str,
    entries: &[String],
    registry: &Registry,
    mapper: &TypeMapper<'_>,
) -> Result<Procedure> {
    validate_method(method)?;
    let schema = mapper.schema();
    let Some((terminal, middleware)) = entries.split_last() else {
        return Err(Error::EmptyRoute(method.to_string()));
    };

    for path in middleware {
        let sig = lookup(schema, path)?;
        if sig.is_middleware() && sig.is_async {
            return Err(Error::AsyncMiddleware {
                method: method.to_string(),
                function: path.clone(),
            });
        }
        if !sig.is_middleware() {
            return Err(Error::MisplacedProcedure {
                method: method.to_string(),
                function: path.clone(),
            });
        }
    }

    let sig = lookup(schema, terminal)?;
    if sig.is_middleware() {
        return Err(Error::MiddlewareAsTerminal {
            method: method.to_string(),
            function: terminal.clone(),
        });
    }
    let output = Output::from_results(&sig.results).ok_or_else(|| Error::UnsupportedReturn {
        method: method.to_string(),
        function: terminal.clone(),
    })?;

    let names = schema
        .names_of(terminal)
        .ok_or_else(|| Error::MissingParamNames(terminal.clone()))?;
    if names.len() != sig.params.len() {
        return Err(Error::ParamNameMismatch {
            function: terminal.clone(),
            expected: sig.params.len(),
            found: names.len(),
        });
    }

    let mut wire_index = 0;
    let mut params = Vec::with_capacity(sig.params.len());
    for (param, name) in sig.params.iter().zip(names) {
        let source = match registry.classify(&param.ty) {
            Role::Context(index) => Source::Context(index),
            Role::Dependency(index) => Source::Dependency(index),
            Role::Wire => {
                if !is_wire_compatible(&param.ty, mapper) {
                    return Err(Error::UnsupportedArgument {
                        method: method.to_string(),
                        function: terminal.clone(),
                        param: name.clone(),
                    });
                }
                wire_index += 1;
                Source::Wire(wire_index - 1)
            }
        };
        params.push(PlannedParam {
            name: name.clone(),
            ty: param.ty.clone(),
            passing: param.passing,
            source,
        });
    }

    tracing::debug!(
        method = %method,
        function = %terminal,
        wire_args = wire_index,
        middleware = middleware.len(),
        "Planned procedure"
    );

    Ok(Procedure {
        method: method.to_string(),
        handler: handler_name(method),
        function: terminal.clone(),
        is_async: sig.is_async,
        middleware: middleware.to_vec(),
        params,
        output,
    })
}

/// Plan every route in method order
pub fn plan_all(
    routes: &BTreeMap<String, Vec<String>>,
    registry: &Registry,
    mapper: &TypeMapper<'_>,
) -> Result<Vec<Procedure>> {
    let mut handlers: BTreeMap<String, &str> = BTreeMap::new();
    let mut procedures = Vec::with_capacity(routes.len());
    for (method, entries) in routes {
        let procedure = plan(method, entries, registry, mapper)?;
        if let Some(first) = handlers.insert(procedure.handler.clone(), method) {
            return Err(Error::HandlerCollision {
                handler: procedure.handler,
                first: first.to_string(),
                second: method.clone(),
            });
        }
        procedures.push(procedure);
    }
    Ok(procedures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirebind_core::{Param, Primitive, TypeDecl};

    fn int() -> TypeNode {
        TypeNode::primitive(Primitive::I32)
    }

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema.define_type("app::Db", TypeDecl::interface(Some("app"), "Db"));
        schema.define_type("app::Session", TypeDecl::record(Some("app"), "Session", vec![]));
        schema.insert_function(
            FunctionSig::new("app::add")
                .param(Param::owned(int()))
                .param(Param::owned(int()))
                .result(int()),
            vec!["a".into(), "b".into()],
        );
        schema.insert_function(
            FunctionSig::new("app::save")
                .with_async(true)
                .param(Param::new(TypeNode::named("app::Session"), Passing::Borrowed))
                .param(Param::new(TypeNode::named("app::Db"), Passing::Shared))
                .param(Param::owned(TypeNode::primitive(Primitive::String)))
                .result(TypeNode::primitive(Primitive::Bool))
                .result(TypeNode::Error),
            vec!["session".into(), "db".into(), "name".into()],
        );
        schema.insert_function(
            FunctionSig::new("app::mw")
                .param(Param::owned(TypeNode::Handler))
                .result(TypeNode::Handler),
            vec!["next".into()],
        );
        schema.insert_function(
            FunctionSig::new("app::async_mw")
                .with_async(true)
                .param(Param::owned(TypeNode::Handler))
                .result(TypeNode::Handler),
            vec!["next".into()],
        );
        schema.insert_function(
            FunctionSig::new("app::pair").result(int()).result(int()),
            vec![],
        );
        schema.insert_function(FunctionSig::new("app::only_error").result(TypeNode::Error), vec![]);
        schema.insert_function(
            FunctionSig::new("app::uses_db").param(Param::owned(TypeNode::named("app::Db"))),
            vec!["db".into()],
        );
        schema.insert_function(FunctionSig::new("app::unnamed").param(Param::owned(int())), vec![]);
        schema
    }

    fn registry(schema: &Schema) -> Registry {
        let mut schema = schema.clone();
        schema.insert_function(
            FunctionSig::new("app::session")
                .param(Param::new(TypeNode::Request, Passing::Borrowed))
                .result(TypeNode::named("app::Session")),
            vec!["request".into()],
        );
        let mut registry = Registry::new();
        registry.add_extractor(&schema, "app::session").unwrap();
        registry.add_dependency(&schema, "app::Db").unwrap();
        registry
    }

    fn route(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_names() {
        assert_eq!(handler_name("math.add"), "handle_math_add");
        assert_eq!(handler_name("user.getById"), "handle_user_get_by_id");
        assert_eq!(contract_prefix("user.getById"), "UserGetById");
    }

    #[test]
    fn test_plan_assigns_sources() {
        let schema = schema();
        let registry = registry(&schema);
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);

        let procedure = plan("item.save", &route(&["app::mw", "app::save"]), &registry, &mapper).unwrap();
        assert_eq!(procedure.handler, "handle_item_save");
        assert!(procedure.is_async);
        assert_eq!(procedure.middleware, vec!["app::mw"]);
        let sources: Vec<Source> = procedure.params.iter().map(|p| p.source).collect();
        assert_eq!(sources, vec![Source::Context(0), Source::Dependency(0), Source::Wire(0)]);
        assert_eq!(procedure.output, Output::Fallible(TypeNode::primitive(Primitive::Bool)));
    }

    #[test]
    fn test_wire_positions_skip_other_roles() {
        let schema = schema();
        let registry = Registry::new();
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);

        let procedure = plan("math.add", &route(&["app::add"]), &registry, &mapper).unwrap();
        let wire: Vec<_> = procedure.wire_params().map(|p| (p.name.as_str(), p.source)).collect();
        assert_eq!(wire, vec![("a", Source::Wire(0)), ("b", Source::Wire(1))]);
    }

    #[test]
    fn test_route_shape_errors() {
        let schema = schema();
        let registry = registry(&schema);
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);
        let plan = |entries: &[&str]| plan("m", &route(entries), &registry, &mapper);

        assert!(matches!(plan(&[]), Err(Error::EmptyRoute(_))));
        assert!(matches!(plan(&["app::mw"]), Err(Error::MiddlewareAsTerminal { .. })));
        assert!(matches!(
            plan(&["app::add", "app::add"]),
            Err(Error::MisplacedProcedure { .. })
        ));
        assert!(matches!(plan(&["app::missing"]), Err(Error::UnknownFunction(_))));

        let err = plan(&["app::async_mw", "app::add"]).unwrap_err();
        assert!(matches!(err, Error::AsyncMiddleware { ref function, .. } if function == "app::async_mw"));
        assert!(err.to_string().contains("must be synchronous"));
    }

    #[test]
    fn test_method_names() {
        for method in ["math.add", "user.getById", "math_add", "v2.user-list", "ping"] {
            assert!(validate_method(method).is_ok(), "{method}");
        }
        for (method, segment) in [
            ("2fa.verify", "2fa"),
            ("user..get", ""),
            ("", ""),
            ("user.get!", "get!"),
            ("_private.call", "_private"),
            ("user.\"x\"", "\"x\""),
        ] {
            let err = validate_method(method).unwrap_err();
            assert!(
                matches!(err, Error::InvalidMethodName { segment: ref s, .. } if s == segment),
                "{method}"
            );
        }
    }

    #[test]
    fn test_plan_rejects_bad_method_before_lookup() {
        let schema = schema();
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);
        let err = plan("2fa.verify", &route(&["app::mw", "app::add"]), &Registry::new(), &mapper)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidMethodName { .. }));
    }

    #[test]
    fn test_return_arity() {
        let schema = schema();
        let registry = Registry::new();
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);

        assert!(matches!(
            plan("m", &route(&["app::pair"]), &registry, &mapper),
            Err(Error::UnsupportedReturn { .. })
        ));
        assert!(matches!(
            plan("m", &route(&["app::only_error"]), &registry, &mapper),
            Err(Error::UnsupportedReturn { .. })
        ));
    }

    #[test]
    fn test_interface_argument_needs_registration() {
        let schema = schema();
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);

        let err = plan("m", &route(&["app::uses_db"]), &Registry::new(), &mapper).unwrap_err();
        assert!(matches!(err, Error::UnsupportedArgument { param, .. } if param == "db"));

        let registry = registry(&schema);
        assert!(plan("m", &route(&["app::uses_db"]), &registry, &mapper).is_ok());
    }

    #[test]
    fn test_param_names_must_match() {
        let schema = schema();
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);

        let err = plan("m", &route(&["app::unnamed"]), &Registry::new(), &mapper).unwrap_err();
        assert!(matches!(err, Error::ParamNameMismatch { expected: 1, found: 0, .. }));
    }

    #[test]
    fn test_handler_collision() {
        let schema = schema();
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&schema, &overrides);
        let mut routes = BTreeMap::new();
        routes.insert("math.add".to_string(), route(&["app::add"]));
        routes.insert("math_add".to_string(), route(&["app::add"]));

        let err = plan_all(&routes, &Registry::new(), &mapper).unwrap_err();
        assert!(matches!(err, Error::HandlerCollision { handler, .. } if handler == "handle_math_add"));
    }
}
