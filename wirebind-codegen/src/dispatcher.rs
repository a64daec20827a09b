//! Dispatcher Generator
//!
//! Renders the Rust source of a `Handler` type implementing the runtime's
//! `Dispatch` trait. Per method, the generated handler:
//!
//! 1. resolves every context parameter through its extractor, answering
//!    `Invalid Context` if a fallible extractor fails
//! 2. decodes the wire arguments in order, answering `Invalid JSON` on the
//!    first one that fails
//! 3. calls the procedure once, with dependencies taken from `Handler`
//! 4. encodes the value, `null` for no value, or `Bad Request` for an error
//!
//! `dispatch` itself is a single `match` on the method name. A route with
//! middleware wraps the method's handler in a `BoxEndpoint` and passes it
//! through each middleware, last entry first, so the first entry ends up
//! outermost.

use crate::classifier::Registry;
use crate::code_writer::CodeWriter;
use crate::cw_line;
use crate::error::Result;
use crate::procedure::{Output, PlannedParam, Procedure, Source};
use heck::ToUpperCamelCase;
use std::fmt;
use wirebind_core::{Passing, Primitive, TypeNode};

pub const HEADER: &str = "// This file is generated by wirebind. DO NOT EDIT.";

/// Turn a schema path into one usable from the generated file
///
/// Paths in the consuming crate become `crate::` paths; other paths are made
/// absolute.
pub fn rust_path(path: &str, crate_name: Option<&str>) -> String {
    if let Some(name) = crate_name {
        if path == name {
            return "crate".to_string();
        }
        if let Some(rest) = path.strip_prefix(name).and_then(|r| r.strip_prefix("::")) {
            return format!("crate::{rest}");
        }
    }
    let is_relative = ["crate::", "self::", "super::", "::"]
        .iter()
        .any(|prefix| path.starts_with(prefix));
    if is_relative {
        path.to_string()
    } else {
        format!("::{path}")
    }
}

fn pass(expr: &str, passing: Passing) -> String {
    match passing {
        Passing::Owned => expr.to_string(),
        Passing::Borrowed => format!("&{expr}"),
        Passing::Shared => format!("Arc::new({expr})"),
    }
}

pub struct DispatcherGenerator<'a> {
    registry: &'a Registry,
    runtime_path: &'a str,
    crate_name: Option<&'a str>,
}

impl<'a> DispatcherGenerator<'a> {
    pub fn new(registry: &'a Registry, runtime_path: &'a str, crate_name: Option<&'a str>) -> Self {
        Self {
            registry,
            runtime_path,
            crate_name,
        }
    }

    fn path(&self, path: &str) -> String {
        rust_path(path, self.crate_name)
    }

    pub fn render(&self, procedures: &[Procedure]) -> Result<String> {
        let mut w = CodeWriter::new();
        w.line(HEADER)?;
        w.blank_line()?;
        w.line("#[allow(unused_imports)]")?;
        cw_line!(
            w,
            "use {}::{{decode_arg, unknown_method, BoxEndpoint, BoxFuture, Dispatch, Endpoint, \
             ErrorBody, Request, RequestBody, WireResponse}};",
            self.runtime_path
        )?;
        w.line("#[allow(unused_imports)]")?;
        w.line("use ::std::sync::Arc;")?;
        w.blank_line()?;

        self.write_struct(&mut w)?;
        w.blank_line()?;
        self.write_handlers(&mut w, procedures)?;
        w.blank_line()?;
        self.write_dispatch(&mut w, procedures)?;

        for procedure in procedures.iter().filter(|p| !p.middleware.is_empty()) {
            w.blank_line()?;
            self.write_endpoint(&mut w, procedure)?;
        }
        Ok(w.finish())
    }

    fn write_struct(&self, w: &mut CodeWriter) -> fmt::Result {
        let deps: Vec<(&str, String)> = self
            .registry
            .dependencies()
            .iter()
            .map(|d| (d.field.as_str(), format!("Arc<{}>", self.path(&d.id))))
            .collect();

        w.line("/// Generated method table")?;
        w.line("#[derive(Clone)]")?;
        w.block("pub struct Handler", |w| {
            deps.iter()
                .try_for_each(|(field, ty)| cw_line!(w, "pub {field}: {ty},"))
        })?;
        w.blank_line()?;

        let params: Vec<String> = deps.iter().map(|(f, ty)| format!("{f}: {ty}")).collect();
        let fields: Vec<&str> = deps.iter().map(|(f, _)| *f).collect();
        w.block("impl Handler", |w| {
            w.line("#[allow(clippy::new_without_default)]")?;
            w.block(&format!("pub fn new({}) -> Self", params.join(", ")), |w| {
                if fields.is_empty() {
                    w.line("Self {}")
                } else {
                    cw_line!(w, "Self {{ {} }}", fields.join(", "))
                }
            })
        })
    }

    fn write_handlers(&self, w: &mut CodeWriter, procedures: &[Procedure]) -> fmt::Result {
        w.line("#[allow(unused_variables)]")?;
        w.block("impl Handler", |w| {
            for (i, procedure) in procedures.iter().enumerate() {
                if i > 0 {
                    w.blank_line()?;
                }
                self.write_handler(w, procedure)?;
            }
            Ok(())
        })
    }

    fn write_handler(&self, w: &mut CodeWriter, procedure: &Procedure) -> fmt::Result {
        cw_line!(w, "/// `{}`", procedure.method)?;
        let header = format!(
            "pub async fn {}(&self, request: &Request, body: &RequestBody) -> WireResponse",
            procedure.handler
        );
        w.block(&header, |w| {
            for (position, param) in procedure.params.iter().enumerate() {
                if let Source::Context(index) = param.source {
                    self.write_context(w, position, index)?;
                }
            }
            for (position, param) in procedure.params.iter().enumerate() {
                if let Source::Wire(index) = param.source {
                    write_decode(w, position, index, param)?;
                }
            }

            let args: Vec<String> = procedure
                .params
                .iter()
                .enumerate()
                .map(|(position, param)| self.argument(position, param))
                .collect();
            let mut call = format!("{}({})", self.path(&procedure.function), args.join(", "));
            if procedure.is_async {
                call.push_str(".await");
            }

            match &procedure.output {
                Output::Unit => {
                    cw_line!(w, "{call};")?;
                    w.line("WireResponse::null()")
                }
                Output::Value(_) => {
                    cw_line!(w, "let result = {call};")?;
                    w.line("WireResponse::ok(&result)")
                }
                Output::Fallible(_) => w.block(&format!("match {call}"), |w| {
                    w.line("Ok(value) => WireResponse::ok(&value),")?;
                    w.line("Err(err) => WireResponse::error(ErrorBody::bad_request(err.to_string())),")
                }),
            }
        })
    }

    fn write_context(&self, w: &mut CodeWriter, position: usize, index: usize) -> fmt::Result {
        let extractor = &self.registry.extractors()[index];
        let request = match extractor.passing {
            Passing::Borrowed => "request".to_string(),
            Passing::Owned => "request.clone()".to_string(),
            Passing::Shared => "Arc::new(request.clone())".to_string(),
        };
        let mut call = format!("{}({request})", self.path(&extractor.path));
        if extractor.is_async {
            call.push_str(".await");
        }

        if !extractor.fallible {
            return cw_line!(w, "let ctx{position} = {call};");
        }
        w.block_with(&format!("let ctx{position} = match {call}"), "};", |w| {
            w.line("Ok(value) => value,")?;
            w.line("Err(err) => return WireResponse::error(ErrorBody::invalid_context(err.to_string())),")
        })
    }

    fn argument(&self, position: usize, param: &PlannedParam) -> String {
        match param.source {
            Source::Context(_) => pass(&format!("ctx{position}"), param.passing),
            Source::Wire(_) => pass(&format!("arg{position}"), param.passing),
            Source::Dependency(index) => {
                let field = &self.registry.dependencies()[index].field;
                dependency_expr(field, &param.ty, param.passing)
            }
        }
    }

    fn write_dispatch(&self, w: &mut CodeWriter, procedures: &[Procedure]) -> fmt::Result {
        let mut methods: Vec<&str> = procedures.iter().map(|p| p.method.as_str()).collect();
        methods.sort_unstable();
        let quoted: Vec<String> = methods.iter().map(|m| format!("{m:?}")).collect();

        w.block("impl Dispatch for Handler", |w| {
            w.block("fn methods(&self) -> &'static [&'static str]", |w| {
                cw_line!(w, "&[{}]", quoted.join(", "))
            })?;
            w.blank_line()?;
            w.block(
                "fn dispatch(&self, request: Arc<Request>, body: Arc<RequestBody>) -> BoxFuture<'_, WireResponse>",
                |w| {
                    w.block_with("Box::pin(async move", "})", |w| {
                        w.block("match body.method.as_str()", |w| {
                            for procedure in procedures {
                                self.write_arm(w, procedure)?;
                            }
                            w.line("other => unknown_method(other),")
                        })
                    })
                },
            )
        })
    }

    fn write_arm(&self, w: &mut CodeWriter, procedure: &Procedure) -> fmt::Result {
        let method = format!("{:?}", procedure.method);
        if procedure.middleware.is_empty() {
            return cw_line!(w, "{method} => self.{}(&request, &body).await,", procedure.handler);
        }
        w.block(&format!("{method} =>"), |w| {
            cw_line!(
                w,
                "let endpoint: BoxEndpoint = Box::new({}(self.clone()));",
                endpoint_name(&procedure.method)
            )?;
            for middleware in procedure.middleware.iter().rev() {
                cw_line!(w, "let endpoint = {}(endpoint);", self.path(middleware))?;
            }
            w.line("endpoint.call(Arc::clone(&request), Arc::clone(&body)).await")
        })
    }

    fn write_endpoint(&self, w: &mut CodeWriter, procedure: &Procedure) -> fmt::Result {
        let name = endpoint_name(&procedure.method);
        cw_line!(w, "struct {name}(Handler);")?;
        w.blank_line()?;
        w.block(&format!("impl Endpoint for {name}"), |w| {
            w.block(
                "fn call(&self, request: Arc<Request>, body: Arc<RequestBody>) -> BoxFuture<'static, WireResponse>",
                |w| {
                    w.line("let handler = self.0.clone();")?;
                    cw_line!(
                        w,
                        "Box::pin(async move {{ handler.{}(&request, &body).await }})",
                        procedure.handler
                    )
                },
            )
        })
    }
}

fn endpoint_name(method: &str) -> String {
    let name: String = method.split('.').map(|s| s.to_upper_camel_case()).collect();
    format!("{name}Endpoint")
}

fn write_decode(w: &mut CodeWriter, position: usize, index: usize, param: &PlannedParam) -> fmt::Result {
    // A borrowed `&str` or `&[T]` cannot drive inference of the decoded type
    let annotation = match (param.passing, &param.ty) {
        (Passing::Borrowed, TypeNode::Primitive { primitive: Primitive::String }) => ": String",
        (Passing::Borrowed, TypeNode::List { .. }) => ": Vec<_>",
        _ => "",
    };
    w.block_with(
        &format!("let arg{position}{annotation} = match decode_arg(body, {index})"),
        "};",
        |w| {
            w.line("Ok(value) => value,")?;
            w.line("Err(err) => return WireResponse::error(err),")
        },
    )
}

/// Expression handing a dependency field to a parameter of type `ty`
///
/// Wrapped dependencies are built from shared handles, so `Option<Arc<T>>`
/// and `Vec<Arc<T>>` are the supported wrapped forms.
fn dependency_expr(field: &str, ty: &TypeNode, passing: Passing) -> String {
    let handle = format!("self.{field}");
    if ty.element().is_none() {
        return match passing {
            Passing::Owned => format!("(*{handle}).clone()"),
            Passing::Borrowed => format!("&*{handle}"),
            Passing::Shared => format!("Arc::clone(&{handle})"),
        };
    }

    let mut layers = Vec::new();
    let mut node = ty;
    while let Some(element) = node.element() {
        layers.push(node);
        node = element;
    }
    let expr = layers
        .iter()
        .rev()
        .fold(format!("Arc::clone(&{handle})"), |inner, layer| match layer {
            TypeNode::Nullable { .. } => format!("Some({inner})"),
            _ => format!("vec![{inner}]"),
        });
    pass(&expr, passing)
}
