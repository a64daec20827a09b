//! Build-time errors
//!
//! Every variant is a configuration or programming mistake in what was
//! registered with the [`Builder`](crate::Builder). A build stops at the
//! first one and produces no artifacts.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("context extractor `{function}` must take exactly one `&Request` parameter")]
    InvalidExtractorParams { function: String },

    #[error("context extractor `{function}` must return `T` or `Result<T, E>`")]
    InvalidExtractorResults { function: String },

    #[error("context type of `{function}` already has the extractor `{existing}`")]
    DuplicateExtractor { function: String, existing: String },

    #[error("dependency `{0}` is registered twice")]
    DuplicateDependency(String),

    #[error("route `{0}` is registered twice")]
    DuplicateRoute(String),

    #[error(
        "method `{method}` has the segment `{segment}`; each dot-separated segment must \
         start with an ASCII letter and hold only ASCII letters, digits, `_` or `-`"
    )]
    InvalidMethodName { method: String, segment: String },

    #[error("route `{0}` has no entries")]
    EmptyRoute(String),

    #[error(
        "`{function}` in route `{method}` must return nothing, one value, \
         or one value followed by an error"
    )]
    UnsupportedReturn { method: String, function: String },

    #[error("`{function}` in route `{method}` is not middleware; only the last entry may be a procedure")]
    MisplacedProcedure { method: String, function: String },

    #[error("middleware `{function}` in route `{method}` is async; middleware must be synchronous")]
    AsyncMiddleware { method: String, function: String },

    #[error("route `{method}` ends with middleware `{function}`; the last entry must be a procedure")]
    MiddlewareAsTerminal { method: String, function: String },

    #[error(
        "parameter `{param}` of `{function}` in route `{method}` cannot be sent over \
         the wire: its type is an opaque service or a request marker; register it as a \
         dependency or context, or map it with a custom type"
    )]
    UnsupportedArgument {
        method: String,
        function: String,
        param: String,
    },

    #[error("no parameter names recorded for `{0}`")]
    MissingParamNames(String),

    #[error("`{function}` has {expected} parameters but {found} recorded names")]
    ParamNameMismatch {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("function `{0}` is not described in the schema")]
    UnknownFunction(String),

    #[error("type `{0}` is not described in the schema")]
    UnknownType(String),

    #[error("`{first}` and `{second}` both map to the contract type `{name}`")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("routes `{first}` and `{second}` both generate the handler `{handler}`")]
    HandlerCollision {
        handler: String,
        first: String,
        second: String,
    },

    #[error("dependencies `{first}` and `{second}` both generate the field `{field}`")]
    DependencyCollision {
        field: String,
        first: String,
        second: String,
    },

    #[error("failed to format generated code")]
    Format(#[from] std::fmt::Error),

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
