//! Core types for wirebind
//!
//! This crate holds everything the code generator and the generated
//! dispatchers share:
//!
//! - the serializable type-description [`Schema`] and the [`Describe`] trait
//!   that produces it
//! - the wire types ([`Request`], [`RequestBody`], [`WireResponse`]) and the
//!   error envelope ([`ErrorBody`], [`ErrorCategory`])
//! - the [`codec`] used to decode bodies and arguments
//! - logging and telemetry setup ([`ObservabilityConfig`])

pub mod codec;
mod describe;
mod error;
mod observability;
mod schema;
mod types;

pub use describe::Describe;
pub use error::{Error, ErrorBody, ErrorCategory, Result};
pub use observability::{
    init_observability, LogFormat, LogTarget, ObservabilityConfig, TelemetryGuard,
};
pub use schema::{
    DeclShape, Field, FunctionDescriptor, FunctionSig, Param, Passing, Primitive, Schema,
    TypeDecl, TypeNode,
};
pub use types::{Request, RequestBody, WireResponse};
