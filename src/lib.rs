//! wirebind - a typed RPC boundary generated from plain functions
//!
//! Write ordinary Rust functions, describe them, and wirebind generates two
//! artifacts from one pass over their types:
//!
//! - a dispatcher that decodes `{"method": "...", "args": [...]}` requests,
//!   calls the matching function and encodes its result
//! - a TypeScript contract describing every method and every record its
//!   arguments and results reach
//!
//! # Architecture
//!
//! - **wirebind-core**: the type-description `Schema`, the `Describe` trait,
//!   wire types, codec, errors and observability
//! - **wirebind-server**: the runtime generated dispatchers run on
//!   (re-exported here as [`server`])
//! - **wirebind-macros**: `#[derive(Describe)]` and `#[describe_fn]`
//! - **wirebind-codegen**: the generator, used from build scripts and the
//!   `wirebind-gen` CLI
//!
//! # Describing an API
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use wirebind::{describe_fn, Describe, Schema, TypeNode};
//!
//! #[derive(Describe, Serialize, Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! pub struct Point {
//!     pub x_pos: f64,
//!     pub y_pos: f64,
//! }
//!
//! #[describe_fn]
//! pub fn midpoint(a: Point, b: &Point) -> Point {
//!     Point { x_pos: (a.x_pos + b.x_pos) / 2.0, y_pos: (a.y_pos + b.y_pos) / 2.0 }
//! }
//!
//! let mut schema = Schema::new();
//! schema.add_function(midpoint_descriptor);
//!
//! let sig = schema.function(concat!(module_path!(), "::midpoint")).unwrap();
//! assert_eq!(sig.params.len(), 2);
//! assert!(matches!(sig.results[0], TypeNode::Named { .. }));
//! ```
//!
//! The schema is then handed to `wirebind_codegen::Builder`, usually from a
//! `build.rs`, and the generated dispatcher is served through
//! [`server::DispatchService`].

pub use wirebind_core::*;
pub use wirebind_macros::{describe_fn, Describe};
pub use wirebind_server as server;
