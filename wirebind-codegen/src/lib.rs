//! wirebind code generator
//!
//! Turns a [`Schema`](wirebind_core::Schema) and a set of registrations into
//! two artifacts from one pass over the type graph:
//!
//! - the Rust source of a dispatcher implementing
//!   `wirebind_server::Dispatch`
//! - a TypeScript contract describing every method and every record
//!   reachable from the wire arguments and return values
//!
//! Components, leaves first:
//!
//! - [`type_mapper`]: one type node to one contract type
//! - [`walker`]: emits each reachable record definition once
//! - [`classifier`]: context, dependency or wire argument
//! - [`procedure`]: route validation and planning
//! - [`dispatcher`] and [`contract`]: the two renderers
//!
//! [`Builder`] ties them together. Build scripts typically call it with the
//! schema of the API crate and write the dispatcher into `OUT_DIR`:
//!
//! ```ignore
//! let artifacts = Builder::from_config(demo_api::schema(), config).build()?;
//! artifacts.write(out_dir.join("dispatcher.rs"), "web/src/contract.ts")?;
//! ```

pub mod code_writer;

pub mod classifier;
pub mod contract;
pub mod dispatcher;
pub mod procedure;
pub mod type_mapper;
pub mod walker;

mod builder;
mod error;

pub use builder::{Artifacts, BuildConfig, Builder, DEFAULT_CONTRACT_NAME, DEFAULT_RUNTIME_PATH};
pub use error::{Error, Result};
