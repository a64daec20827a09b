//! demo-api behind a generated dispatcher
//!
//! `build.rs` writes `dispatcher.rs` and `contract.ts` into `OUT_DIR`; the
//! dispatcher is compiled in below and the contract is exposed as
//! [`CONTRACT`] so it can be copied into a web client.

use demo_api::store::UserStore;
use std::sync::Arc;
use wirebind::server::{DispatchMetrics, DispatchService};

#[allow(clippy::all, dead_code)]
mod generated {
    include!(concat!(env!("OUT_DIR"), "/dispatcher.rs"));
}

pub use generated::Handler;

/// TypeScript contract for every method [`Handler`] serves
pub const CONTRACT: &str = include_str!(concat!(env!("OUT_DIR"), "/contract.ts"));

/// Dispatch service over a fresh handler
pub fn service(store: Arc<UserStore>) -> DispatchService<Handler> {
    DispatchService::new(Handler::new(store)).with_metrics(DispatchMetrics::new())
}
