//! Example API served through a generated wirebind dispatcher
//!
//! Plain functions grouped by area, each tagged with `#[describe_fn]`.
//! [`schema`] collects their descriptors; `demo-server` feeds it to the
//! generator from its build script.

pub mod auth;
pub mod math;
pub mod model;
pub mod store;
pub mod user;

use wirebind::Schema;

/// Every function this crate exposes, plus the types they reach
pub fn schema() -> Schema {
    let mut schema = Schema::new();
    schema
        .add_function(math::add_descriptor)
        .add_function(math::divide_descriptor)
        .add_function(math::midpoint_descriptor)
        .add_function(user::get_descriptor)
        .add_function(user::create_descriptor)
        .add_function(user::whoami_descriptor)
        .add_function(user::clear_descriptor)
        .add_function(auth::session_descriptor)
        .add_function(auth::require_admin_descriptor)
        .add_function(wirebind::server::middleware::logging_descriptor);
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_covers_api() {
        let schema = schema();
        assert!(schema.function("demo_api::math::add").is_some());
        assert!(schema.function("demo_api::auth::require_admin").unwrap().is_middleware());
        assert!(schema.decl("demo_api::model::User").is_some());
        assert!(schema.decl("demo_api::store::UserStore").is_some());
        assert_eq!(
            schema.names_of("demo_api::user::create").unwrap(),
            &["session", "store", "name", "email"]
        );
    }
}
