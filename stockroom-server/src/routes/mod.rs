//! Route handlers for the items service.
//!
//! - items: CRUD over the persisted records
//! - health: liveness probe
//! - docs: OpenAPI document (optional)

pub mod docs;
pub mod health;
pub mod items;
