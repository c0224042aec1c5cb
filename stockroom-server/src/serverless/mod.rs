//! Serverless invocation adapter.
//!
//! Bridges a platform invocation event onto the same router the
//! long-running server uses: the schema check runs first, path fields are
//! normalized to drop the deployment-stage prefix, the event is dispatched
//! as one HTTP request, and idle reclamation is consulted only after the
//! response has been built.

pub mod event;
pub mod invoke;
pub mod normalize;

pub use event::{InvocationEvent, InvocationResponse, RequestContext};
pub use invoke::handle_invocation;
pub use normalize::normalize;
