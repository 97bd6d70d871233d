//! GreedHunter Context - Request context for activity logging
//!
//! Every activity entry is enriched with the session token, client IP and
//! device profile active at the time of the request. This crate derives that
//! context from the inbound request's headers; it never fails, absent fields
//! degrade to empty strings or `None`.

pub mod extract;
pub mod user_agent;

pub use extract::{extract_context, RequestContext, RequestMeta};
pub use user_agent::{classify_user_agent, UaProfile};
