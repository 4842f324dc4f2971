//! API-compatible types.
//!
//! The types in this module are the request and response bodies of the HTTP
//! surface. Datetimes are serialised as RFC 3339 strings and commitments as hex.

pub mod auth;
pub mod ballot;
pub mod candidate;
pub mod election;
pub mod registry;
pub mod voter;
