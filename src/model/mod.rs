pub mod api;
pub mod common;
pub mod election;
pub mod oracle;
pub mod registry;
