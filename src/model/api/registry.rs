use serde::{Deserialize, Serialize};

/// The registry's current logic version.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicVersion {
    pub version: u32,
}
