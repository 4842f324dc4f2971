mod identity;

pub use identity::{AssetRef, Identity};

/// Our election IDs are integers, issued sequentially by the registry.
pub type ElectionId = u32;
/// Our candidate IDs are integers, issued sequentially within an election.
pub type CandidateId = u32;
