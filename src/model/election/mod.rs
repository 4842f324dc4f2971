pub use candidates::{Candidate, CandidateRegistry};
pub use commit_reveal::{CommitBook, CommitHash, VoteCommit};
pub use config::{ElectionConfig, Phase, TallyMode, REVEAL_WINDOW_SECONDS};
pub use election_core::Election;
pub use eligibility::EligibilityPolicy;
pub use emergency::EmergencyState;
pub use error::{ElectionError, Result};
pub use event::{ElectionEvent, EventKind};
pub use instance::ElectionInstance;
pub use results::{CandidateTally, ElectionResults};
pub use voters::{VoterRecord, VoterRegistry};

mod candidates;
mod commit_reveal;
pub mod config;
pub mod election_core;
mod eligibility;
mod emergency;
mod error;
mod event;
mod instance;
mod results;
mod voters;
