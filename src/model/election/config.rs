use std::fmt::{Display, Formatter};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use super::error::{ElectionError, Result};

/// Length of the reveal window that follows the end of a commit-reveal election.
pub const REVEAL_WINDOW_SECONDS: i64 = 86_400;

pub fn reveal_window() -> Duration {
    Duration::seconds(REVEAL_WINDOW_SECONDS)
}

/// Election configuration, as supplied by the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionConfig {
    /// Election title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Candidates may register strictly before this instant.
    pub candidate_deadline: DateTime<Utc>,
    /// Voting opens at this instant.
    pub start_time: DateTime<Utc>,
    /// Voting closes after this instant.
    pub end_time: DateTime<Utc>,
    /// How the final tally is presented.
    pub tally_mode: TallyMode,
    /// Whether anyone (rather than only the owner) may stand as a candidate.
    #[serde(default)]
    pub open_candidate_registration: bool,
    /// Whether results are visible while voting is ongoing.
    #[serde(default)]
    pub live_results_enabled: bool,
    /// Whether results are visible to everyone regardless of phase.
    #[serde(default)]
    pub results_public: bool,
    /// Whether ballots go through the commit-reveal protocol.
    #[serde(default)]
    pub use_commit_reveal: bool,
}

impl ElectionConfig {
    /// Check that `candidate_deadline <= start_time < end_time`, and that a reveal
    /// window after `end_time` is representable.
    pub fn validate(&self) -> Result<()> {
        if self.candidate_deadline > self.start_time {
            return Err(ElectionError::validation(
                "candidate deadline must not be after the start time",
            ));
        }
        if self.start_time >= self.end_time {
            return Err(ElectionError::validation(
                "start time must be before the end time",
            ));
        }
        if self.end_time.checked_add_signed(reveal_window()).is_none() {
            return Err(ElectionError::validation(
                "end time is too far in the future",
            ));
        }
        Ok(())
    }

    /// The last instant at which a commitment may be revealed, if commit-reveal is enabled.
    pub fn reveal_deadline(&self) -> Option<DateTime<Utc>> {
        self.use_commit_reveal
            .then(|| self.end_time.checked_add_signed(reveal_window()))
            .flatten()
    }
}

/// Tally presentation modes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum TallyMode {
    /// A single highest-vote candidate.
    WinnerTakesAll = 0,
    /// All candidates in ranked order.
    Leaderboard = 1,
}

/// Election phase, derived from the configured times and emergency state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    Ongoing,
    Ended,
}

impl Phase {
    /// The phase at `now` for a voting window of `[start, end]`.
    pub fn at(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now < start {
            Self::NotStarted
        } else if now <= end {
            Self::Ongoing
        } else {
            Self::Ended
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NotStarted => "not started",
            Self::Ongoing => "ongoing",
            Self::Ended => "ended",
        })
    }
}

/// Example data for tests.
#[cfg(test)]
pub mod examples {
    use chrono::TimeZone;

    use super::*;

    /// A fixed reference instant, `T` in the test scenarios.
    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    /// `T + secs`.
    pub fn t(secs: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(secs)
    }

    impl ElectionConfig {
        /// Candidates until T+5, voting from T+10 to T+100, direct voting, winner takes all.
        pub fn example() -> Self {
            Self {
                title: "Student Union President".to_string(),
                description: "Annual presidential election".to_string(),
                candidate_deadline: t(5),
                start_time: t(10),
                end_time: t(100),
                tally_mode: TallyMode::WinnerTakesAll,
                open_candidate_registration: true,
                live_results_enabled: false,
                results_public: false,
                use_commit_reveal: false,
            }
        }

        pub fn commit_reveal_example() -> Self {
            Self {
                use_commit_reveal: true,
                ..Self::example()
            }
        }

        pub fn leaderboard_example() -> Self {
            Self {
                title: "Best Society Award".to_string(),
                tally_mode: TallyMode::Leaderboard,
                ..Self::example()
            }
        }
    }
}
