use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::common::{AssetRef, CandidateId, ElectionId, Identity};

use super::candidates::{Candidate, CandidateRegistry};
use super::commit_reveal::{CommitBook, CommitHash, VoteCommit};
use super::config::{ElectionConfig, Phase, TallyMode};
use super::eligibility::EligibilityPolicy;
use super::emergency::EmergencyState;
use super::error::{ElectionError, Result};
use super::event::{ElectionEvent, EventKind};
use super::results::{self, CandidateTally, ElectionResults};
use super::voters::{VoterRecord, VoterRegistry};

/// The full record of one election.
///
/// Every mutating operation runs all of its checks before its first write,
/// so a rejected call leaves the record exactly as it was.
/// Status is never stored: it is derived from the configured times,
/// the emergency state and the `now` supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    id: ElectionId,
    owner: Identity,
    config: ElectionConfig,
    eligibility: EligibilityPolicy,
    /// `end_time + 1 day` while commit-reveal is enabled.
    reveal_deadline: Option<DateTime<Utc>>,
    candidates: CandidateRegistry,
    voters: VoterRegistry,
    commits: CommitBook,
    emergency: EmergencyState,
    total_votes: u64,
    events: Vec<ElectionEvent>,
}

impl Election {
    /// Create a new election owned by `owner`.
    pub fn new(
        id: ElectionId,
        owner: Identity,
        config: ElectionConfig,
        eligibility: EligibilityPolicy,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        config.validate()?;

        let mut election = Self {
            id,
            reveal_deadline: config.reveal_deadline(),
            owner: owner.clone(),
            eligibility,
            candidates: CandidateRegistry::default(),
            voters: VoterRegistry::default(),
            commits: CommitBook::default(),
            emergency: EmergencyState::default(),
            total_votes: 0,
            events: Vec::new(),
            config,
        };
        let title = election.config.title.clone();
        election.emit(now, EventKind::ElectionCreated { owner, title });
        Ok(election)
    }

    /// The phase at `now`. An emergency stop pins this to [`Phase::Ended`].
    pub fn status(&self, now: DateTime<Utc>) -> Phase {
        if self.emergency.is_emergency_stopped {
            Phase::Ended
        } else {
            Phase::at(self.config.start_time, self.config.end_time, now)
        }
    }

    /// Replace the configuration and eligibility policy before voting opens.
    pub fn update_settings(
        &mut self,
        caller: &Identity,
        config: ElectionConfig,
        eligibility: EligibilityPolicy,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.require_owner(caller, "update settings")?;
        self.require_phase(now, Phase::NotStarted, "settings can only change")?;
        config.validate()?;

        self.reveal_deadline = config.reveal_deadline();
        self.config = config;
        self.eligibility = eligibility;
        self.emit(now, EventKind::SettingsUpdated { owner: caller.clone() });
        Ok(())
    }

    /// Stand `caller` as a candidate.
    pub fn register_candidate(
        &mut self,
        caller: &Identity,
        name: String,
        description: String,
        now: DateTime<Utc>,
    ) -> Result<CandidateId> {
        if self.emergency.is_emergency_stopped {
            return Err(ElectionError::state(
                "election has been emergency-stopped",
            ));
        }
        if now >= self.config.candidate_deadline {
            return Err(ElectionError::state(
                "candidate registration deadline has passed",
            ));
        }
        if !self.config.open_candidate_registration && !self.is_owner(caller) {
            return Err(ElectionError::unauthorized(
                "only the owner may register candidates in this election",
            ));
        }
        self.candidates.check_new(&name, caller)?;

        let candidate_id = self
            .candidates
            .insert(name.clone(), description, caller.clone());
        self.emit(
            now,
            EventKind::CandidateRegistered {
                candidate_id,
                name,
                registrant: caller.clone(),
            },
        );
        Ok(candidate_id)
    }

    /// Add identities to the whitelist. Returns how many were newly added.
    pub fn add_eligible_voters(
        &mut self,
        caller: &Identity,
        voters: &[Identity],
        now: DateTime<Utc>,
    ) -> Result<usize> {
        self.check_whitelist_edit(caller, now)?;

        let mut added = 0;
        for voter in voters {
            if self.voters.grant(voter) {
                added += 1;
                self.emit(
                    now,
                    EventKind::VoterEligibilityChanged {
                        voter: voter.clone(),
                        eligible: true,
                    },
                );
            }
        }
        Ok(added)
    }

    /// Strike identities off the whitelist. Returns how many were actually removed.
    pub fn remove_eligible_voters(
        &mut self,
        caller: &Identity,
        voters: &[Identity],
        now: DateTime<Utc>,
    ) -> Result<usize> {
        self.check_whitelist_edit(caller, now)?;

        let mut removed = 0;
        for voter in voters {
            if self.voters.revoke(voter) {
                removed += 1;
                self.emit(
                    now,
                    EventKind::VoterEligibilityChanged {
                        voter: voter.clone(),
                        eligible: false,
                    },
                );
            }
        }
        Ok(removed)
    }

    /// The checks [`Election::register_to_vote`] makes before looking at holdings.
    ///
    /// Returns the asset whose balance must be fetched for `caller`, if any.
    pub fn check_can_register(
        &self,
        caller: &Identity,
        now: DateTime<Utc>,
    ) -> Result<Option<AssetRef>> {
        if self.voters.record(caller).has_registered_to_vote {
            return Err(ElectionError::already_done(format!(
                "{caller} is already registered"
            )));
        }
        self.require_phase(now, Phase::NotStarted, "voters can only register")?;
        Ok(self.eligibility.holdings_asset().cloned())
    }

    /// Fails if the holdings asset is no longer `queried`, e.g. because the
    /// settings changed while a balance was being fetched.
    pub fn confirm_holdings_asset(&self, queried: Option<&AssetRef>) -> Result<()> {
        if self.eligibility.holdings_asset() != queried {
            return Err(ElectionError::state(
                "eligibility settings changed during registration",
            ));
        }
        Ok(())
    }

    /// Register `caller` to vote.
    ///
    /// `holdings` is the oracle's balance of [`EligibilityPolicy::holdings_asset`]
    /// for the caller, and is only consulted by holdings-based policies.
    pub fn register_to_vote(
        &mut self,
        caller: &Identity,
        holdings: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.check_can_register(caller, now)?;
        let record = self.voters.record(caller);
        self.eligibility.admit(record.is_eligible, holdings)?;

        self.voters.register(caller);
        self.emit(
            now,
            EventKind::VoterRegistered {
                voter: caller.clone(),
            },
        );
        Ok(())
    }

    /// Cast a direct vote.
    pub fn vote(
        &mut self,
        caller: &Identity,
        candidate_id: CandidateId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.require_phase(now, Phase::Ongoing, "votes can only be cast")?;
        if self.config.use_commit_reveal {
            return Err(ElectionError::state(
                "this election uses commit-reveal; commit a hash instead",
            ));
        }
        self.require_eligible(caller)?;
        self.require_not_voted(caller)?;
        self.candidates.votable(candidate_id)?;

        self.tally(caller, candidate_id);
        self.emit(
            now,
            EventKind::VoteCast {
                voter: caller.clone(),
            },
        );
        Ok(())
    }

    /// Commit to a ballot without disclosing it.
    pub fn commit_vote(
        &mut self,
        caller: &Identity,
        commit_hash: CommitHash,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.require_phase(now, Phase::Ongoing, "commitments can only be made")?;
        if !self.config.use_commit_reveal {
            return Err(ElectionError::state(
                "this election does not use commit-reveal",
            ));
        }
        self.require_eligible(caller)?;
        if self.commits.has_committed(caller) {
            return Err(ElectionError::already_done(format!(
                "{caller} has already committed a vote"
            )));
        }
        self.require_not_voted(caller)?;

        self.commits.commit(caller, commit_hash);
        self.emit(
            now,
            EventKind::VoteCommitted {
                voter: caller.clone(),
            },
        );
        Ok(())
    }

    /// Open a previous commitment, counting the vote if it matches.
    pub fn reveal_vote(
        &mut self,
        caller: &Identity,
        candidate_id: CandidateId,
        nonce: u128,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let reveal_deadline = self.reveal_deadline.ok_or_else(|| {
            ElectionError::state("this election does not use commit-reveal")
        })?;
        if now <= self.config.end_time {
            return Err(ElectionError::state(
                "votes can only be revealed after voting has ended",
            ));
        }
        if now > reveal_deadline {
            return Err(ElectionError::state("the reveal deadline has passed"));
        }
        self.require_eligible(caller)?;
        let commit = self.commits.pending(caller)?;
        self.require_not_voted(caller)?;
        self.candidates.votable(candidate_id)?;
        if !commit.opens_to(candidate_id, nonce, caller) {
            return Err(ElectionError::integrity(
                "revealed ballot does not match the commitment",
            ));
        }

        self.commits.mark_revealed(caller);
        self.tally(caller, candidate_id);
        self.emit(
            now,
            EventKind::VoteRevealed {
                voter: caller.clone(),
            },
        );
        Ok(())
    }

    /// Announce that reveals are open. Purely informational.
    pub fn start_reveal_phase(&mut self, caller: &Identity, now: DateTime<Utc>) -> Result<()> {
        self.require_owner(caller, "start the reveal phase")?;
        if !self.config.use_commit_reveal {
            return Err(ElectionError::state(
                "this election does not use commit-reveal",
            ));
        }
        self.require_phase(now, Phase::Ended, "the reveal phase can only start")?;
        if self.commits.reveal_phase_started() {
            return Err(ElectionError::already_done(
                "the reveal phase has already started",
            ));
        }

        self.commits.start_reveal_phase();
        self.emit(
            now,
            EventKind::RevealPhaseStarted {
                owner: caller.clone(),
            },
        );
        Ok(())
    }

    /// Current tallies, subject to the visibility rules.
    pub fn results(&self, caller: Option<&Identity>, now: DateTime<Utc>) -> Result<ElectionResults> {
        self.require_results_visible(caller, now)?;
        Ok(ElectionResults {
            candidates: self.candidates.active().map(CandidateTally::from).collect(),
            total_votes: self.total_votes,
            participation_rate: results::participation_rate(
                self.total_votes,
                self.voters.total_eligible_voters(),
            ),
        })
    }

    /// The winning candidate of a finished winner-takes-all election.
    pub fn winner(&self, caller: Option<&Identity>, now: DateTime<Utc>) -> Result<CandidateTally> {
        self.require_final_tally(TallyMode::WinnerTakesAll, caller, now)?;
        results::winner(self.candidates.active())
            .ok_or_else(|| ElectionError::not_found("no active candidates"))
    }

    /// The ranked candidates of a finished leaderboard election.
    pub fn leaderboard(
        &self,
        caller: Option<&Identity>,
        now: DateTime<Utc>,
    ) -> Result<Vec<CandidateTally>> {
        self.require_final_tally(TallyMode::Leaderboard, caller, now)?;
        Ok(results::leaderboard(self.candidates.active()))
    }

    /// End the election immediately. Results are hidden until the owner re-enables them.
    pub fn emergency_stop(&mut self, caller: &Identity, now: DateTime<Utc>) -> Result<()> {
        self.require_owner(caller, "stop the election")?;
        self.emergency.check_can_stop()?;

        self.config.end_time = self.config.end_time.min(now);
        self.reveal_deadline = self.config.reveal_deadline();
        self.emergency.stop(now);
        self.emit(
            now,
            EventKind::EmergencyStopped {
                owner: caller.clone(),
            },
        );
        Ok(())
    }

    pub fn enable_results_after_emergency(
        &mut self,
        caller: &Identity,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.set_results_after_emergency(caller, true, now)
    }

    pub fn disable_results_after_emergency(
        &mut self,
        caller: &Identity,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.set_results_after_emergency(caller, false, now)
    }

    pub fn id(&self) -> ElectionId {
        self.id
    }

    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    pub fn is_owner(&self, identity: &Identity) -> bool {
        &self.owner == identity
    }

    pub fn config(&self) -> &ElectionConfig {
        &self.config
    }

    pub fn eligibility(&self) -> &EligibilityPolicy {
        &self.eligibility
    }

    pub fn reveal_deadline(&self) -> Option<DateTime<Utc>> {
        self.reveal_deadline
    }

    pub fn reveal_phase_started(&self) -> bool {
        self.commits.reveal_phase_started()
    }

    pub fn emergency(&self) -> &EmergencyState {
        &self.emergency
    }

    pub fn candidate(&self, id: CandidateId) -> Result<&Candidate> {
        self.candidates.get(id)
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn candidate_count(&self) -> u32 {
        self.candidates.count()
    }

    pub fn voter(&self, identity: &Identity) -> VoterRecord {
        self.voters.record(identity)
    }

    pub fn commitment(&self, identity: &Identity) -> Option<&VoteCommit> {
        self.commits.get(identity)
    }

    pub fn total_votes(&self) -> u64 {
        self.total_votes
    }

    pub fn total_eligible_voters(&self) -> u64 {
        self.voters.total_eligible_voters()
    }

    pub fn total_registered_voters(&self) -> u64 {
        self.voters.total_registered_voters()
    }

    /// All notifications emitted so far, oldest first.
    pub fn events(&self) -> &[ElectionEvent] {
        &self.events
    }

    fn require_owner(&self, caller: &Identity, action: &str) -> Result<()> {
        if !self.is_owner(caller) {
            return Err(ElectionError::unauthorized(format!(
                "only the owner may {action}"
            )));
        }
        Ok(())
    }

    fn require_phase(&self, now: DateTime<Utc>, expected: Phase, action: &str) -> Result<()> {
        let status = self.status(now);
        if status != expected {
            return Err(ElectionError::state(format!(
                "{action} while the election is {expected}, but it is {status}"
            )));
        }
        Ok(())
    }

    fn require_eligible(&self, caller: &Identity) -> Result<()> {
        if !self.voters.is_eligible(caller) {
            return Err(ElectionError::unauthorized(format!(
                "{caller} is not eligible to vote"
            )));
        }
        Ok(())
    }

    fn require_not_voted(&self, caller: &Identity) -> Result<()> {
        if self.voters.record(caller).has_voted {
            return Err(ElectionError::already_done(format!(
                "{caller} has already voted"
            )));
        }
        Ok(())
    }

    /// Whether `caller` may currently see per-candidate vote counts.
    pub fn results_visible_to(&self, caller: Option<&Identity>, now: DateTime<Utc>) -> bool {
        let caller_is_owner = caller.map_or(false, |caller| self.is_owner(caller));
        results::results_visible(
            &self.config,
            self.status(now),
            &self.emergency,
            caller_is_owner,
        )
    }

    fn require_results_visible(&self, caller: Option<&Identity>, now: DateTime<Utc>) -> Result<()> {
        if !self.results_visible_to(caller, now) {
            return Err(ElectionError::unauthorized("results are not visible yet"));
        }
        Ok(())
    }

    fn require_final_tally(
        &self,
        mode: TallyMode,
        caller: Option<&Identity>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.require_phase(now, Phase::Ended, "final tallies are only available")?;
        if self.config.tally_mode != mode {
            return Err(ElectionError::state(format!(
                "election is tallied as {:?}",
                self.config.tally_mode
            )));
        }
        self.require_results_visible(caller, now)
    }

    fn check_whitelist_edit(&self, caller: &Identity, now: DateTime<Utc>) -> Result<()> {
        self.require_owner(caller, "edit the whitelist")?;
        if !self.eligibility.uses_whitelist() {
            return Err(ElectionError::state("election does not use a whitelist"));
        }
        self.require_phase(now, Phase::NotStarted, "the whitelist can only change")
    }

    fn set_results_after_emergency(
        &mut self,
        caller: &Identity,
        visible: bool,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.require_owner(caller, "change results visibility")?;
        self.emergency.check_stopped()?;

        self.emergency.allow_results_after_emergency = visible;
        self.emit(now, EventKind::ResultsVisibilityChanged { visible });
        Ok(())
    }

    /// Count one vote as a single unit: voter flag, candidate count, total.
    fn tally(&mut self, voter: &Identity, candidate_id: CandidateId) {
        self.voters.mark_voted(voter);
        self.candidates.record_vote(candidate_id);
        self.total_votes += 1;
    }

    fn emit(&mut self, now: DateTime<Utc>, kind: EventKind) {
        info!("Election {}: {kind}", self.id);
        self.events.push(ElectionEvent { at: now, kind });
    }
}

/// Example data for tests.
#[cfg(test)]
pub mod examples {
    use super::*;
    use crate::model::election::config::examples::t0;

    pub fn identity(name: &str) -> Identity {
        Identity::new(name).unwrap()
    }

    pub fn owner() -> Identity {
        identity("owner")
    }

    impl Election {
        pub fn example(config: ElectionConfig, eligibility: EligibilityPolicy) -> Self {
            Self::new(0, owner(), config, eligibility, t0()).unwrap()
        }
    }
}
