use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{ElectionError, Result};

/// Owner-controlled emergency flags, independent of the phase clock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyState {
    pub is_emergency_stopped: bool,
    /// Results stay hidden after an emergency stop unless the owner opts in.
    pub allow_results_after_emergency: bool,
    pub stopped_at: Option<DateTime<Utc>>,
}

impl EmergencyState {
    pub(super) fn check_can_stop(&self) -> Result<()> {
        if self.is_emergency_stopped {
            return Err(ElectionError::already_done("election is already stopped"));
        }
        Ok(())
    }

    pub(super) fn check_stopped(&self) -> Result<()> {
        if !self.is_emergency_stopped {
            return Err(ElectionError::state("election has not been emergency-stopped"));
        }
        Ok(())
    }

    pub(super) fn stop(&mut self, now: DateTime<Utc>) {
        self.is_emergency_stopped = true;
        self.allow_results_after_emergency = false;
        self.stopped_at = Some(now);
    }
}
