//! Error taxonomy for engine operations.
//!
//! Three families of outcome exist and only the first two live here:
//! validation errors and precondition conflicts are `EngineError` variants;
//! negative results ("no eligible guide", "no slot found") are ordinary
//! `Ok` values carried by the report types in [`crate::api`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::{PanelId, TeamId, UserId};
use crate::db::RepositoryError;
use crate::models::schedule::SlotType;
use crate::models::user::Role;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// One team's failed review-sequence check inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceViolation {
    pub team: TeamId,
    pub slot_type: SlotType,
    /// Prior stages that have no live entry yet.
    pub missing: Vec<SlotType>,
}

impl std::fmt::Display for SequenceViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let missing: Vec<String> = self.missing.iter().map(|s| s.to_string()).collect();
        write!(
            f,
            "team {}: {} requires {} to be scheduled first",
            self.team,
            self.slot_type,
            missing.join(", ")
        )
    }
}

/// Errors surfaced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The user does not hold the role the operation requires.
    #[error("user {user} does not hold the {role} role")]
    InvalidRole { user: UserId, role: Role },

    /// The team's guide sits on the panel being assigned.
    #[error("guide {guide} is a member or coordinator of panel {panel}")]
    ConflictOfInterest { guide: UserId, panel: PanelId },

    /// The team already has a panel.
    #[error("team {team} already has a panel assigned")]
    AlreadyAssigned { team: TeamId },

    /// The guide request is no longer pending.
    #[error("guide request for team {team} was already processed")]
    AlreadyProcessed { team: TeamId },

    /// A scheduled entry already occupies this (team, panel, period) key.
    #[error("duplicate slot for team {team} starting {start}")]
    DuplicateSlot { team: TeamId, start: NaiveDateTime },

    /// Batch sequence validation failed; nothing was written.
    #[error("review sequence violated for {} team(s)", violations.len())]
    SequenceViolation { violations: Vec<SequenceViolation> },

    /// The admin has not configured the review period window.
    #[error("review period is not set")]
    ReviewPeriodNotSet,

    /// Malformed or missing input, rejected before any state change.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Underlying store failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl EngineError {
    /// Map a repository `NotFound` onto the typed engine variant, passing
    /// every other repository error through unchanged.
    pub(crate) fn on_missing(entity: &'static str, id: i64) -> impl FnOnce(RepositoryError) -> Self {
        move |err| {
            if err.is_not_found() {
                EngineError::NotFound { entity, id }
            } else {
                EngineError::Repository(err)
            }
        }
    }
}
