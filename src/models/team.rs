use serde::{Deserialize, Serialize};

use crate::api::{PanelId, TeamId, UserId};

/// Guide-request lifecycle of a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    Pending,
    Approved,
    Rejected,
}

/// A project team.
///
/// Invariants maintained by the engine:
/// - `status == Approved` implies `guide_preference.is_some()`.
/// - `rejected_guides` is append-only and deduplicated; automatic
///   assignment never picks a guide listed there.
/// - `coordinator` is derived from `panel` and recomputed on every panel
///   assignment/mutation, never edited independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub leader: Option<UserId>,
    pub members: Vec<UserId>,
    pub guide_preference: Option<UserId>,
    pub rejected_guides: Vec<UserId>,
    pub status: TeamStatus,
    pub panel: Option<PanelId>,
    pub coordinator: Option<UserId>,
}

impl Team {
    pub fn has_rejected(&self, guide: UserId) -> bool {
        self.rejected_guides.contains(&guide)
    }

    /// Whether the team needs a guide picked by bulk assignment.
    pub fn needs_guide(&self) -> bool {
        self.guide_preference.is_none()
            || matches!(self.status, TeamStatus::Pending | TeamStatus::Rejected)
    }

    /// An empty team (no leader, no members) is deleted after any
    /// membership-reducing mutation.
    pub fn is_empty(&self) -> bool {
        self.leader.is_none() && self.members.is_empty()
    }
}
