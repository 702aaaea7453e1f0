//! Insert-side record shapes. Identifiers are allocated by the store.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::{PanelId, TeamId, UserId};
use crate::models::schedule::SlotType;
use crate::models::user::{MemberType, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    pub leader: Option<UserId>,
    pub members: Vec<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub roles: Vec<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_type: Option<MemberType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPanel {
    pub members: Vec<UserId>,
    pub coordinator: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewScheduleEntry {
    pub team: TeamId,
    pub panel: PanelId,
    pub slot_type: SlotType,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}
