//! Abstract repository interface for the review engine.
//!
//! Every state transition that depends on a precondition is exposed as a
//! single conditional operation (match-on-precondition, write-if-matched)
//! so that implementations can close the read-then-write race window. A
//! failed precondition surfaces as [`RepositoryError::Conflict`]; callers
//! either retry against fresh state or report the conflict, never block.

use async_trait::async_trait;

use crate::api::{PanelId, ScheduleId, TeamId, UserId};
use crate::db::error::RepositoryResult;
use crate::db::models::{NewPanel, NewScheduleEntry, NewTeam, NewUser};
use crate::models::availability::{Availability, AvailabilityRole};
use crate::models::config::ReviewConfig;
use crate::models::panel::Panel;
use crate::models::schedule::{ScheduleEntry, ScheduleStatus};
use crate::models::team::Team;
use crate::models::time::TimeSlot;
use crate::models::user::User;

/// Storage backend for teams, users, panels, availability, schedules and
/// the admin config singleton.
///
/// Listing operations return records in ascending id order; bulk engine
/// runs rely on that as their stable processing order.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    // -------- teams --------

    async fn insert_team(&self, team: NewTeam) -> RepositoryResult<Team>;
    async fn get_team(&self, id: TeamId) -> RepositoryResult<Team>;
    async fn list_teams(&self) -> RepositoryResult<Vec<Team>>;
    async fn delete_team(&self, id: TeamId) -> RepositoryResult<()>;

    /// Admin override: set the guide and mark the team approved,
    /// unconditionally.
    async fn set_guide(&self, team: TeamId, guide: UserId) -> RepositoryResult<Team>;

    /// Bulk-assignment write: succeeds only while the team still needs a
    /// guide and has not rejected this one. Conflict otherwise.
    async fn assign_guide_if_needed(&self, team: TeamId, guide: UserId)
        -> RepositoryResult<Team>;

    /// Team (re)requests a guide: sets the preference and resets the
    /// status to pending.
    async fn request_guide(&self, team: TeamId, guide: UserId) -> RepositoryResult<Team>;

    /// Approve only if this guide's request is still pending. Conflict
    /// when the request was already processed or belongs to another guide.
    async fn accept_request_if_pending(
        &self,
        team: TeamId,
        guide: UserId,
    ) -> RepositoryResult<Team>;

    /// Reject only if this guide's request is still pending: clears the
    /// preference, marks the team rejected and appends the guide to the
    /// team's rejected list (append-only, deduplicated).
    async fn reject_request_if_pending(
        &self,
        team: TeamId,
        guide: UserId,
    ) -> RepositoryResult<Team>;

    /// Attach a panel only while the team has none, copying the panel's
    /// coordinator onto the team. Conflict when a panel is already set.
    async fn assign_panel_if_unassigned(
        &self,
        team: TeamId,
        panel: PanelId,
        coordinator: UserId,
    ) -> RepositoryResult<Team>;

    /// Detach the panel and the derived coordinator.
    async fn clear_panel(&self, team: TeamId) -> RepositoryResult<Team>;

    /// Recompute the denormalized coordinator after a panel mutation.
    async fn set_team_coordinator(
        &self,
        team: TeamId,
        coordinator: Option<UserId>,
    ) -> RepositoryResult<Team>;

    /// Drop a user from the team's leader/member slots.
    async fn remove_team_member(&self, team: TeamId, user: UserId) -> RepositoryResult<Team>;

    /// Cascade helper: drop the guide preference and fall back to pending.
    async fn clear_guide(&self, team: TeamId) -> RepositoryResult<Team>;

    // -------- users --------

    async fn insert_user(&self, user: NewUser) -> RepositoryResult<User>;
    async fn get_user(&self, id: UserId) -> RepositoryResult<User>;
    async fn list_users(&self) -> RepositoryResult<Vec<User>>;
    async fn delete_user(&self, id: UserId) -> RepositoryResult<()>;

    // -------- panels --------

    async fn insert_panel(&self, panel: NewPanel) -> RepositoryResult<Panel>;
    async fn get_panel(&self, id: PanelId) -> RepositoryResult<Panel>;
    async fn list_panels(&self) -> RepositoryResult<Vec<Panel>>;
    async fn update_panel(&self, panel: Panel) -> RepositoryResult<Panel>;
    async fn delete_panel(&self, id: PanelId) -> RepositoryResult<()>;

    // -------- availability (engine reads; the CRUD layer writes) --------

    /// Replace one user's submission for one role context. Submissions
    /// implicitly belong to the active review window; a new window starts
    /// with fresh submissions rather than layering keyed histories.
    async fn put_availability(&self, availability: Availability) -> RepositoryResult<()>;

    /// Intervals one user submitted for one role context; empty when none.
    async fn availability_for(
        &self,
        owner: UserId,
        role: AvailabilityRole,
    ) -> RepositoryResult<Vec<TimeSlot>>;

    // -------- schedules --------

    /// Persist a booking, enforcing at write time that the team has no
    /// live entry for this stage and that `(team, panel, start)` is free.
    /// Conflict on either violation.
    async fn insert_schedule(&self, entry: NewScheduleEntry) -> RepositoryResult<ScheduleEntry>;

    async fn get_schedule(&self, id: ScheduleId) -> RepositoryResult<ScheduleEntry>;
    async fn schedules_for_team(&self, team: TeamId) -> RepositoryResult<Vec<ScheduleEntry>>;

    /// All entries currently in `Scheduled` status, across every team.
    async fn scheduled_entries(&self) -> RepositoryResult<Vec<ScheduleEntry>>;

    /// Flip `is_notified` to true. Idempotent: an already-notified entry
    /// is returned unchanged.
    async fn mark_notified(&self, id: ScheduleId) -> RepositoryResult<ScheduleEntry>;

    async fn set_schedule_status(
        &self,
        id: ScheduleId,
        status: ScheduleStatus,
    ) -> RepositoryResult<ScheduleEntry>;

    /// Cascade helpers; return how many entries were removed.
    async fn delete_schedules_for_team(&self, team: TeamId) -> RepositoryResult<usize>;
    async fn delete_schedules_for_panel(&self, panel: PanelId) -> RepositoryResult<usize>;

    // -------- config --------

    async fn load_config(&self) -> RepositoryResult<ReviewConfig>;
    async fn store_config(&self, config: ReviewConfig) -> RepositoryResult<()>;
}
