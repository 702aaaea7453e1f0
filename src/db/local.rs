//! In-memory repository for unit testing and local development.
//!
//! All records live behind one `parking_lot::RwLock`; every conditional
//! write checks its precondition and mutates under the same write guard,
//! which gives the atomic match-on-precondition semantics the trait
//! requires.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::api::{PanelId, ScheduleId, TeamId, UserId};
use crate::db::error::{ErrorContext, RepositoryError, RepositoryResult};
use crate::db::models::{NewPanel, NewScheduleEntry, NewTeam, NewUser};
use crate::db::repository::ReviewRepository;
use crate::models::availability::{Availability, AvailabilityRole};
use crate::models::config::ReviewConfig;
use crate::models::panel::Panel;
use crate::models::schedule::{ScheduleEntry, ScheduleStatus};
use crate::models::team::{Team, TeamStatus};
use crate::models::time::TimeSlot;
use crate::models::user::User;

#[derive(Default)]
struct Store {
    teams: HashMap<i64, Team>,
    users: HashMap<i64, User>,
    panels: HashMap<i64, Panel>,
    availability: HashMap<(i64, AvailabilityRole), Vec<TimeSlot>>,
    schedules: HashMap<i64, ScheduleEntry>,
    config: ReviewConfig,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory implementation of [`ReviewRepository`].
#[derive(Default)]
pub struct LocalRepository {
    store: RwLock<Store>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn team_not_found(id: TeamId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("team {} does not exist", id),
        ErrorContext::default().with_entity("team").with_entity_id(id),
    )
}

fn user_not_found(id: UserId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("user {} does not exist", id),
        ErrorContext::default().with_entity("user").with_entity_id(id),
    )
}

fn panel_not_found(id: PanelId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("panel {} does not exist", id),
        ErrorContext::default().with_entity("panel").with_entity_id(id),
    )
}

fn schedule_not_found(id: ScheduleId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("schedule entry {} does not exist", id),
        ErrorContext::default()
            .with_entity("schedule")
            .with_entity_id(id),
    )
}

fn sorted_by_id<T: Clone>(map: &HashMap<i64, T>) -> Vec<T> {
    let mut ids: Vec<i64> = map.keys().copied().collect();
    ids.sort_unstable();
    ids.into_iter().map(|id| map[&id].clone()).collect()
}

#[async_trait]
impl ReviewRepository for LocalRepository {
    // -------- teams --------

    async fn insert_team(&self, team: NewTeam) -> RepositoryResult<Team> {
        let mut store = self.store.write();
        let id = store.next_id();
        let team = Team {
            id: TeamId::new(id),
            name: team.name,
            leader: team.leader,
            members: team.members,
            guide_preference: None,
            rejected_guides: Vec::new(),
            status: TeamStatus::Pending,
            panel: None,
            coordinator: None,
        };
        store.teams.insert(id, team.clone());
        Ok(team)
    }

    async fn get_team(&self, id: TeamId) -> RepositoryResult<Team> {
        self.store
            .read()
            .teams
            .get(&id.value())
            .cloned()
            .ok_or_else(|| team_not_found(id))
    }

    async fn list_teams(&self) -> RepositoryResult<Vec<Team>> {
        let store = self.store.read();
        Ok(sorted_by_id(&store.teams))
    }

    async fn delete_team(&self, id: TeamId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        store
            .teams
            .remove(&id.value())
            .map(|_| ())
            .ok_or_else(|| team_not_found(id))
    }

    async fn set_guide(&self, team: TeamId, guide: UserId) -> RepositoryResult<Team> {
        let mut store = self.store.write();
        let record = store
            .teams
            .get_mut(&team.value())
            .ok_or_else(|| team_not_found(team))?;
        record.guide_preference = Some(guide);
        record.status = TeamStatus::Approved;
        Ok(record.clone())
    }

    async fn assign_guide_if_needed(
        &self,
        team: TeamId,
        guide: UserId,
    ) -> RepositoryResult<Team> {
        let mut store = self.store.write();
        let record = store
            .teams
            .get_mut(&team.value())
            .ok_or_else(|| team_not_found(team))?;
        if !record.needs_guide() {
            return Err(RepositoryError::conflict_with_context(
                format!("team {} no longer needs a guide", team),
                ErrorContext::new("assign_guide_if_needed")
                    .with_entity("team")
                    .with_entity_id(team),
            ));
        }
        if record.has_rejected(guide) {
            return Err(RepositoryError::conflict_with_context(
                format!("team {} has rejected guide {}", team, guide),
                ErrorContext::new("assign_guide_if_needed")
                    .with_entity("team")
                    .with_entity_id(team),
            ));
        }
        record.guide_preference = Some(guide);
        record.status = TeamStatus::Approved;
        Ok(record.clone())
    }

    async fn request_guide(&self, team: TeamId, guide: UserId) -> RepositoryResult<Team> {
        let mut store = self.store.write();
        let record = store
            .teams
            .get_mut(&team.value())
            .ok_or_else(|| team_not_found(team))?;
        record.guide_preference = Some(guide);
        record.status = TeamStatus::Pending;
        Ok(record.clone())
    }

    async fn accept_request_if_pending(
        &self,
        team: TeamId,
        guide: UserId,
    ) -> RepositoryResult<Team> {
        let mut store = self.store.write();
        let record = store
            .teams
            .get_mut(&team.value())
            .ok_or_else(|| team_not_found(team))?;
        if record.guide_preference != Some(guide) || record.status != TeamStatus::Pending {
            return Err(RepositoryError::conflict_with_context(
                format!("no pending request from team {} for guide {}", team, guide),
                ErrorContext::new("accept_request_if_pending")
                    .with_entity("team")
                    .with_entity_id(team),
            ));
        }
        record.status = TeamStatus::Approved;
        Ok(record.clone())
    }

    async fn reject_request_if_pending(
        &self,
        team: TeamId,
        guide: UserId,
    ) -> RepositoryResult<Team> {
        let mut store = self.store.write();
        let record = store
            .teams
            .get_mut(&team.value())
            .ok_or_else(|| team_not_found(team))?;
        if record.guide_preference != Some(guide) || record.status != TeamStatus::Pending {
            return Err(RepositoryError::conflict_with_context(
                format!("no pending request from team {} for guide {}", team, guide),
                ErrorContext::new("reject_request_if_pending")
                    .with_entity("team")
                    .with_entity_id(team),
            ));
        }
        record.guide_preference = None;
        record.status = TeamStatus::Rejected;
        if !record.rejected_guides.contains(&guide) {
            record.rejected_guides.push(guide);
        }
        Ok(record.clone())
    }

    async fn assign_panel_if_unassigned(
        &self,
        team: TeamId,
        panel: PanelId,
        coordinator: UserId,
    ) -> RepositoryResult<Team> {
        let mut store = self.store.write();
        let record = store
            .teams
            .get_mut(&team.value())
            .ok_or_else(|| team_not_found(team))?;
        if record.panel.is_some() {
            return Err(RepositoryError::conflict_with_context(
                format!("team {} already has a panel", team),
                ErrorContext::new("assign_panel_if_unassigned")
                    .with_entity("team")
                    .with_entity_id(team),
            ));
        }
        record.panel = Some(panel);
        record.coordinator = Some(coordinator);
        Ok(record.clone())
    }

    async fn clear_panel(&self, team: TeamId) -> RepositoryResult<Team> {
        let mut store = self.store.write();
        let record = store
            .teams
            .get_mut(&team.value())
            .ok_or_else(|| team_not_found(team))?;
        record.panel = None;
        record.coordinator = None;
        Ok(record.clone())
    }

    async fn set_team_coordinator(
        &self,
        team: TeamId,
        coordinator: Option<UserId>,
    ) -> RepositoryResult<Team> {
        let mut store = self.store.write();
        let record = store
            .teams
            .get_mut(&team.value())
            .ok_or_else(|| team_not_found(team))?;
        record.coordinator = coordinator;
        Ok(record.clone())
    }

    async fn remove_team_member(&self, team: TeamId, user: UserId) -> RepositoryResult<Team> {
        let mut store = self.store.write();
        let record = store
            .teams
            .get_mut(&team.value())
            .ok_or_else(|| team_not_found(team))?;
        if record.leader == Some(user) {
            record.leader = None;
        }
        record.members.retain(|m| *m != user);
        Ok(record.clone())
    }

    async fn clear_guide(&self, team: TeamId) -> RepositoryResult<Team> {
        let mut store = self.store.write();
        let record = store
            .teams
            .get_mut(&team.value())
            .ok_or_else(|| team_not_found(team))?;
        record.guide_preference = None;
        record.status = TeamStatus::Pending;
        Ok(record.clone())
    }

    // -------- users --------

    async fn insert_user(&self, user: NewUser) -> RepositoryResult<User> {
        let mut store = self.store.write();
        let id = store.next_id();
        let user = User {
            id: UserId::new(id),
            name: user.name,
            roles: user.roles,
            member_type: user.member_type,
        };
        store.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<User> {
        self.store
            .read()
            .users
            .get(&id.value())
            .cloned()
            .ok_or_else(|| user_not_found(id))
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        let store = self.store.read();
        Ok(sorted_by_id(&store.users))
    }

    async fn delete_user(&self, id: UserId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        store
            .users
            .remove(&id.value())
            .map(|_| ())
            .ok_or_else(|| user_not_found(id))
    }

    // -------- panels --------

    async fn insert_panel(&self, panel: NewPanel) -> RepositoryResult<Panel> {
        let mut store = self.store.write();
        let id = store.next_id();
        let panel = Panel {
            id: PanelId::new(id),
            members: panel.members,
            coordinator: panel.coordinator,
        };
        store.panels.insert(id, panel.clone());
        Ok(panel)
    }

    async fn get_panel(&self, id: PanelId) -> RepositoryResult<Panel> {
        self.store
            .read()
            .panels
            .get(&id.value())
            .cloned()
            .ok_or_else(|| panel_not_found(id))
    }

    async fn list_panels(&self) -> RepositoryResult<Vec<Panel>> {
        let store = self.store.read();
        Ok(sorted_by_id(&store.panels))
    }

    async fn update_panel(&self, panel: Panel) -> RepositoryResult<Panel> {
        let mut store = self.store.write();
        let id = panel.id;
        match store.panels.get_mut(&id.value()) {
            Some(record) => {
                *record = panel.clone();
                Ok(panel)
            }
            None => Err(panel_not_found(id)),
        }
    }

    async fn delete_panel(&self, id: PanelId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        store
            .panels
            .remove(&id.value())
            .map(|_| ())
            .ok_or_else(|| panel_not_found(id))
    }

    // -------- availability --------

    async fn put_availability(&self, availability: Availability) -> RepositoryResult<()> {
        let mut store = self.store.write();
        store.availability.insert(
            (availability.owner.value(), availability.role),
            availability.intervals,
        );
        Ok(())
    }

    async fn availability_for(
        &self,
        owner: UserId,
        role: AvailabilityRole,
    ) -> RepositoryResult<Vec<TimeSlot>> {
        let store = self.store.read();
        Ok(store
            .availability
            .get(&(owner.value(), role))
            .cloned()
            .unwrap_or_default())
    }

    // -------- schedules --------

    async fn insert_schedule(&self, entry: NewScheduleEntry) -> RepositoryResult<ScheduleEntry> {
        let mut store = self.store.write();

        // Both uniqueness checks run under the write guard so that two
        // racing bookings cannot both pass.
        for existing in store.schedules.values() {
            if existing.status != ScheduleStatus::Scheduled {
                continue;
            }
            if existing.team == entry.team && existing.slot_type == entry.slot_type {
                return Err(RepositoryError::conflict_with_context(
                    format!(
                        "team {} already has a scheduled {} entry",
                        entry.team, entry.slot_type
                    ),
                    ErrorContext::new("insert_schedule")
                        .with_entity("schedule")
                        .with_entity_id(existing.id),
                ));
            }
            if existing.team == entry.team
                && existing.panel == entry.panel
                && existing.start == entry.start
            {
                return Err(RepositoryError::conflict_with_context(
                    format!(
                        "slot at {} already booked for team {} and panel {}",
                        entry.start, entry.team, entry.panel
                    ),
                    ErrorContext::new("insert_schedule")
                        .with_entity("schedule")
                        .with_entity_id(existing.id),
                ));
            }
        }

        let id = store.next_id();
        let entry = ScheduleEntry {
            id: ScheduleId::new(id),
            team: entry.team,
            panel: entry.panel,
            slot_type: entry.slot_type,
            start: entry.start,
            end: entry.end,
            status: ScheduleStatus::Scheduled,
            is_notified: false,
        };
        store.schedules.insert(id, entry.clone());
        Ok(entry)
    }

    async fn get_schedule(&self, id: ScheduleId) -> RepositoryResult<ScheduleEntry> {
        self.store
            .read()
            .schedules
            .get(&id.value())
            .cloned()
            .ok_or_else(|| schedule_not_found(id))
    }

    async fn schedules_for_team(&self, team: TeamId) -> RepositoryResult<Vec<ScheduleEntry>> {
        let store = self.store.read();
        let mut entries: Vec<ScheduleEntry> = store
            .schedules
            .values()
            .filter(|e| e.team == team)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.id.value());
        Ok(entries)
    }

    async fn scheduled_entries(&self) -> RepositoryResult<Vec<ScheduleEntry>> {
        let store = self.store.read();
        let mut entries: Vec<ScheduleEntry> = store
            .schedules
            .values()
            .filter(|e| e.status == ScheduleStatus::Scheduled)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.id.value());
        Ok(entries)
    }

    async fn mark_notified(&self, id: ScheduleId) -> RepositoryResult<ScheduleEntry> {
        let mut store = self.store.write();
        let record = store
            .schedules
            .get_mut(&id.value())
            .ok_or_else(|| schedule_not_found(id))?;
        // false -> true exactly once; setting an already-true flag is a no-op.
        record.is_notified = true;
        Ok(record.clone())
    }

    async fn set_schedule_status(
        &self,
        id: ScheduleId,
        status: ScheduleStatus,
    ) -> RepositoryResult<ScheduleEntry> {
        let mut store = self.store.write();
        let record = store
            .schedules
            .get_mut(&id.value())
            .ok_or_else(|| schedule_not_found(id))?;
        record.status = status;
        Ok(record.clone())
    }

    async fn delete_schedules_for_team(&self, team: TeamId) -> RepositoryResult<usize> {
        let mut store = self.store.write();
        let before = store.schedules.len();
        store.schedules.retain(|_, e| e.team != team);
        Ok(before - store.schedules.len())
    }

    async fn delete_schedules_for_panel(&self, panel: PanelId) -> RepositoryResult<usize> {
        let mut store = self.store.write();
        let before = store.schedules.len();
        store.schedules.retain(|_, e| e.panel != panel);
        Ok(before - store.schedules.len())
    }

    // -------- config --------

    async fn load_config(&self) -> RepositoryResult<ReviewConfig> {
        Ok(self.store.read().config.clone())
    }

    async fn store_config(&self, config: ReviewConfig) -> RepositoryResult<()> {
        self.store.write().config = config;
        Ok(())
    }
}
