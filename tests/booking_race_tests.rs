//! Booking behavior when a concurrent writer wins a uniqueness key first.

mod support;

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use review_engine::api::{PanelId, ScheduleId, TeamId, UserId};
use review_engine::db::models::{NewPanel, NewScheduleEntry, NewTeam, NewUser};
use review_engine::db::{LocalRepository, RepositoryResult, ReviewRepository};
use review_engine::engine;
use review_engine::models::{
    Availability, AvailabilityRole, Panel, ReviewConfig, ScheduleEntry, ScheduleStatus, SlotType,
    Team, TimeSlot, User,
};
use review_engine::EngineError;

use support::{add_faculty, add_guide, add_team, at, date, full_window_availability, review_config};
use review_engine::models::MemberType;

/// Delegates everything to an inner store, but slips one rival schedule
/// entry in just before the first insert, reproducing a writer that wins
/// the race between this request's read and its write.
struct ContendedRepository {
    inner: LocalRepository,
    rival: Mutex<Option<NewScheduleEntry>>,
}

impl ContendedRepository {
    fn new(inner: LocalRepository, rival: NewScheduleEntry) -> Self {
        Self {
            inner,
            rival: Mutex::new(Some(rival)),
        }
    }
}

#[async_trait]
impl ReviewRepository for ContendedRepository {
    async fn insert_team(&self, team: NewTeam) -> RepositoryResult<Team> {
        self.inner.insert_team(team).await
    }

    async fn get_team(&self, id: TeamId) -> RepositoryResult<Team> {
        self.inner.get_team(id).await
    }

    async fn list_teams(&self) -> RepositoryResult<Vec<Team>> {
        self.inner.list_teams().await
    }

    async fn delete_team(&self, id: TeamId) -> RepositoryResult<()> {
        self.inner.delete_team(id).await
    }

    async fn set_guide(&self, team: TeamId, guide: UserId) -> RepositoryResult<Team> {
        self.inner.set_guide(team, guide).await
    }

    async fn assign_guide_if_needed(
        &self,
        team: TeamId,
        guide: UserId,
    ) -> RepositoryResult<Team> {
        self.inner.assign_guide_if_needed(team, guide).await
    }

    async fn request_guide(&self, team: TeamId, guide: UserId) -> RepositoryResult<Team> {
        self.inner.request_guide(team, guide).await
    }

    async fn accept_request_if_pending(
        &self,
        team: TeamId,
        guide: UserId,
    ) -> RepositoryResult<Team> {
        self.inner.accept_request_if_pending(team, guide).await
    }

    async fn reject_request_if_pending(
        &self,
        team: TeamId,
        guide: UserId,
    ) -> RepositoryResult<Team> {
        self.inner.reject_request_if_pending(team, guide).await
    }

    async fn assign_panel_if_unassigned(
        &self,
        team: TeamId,
        panel: PanelId,
        coordinator: UserId,
    ) -> RepositoryResult<Team> {
        self.inner
            .assign_panel_if_unassigned(team, panel, coordinator)
            .await
    }

    async fn clear_panel(&self, team: TeamId) -> RepositoryResult<Team> {
        self.inner.clear_panel(team).await
    }

    async fn set_team_coordinator(
        &self,
        team: TeamId,
        coordinator: Option<UserId>,
    ) -> RepositoryResult<Team> {
        self.inner.set_team_coordinator(team, coordinator).await
    }

    async fn remove_team_member(&self, team: TeamId, user: UserId) -> RepositoryResult<Team> {
        self.inner.remove_team_member(team, user).await
    }

    async fn clear_guide(&self, team: TeamId) -> RepositoryResult<Team> {
        self.inner.clear_guide(team).await
    }

    async fn insert_user(&self, user: NewUser) -> RepositoryResult<User> {
        self.inner.insert_user(user).await
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<User> {
        self.inner.get_user(id).await
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        self.inner.list_users().await
    }

    async fn delete_user(&self, id: UserId) -> RepositoryResult<()> {
        self.inner.delete_user(id).await
    }

    async fn insert_panel(&self, panel: NewPanel) -> RepositoryResult<Panel> {
        self.inner.insert_panel(panel).await
    }

    async fn get_panel(&self, id: PanelId) -> RepositoryResult<Panel> {
        self.inner.get_panel(id).await
    }

    async fn list_panels(&self) -> RepositoryResult<Vec<Panel>> {
        self.inner.list_panels().await
    }

    async fn update_panel(&self, panel: Panel) -> RepositoryResult<Panel> {
        self.inner.update_panel(panel).await
    }

    async fn delete_panel(&self, id: PanelId) -> RepositoryResult<()> {
        self.inner.delete_panel(id).await
    }

    async fn put_availability(&self, availability: Availability) -> RepositoryResult<()> {
        self.inner.put_availability(availability).await
    }

    async fn availability_for(
        &self,
        owner: UserId,
        role: AvailabilityRole,
    ) -> RepositoryResult<Vec<TimeSlot>> {
        self.inner.availability_for(owner, role).await
    }

    async fn insert_schedule(&self, entry: NewScheduleEntry) -> RepositoryResult<ScheduleEntry> {
        let rival = self.rival.lock().take();
        if let Some(rival) = rival {
            self.inner.insert_schedule(rival).await?;
        }
        self.inner.insert_schedule(entry).await
    }

    async fn get_schedule(&self, id: ScheduleId) -> RepositoryResult<ScheduleEntry> {
        self.inner.get_schedule(id).await
    }

    async fn schedules_for_team(&self, team: TeamId) -> RepositoryResult<Vec<ScheduleEntry>> {
        self.inner.schedules_for_team(team).await
    }

    async fn scheduled_entries(&self) -> RepositoryResult<Vec<ScheduleEntry>> {
        self.inner.scheduled_entries().await
    }

    async fn mark_notified(&self, id: ScheduleId) -> RepositoryResult<ScheduleEntry> {
        self.inner.mark_notified(id).await
    }

    async fn set_schedule_status(
        &self,
        id: ScheduleId,
        status: ScheduleStatus,
    ) -> RepositoryResult<ScheduleEntry> {
        self.inner.set_schedule_status(id, status).await
    }

    async fn delete_schedules_for_team(&self, team: TeamId) -> RepositoryResult<usize> {
        self.inner.delete_schedules_for_team(team).await
    }

    async fn delete_schedules_for_panel(&self, panel: PanelId) -> RepositoryResult<usize> {
        self.inner.delete_schedules_for_panel(panel).await
    }

    async fn load_config(&self) -> RepositoryResult<ReviewConfig> {
        self.inner.load_config().await
    }

    async fn store_config(&self, config: ReviewConfig) -> RepositoryResult<()> {
        self.inner.store_config(config).await
    }
}

#[tokio::test]
async fn test_lost_stage_race_surfaces_conflict_instead_of_retrying() {
    let inner = LocalRepository::new();
    let guide = add_guide(&inner, "Guide").await;
    let member = add_faculty(&inner, "Member", MemberType::Internal).await;
    let coordinator = support::add_coordinator(&inner, "Coordinator").await;
    let panel = engine::create_panel(
        &inner,
        NewPanel {
            members: vec![member.id],
            coordinator: coordinator.id,
        },
    )
    .await
    .unwrap();
    let team = add_team(&inner, "Alpha").await;
    engine::assign_guide(&inner, team.id, guide.id).await.unwrap();
    engine::assign_panel(&inner, team.id, panel.id).await.unwrap();
    full_window_availability(&inner, member.id).await;

    // The rival books the same team and stage into a later period, so our
    // insert loses the stage key, not the slot key: no re-search can pass.
    let rival = NewScheduleEntry {
        team: team.id,
        panel: panel.id,
        slot_type: SlotType::Review1,
        start: at(date(2026, 3, 2), 10, 40),
        end: at(date(2026, 3, 2), 11, 20),
    };
    let repo = ContendedRepository::new(inner, rival);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        engine::generate_slot_for_team(&repo, &review_config(), team.id),
    )
    .await
    .expect("booking must terminate after losing the stage to another writer");

    let err = result.unwrap_err();
    assert!(matches!(err, EngineError::Repository(ref e) if e.is_conflict()));

    // Only the rival's entry stands.
    let entries = repo.schedules_for_team(team.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].start, at(date(2026, 3, 2), 10, 40));
}

#[tokio::test]
async fn test_lost_slot_race_retries_to_the_next_period() {
    let inner = LocalRepository::new();
    let guide = add_guide(&inner, "Guide").await;
    let member = add_faculty(&inner, "Member", MemberType::Internal).await;
    let coordinator = support::add_coordinator(&inner, "Coordinator").await;
    let panel = engine::create_panel(
        &inner,
        NewPanel {
            members: vec![member.id],
            coordinator: coordinator.id,
        },
    )
    .await
    .unwrap();
    let team = add_team(&inner, "Alpha").await;
    engine::assign_guide(&inner, team.id, guide.id).await.unwrap();
    engine::assign_panel(&inner, team.id, panel.id).await.unwrap();
    full_window_availability(&inner, member.id).await;

    // A concurrent writer takes the exact (team, panel, start) key for a
    // different stage between our search and our write. The stage we are
    // booking is still open, so the loss must trigger a re-search that
    // lands on the next period, not a hard failure.
    let rival = NewScheduleEntry {
        team: team.id,
        panel: panel.id,
        slot_type: SlotType::Review2,
        start: at(date(2026, 3, 2), 9, 0),
        end: at(date(2026, 3, 2), 9, 40),
    };
    let repo = ContendedRepository::new(inner, rival);

    let outcome = engine::generate_slot_for_team(&repo, &review_config(), team.id)
        .await
        .unwrap();
    let review_engine::api::SlotOutcome::Booked(entry) = outcome else {
        panic!("expected a booked slot");
    };
    assert_eq!(entry.team, team.id);
    assert_eq!(entry.slot_type, SlotType::Review1);
    assert_eq!(entry.start, at(date(2026, 3, 2), 9, 50));
}
