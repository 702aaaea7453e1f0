//! Guide assignment flows: manual override, bulk load balancing and the
//! accept/reject request lifecycle.

mod support;

use review_engine::api::UserId;
use review_engine::db::{LocalRepository, ReviewRepository};
use review_engine::engine;
use review_engine::models::TeamStatus;
use review_engine::EngineError;

use support::{add_guide, add_team};

#[tokio::test]
async fn test_manual_assignment_approves_team() {
    let repo = LocalRepository::new();
    let guide = add_guide(&repo, "Dr. Iyer").await;
    let team = add_team(&repo, "Alpha").await;

    let team = engine::assign_guide(&repo, team.id, guide.id).await.unwrap();
    assert_eq!(team.guide_preference, Some(guide.id));
    assert_eq!(team.status, TeamStatus::Approved);
}

#[tokio::test]
async fn test_manual_assignment_requires_guide_role() {
    let repo = LocalRepository::new();
    let student = support::add_coordinator(&repo, "Coordinator only").await;
    let team = add_team(&repo, "Alpha").await;

    let err = engine::assign_guide(&repo, team.id, student.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRole { .. }));

    let err = engine::assign_guide(&repo, team.id, UserId::new(9999))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[tokio::test]
async fn test_bulk_assignment_balances_load() {
    let repo = LocalRepository::new();
    let low = add_guide(&repo, "Guide with no teams").await;
    let high = add_guide(&repo, "Guide with one team").await;

    // Pre-load the second guide with one approved team.
    let seeded = add_team(&repo, "Seeded").await;
    engine::assign_guide(&repo, seeded.id, high.id).await.unwrap();

    let t1 = add_team(&repo, "T1").await;
    let t2 = add_team(&repo, "T2").await;
    let t3 = add_team(&repo, "T3").await;

    let report = engine::bulk_assign_guides(&repo).await.unwrap();
    assert_eq!(report.assigned_count(), 3);
    assert!(report.skipped.is_empty());

    // The zero-count guide absorbs the first two teams (the tie after the
    // first pick resolves by input order), then the other guide gets one.
    let pick = |team| {
        report
            .assigned
            .iter()
            .find(|a| a.team == team)
            .map(|a| a.guide)
    };
    assert_eq!(pick(t1.id), Some(low.id));
    assert_eq!(pick(t2.id), Some(low.id));
    assert_eq!(pick(t3.id), Some(high.id));
}

#[tokio::test]
async fn test_bulk_assignment_skips_fully_rejected_team() {
    let repo = LocalRepository::new();
    let only_guide = add_guide(&repo, "The only guide").await;
    let team = add_team(&repo, "Unlucky").await;

    engine::request_guide(&repo, team.id, only_guide.id).await.unwrap();
    engine::reject_guide_request(&repo, only_guide.id, team.id)
        .await
        .unwrap();

    // The team is skipped, not failed, on every subsequent run.
    for _ in 0..3 {
        let report = engine::bulk_assign_guides(&repo).await.unwrap();
        assert_eq!(report.assigned_count(), 0);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].team, team.id);
    }

    let team = repo.get_team(team.id).await.unwrap();
    assert!(team.guide_preference.is_none());
    assert_eq!(team.rejected_guides, vec![only_guide.id]);
}

#[tokio::test]
async fn test_rejection_persists_across_runs_with_other_guides() {
    let repo = LocalRepository::new();
    let rejected = add_guide(&repo, "Rejected guide").await;
    let fallback = add_guide(&repo, "Fallback guide").await;
    let team = add_team(&repo, "Team").await;

    engine::request_guide(&repo, team.id, rejected.id).await.unwrap();
    engine::reject_guide_request(&repo, rejected.id, team.id)
        .await
        .unwrap();

    let report = engine::bulk_assign_guides(&repo).await.unwrap();
    assert_eq!(report.assigned_count(), 1);
    // The rejected guide is never re-selected, even though they carry the
    // lower load.
    assert_eq!(report.assigned[0].guide, fallback.id);
}

#[tokio::test]
async fn test_accept_forces_sibling_rejection() {
    let repo = LocalRepository::new();
    let guide = add_guide(&repo, "Popular guide").await;
    let winner = add_team(&repo, "Winner").await;
    let loser = add_team(&repo, "Loser").await;

    engine::request_guide(&repo, winner.id, guide.id).await.unwrap();
    engine::request_guide(&repo, loser.id, guide.id).await.unwrap();

    let winner = engine::accept_guide_request(&repo, guide.id, winner.id)
        .await
        .unwrap();
    assert_eq!(winner.status, TeamStatus::Approved);

    let loser = repo.get_team(loser.id).await.unwrap();
    assert_eq!(loser.status, TeamStatus::Rejected);
    assert!(loser.guide_preference.is_none());
    assert!(loser.rejected_guides.contains(&guide.id));
}

#[tokio::test]
async fn test_accept_twice_reports_already_processed() {
    let repo = LocalRepository::new();
    let guide = add_guide(&repo, "Guide").await;
    let team = add_team(&repo, "Team").await;

    engine::request_guide(&repo, team.id, guide.id).await.unwrap();
    engine::accept_guide_request(&repo, guide.id, team.id)
        .await
        .unwrap();

    let err = engine::accept_guide_request(&repo, guide.id, team.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadyProcessed { .. }));
}

#[tokio::test]
async fn test_rejected_team_can_request_another_guide() {
    let repo = LocalRepository::new();
    let first = add_guide(&repo, "First choice").await;
    let second = add_guide(&repo, "Second choice").await;
    let team = add_team(&repo, "Team").await;

    engine::request_guide(&repo, team.id, first.id).await.unwrap();
    engine::reject_guide_request(&repo, first.id, team.id)
        .await
        .unwrap();

    let team = engine::request_guide(&repo, team.id, second.id).await.unwrap();
    assert_eq!(team.status, TeamStatus::Pending);
    assert_eq!(team.guide_preference, Some(second.id));

    let team = engine::accept_guide_request(&repo, second.id, team.id)
        .await
        .unwrap();
    assert_eq!(team.status, TeamStatus::Approved);
}
