//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};

use review_engine::api::UserId;
use review_engine::db::models::{NewTeam, NewUser};
use review_engine::db::{LocalRepository, ReviewRepository};
use review_engine::models::{
    Availability, AvailabilityRole, MemberType, ReviewConfig, ReviewPeriod, Role, Team, TimeSlot,
    User,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, minute, 0).unwrap()
}

/// Two working weeks starting Monday 2026-03-02.
pub fn review_config() -> ReviewConfig {
    ReviewConfig {
        review_period: Some(ReviewPeriod {
            start: date(2026, 3, 2),
            end: date(2026, 3, 13),
        }),
        max_team_size: 4,
    }
}

pub async fn add_guide(repo: &LocalRepository, name: &str) -> User {
    repo.insert_user(NewUser {
        name: name.into(),
        roles: vec![Role::Guide],
        member_type: Some(MemberType::Internal),
    })
    .await
    .unwrap()
}

pub async fn add_faculty(repo: &LocalRepository, name: &str, member_type: MemberType) -> User {
    repo.insert_user(NewUser {
        name: name.into(),
        roles: vec![Role::Panel],
        member_type: Some(member_type),
    })
    .await
    .unwrap()
}

pub async fn add_coordinator(repo: &LocalRepository, name: &str) -> User {
    repo.insert_user(NewUser {
        name: name.into(),
        roles: vec![Role::Coordinator],
        member_type: Some(MemberType::Internal),
    })
    .await
    .unwrap()
}

pub async fn add_team(repo: &LocalRepository, name: &str) -> Team {
    repo.insert_team(NewTeam {
        name: name.into(),
        leader: None,
        members: Vec::new(),
    })
    .await
    .unwrap()
}

/// Submit 09:00-17:00 panel availability for every weekday of the default
/// review window.
pub async fn full_window_availability(repo: &LocalRepository, user: UserId) {
    let mut intervals = Vec::new();
    let mut day = date(2026, 3, 2);
    while day <= date(2026, 3, 13) {
        intervals.push(TimeSlot::new(at(day, 9, 0), at(day, 17, 0)));
        day = day.succ_opt().unwrap();
    }
    repo.put_availability(Availability {
        owner: user,
        role: AvailabilityRole::Panel,
        intervals,
    })
    .await
    .unwrap();
}
