//! The review assignment and scheduling engine.
//!
//! Operations here are short-lived, request-scoped computations invoked by
//! the surrounding CRUD layer. Each takes the repository (and, where the
//! review window matters, the loaded [`crate::models::ReviewConfig`]) as an
//! explicit parameter; there is no hidden global state and no background
//! scheduler.

pub mod booking;
pub mod cleanup;
pub mod grid;
pub mod guides;
pub mod notify;
pub mod panels;
pub mod roles;
pub mod sequence;

pub use booking::{
    coordinator_assign_slots, generate_schedules_for_all_teams, generate_slot_for_team,
};
pub use cleanup::{delete_panel, delete_team, delete_user, remove_team_member};
pub use grid::{GridSlot, ReviewPeriodGrid};
pub use notify::notify_schedule;
pub use guides::{
    accept_guide_request, assign_guide, bulk_assign_guides, reject_guide_request, request_guide,
};
pub use panels::{assign_panel, create_panel, remove_panel, update_panel};
pub use roles::effective_roles;
