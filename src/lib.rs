//! # Review Assignment & Scheduling Engine
//!
//! Core subsystem of a project-evaluation portal: assigns a supervising
//! guide to each team under load-balancing and rejection constraints,
//! assigns an evaluation panel under conflict-of-interest constraints, and
//! converts submitted availability into concrete, non-conflicting review
//! slots on a fixed daily period grid, honoring the strict review1 →
//! review2 → review3 → viva sequence.
//!
//! The surrounding portal (authentication, document generation, file
//! storage, HTTP routing) is not part of this crate; those layers call the
//! operations in [`engine`] and read the records persisted through [`db`].
//!
//! ## Architecture
//!
//! - [`api`]: identifier newtypes and report/outcome DTOs
//! - [`models`]: domain records (teams, users, panels, availability,
//!   schedule entries, config)
//! - [`db`]: repository trait, errors and the in-memory backend
//! - [`engine`]: the assignment, validation and booking operations
//!
//! ## Usage
//!
//! ```ignore
//! use review_engine::db::LocalRepository;
//! use review_engine::engine;
//! use review_engine::models::ReviewConfig;
//!
//! async fn run() -> anyhow::Result<()> {
//!     let repo = LocalRepository::new();
//!     let config = ReviewConfig::from_env()?;
//!
//!     let report = engine::bulk_assign_guides(&repo).await?;
//!     println!("assigned {} teams", report.assigned_count());
//!
//!     let schedules = engine::generate_schedules_for_all_teams(&repo, &config).await?;
//!     for entry in &schedules.created {
//!         engine::notify_schedule(&repo, entry.id).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;

pub use error::{EngineError, EngineResult, SequenceViolation};
