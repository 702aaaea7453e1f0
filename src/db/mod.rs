//! Persistence layer for the review engine, via the repository pattern.
//!
//! The engine talks to storage only through the [`ReviewRepository`]
//! trait, so backends can be swapped without touching the scheduling
//! logic. The crate ships [`LocalRepository`], an in-memory backend used
//! for unit testing and local development; a SQL-backed implementation
//! plugs in behind the same trait.
//!
//! Conditional writes are the load-bearing part of the interface: every
//! precondition-dependent transition ("accept only if still pending",
//! "book only if the uniqueness key is free") is one atomic repository
//! call, never a read-then-write pair.

pub mod error;
pub mod local;
pub mod models;
pub mod repository;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use local::LocalRepository;
pub use repository::ReviewRepository;
