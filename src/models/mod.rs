//! Domain records persisted by the repository and read by the engine.

pub mod availability;
pub mod config;
pub mod panel;
pub mod schedule;
pub mod team;
pub mod time;
pub mod user;

pub use availability::{Availability, AvailabilityRole};
pub use config::{ReviewConfig, ReviewPeriod};
pub use panel::Panel;
pub use schedule::{ScheduleEntry, ScheduleStatus, SlotType};
pub use team::{Team, TeamStatus};
pub use time::{overlaps, TimeSlot};
pub use user::{MemberType, Role, User};
