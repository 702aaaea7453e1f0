//! Notification flag setter.
//!
//! Booking alone does not make a slot visible to the student, guide or
//! panel read views; this flag is the visibility gate.

use log::info;

use crate::api::ScheduleId;
use crate::db::ReviewRepository;
use crate::error::{EngineError, EngineResult};
use crate::models::schedule::ScheduleEntry;

/// Mark a booked schedule entry visible to its participants.
///
/// Idempotent: notifying an already-notified entry is a no-op, not an
/// error.
pub async fn notify_schedule(
    repo: &dyn ReviewRepository,
    schedule_id: ScheduleId,
) -> EngineResult<ScheduleEntry> {
    let entry = repo
        .mark_notified(schedule_id)
        .await
        .map_err(EngineError::on_missing("schedule", schedule_id.value()))?;
    info!("schedule entry {} marked notified", schedule_id);
    Ok(entry)
}
