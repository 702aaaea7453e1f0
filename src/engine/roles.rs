//! Effective role computation.
//!
//! Roles granted by live team/panel membership are computed on demand from
//! the current records rather than cached on the user, so a guide whose
//! last team is deleted stops being a guide without any writeback.

use std::collections::BTreeSet;

use crate::api::UserId;
use crate::db::ReviewRepository;
use crate::error::{EngineError, EngineResult};
use crate::models::user::Role;

/// The user's stored base roles plus the roles implied by current
/// team/panel membership, sorted and deduplicated.
pub async fn effective_roles(
    repo: &dyn ReviewRepository,
    user_id: UserId,
) -> EngineResult<Vec<Role>> {
    let user = repo
        .get_user(user_id)
        .await
        .map_err(EngineError::on_missing("user", user_id.value()))?;

    let mut roles: BTreeSet<Role> = user.roles.into_iter().collect();

    if repo
        .list_teams()
        .await?
        .iter()
        .any(|t| t.guide_preference == Some(user_id))
    {
        roles.insert(Role::Guide);
    }

    for panel in repo.list_panels().await? {
        if panel.members.contains(&user_id) {
            roles.insert(Role::Panel);
        }
        if panel.coordinator == user_id {
            roles.insert(Role::Coordinator);
        }
    }

    Ok(roles.into_iter().collect())
}
