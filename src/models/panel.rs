use serde::{Deserialize, Serialize};

use crate::api::{PanelId, UserId};

/// An evaluation panel.
///
/// Composition rules (enforced at create/update time by the panel engine):
/// at most one member is external, the coordinator is internal and is not
/// listed among the members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub id: PanelId,
    pub members: Vec<UserId>,
    pub coordinator: UserId,
}

impl Panel {
    /// Whether `user` sits on this panel as a member or as the coordinator.
    pub fn includes(&self, user: UserId) -> bool {
        self.coordinator == user || self.members.contains(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_includes_member_and_coordinator() {
        let panel = Panel {
            id: PanelId::new(1),
            members: vec![UserId::new(2), UserId::new(3)],
            coordinator: UserId::new(4),
        };
        assert!(panel.includes(UserId::new(2)));
        assert!(panel.includes(UserId::new(4)));
        assert!(!panel.includes(UserId::new(5)));
    }
}
