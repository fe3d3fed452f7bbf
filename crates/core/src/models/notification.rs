//! In-app notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::timestamp;
use crate::{NotificationId, NotificationKind, UserId};

/// A notification shown in the header dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Count of notifications not yet read.
#[must_use]
pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_type_field_maps_to_kind() {
        let list: Vec<Notification> = serde_json::from_value(serde_json::json!([
            { "id": 1, "title": "Sold", "message": "Your Submariner sold", "type": "success", "read": false },
            { "id": 2, "title": "Hi", "message": "Welcome", "type": "info", "read": true }
        ]))
        .unwrap();

        assert_eq!(list[0].kind, NotificationKind::Success);
        assert_eq!(unread_count(&list), 1);
    }
}
