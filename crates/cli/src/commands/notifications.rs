//! Notification commands.

use clap::Subcommand;
use luxtime_core::{NotificationId, unread_count};

use super::{CommandError, Context, print_json};

#[derive(Subcommand)]
pub enum NotificationAction {
    /// List notifications
    List {
        /// Only unread ones
        #[arg(long)]
        unread: bool,
    },
    /// Mark a notification read
    Read {
        /// Notification ID
        id: NotificationId,
    },
    /// Mark every notification read
    ReadAll,
    /// Delete a notification
    Delete {
        /// Notification ID
        id: NotificationId,
    },
}

pub async fn run(ctx: &Context, action: NotificationAction) -> Result<(), CommandError> {
    ctx.require_user().await?;

    match action {
        NotificationAction::List { unread } => {
            let mut notifications = ctx.api.notifications().await?;
            tracing::info!("{} unread", unread_count(&notifications));
            if unread {
                notifications.retain(|n| !n.read);
            }
            print_json(&notifications)
        }
        NotificationAction::Read { id } => {
            ctx.api.mark_notification_read(id).await?;
            print_json(&serde_json::json!({ "id": id, "read": true }))
        }
        NotificationAction::ReadAll => {
            ctx.api.mark_all_notifications_read().await?;
            print_json(&serde_json::json!({ "read_all": true }))
        }
        NotificationAction::Delete { id } => {
            ctx.api.delete_notification(id).await?;
            print_json(&serde_json::json!({ "id": id, "deleted": true }))
        }
    }
}
