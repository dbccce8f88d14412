//! User-facing message texts.

use crate::{broadcast::BroadcastSummary, domain::UserId};

pub const WELCOME: &str = "Hey there! 👋 Welcome to Encryptonite, where your secrets are safe from everyone... even us.\n\n\
Ready to lock down your texts? Tap the button below to launch the Mini App and start \
encrypting/decrypting messages instantly. We take privacy so seriously, we don't even know \
what you ate for breakfast. Seriously.";

pub const LAUNCH_BUTTON: &str = "🔐 Launch Encryptonite";

pub const PERMISSION_DENIED: &str = "❌ You don't have permission to use this command.";

pub const BROADCAST_PROMPT: &str = "📢 Broadcast Mode Activated\n\n\
Send me the message you want to broadcast to all users.\n\
Send /cancel to cancel the broadcast.";

pub const BROADCAST_CANCELLED: &str = "❌ Broadcast cancelled.";

pub fn new_user_notification(first_name: &str, username: &str, user_id: UserId) -> String {
    format!(
        "🆕 New User Started Bot:\n\n\
👤 Name: {first_name}\n\
🔖 Username: @{username}\n\
🆔 User ID: {id}\n\
🔗 Profile: {link}",
        id = user_id.0,
        link = profile_link(user_id),
    )
}

pub fn profile_link(user_id: UserId) -> String {
    format!("tg://user?id={}", user_id.0)
}

pub fn broadcast_progress(total: usize) -> String {
    format!("📤 Broadcasting message to {total} users...\nThis may take a moment.")
}

pub fn broadcast_summary(summary: &BroadcastSummary) -> String {
    format!(
        "✅ Broadcast Complete!\n\n\
📊 Summary:\n\
👥 Total Users: {}\n\
✅ Successfully Delivered: {}\n\
❌ Blocked/Failed: {}",
        summary.total, summary.delivered, summary.failed
    )
}
