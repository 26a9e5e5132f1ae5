//! Webhook endpoint resolution and changelog publishing.

use std::time::Duration;

pub mod locate;
pub mod publish;

pub use locate::{locate_webhook, WebhookSource, FALLBACK_SCRIPT_NAME, WEBHOOK_ENV_VAR};
pub use publish::{truncate_description, Embed, PublishOutcome, WebhookPayload, WebhookPublisher};

/// Bot display name on published messages.
pub const BOT_NAME: &str = "Release Bot";

/// Maximum embed description length, in characters, before truncation.
///
/// Slightly under the platform's own 4096-character embed limit so the
/// truncation marker always fits.
pub const DESCRIPTION_LIMIT: usize = 3900;

/// Marker appended when a description was truncated.
pub const TRUNCATION_MARKER: &str = "\n...";

/// Fixed timeout applied to the webhook POST.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
