//! Webhook endpoint resolution.
//!
//! Resolution walks an ordered provider list and returns the first usable
//! value. Finding nothing is a normal outcome, not an error; the publisher
//! turns an absent endpoint into a no-op.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

/// Environment variable consulted when no explicit endpoint is given.
pub const WEBHOOK_ENV_VAR: &str = "DISCORD_WEBHOOK";

/// Sibling script scanned as the last-resort endpoint source.
pub const FALLBACK_SCRIPT_NAME: &str = "auto_push.ps1";

/// Single-quoted assignment patterns recognized in the fallback script.
const SCRIPT_PATTERNS: [&str; 2] = [
    r"\$DiscordWebhook\s*=\s*'([^']+)'",
    r"\$webhook\s*=\s*'([^']+)'",
];

/// One endpoint source, queried in the order callers list them.
#[derive(Debug, Clone)]
pub enum WebhookSource {
    /// An endpoint supplied directly by the caller.
    Explicit(Option<String>),
    /// An environment variable, read at resolution time.
    Environment(String),
    /// A script file scanned for a quoted webhook assignment.
    ScriptScan(PathBuf),
}

impl WebhookSource {
    fn resolve(&self) -> Option<String> {
        match self {
            Self::Explicit(url) => url.clone(),
            Self::Environment(name) => std::env::var(name).ok(),
            Self::ScriptScan(path) => scan_script(path),
        }
    }

    /// Short label for diagnostics. Never includes the resolved value,
    /// which embeds the webhook secret.
    fn label(&self) -> &'static str {
        match self {
            Self::Explicit(_) => "explicit",
            Self::Environment(_) => "environment",
            Self::ScriptScan(_) => "script scan",
        }
    }
}

/// Returns the first non-empty endpoint the sources yield, trimmed.
///
/// Empty or whitespace-only values are treated as absent and resolution
/// moves on to the next source.
pub fn locate_webhook(sources: &[WebhookSource]) -> Option<String> {
    for source in sources {
        if let Some(url) = source.resolve() {
            let url = url.trim();
            if !url.is_empty() {
                debug!(source = source.label(), "Resolved webhook endpoint");
                return Some(url.to_string());
            }
        }
    }

    debug!("No webhook endpoint resolved");
    None
}

/// Scans a script file for either recognized assignment; first match wins.
fn scan_script(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;

    for pattern in SCRIPT_PATTERNS {
        let Ok(re) = Regex::new(pattern) else {
            continue;
        };
        if let Some(captures) = re.captures(&text) {
            return Some(captures[1].trim().to_string());
        }
    }

    None
}
