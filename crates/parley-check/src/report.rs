use tracing::{info, warn};

use parley_types::checks::audit;
use parley_types::{ChannelMessage, ChannelWebhook, Directory, SchemaError};

/// Outcome of checking one set of payload files.
#[derive(Debug)]
pub struct Report {
    pub messages_checked: usize,
    pub webhooks_checked: usize,
    pub references_checked: bool,
    pub violations: Vec<SchemaError>,
}

impl Report {
    pub fn build(
        messages: &[ChannelMessage],
        webhooks: &[ChannelWebhook],
        directory: Option<&Directory>,
    ) -> Self {
        let mut violations = audit(messages);
        violations.extend(audit(webhooks));

        if let Some(directory) = directory {
            violations.extend(messages.iter().flat_map(|m| directory.verify_message(m)));
            violations.extend(webhooks.iter().flat_map(|w| directory.verify_webhook(w)));
        }

        Self {
            messages_checked: messages.len(),
            webhooks_checked: webhooks.len(),
            references_checked: directory.is_some(),
            violations,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Logs the summary and at most `max_reported` violations.
    pub fn log(&self, max_reported: usize) {
        info!(
            "Checked {} message(s), {} webhook(s), references {}",
            self.messages_checked,
            self.webhooks_checked,
            if self.references_checked { "checked" } else { "skipped" }
        );

        for violation in self.violations.iter().take(max_reported) {
            warn!("{}", violation);
        }

        let hidden = self.violations.len().saturating_sub(max_reported);
        if hidden > 0 {
            warn!("... {} more violation(s) not shown", hidden);
        }
    }
}
