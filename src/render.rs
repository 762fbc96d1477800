use serde::Serialize;

use crate::change::{Change, Severity};
use crate::changes::Buckets;
use crate::emphasis::code_quotes;

/// One coloured block of a chat message, in Slack attachment shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub mrkdwn_in: [&'static str; 2],
    pub color: &'static str,
    #[serde(rename = "author_name")]
    pub title: &'static str,
    pub text: String,
    pub fallback: String,
}

fn style(level: Severity) -> (&'static str, &'static str) {
    match level {
        Severity::Breaking => ("#E74C3B", "Breaking changes"),
        Severity::Dangerous => ("#F0C418", "Dangerous changes"),
        Severity::Safe => ("#23B99A", "Safe changes"),
    }
}

/// Render one bucket. Callers skip empty buckets.
pub fn render_bucket(level: Severity, changes: &[&Change]) -> Attachment {
    let (color, title) = style(level);
    let text = changes
        .iter()
        .map(|c| code_quotes(&c.message))
        .collect::<Vec<_>>()
        .join("\n");

    Attachment {
        mrkdwn_in: ["text", "fallback"],
        color,
        title,
        fallback: text.clone(),
        text,
    }
}

pub fn render_attachments(buckets: &Buckets<'_>) -> Vec<Attachment> {
    buckets
        .non_empty()
        .map(|(level, changes)| render_bucket(level, changes))
        .collect()
}
