//! Slack incoming-webhook wire shapes.
//!
//! The legacy attachment format is used because it is the one that renders a
//! colored side bar, which is how severity is conveyed.

use relay::{Field, NotificationMessage};
use serde::{Deserialize, Serialize};

/// Top-level webhook body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Message text. Always empty; everything lives in the attachment.
    pub text: String,
    pub attachments: Vec<Attachment>,
}

/// A single colored attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub fallback: String,
    /// `#RRGGBB`.
    pub color: String,
    pub title: String,
    pub title_link: String,
    pub fields: Vec<AttachmentField>,
    pub footer: String,
    /// Unix seconds, as a string.
    pub ts: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    /// `"true"` for half-width fields; omitted otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
}

impl From<&Field> for AttachmentField {
    fn from(field: &Field) -> Self {
        Self {
            title: field.title.clone(),
            value: field.value.clone(),
            short: field.short.then(|| "true".to_string()),
        }
    }
}

impl From<&NotificationMessage> for WebhookPayload {
    fn from(message: &NotificationMessage) -> Self {
        Self {
            text: String::new(),
            attachments: vec![Attachment {
                fallback: message.fallback_text.clone(),
                color: message.color_code().to_string(),
                title: message.title_text.clone(),
                title_link: message.title_link.clone(),
                fields: message.fields.iter().map(AttachmentField::from).collect(),
                footer: message.footer_text.clone(),
                ts: message.timestamp.unix_seconds().to_string(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay::{SeverityTier, Timestamp};
    use serde_json::json;

    fn message() -> NotificationMessage {
        NotificationMessage {
            fallback_text: "AWS CodeBuild notification attachment".into(),
            title_text: "AWS CodeBuild: proj, Build Log (Click here)".into(),
            title_link: "https://us-east-1.console.aws.amazon.com/codesuite/codebuild/projects/proj/build/proj%3A42/log".into(),
            severity: SeverityTier::Info,
            fields: vec![
                Field::short("Build Status", "IN_PROGRESS"),
                Field::wide("Note", "full width"),
            ],
            footer_text: "send by ecs-codepipeline-notifier".into(),
            timestamp: Timestamp::from_unix_seconds(1_700_000_123).unwrap(),
        }
    }

    #[test]
    fn payload_matches_webhook_shape() {
        let payload = WebhookPayload::from(&message());
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "text": "",
                "attachments": [{
                    "fallback": "AWS CodeBuild notification attachment",
                    "color": "#0174DF",
                    "title": "AWS CodeBuild: proj, Build Log (Click here)",
                    "title_link": "https://us-east-1.console.aws.amazon.com/codesuite/codebuild/projects/proj/build/proj%3A42/log",
                    "fields": [
                        {"title": "Build Status", "value": "IN_PROGRESS", "short": "true"},
                        {"title": "Note", "value": "full width"}
                    ],
                    "footer": "send by ecs-codepipeline-notifier",
                    "ts": "1700000123"
                }]
            })
        );
    }

    #[test]
    fn identical_messages_serialise_identically() {
        let a = serde_json::to_string(&WebhookPayload::from(&message())).unwrap();
        let b = serde_json::to_string(&WebhookPayload::from(&message())).unwrap();
        assert_eq!(a, b);
    }
}
