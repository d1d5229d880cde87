use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tripway_shared::pii::{mask_email, mask_phone};

use crate::CoreResult;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SmsMessage {
    pub to: String,
    pub body: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, message: &EmailMessage) -> CoreResult<()>;
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_sms(&self, message: &SmsMessage) -> CoreResult<()>;
}

/// Body of `POST /api/send-confirmation-email`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationEmailRequest {
    pub to: String,
    pub booking_id: String,
    pub name: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl ConfirmationEmailRequest {
    pub fn into_message(self) -> EmailMessage {
        let greeting = match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => format!("Hi {},", name.trim()),
            _ => "Hi,".to_string(),
        };

        let mut lines = vec![
            greeting,
            String::new(),
            format!("Your booking {} has been received.", self.booking_id),
        ];
        if let Some(serde_json::Value::Object(details)) = &self.details {
            lines.push(String::new());
            for (key, value) in details {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                lines.push(format!("{}: {}", humanize(key), value));
            }
        }
        lines.push(String::new());
        lines.push("Thank you for travelling with us.".to_string());

        let text = lines.join("\n");
        let html = format!(
            "<p>{}</p>",
            lines
                .iter()
                .map(|l| escape_html(l))
                .collect::<Vec<_>>()
                .join("<br/>")
        );

        EmailMessage {
            to: self.to,
            subject: format!("Booking confirmation {}", self.booking_id),
            text,
            html: Some(html),
        }
    }
}

pub fn confirmation_code_sms(phone: &str, code: &str, ttl_seconds: u64) -> SmsMessage {
    SmsMessage {
        to: phone.to_string(),
        body: format!(
            "Your verification code is {}. It expires in {} minutes.",
            code,
            (ttl_seconds / 60).max(1)
        ),
    }
}

/// Writes messages to the log instead of delivering them. Used when provider
/// credentials are not configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl EmailSender for LogNotifier {
    async fn send_email(&self, message: &EmailMessage) -> CoreResult<()> {
        tracing::info!(to = %mask_email(&message.to), subject = %message.subject, "email delivery skipped (no provider configured)");
        Ok(())
    }
}

#[async_trait]
impl SmsSender for LogNotifier {
    async fn send_sms(&self, message: &SmsMessage) -> CoreResult<()> {
        tracing::info!(to = %mask_phone(&message.to), "sms delivery skipped (no provider configured)");
        Ok(())
    }
}

fn humanize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_email_lists_details() {
        let req = ConfirmationEmailRequest {
            to: "asha@example.com".to_string(),
            booking_id: "BK1".to_string(),
            name: Some("Asha".to_string()),
            details: Some(serde_json::json!({"travel_date": "2025-03-14", "total_price": 3186.0})),
        };
        let message = req.into_message();
        assert_eq!(message.subject, "Booking confirmation BK1");
        assert!(message.text.starts_with("Hi Asha,"));
        assert!(message.text.contains("Travel date: 2025-03-14"));
        assert!(message.text.contains("Total price: 3186.0"));
    }

    #[test]
    fn test_html_body_is_escaped() {
        let req = ConfirmationEmailRequest {
            to: "a@b.co".to_string(),
            booking_id: "<BK>".to_string(),
            name: None,
            details: None,
        };
        let html = req.into_message().html.unwrap();
        assert!(html.contains("&lt;BK&gt;"));
    }

    #[test]
    fn test_code_sms() {
        let sms = confirmation_code_sms("+15551234567", "042042", 300);
        assert!(sms.body.contains("042042"));
        assert!(sms.body.contains("5 minutes"));
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let notifier = LogNotifier;
        let sms = confirmation_code_sms("+15551234567", "123456", 60);
        assert!(notifier.send_sms(&sms).await.is_ok());
    }
}
