use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};
use tripway_core::notify::{EmailMessage, EmailSender, SmsMessage, SmsSender};
use tripway_core::{CoreError, CoreResult};
use tripway_shared::pii::{mask_email, mask_phone};

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";
const TWILIO_BASE_URL: &str = "https://api.twilio.com/2010-04-01";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn http_client() -> CoreResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| CoreError::Internal(format!("Failed to build HTTP client: {}", e)))
}

/// Email delivery through the SendGrid v3 API.
#[derive(Clone)]
pub struct SendGridClient {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

impl SendGridClient {
    pub fn new(api_key: String, from: String) -> CoreResult<Self> {
        Ok(Self {
            http: http_client()?,
            api_key,
            from,
        })
    }

    fn payload(&self, message: &EmailMessage) -> serde_json::Value {
        let mut content = vec![json!({"type": "text/plain", "value": message.text})];
        if let Some(html) = &message.html {
            content.push(json!({"type": "text/html", "value": html}));
        }
        json!({
            "personalizations": [{"to": [{"email": message.to}]}],
            "from": {"email": self.from},
            "subject": message.subject,
            "content": content,
        })
    }
}

#[async_trait]
impl EmailSender for SendGridClient {
    async fn send_email(&self, message: &EmailMessage) -> CoreResult<()> {
        let response = self
            .http
            .post(SENDGRID_URL)
            .bearer_auth(&self.api_key)
            .json(&self.payload(message))
            .send()
            .await
            .map_err(|e| upstream("SendGrid", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(upstream("SendGrid", format!("HTTP {}: {}", status, body)));
        }

        info!("Email sent to {}", mask_email(&message.to));
        Ok(())
    }
}

/// SMS delivery through the Twilio Messages API.
#[derive(Clone)]
pub struct TwilioClient {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from: String,
}

impl TwilioClient {
    pub fn new(account_sid: String, auth_token: String, from: String) -> CoreResult<Self> {
        Ok(Self {
            http: http_client()?,
            account_sid,
            auth_token,
            from,
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/Accounts/{}/Messages.json", TWILIO_BASE_URL, self.account_sid)
    }
}

#[async_trait]
impl SmsSender for TwilioClient {
    async fn send_sms(&self, message: &SmsMessage) -> CoreResult<()> {
        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", message.to.as_str()),
                ("From", self.from.as_str()),
                ("Body", message.body.as_str()),
            ])
            .send()
            .await
            .map_err(|e| upstream("Twilio", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(upstream("Twilio", format!("HTTP {}: {}", status, body)));
        }

        info!("SMS sent to {}", mask_phone(&message.to));
        Ok(())
    }
}

fn upstream(provider: &str, detail: String) -> CoreError {
    error!("{} request failed: {}", provider, detail);
    CoreError::Upstream(format!("{} request failed", provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sendgrid_payload_shape() {
        let client = SendGridClient::new("key".to_string(), "bookings@tripway.test".to_string()).unwrap();
        let payload = client.payload(&EmailMessage {
            to: "asha@example.com".to_string(),
            subject: "Booking confirmation BK1".to_string(),
            text: "Hi".to_string(),
            html: Some("<p>Hi</p>".to_string()),
        });
        assert_eq!(payload["personalizations"][0]["to"][0]["email"], "asha@example.com");
        assert_eq!(payload["from"]["email"], "bookings@tripway.test");
        assert_eq!(payload["content"].as_array().unwrap().len(), 2);
        assert_eq!(payload["content"][0]["type"], "text/plain");
    }

    #[test]
    fn test_twilio_url_uses_account() {
        let client = TwilioClient::new("AC123".to_string(), "token".to_string(), "+1555".to_string()).unwrap();
        assert_eq!(
            client.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_http_client_builds_with_timeout() {
        assert!(http_client().is_ok());
    }
}
