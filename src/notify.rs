//! 運用者への通知（保存失敗アラート）

use crate::error::{ReportError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> Result<()>;
}

/// Resend メールAPI
pub struct ResendNotifier {
    http: reqwest::Client,
    api_key: String,
    from: String,
    to: String,
}

#[derive(Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

impl ResendNotifier {
    pub fn new(api_key: String, from: String, to: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key,
            from,
            to,
        })
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        let request = EmailRequest {
            from: &self.from,
            to: [self.to.as_str()],
            subject,
            text: body,
        };

        let response = self
            .http
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ReportError::Notify(format!("HTTP {}: {}", status.as_u16(), text)));
        }

        tracing::info!(to = self.to.as_str(), "alert email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_request_shape() {
        let request = EmailRequest {
            from: "Camp Report <onboarding@resend.dev>",
            to: ["ops@example.com"],
            subject: "保存失敗",
            text: "body",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["to"][0], "ops@example.com");
        assert_eq!(json["subject"], "保存失敗");
    }
}
