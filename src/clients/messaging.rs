use std::time::Duration;

use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    billing::message::normalize_phone,
    config::Config,
    error::{AppError, AppResult},
};

#[derive(Debug, Serialize, PartialEq)]
pub struct OutboundMessage {
    pub phone: String,
    pub message: String,
}

impl OutboundMessage {
    pub fn new(phone: &str, message: String) -> AppResult<Self> {
        let phone = normalize_phone(phone);
        if phone.len() < 7 {
            return Err(AppError::validation("Phone number is missing or too short"));
        }
        Ok(Self { phone, message })
    }
}

/// Sends text through the studio's WhatsApp gateway.
#[derive(Clone)]
pub struct MessagingClient {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl MessagingClient {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            url: config.messaging_url.clone(),
            token: config.messaging_token.clone(),
        })
    }

    #[instrument(name = "messaging_send", skip(self, msg), fields(phone = %msg.phone))]
    pub async fn send(&self, msg: &OutboundMessage) -> AppResult<()> {
        if self.url.is_empty() {
            return Err(AppError::validation("Messaging endpoint is not configured"));
        }

        let mut builder = self.client.post(&self.url).json(msg);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let resp = builder.send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("messaging returned {status}: {text}")));
        }

        info!("Message delivered to gateway");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_message_normalizes_phone() {
        let msg = OutboundMessage::new("+964 770 123 4567", "hi".into()).unwrap();
        assert_eq!(msg.phone, "9647701234567");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            serde_json::json!({ "phone": "9647701234567", "message": "hi" })
        );
    }

    #[test]
    fn rejects_missing_phone() {
        assert!(OutboundMessage::new("", "hi".into()).is_err());
        assert!(OutboundMessage::new("n/a", "hi".into()).is_err());
    }
}
