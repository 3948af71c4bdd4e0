//! Transactional mail client used for password reset links
//!
//! Posts a JSON message to an HTTP mail API. When no endpoint is configured
//! the link is written to the log instead, which is how local development
//! picks it up.

use reqwest::Client;
use serde::Serialize;

use crate::config::MailConfig;
use crate::error::{AppError, AppResult};

/// Mail API client
#[derive(Clone)]
pub struct MailClient {
    client: Client,
    endpoint: Option<String>,
    api_key: Option<String>,
    sender: String,
}

/// Request body accepted by the mail API
#[derive(Debug, Serialize)]
struct OutgoingMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl MailClient {
    /// Create a client from the mail configuration section
    pub fn new(config: &MailConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.api_endpoint.clone().filter(|e| !e.is_empty()),
            api_key: config.api_key.clone(),
            sender: config.sender.clone(),
        }
    }

    /// Whether mail is actually delivered rather than logged
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Send a plain-text message
    pub async fn send(&self, to: &str, subject: &str, text: &str) -> AppResult<()> {
        let Some(endpoint) = &self.endpoint else {
            tracing::info!(to, subject, body = text, "mail endpoint not configured; message logged");
            return Ok(());
        };

        let mut request = self.client.post(endpoint).json(&OutgoingMail {
            from: &self.sender,
            to,
            subject,
            text,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::MailError(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::MailError(format!("{} - {}", status, body)));
        }

        tracing::debug!(to, subject, "mail sent");
        Ok(())
    }

    /// Send the password reset link
    pub async fn send_password_reset(&self, to: &str, reset_link: &str) -> AppResult<()> {
        let text = format!(
            "A password reset was requested for your RapidXcel account.\n\n\
             Follow this link to choose a new password:\n{}\n\n\
             If you did not request this, you can ignore this message.",
            reset_link
        );
        self.send(to, "Password Reset Request", &text).await
    }
}
