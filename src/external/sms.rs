use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    config::TwilioConfig,
    error::{upstream_error, Error},
};

/// Outbound text messages. Sending is best effort for every caller.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<(), Error>;
}

pub fn verification_message(code: &str) -> String {
    format!("Your LehGo verification code is: {}", code)
}

#[derive(Clone, Debug)]
pub struct TwilioGateway {
    client: reqwest::Client,
    config: TwilioConfig,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    status: Option<String>,
}

impl TwilioGateway {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "https://{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base, self.config.account_sid
        )
    }
}

#[async_trait]
impl SmsGateway for TwilioGateway {
    #[tracing::instrument(skip(self, body))]
    async fn send(&self, to: &str, body: &str) -> Result<(), Error> {
        let res = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", to),
                ("From", self.config.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        let status_code = res.status().as_u16();

        if !res.status().is_success() {
            tracing::warn!(status_code, "gateway rejected message");
            return Err(upstream_error());
        }

        let message: MessageResource = res.json().await?;
        tracing::info!(sid = %message.sid, status = ?message.status, "sms sent");

        Ok(())
    }
}

/// Used when no gateway credentials are configured: writes the message to
/// the log and reports failure so callers fall back to dev mode.
#[derive(Clone, Debug, Default)]
pub struct LogGateway;

#[async_trait]
impl SmsGateway for LogGateway {
    async fn send(&self, to: &str, body: &str) -> Result<(), Error> {
        tracing::warn!(to, body, "no sms gateway configured");
        Err(upstream_error())
    }
}
