use super::helpers::ensure_present;
use super::Engine;

use async_trait::async_trait;

use crate::{api::AuthAPI, error::Error, external::sms::verification_message};

#[async_trait]
impl AuthAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn send_otp(&self, phone: &str) -> Result<String, Error> {
        ensure_present(phone)?;
        let phone = phone.trim();

        let code = self.credentials.issue(phone).await;

        if let Err(err) = self.sms.send(phone, &verification_message(&code)).await {
            // the code stays valid; it is still returned to the caller
            tracing::warn!(error = %err, dev_code = %code, "verification SMS not delivered");
        }

        Ok(code)
    }

    #[tracing::instrument(skip(self, code))]
    async fn verify_otp(&self, phone: &str, code: &str) -> Result<(), Error> {
        self.credentials.validate(phone.trim(), code.trim()).await
    }
}
