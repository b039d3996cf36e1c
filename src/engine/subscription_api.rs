use super::helpers::ensure_present;
use super::Engine;

use async_channel::Receiver;
use async_trait::async_trait;

use crate::{api::SubscriptionAPI, bus::Message, error::Error};

#[async_trait]
impl SubscriptionAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn subscribe(&self, topic: &str) -> Result<Receiver<Message>, Error> {
        ensure_present(topic)?;

        Ok(self.broker.subscribe(topic).await)
    }

    #[tracing::instrument(skip(self))]
    async fn unsubscribe(&self, topic: &str) -> Result<(), Error> {
        self.broker.prune(topic).await;

        Ok(())
    }
}
