use std::collections::HashMap;
use std::sync::Arc;

use async_channel::{Receiver, Sender, TrySendError};
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::MessageBus;
use crate::error::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub payload: Arc<[u8]>,
}

/// In-process broker. Subscribers get a bounded queue each; a publish never
/// waits on a subscriber, so a slow or disconnected one just misses messages.
#[derive(Debug)]
pub struct Broker {
    capacity: usize,
    subscribers: RwLock<HashMap<String, Vec<Sender<Message>>>>,
}

impl Broker {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Receives every message published to exactly `topic` from now on.
    #[tracing::instrument(skip(self))]
    pub async fn subscribe(&self, topic: &str) -> Receiver<Message> {
        let (tx, rx) = async_channel::bounded(self.capacity);

        let mut subscribers = self.subscribers.write().await;
        let senders = subscribers.entry(topic.to_string()).or_default();
        senders.retain(|tx| !tx.is_closed());
        senders.push(tx);
        drop(subscribers);

        tracing::info!("subscriber connected");

        rx
    }

    pub async fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers
            .read()
            .await
            .get(topic)
            .map(|senders| senders.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    /// Total senders held across all topics, closed ones included.
    pub async fn sender_count(&self) -> usize {
        self.subscribers.read().await.values().map(Vec::len).sum()
    }

    pub async fn topic_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Forgets closed subscribers of `topic`, and the topic itself once it
    /// has none left.
    pub async fn prune(&self, topic: &str) {
        let mut subscribers = self.subscribers.write().await;

        if let Some(senders) = subscribers.get_mut(topic) {
            senders.retain(|tx| !tx.is_closed());

            if senders.is_empty() {
                subscribers.remove(topic);
            }
        }
    }

    /// Forgets closed subscribers of every topic, returning how many were
    /// dropped.
    pub async fn sweep(&self) -> usize {
        let mut subscribers = self.subscribers.write().await;
        let before: usize = subscribers.values().map(Vec::len).sum();

        subscribers.retain(|_, senders| {
            senders.retain(|tx| !tx.is_closed());
            !senders.is_empty()
        });

        before - subscribers.values().map(Vec::len).sum::<usize>()
    }
}

#[async_trait]
impl MessageBus for Broker {
    #[tracing::instrument(skip(self, payload), fields(bytes = payload.len()))]
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), Error> {
        let message = Message {
            topic: topic.to_string(),
            payload: payload.into(),
        };

        let mut delivered = 0;
        let mut stale = false;

        if let Some(senders) = self.subscribers.read().await.get(topic) {
            for tx in senders {
                match tx.try_send(message.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!("subscriber queue full, message dropped")
                    }
                    Err(TrySendError::Closed(_)) => stale = true,
                }
            }
        }

        if stale {
            self.prune(topic).await;
        }

        tracing::debug!(delivered, "published");

        Ok(())
    }
}
