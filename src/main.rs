use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use lehgo::auth::MemoryCredentialStore;
use lehgo::bus::Broker;
use lehgo::config::Config;
use lehgo::db::PgPool;
use lehgo::engine::Engine;
use lehgo::error::Error;
use lehgo::external::sms::{LogGateway, SmsGateway, TwilioGateway};
use lehgo::server::serve;

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lehgo=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;

    let PgPool(pool) = PgPool::new(
        &config.database_url,
        config.database_max_connections,
        config.database_acquire_timeout,
    )
    .await?;

    let sms: Arc<dyn SmsGateway> = match config.twilio.clone() {
        Some(twilio) => Arc::new(TwilioGateway::new(twilio)),
        None => {
            tracing::warn!("twilio credentials missing, verification codes are only logged");
            Arc::new(LogGateway)
        }
    };

    let credentials = Arc::new(MemoryCredentialStore::new(config.otp_ttl));
    if config.otp_ttl.is_some() {
        let credentials = credentials.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PURGE_INTERVAL);
            loop {
                interval.tick().await;
                let purged = credentials.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "expired codes purged");
                }
            }
        });
    }

    let broker = Arc::new(Broker::new(config.bus_subscriber_capacity));
    {
        // upgrades that never complete leave senders no disconnect will prune
        let broker = broker.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PURGE_INTERVAL);
            loop {
                interval.tick().await;
                let swept = broker.sweep().await;
                if swept > 0 {
                    tracing::debug!(swept, "closed subscribers released");
                }
            }
        });
    }

    let engine = Engine::new(pool, broker, credentials, sms).await?;

    serve(Arc::new(engine), config.listen_addr).await
}
