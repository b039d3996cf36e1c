mod auth_api;
mod bid_api;
mod driver_search_api;
mod helpers;
mod ride_api;
mod subscription_api;
mod user_api;

pub use driver_search_api::PgDriverLocator;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::{
    api::API,
    auth::CredentialStore,
    bus::Broker,
    db::create_schema,
    dispatch::{BidNotifier, Dispatcher},
    error::Error,
    external::sms::SmsGateway,
    matching::DriverLocator,
};

type Database = Postgres;

pub struct Engine {
    pool: Pool<Database>,
    broker: Arc<Broker>,
    credentials: Arc<dyn CredentialStore>,
    sms: Arc<dyn SmsGateway>,
    locator: Arc<dyn DriverLocator>,
    dispatcher: Dispatcher,
    notifier: BidNotifier,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub async fn new(
        pool: Pool<Database>,
        broker: Arc<Broker>,
        credentials: Arc<dyn CredentialStore>,
        sms: Arc<dyn SmsGateway>,
    ) -> Result<Self, Error> {
        create_schema(&pool).await?;

        let locator = Arc::new(PgDriverLocator::new(pool.clone())) as Arc<dyn DriverLocator>;
        let dispatcher = Dispatcher::new(locator.clone(), broker.clone());
        let notifier = BidNotifier::new(broker.clone());

        Ok(Self {
            pool,
            broker,
            credentials,
            sms,
            locator,
            dispatcher,
            notifier,
        })
    }
}

impl API for Engine {}
