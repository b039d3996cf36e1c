use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Executor, Pool, Postgres};

use crate::error::Error;

pub struct PgPool(pub Pool<Postgres>);

impl PgPool {
    /// Callers wait at most `acquire_timeout` for a free connection before the
    /// query fails with a database error.
    #[tracing::instrument(skip(db_uri))]
    pub async fn new(
        db_uri: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(db_uri)
            .await?;

        tracing::info!("connected to postgres");

        Ok(Self(pool))
    }
}

/// Creates the tables if they are missing. Existing data is left alone.
#[tracing::instrument(skip_all)]
pub async fn create_schema(pool: &Pool<Postgres>) -> Result<(), Error> {
    pool.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id SERIAL PRIMARY KEY,
            phone VARCHAR(20) UNIQUE NOT NULL,
            name VARCHAR(100),
            role VARCHAR(20) NOT NULL,
            last_lat DOUBLE PRECISION NOT NULL DEFAULT 0,
            last_long DOUBLE PRECISION NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .await?;

    pool.execute("CREATE INDEX IF NOT EXISTS users_role_last_lat_idx ON users (role, last_lat)")
        .await?;

    pool.execute(
        "CREATE TABLE IF NOT EXISTS rides (
            id SERIAL PRIMARY KEY,
            rider_id INT4 NOT NULL REFERENCES users(id),
            pickup_address TEXT NOT NULL,
            dropoff_address TEXT NOT NULL,
            pickup_lat DOUBLE PRECISION NOT NULL DEFAULT 0,
            pickup_long DOUBLE PRECISION NOT NULL DEFAULT 0,
            dropoff_lat DOUBLE PRECISION NOT NULL DEFAULT 0,
            dropoff_long DOUBLE PRECISION NOT NULL DEFAULT 0,
            vehicle_type VARCHAR(20),
            status VARCHAR(20) NOT NULL DEFAULT 'requested',
            price NUMERIC(10, 2),
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .await?;

    pool.execute(
        "CREATE TABLE IF NOT EXISTS bids (
            id SERIAL PRIMARY KEY,
            ride_id INT4 NOT NULL REFERENCES rides(id),
            driver_id INT4 NOT NULL REFERENCES users(id),
            amount NUMERIC(10, 2) NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'pending',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .await?;

    tracing::info!("schema ready");

    Ok(())
}
