use super::helpers::{ensure_present, user_from_row, USER_COLUMNS};
use super::Engine;

use async_trait::async_trait;
use sqlx::Executor;

use crate::{
    api::UserAPI,
    entities::{Coordinates, NewUser, User},
    error::{invalid_input_error, Error},
};

#[async_trait]
impl UserAPI for Engine {
    #[tracing::instrument(skip(self, params), fields(role = params.role.name()))]
    async fn create_user(&self, params: NewUser) -> Result<User, Error> {
        ensure_present(&params.phone)?;

        if !Coordinates::new(params.last_lat, params.last_long).is_valid() {
            return Err(invalid_input_error());
        }

        let query = format!(
            "INSERT INTO users (phone, name, role, last_lat, last_long)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        );

        let row = self
            .pool
            .fetch_one(
                sqlx::query(&query)
                    .bind(params.phone.trim())
                    .bind(&params.name)
                    .bind(params.role.name())
                    .bind(params.last_lat)
                    .bind(params.last_long),
            )
            .await?;

        let user = user_from_row(&row)?;

        tracing::info!(user_id = user.id, "user created");

        Ok(user)
    }
}
