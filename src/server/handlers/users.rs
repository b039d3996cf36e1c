use axum::extract::{rejection::JsonRejection, Extension, Json};

use crate::api::DynAPI;
use crate::entities::{NewUser, User};
use crate::error::Error;

pub async fn create(
    Extension(api): Extension<DynAPI>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<Json<User>, Error> {
    let Json(params) = payload?;
    let user = api.create_user(params).await?;

    Ok(user.into())
}
