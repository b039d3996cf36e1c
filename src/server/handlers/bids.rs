use axum::extract::{rejection::JsonRejection, Extension, Json};

use crate::api::DynAPI;
use crate::entities::{Bid, NewBid};
use crate::error::Error;

pub async fn create(
    Extension(api): Extension<DynAPI>,
    payload: Result<Json<NewBid>, JsonRejection>,
) -> Result<Json<Bid>, Error> {
    let Json(params) = payload?;
    let bid = api.create_bid(params).await?;

    Ok(bid.into())
}
