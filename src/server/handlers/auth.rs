use axum::extract::{rejection::JsonRejection, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::error::Error;

#[derive(Debug, Deserialize)]
pub struct SendOtpParams {
    phone: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpParams {
    phone: String,
    code: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OtpStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_code: Option<String>,
}

pub async fn send_otp(
    Extension(api): Extension<DynAPI>,
    payload: Result<Json<SendOtpParams>, JsonRejection>,
) -> Result<Json<OtpStatus>, Error> {
    let Json(params) = payload?;
    let code = api.send_otp(&params.phone).await?;

    Ok(OtpStatus {
        status: "sent".into(),
        dev_code: Some(code),
    }
    .into())
}

pub async fn verify_otp(
    Extension(api): Extension<DynAPI>,
    payload: Result<Json<VerifyOtpParams>, JsonRejection>,
) -> Result<Json<OtpStatus>, Error> {
    let Json(params) = payload?;
    api.verify_otp(&params.phone, &params.code).await?;

    Ok(OtpStatus {
        status: "verified".into(),
        dev_code: None,
    }
    .into())
}
