use super::headers;
use crate::api::v1::handler::ApiResponse;
use crate::application_impl::ResponseHeaderWriter;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::{debug, warn};
use warp::http::StatusCode;
use warp::{Rejection, Reply, reject};

/// Turns a rejection into the JSON envelope. Rejected requests never reach the
/// broker, so only the CORS headers are attached.
pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (code, message, status) = if let Some(code) = err.find::<ApiErrorCode>() {
        (code.clone(), code.to_string(), code.status())
    } else if err.is_not_found() {
        let code = ApiErrorCode::RouteNotFound;
        (code.clone(), code.to_string(), StatusCode::NOT_FOUND)
    } else if let Some(e) = err.find::<warp::body::BodyDeserializeError>() {
        (ApiErrorCode::InvalidPayload, e.to_string(), StatusCode::BAD_REQUEST)
    } else if let Some(e) = err.find::<reject::UnsupportedMediaType>() {
        (
            ApiErrorCode::InvalidPayload,
            e.to_string(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
        )
    } else if err.find::<reject::PayloadTooLarge>().is_some() {
        (
            ApiErrorCode::InvalidPayload,
            "payload too large".to_string(),
            StatusCode::PAYLOAD_TOO_LARGE,
        )
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        let code = ApiErrorCode::MethodNotAllowed;
        (code.clone(), code.to_string(), StatusCode::METHOD_NOT_ALLOWED)
    } else {
        (
            ApiErrorCode::internal(format!("{:?}", err)),
            ApiErrorCode::InternalError.to_string(),
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(code, message));
    let mut response = warp::reply::with_status(json, status).into_response();
    headers::apply(&ResponseHeaderWriter::cors(), response.headers_mut());
    Ok(response)
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
pub enum ApiErrorCode {
    #[error("No session data")]
    SessionNotFound,
    #[error("Session payload is not valid")]
    InvalidPayload,
    #[error("Session store unavailable")]
    StoreUnavailable,
    #[error("Route not found")]
    RouteNotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::SessionNotFound | ApiErrorCode::InvalidPayload => StatusCode::OK,
            ApiErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorCode::RouteNotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<SessionError> for ApiErrorCode {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::SessionNotFound => {
                debug!("session not found");
                ApiErrorCode::SessionNotFound
            }
            SessionError::Serialization(e) => {
                debug!("session payload rejected: {}", e);
                ApiErrorCode::InvalidPayload
            }
            SessionError::StoreUnavailable(e) => {
                warn!("session store unavailable: {}", e);
                ApiErrorCode::StoreUnavailable
            }
        }
    }
}
