use super::error::*;
use super::headers;
use crate::application_impl::SessionBroker;
use crate::application_port::SessionReply;
use crate::domain_model::RequestHeaders;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use warp::Reply;
use warp::http::HeaderMap;
use warp::reply::Response;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Session headers go out on failures too, so the client keeps a usable token.
fn respond<T: Serialize>(reply: SessionReply<T>) -> Response {
    let (session_headers, result) = reply.into_parts();
    let mut response = match result {
        Ok(data) => warp::reply::json(&ApiResponse::ok(data)).into_response(),
        Err(e) => {
            let code = ApiErrorCode::from(e);
            let status = code.status();
            let json = warp::reply::json(&ApiResponse::<()>::err(code.clone(), code.to_string()));
            warp::reply::with_status(json, status).into_response()
        }
    };
    headers::apply(&session_headers, response.headers_mut());
    response
}

pub async fn store_session(
    header_map: HeaderMap,
    body: Value,
    broker: Arc<SessionBroker>,
) -> Result<Response, warp::Rejection> {
    let request = RequestHeaders::from(&header_map);
    Ok(respond(broker.store(&request, &body).await))
}

pub async fn load_session(
    header_map: HeaderMap,
    broker: Arc<SessionBroker>,
) -> Result<Response, warp::Rejection> {
    let request = RequestHeaders::from(&header_map);
    Ok(respond(broker.load::<Value>(&request).await))
}

pub async fn delete_session(
    header_map: HeaderMap,
    broker: Arc<SessionBroker>,
) -> Result<Response, warp::Rejection> {
    let request = RequestHeaders::from(&header_map);
    Ok(respond(broker.delete(&request).await))
}

pub async fn rotate_session(
    header_map: HeaderMap,
    broker: Arc<SessionBroker>,
) -> Result<Response, warp::Rejection> {
    let request = RequestHeaders::from(&header_map);
    Ok(respond(broker.rotate(&request).await))
}

pub async fn health() -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&ApiResponse::ok("ok")))
}
