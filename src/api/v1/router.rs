use super::handler;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

const MAX_PAYLOAD_BYTES: u64 = 64 * 1024;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    // paths before methods, so unknown paths reject as not found
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handler::health);

    let store = warp::path("session")
        .and(warp::path::end())
        .and(warp::put())
        .and(warp::header::headers_cloned())
        .and(warp::body::content_length_limit(MAX_PAYLOAD_BYTES))
        .and(warp::body::json())
        .and(with(server.session_broker.clone()))
        .and_then(handler::store_session);

    let load = warp::path("session")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::header::headers_cloned())
        .and(with(server.session_broker.clone()))
        .and_then(handler::load_session);

    let delete = warp::path("session")
        .and(warp::path::end())
        .and(warp::delete())
        .and(warp::header::headers_cloned())
        .and(with(server.session_broker.clone()))
        .and_then(handler::delete_session);

    let rotate = warp::path("session")
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::header::headers_cloned())
        .and(with(server.session_broker.clone()))
        .and_then(handler::rotate_session);

    health.or(store).or(load).or(delete).or(rotate)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}
