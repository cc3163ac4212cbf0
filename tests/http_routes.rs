use chrono::{FixedOffset, NaiveDateTime};
use serde_json::{Value, json};
use sesame::api;
use sesame::application_impl::ResponseHeaderWriter;
use sesame::domain_port::KeyValueStore;
use sesame::infra_memory::MemoryKvStore;
use sesame::server::Server;
use std::sync::Arc;
use std::time::Duration;
use warp::Filter;
use warp::http::{Response, StatusCode};
use warp::hyper::body::Bytes;

const TTL: Duration = Duration::from_secs(600);

// Helper to build the server around an in-memory store
fn test_server() -> (Arc<MemoryKvStore>, Arc<Server>) {
    let store = Arc::new(MemoryKvStore::new());
    let writer = ResponseHeaderWriter::new(FixedOffset::east_opt(0).unwrap());
    let server = Arc::new(Server::from_parts(store.clone(), TTL, writer));
    (store, server)
}

fn api(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = std::convert::Infallible> + Clone {
    warp::path("api")
        .and(warp::path("v1"))
        .and(api::v1::routes(server))
        .recover(api::v1::recover_error)
}

fn header<'a>(res: &'a Response<Bytes>, name: &str) -> Option<&'a str> {
    res.headers().get(name).map(|v| v.to_str().unwrap())
}

fn body(res: &Response<Bytes>) -> Value {
    serde_json::from_slice(res.body()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_, server) = test_server();
    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/health")
        .reply(&api(server))
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body(&res)["data"], "ok");
}

#[tokio::test]
async fn test_example_flow_store_load_rotate_opt_out() {
    let (_, server) = test_server();
    let filter = api(server);

    let res = warp::test::request()
        .method("PUT")
        .path("/api/v1/session")
        .header("Refresh-Token", "off")
        .json(&json!({"user": "alice"}))
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body(&res)["success"], true);
    let token = header(&res, "refresh-token").unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&token).is_ok());
    assert_eq!(header(&res, "refresh-expires"), None);

    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/session")
        .header("Authorization", format!("Bearer {}", token))
        .header("Refresh-Token", "off")
        .reply(&filter)
        .await;
    assert_eq!(body(&res)["data"], json!({"user": "alice"}));

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/session/refresh")
        .header("Authorization", format!("Bearer {}", token))
        .header("Refresh-Token", "off")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body(&res)["success"], true);
    assert_eq!(header(&res, "refresh-token"), Some(token.as_str()));
    assert_eq!(header(&res, "refresh-expires"), None);
}

#[tokio::test]
async fn test_rotation_moves_session_to_new_token() {
    let (store, server) = test_server();
    let filter = api(server);
    store.set("T", r#"{"a":1}"#, TTL).await.unwrap();

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/session/refresh")
        .header("Authorization", "Bearer T")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let next = header(&res, "refresh-token").unwrap().to_string();
    assert_ne!(next, "T");
    let expires = header(&res, "refresh-expires").unwrap();
    assert!(NaiveDateTime::parse_from_str(expires, "%Y-%m-%d %H:%M:%S").is_ok());
    assert!(!store.exists("T").await);

    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/session")
        .header("Accept-Token", next.as_str())
        .header("Refresh-Token", "0")
        .reply(&filter)
        .await;
    assert_eq!(body(&res)["data"], json!({"a": 1}));
}

#[tokio::test]
async fn test_missing_session_reports_not_found_with_headers() {
    let (_, server) = test_server();
    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/session")
        .header("Authorization", "Bearer nobody")
        .header("Refresh-Token", "false")
        .reply(&api(server))
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let json = body(&res);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "SessionNotFound");
    assert_eq!(header(&res, "refresh-token"), Some("nobody"));
    assert_eq!(
        header(&res, "access-control-expose-headers"),
        Some("Authorization, Access-Token, Refresh-Token, Refresh-Expires")
    );
    assert!(header(&res, "access-control-allow-headers").is_some());
}

#[tokio::test]
async fn test_delete_twice_succeeds() {
    let (store, server) = test_server();
    let filter = api(server);
    store.set("T", r#"{"a":1}"#, TTL).await.unwrap();

    for _ in 0..2 {
        let res = warp::test::request()
            .method("DELETE")
            .path("/api/v1/session")
            .header("Authorization", "Basic T")
            .header("Refresh-Token", "off")
            .reply(&filter)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body(&res)["success"], true);
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_invalid_json_body_is_rejected() {
    let (store, server) = test_server();
    let res = warp::test::request()
        .method("PUT")
        .path("/api/v1/session")
        .header("Content-Type", "application/json")
        .body("{not json")
        .reply(&api(server))
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&res)["error"]["code"], "InvalidPayload");
    assert!(header(&res, "access-control-expose-headers").is_some());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_non_json_body_is_unsupported_media_type() {
    let (store, server) = test_server();
    let res = warp::test::request()
        .method("PUT")
        .path("/api/v1/session")
        .header("Content-Type", "text/plain")
        .body(r#"{"a":1}"#)
        .reply(&api(server))
        .await;

    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let json = body(&res);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "InvalidPayload");
    assert_eq!(
        header(&res, "access-control-expose-headers"),
        Some("Authorization, Access-Token, Refresh-Token, Refresh-Expires")
    );
    assert!(header(&res, "access-control-allow-headers").is_some());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let (store, server) = test_server();
    let big = format!(r#"{{"blob":"{}"}}"#, "x".repeat(70 * 1024));
    let res = warp::test::request()
        .method("PUT")
        .path("/api/v1/session")
        .header("Content-Type", "application/json")
        .body(big)
        .reply(&api(server))
        .await;

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body(&res)["error"]["code"], "InvalidPayload");
    assert!(header(&res, "access-control-allow-headers").is_some());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_default_store_advertises_token_without_record() {
    let (store, server) = test_server();
    let res = warp::test::request()
        .method("PUT")
        .path("/api/v1/session")
        .json(&json!({"user": "alice"}))
        .reply(&api(server))
        .await;

    assert_eq!(body(&res)["success"], true);
    let advertised = header(&res, "refresh-token").unwrap();
    assert!(header(&res, "refresh-expires").is_some());
    assert!(!store.exists(advertised).await);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (_, server) = test_server();
    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/nope")
        .reply(&api(server))
        .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
