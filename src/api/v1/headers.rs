use crate::domain_model::*;
use crate::logger::*;
use warp::http::HeaderMap;
use warp::http::header::{HeaderName, HeaderValue};

fn read(map: &HeaderMap, name: &str) -> Option<String> {
    map.get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

impl From<&HeaderMap> for RequestHeaders {
    fn from(map: &HeaderMap) -> Self {
        RequestHeaders {
            authorization: read(map, AUTHORIZATION),
            accept_token: read(map, ACCEPT_TOKEN),
            refresh_token: read(map, REFRESH_TOKEN),
        }
    }
}

pub fn apply(headers: &ResponseHeaders, target: &mut HeaderMap) {
    for (name, value) in headers.iter() {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                target.insert(name, value);
            }
            _ => warn!("dropping unrepresentable response header {}", name),
        }
    }
}
