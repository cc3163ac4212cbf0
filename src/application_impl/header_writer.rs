use crate::domain_model::*;
use chrono::{FixedOffset, Local};

pub const EXPIRES_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Builds the CORS and token headers every session response carries.
#[derive(Debug, Clone)]
pub struct ResponseHeaderWriter {
    offset: FixedOffset,
}

impl ResponseHeaderWriter {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Uses the process's current local UTC offset.
    pub fn local() -> Self {
        Self::new(*Local::now().offset())
    }

    /// The fixed CORS pair, with no token headers.
    pub fn cors() -> ResponseHeaders {
        let mut headers = ResponseHeaders::new();
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_REQUEST_HEADERS);
        headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, EXPOSED_RESPONSE_HEADERS);
        headers
    }

    pub fn write(&self, current: &Token, ticket: Option<&RotationTicket>) -> ResponseHeaders {
        let mut headers = Self::cors();
        match ticket {
            Some(ticket) => {
                headers.insert(REFRESH_TOKEN, ticket.next_token.as_str());
                headers.insert(
                    REFRESH_EXPIRES,
                    ticket
                        .expires_at
                        .with_timezone(&self.offset)
                        .format(EXPIRES_FORMAT)
                        .to_string(),
                );
            }
            None => headers.insert(REFRESH_TOKEN, current.as_str()),
        }
        headers
    }
}
