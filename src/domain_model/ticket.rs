use crate::domain_model::Token;
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// Next-token/expiry pair decided for a request that asked for rotation.
/// It only becomes durable once the old key is renamed to `next_token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationTicket {
    pub next_token: Token,
    pub expires_at: DateTime<Utc>,
}

impl RotationTicket {
    pub fn issue(ttl: Duration) -> Self {
        Self::issue_at(Utc::now(), ttl)
    }

    // Saturates at the latest representable instant.
    fn issue_at(now: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        RotationTicket {
            next_token: Token::generate(),
            expires_at,
        }
    }
}
