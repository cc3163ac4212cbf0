use crate::domain_model::ResponseHeaders;
use crate::domain_port::KvStoreError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session not found")]
    SessionNotFound,
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<KvStoreError> for SessionError {
    fn from(err: KvStoreError) -> Self {
        SessionError::StoreUnavailable(err.to_string())
    }
}

/// Outcome of a session operation. `headers` are always present, whatever
/// `result` holds, and must be attached to the response.
#[derive(Debug)]
pub struct SessionReply<T> {
    pub headers: ResponseHeaders,
    pub result: Result<T, SessionError>,
}

impl<T> SessionReply<T> {
    pub fn into_parts(self) -> (ResponseHeaders, Result<T, SessionError>) {
        (self.headers, self.result)
    }
}
