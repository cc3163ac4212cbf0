use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::KeyValueStore;
use crate::logger::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Per-request decision: who the caller is now, and who they become if
/// rotation was asked for.
struct Resolved {
    current: Token,
    ticket: Option<RotationTicket>,
}

/// Binds request tokens to session records in a [`KeyValueStore`].
///
/// Every operation resolves the caller's token, decides on rotation and
/// returns the response headers alongside its result, so the client always
/// learns which token to present next.
pub struct SessionBroker {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
    policy: RotationPolicy,
    writer: ResponseHeaderWriter,
}

impl SessionBroker {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration, writer: ResponseHeaderWriter) -> Self {
        Self {
            store,
            ttl,
            policy: RotationPolicy::new(ttl),
            writer,
        }
    }

    fn resolve(&self, request: &RequestHeaders) -> Resolved {
        Resolved {
            current: extract_token(request),
            ticket: self.policy.decide(request.refresh_token.as_deref()),
        }
    }

    fn reply<T>(&self, resolved: &Resolved, result: Result<T, SessionError>) -> SessionReply<T> {
        SessionReply {
            headers: self.writer.write(&resolved.current, resolved.ticket.as_ref()),
            result,
        }
    }

    /// Serializes `payload` and stores it under the caller's token,
    /// overwriting any previous record.
    pub async fn store<T>(&self, request: &RequestHeaders, payload: &T) -> SessionReply<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let resolved = self.resolve(request);
        let result = self.store_record(&resolved.current, payload).await;
        self.reply(&resolved, result)
    }

    /// Reads the caller's record. Absent and empty records are both
    /// [`SessionError::SessionNotFound`].
    pub async fn load<T: DeserializeOwned>(&self, request: &RequestHeaders) -> SessionReply<T> {
        let resolved = self.resolve(request);
        let result = self.load_record(&resolved.current).await;
        self.reply(&resolved, result)
    }

    /// Removes the caller's record if there is one.
    pub async fn delete(&self, request: &RequestHeaders) -> SessionReply<()> {
        let resolved = self.resolve(request);
        let result = self.delete_record(&resolved.current).await;
        self.reply(&resolved, result)
    }

    /// Moves the caller's record to the rotation ticket's token with a fresh
    /// TTL. No-op when rotation was not requested or there is no record.
    pub async fn rotate(&self, request: &RequestHeaders) -> SessionReply<()> {
        let resolved = self.resolve(request);
        let result = self.rotate_record(&resolved).await;
        self.reply(&resolved, result)
    }

    /// Administrative wipe of every stored session.
    pub async fn clear(&self) -> Result<(), SessionError> {
        self.store.clear().await?;
        Ok(())
    }

    async fn store_record<T>(&self, token: &Token, payload: &T) -> Result<(), SessionError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let value = serde_json::to_string(payload)?;
        self.store.set(token.as_str(), &value, self.ttl).await?;
        Ok(())
    }

    async fn load_record<T: DeserializeOwned>(&self, token: &Token) -> Result<T, SessionError> {
        if !self.store.exists(token.as_str()).await {
            debug!("no session for token {}", token.short());
            return Err(SessionError::SessionNotFound);
        }
        match self.store.get(token.as_str()).await? {
            Some(value) if !value.is_empty() => Ok(serde_json::from_str(&value)?),
            _ => Err(SessionError::SessionNotFound),
        }
    }

    async fn delete_record(&self, token: &Token) -> Result<(), SessionError> {
        if self.store.exists(token.as_str()).await {
            self.store.delete(token.as_str()).await?;
        }
        Ok(())
    }

    async fn rotate_record(&self, resolved: &Resolved) -> Result<(), SessionError> {
        let Some(ticket) = &resolved.ticket else {
            return Ok(());
        };
        let current = &resolved.current;
        if !self.store.exists(current.as_str()).await {
            return Ok(());
        }
        let moved = self
            .store
            .rename(current.as_str(), ticket.next_token.as_str(), self.ttl)
            .await?;
        if moved {
            debug!(
                "rotated session {} -> {}",
                current.short(),
                ticket.next_token.short()
            );
        } else {
            debug!("session {} vanished before rotation", current.short());
        }
        Ok(())
    }
}
