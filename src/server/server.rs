use crate::application_impl::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use std::sync::Arc;

pub struct Server {
    pub session_broker: Arc<SessionBroker>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn KeyValueStore> = match settings.store.backend.as_str() {
            "memory" => Arc::new(MemoryKvStore::new()),
            "redis" => {
                let url = settings
                    .store
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("store.redis_url is required for redis"))?;
                let redis_client = redis::Client::open(url)?;
                let mut redis_manager = tokio::time::timeout(
                    settings.store.timeout(),
                    redis_client.get_connection_manager(),
                )
                .await
                .map_err(|_| anyhow::anyhow!("timed out connecting to redis"))??;

                let pong: String = tokio::time::timeout(
                    settings.store.timeout(),
                    redis::cmd("PING").query_async(&mut redis_manager),
                )
                .await
                .map_err(|_| anyhow::anyhow!("timed out waiting for redis PING"))??;
                if !pong.eq_ignore_ascii_case("PONG") {
                    return Err(anyhow::anyhow!("unexpected PING reply: {}", pong));
                }
                Arc::new(RedisKvStore::new(
                    redis_manager,
                    settings.store.prefix.clone(),
                    settings.store.timeout(),
                ))
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let writer = match settings.session.utc_offset()? {
            Some(offset) => ResponseHeaderWriter::new(offset),
            None => ResponseHeaderWriter::local(),
        };

        info!(
            backend = %settings.store.backend,
            ttl_secs = settings.session.ttl_secs,
            "session store ready"
        );

        Ok(Self::from_parts(store, settings.session.ttl(), writer))
    }

    pub fn from_parts(
        store: Arc<dyn KeyValueStore>,
        ttl: std::time::Duration,
        writer: ResponseHeaderWriter,
    ) -> Self {
        Self {
            session_broker: Arc::new(SessionBroker::new(store, ttl, writer)),
        }
    }
}
