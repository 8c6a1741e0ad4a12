use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::error::AppResult;
use crate::models::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Hydrated recommendations of one user
    Recommendations(UserId),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Recommendations(user_id) => write!(f, "recs:{}", user_id),
        }
    }
}

/// Creates a Redis client for caching
///
/// Establishes a connection to Redis for fast data caching.
/// Uses connection pooling via the connection-manager feature.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

enum CacheCommand {
    Set { key: String, value: String, ttl: u64 },
    Delete { key: String },
}

/// Message for the cache writer; `ack` is set when the caller waits for the outcome
struct CacheWriteMessage {
    command: CacheCommand,
    ack: Option<oneshot::Sender<AppResult<()>>>,
}

/// Cache handler for storing and retrieving data from Redis
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Initiates a graceful shutdown of the cache writer
    ///
    /// Sends a shutdown signal to the writer task and waits for it to flush
    /// all queued writes to Redis.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task ended abnormally");
        }
    }
}

impl Cache {
    /// Creates a new Cache instance with an async write background task
    ///
    /// Writes are applied by a single task in the order they were queued, so the
    /// last queued value for a key is the one that ends up in Redis.
    pub async fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        let task = tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
        };

        let handle = CacheWriterHandle { shutdown_tx, task };

        (cache, handle)
    }

    /// Background task that processes cache write messages
    ///
    /// On shutdown it drains whatever is already queued and exits without waiting
    /// for senders that are still alive.
    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                message = write_rx.recv() => {
                    let Some(msg) = message else {
                        tracing::info!("All cache handles dropped, writer stopping");
                        break;
                    };
                    let result = Self::write_to_redis(&client, msg.command).await;
                    match msg.ack {
                        Some(ack) => {
                            let _ = ack.send(result);
                        }
                        None => {
                            if let Err(e) = result {
                                tracing::error!(error = %e, "Failed to write to Redis cache");
                            }
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    let mut flushed = 0;
                    while let Ok(msg) = write_rx.try_recv() {
                        let result = Self::write_to_redis(&client, msg.command).await;
                        if let Err(e) = &result {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        } else {
                            flushed += 1;
                        }
                        if let Some(ack) = msg.ack {
                            let _ = ack.send(result);
                        }
                    }

                    tracing::info!(flushed, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    /// Applies a single command to Redis
    async fn write_to_redis(client: &Client, command: CacheCommand) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        match command {
            CacheCommand::Set { key, value, ttl } => {
                let _: () = conn.set_ex(key, value, ttl).await?;
            }
            CacheCommand::Delete { key } => {
                let _: () = conn.del(key).await?;
            }
        }
        Ok(())
    }

    /// Queues `command` behind every earlier write and waits until Redis has applied it
    async fn write_and_wait(&self, command: CacheCommand) -> AppResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.write_tx
            .send(CacheWriteMessage {
                command,
                ack: Some(ack_tx),
            })
            .map_err(|_| AppError::Internal("cache writer is not running".to_string()))?;

        ack_rx
            .await
            .map_err(|_| AppError::Internal("cache writer dropped the write".to_string()))?
    }

    /// Removes `key`, after any writes queued before this call
    pub async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        self.write_and_wait(CacheCommand::Delete {
            key: key.to_string(),
        })
        .await
    }

    /// Stores a value and waits until Redis has it
    ///
    /// Ordered with the background writes, so no write queued earlier can overwrite it.
    pub async fn set<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Cache serialization error: {}", e)))?;

        self.write_and_wait(CacheCommand::Set {
            key: key.to_string(),
            value: json,
            ttl,
        })
        .await
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` when the key does not exist.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(format!("{}", key)).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value in the cache asynchronously without blocking
    ///
    /// The value is serialized here and handed to the background writer; the call
    /// returns before Redis has seen it.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            command: CacheCommand::Set {
                key: key.to_string(),
                value: json,
                ttl,
            },
            ack: None,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}
