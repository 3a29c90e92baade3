//! Redis store client for connecting to an external Redis server

use std::sync::Mutex;

use redis::{Client, Commands, Connection, RedisResult};
use tracing::{info, warn};

use crate::error::{CacheError, Result};
use crate::store::StoreClient;

// == Connection Pool ==
/// Idle connections handed out one per command.
///
/// The lock only guards checkout and return; commands run on a connection
/// owned by the caller. A connection that fails at the transport level is
/// dropped, so the next command dials a fresh one.
struct ConnectionPool<C> {
    idle: Mutex<Vec<C>>,
}

impl<C> ConnectionPool<C> {
    fn new() -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
        }
    }

    fn checkin(&self, conn: C) {
        if let Ok(mut idle) = self.idle.lock() {
            idle.push(conn);
        }
    }

    fn checkout(&self) -> Option<C> {
        self.idle.lock().ok().and_then(|mut idle| idle.pop())
    }

    /// Runs `command` on an idle connection, or on a new one from `connect`.
    ///
    /// Errors are not retried.
    fn run<T>(
        &self,
        connect: impl FnOnce() -> RedisResult<C>,
        command: impl FnOnce(&mut C) -> RedisResult<T>,
    ) -> Result<T> {
        let mut conn = match self.checkout() {
            Some(conn) => conn,
            None => connect().map_err(|e| CacheError::StoreUnavailable(e.to_string()))?,
        };

        match command(&mut conn) {
            Ok(value) => {
                self.checkin(conn);
                Ok(value)
            }
            Err(err) => {
                let err = CacheError::from(err);
                if matches!(err, CacheError::StoreUnavailable(_)) {
                    warn!("Dropping broken Redis connection: {}", err);
                } else {
                    self.checkin(conn);
                }
                Err(err)
            }
        }
    }

    #[cfg(test)]
    fn idle_count(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }
}

// == Redis Store ==
/// Store client backed by synchronous Redis connections.
///
/// Atomicity of `INCR` and `RPUSH` across clients is provided by the server.
/// After a Redis restart the failing command reports `StoreUnavailable` and
/// later commands reconnect.
pub struct RedisStore {
    client: Client,
    pool: ConnectionPool<Connection>,
}

impl RedisStore {
    /// Connect to the Redis server at `url` (e.g. `redis://127.0.0.1:6379/0`).
    ///
    /// Any failure to parse the URL or reach the server is reported as
    /// [`CacheError::StoreUnavailable`].
    pub fn open(url: &str) -> Result<Self> {
        let client =
            Client::open(url).map_err(|e| CacheError::StoreUnavailable(e.to_string()))?;
        let connection = client
            .get_connection()
            .map_err(|e| CacheError::StoreUnavailable(e.to_string()))?;
        info!("Connected to Redis at {}", url);

        let pool = ConnectionPool::new();
        pool.checkin(connection);
        Ok(Self { client, pool })
    }

    fn run<T>(&self, command: impl FnOnce(&mut Connection) -> RedisResult<T>) -> Result<T> {
        self.pool.run(|| self.client.get_connection(), command)
    }
}

impl StoreClient for RedisStore {
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.run(|conn| conn.set(key, value))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.run(|conn| conn.get(key))
    }

    fn increment(&self, key: &str) -> Result<i64> {
        self.run(|conn| conn.incr(key, 1))
    }

    fn append_to_list(&self, key: &str, value: &[u8]) -> Result<()> {
        let _: i64 = self.run(|conn| conn.rpush(key, value))?;
        Ok(())
    }

    fn set_with_expiry(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<()> {
        self.run(|conn| conn.set_ex(key, value, ttl_seconds))
    }

    fn list_range(&self, key: &str) -> Result<Vec<Vec<u8>>> {
        self.run(|conn| conn.lrange(key, 0, -1))
    }

    fn flush(&self) -> Result<()> {
        self.run(|conn| redis::cmd("FLUSHDB").query(conn))
    }
}
