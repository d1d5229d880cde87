use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::info;
use tripway_core::repository::EphemeralStore;
use tripway_core::{CoreError, CoreResult};

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> CoreResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(redis_error)
    }
}

fn redis_error(err: redis::RedisError) -> CoreError {
    tracing::error!("Redis error: {}", err);
    CoreError::Internal(err.to_string())
}

#[async_trait]
impl EphemeralStore for RedisClient {
    async fn put_code(&self, key: &str, code: &str, ttl_seconds: u64) -> CoreResult<()> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, code, ttl_seconds)
            .await
            .map_err(redis_error)?;
        info!("Confirmation code stored under {} for {}s", key, ttl_seconds);
        Ok(())
    }

    async fn take_code(&self, key: &str, code: &str) -> CoreResult<bool> {
        let mut conn = self.connection().await?;
        // Compare and delete atomically so two concurrent checks cannot both match.
        let script = redis::Script::new(r#"
            if redis.call("GET", KEYS[1]) == ARGV[1] then
                return redis.call("DEL", KEYS[1])
            else
                return 0
            end
        "#);

        let removed: i64 = script
            .key(key)
            .arg(code)
            .invoke_async(&mut conn)
            .await
            .map_err(redis_error)?;
        Ok(removed == 1)
    }

    async fn delete(&self, key: &str) -> CoreResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await.map_err(redis_error)
    }

    async fn hit(&self, key: &str, window_seconds: u64) -> CoreResult<u64> {
        let mut conn = self.connection().await?;
        // The expiry is set only when the counter is created, giving a fixed window.
        let script = redis::Script::new(r#"
            local count = redis.call("INCR", KEYS[1])
            if count == 1 then
                redis.call("EXPIRE", KEYS[1], ARGV[1])
            end
            return count
        "#);

        script
            .key(key)
            .arg(window_seconds)
            .invoke_async(&mut conn)
            .await
            .map_err(redis_error)
    }
}
