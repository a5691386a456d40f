//! Redis cache service for analysis results
//!
//! LLM stages dominate the cost of a run; cached reports and context
//! snippets short-circuit repeat analyses of the same rule.

use std::env;

use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};

// Environment variable names
const ENV_REDIS_HOST: &str = "RAM_REDIS_HOST";
const ENV_REDIS_PORT: &str = "RAM_REDIS_PORT";
const ENV_REDIS_PASSWORD: &str = "RAM_REDIS_PASSWORD";
const ENV_REDIS_DB: &str = "RAM_REDIS_DB";
const ENV_CACHE_TTL: &str = "RAM_CACHE_TTL";

// Default values
const DEFAULT_REDIS_HOST: &str = "127.0.0.1";
const DEFAULT_REDIS_PORT: &str = "6379";
const DEFAULT_REDIS_DB: &str = "0";
const DEFAULT_TTL_SECONDS: u64 = 3600; // 1 hour

// TTL for full analysis reports (7 days in seconds); reports are stable
// for a given rule, model, and prompt version
const REPORT_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cache miss for key: {0}")]
    Miss(String),
}

// Cache key prefixes
const PREFIX_ANALYSIS: &str = "analysis:";
const PREFIX_CONTEXT: &str = "context:";

/// Redis-based cache for analysis reports and context snippets
#[derive(Clone)]
pub struct AnalysisCache {
    client: Client,
    ttl_seconds: u64,
}

impl AnalysisCache {
    /// Create a new cache instance and verify connection
    ///
    /// Configuration via environment variables:
    /// - `RAM_REDIS_HOST` - Redis host (default: 127.0.0.1)
    /// - `RAM_REDIS_PORT` - Redis port (default: 6379)
    /// - `RAM_REDIS_PASSWORD` - Redis password (default: none)
    /// - `RAM_REDIS_DB` - Redis database number (default: 0)
    /// - `RAM_CACHE_TTL` - Cache TTL in seconds (default: 3600)
    pub async fn new() -> Result<Self, CacheError> {
        let host = env::var(ENV_REDIS_HOST).unwrap_or_else(|_| DEFAULT_REDIS_HOST.to_string());
        let port = env::var(ENV_REDIS_PORT).unwrap_or_else(|_| DEFAULT_REDIS_PORT.to_string());
        let password = env::var(ENV_REDIS_PASSWORD).ok();
        let db = env::var(ENV_REDIS_DB).unwrap_or_else(|_| DEFAULT_REDIS_DB.to_string());

        let ttl_seconds = env::var(ENV_CACHE_TTL)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TTL_SECONDS);

        // Build Redis URL: redis://[password@]host:port/db
        let redis_url = match password {
            Some(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            _ => format!("redis://{}:{}/{}", host, port, db),
        };

        tracing::debug!(host = %host, port = %port, db = %db, "Connecting to Redis");

        let client = Client::open(redis_url)?;

        // Test the connection by pinging Redis
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        tracing::info!(host = %host, port = %port, "Redis connection established");

        Ok(Self {
            client,
            ttl_seconds,
        })
    }

    /// Get a cached analysis report by composite key hash
    pub async fn get_analysis<T: DeserializeOwned>(&self, key_hash: &str) -> Result<T, CacheError> {
        self.get_with_prefix(PREFIX_ANALYSIS, key_hash).await
    }

    /// Cache an analysis report by composite key hash
    pub async fn set_analysis<T: Serialize>(
        &self,
        key_hash: &str,
        data: &T,
    ) -> Result<(), CacheError> {
        // Use 7-day TTL for full reports
        self.set_with_prefix_and_ttl(PREFIX_ANALYSIS, key_hash, data, REPORT_TTL_SECONDS)
            .await
    }

    /// Get a cached context snippet by query hash
    pub async fn get_context<T: DeserializeOwned>(&self, query_hash: &str) -> Result<T, CacheError> {
        self.get_with_prefix(PREFIX_CONTEXT, query_hash).await
    }

    /// Cache a context snippet by query hash
    pub async fn set_context<T: Serialize>(
        &self,
        query_hash: &str,
        data: &T,
    ) -> Result<(), CacheError> {
        self.set_with_prefix(PREFIX_CONTEXT, query_hash, data).await
    }

    async fn get_with_prefix<T: DeserializeOwned>(
        &self,
        prefix: &str,
        key: &str,
    ) -> Result<T, CacheError> {
        let full_key = format!("{}{}", prefix, key);
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let data: Option<String> = conn.get(&full_key).await?;

        match data {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| CacheError::Serialization(e.to_string()))
            }
            None => Err(CacheError::Miss(key.to_string())),
        }
    }

    async fn set_with_prefix<T: Serialize>(
        &self,
        prefix: &str,
        key: &str,
        data: &T,
    ) -> Result<(), CacheError> {
        self.set_with_prefix_and_ttl(prefix, key, data, self.ttl_seconds)
            .await
    }

    async fn set_with_prefix_and_ttl<T: Serialize>(
        &self,
        prefix: &str,
        key: &str,
        data: &T,
        ttl: u64,
    ) -> Result<(), CacheError> {
        let full_key = format!("{}{}", prefix, key);
        let json =
            serde_json::to_string(data).map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(&full_key, json, ttl).await?;

        tracing::debug!(key = %full_key, ttl = ttl, "Cached data");
        Ok(())
    }
}
