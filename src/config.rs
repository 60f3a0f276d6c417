//! Redis connection configuration

use crate::error::{KvError, KvResult};

/// Connection parameters for a Redis server.
///
/// Built once and handed to [`KvStore`](crate::KvStore); the store keeps its
/// own copy, so the configuration is fixed for the lifetime of the facade.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Host name or address of the Redis server
    pub host: String,
    /// Port the server listens on
    pub port: u16,
    /// Logical database index selected on connect
    pub db: i64,
    /// Password for AUTH; empty string means no authentication
    pub password: String,
    /// Lower bound on pool size, kept for parity with the configured
    /// bounds; the pool itself grows on demand up to `max_size`
    pub min_size: usize,
    /// Maximum number of pooled connections
    pub max_size: usize,
    /// Connect with TLS (`rediss` scheme); requires the `tls` feature
    pub tls: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
            password: String::new(),
            min_size: 1,
            max_size: 10,
            tls: false,
        }
    }
}

impl RedisConfig {
    /// Create a configuration for the given host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Select a logical database index
    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    /// Set the AUTH password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the pool size bounds
    pub fn with_pool_bounds(mut self, min_size: usize, max_size: usize) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    /// Enable TLS for the connection
    pub fn with_tls(mut self) -> Self {
        self.tls = true;
        self
    }

    /// Connection URL in the form `redis://[:password@]host:port/db`.
    ///
    /// The password segment is omitted when the password is empty; the
    /// scheme is `rediss` when TLS is enabled.
    pub fn url(&self) -> String {
        let scheme = if self.tls { "rediss" } else { "redis" };
        if self.password.is_empty() {
            format!("{}://{}:{}/{}", scheme, self.host, self.port, self.db)
        } else {
            format!(
                "{}://:{}@{}:{}/{}",
                scheme, self.password, self.host, self.port, self.db
            )
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> KvResult<()> {
        if self.host.is_empty() {
            return Err(KvError::InvalidConfig("host cannot be empty".to_string()));
        }
        if self.db < 0 {
            return Err(KvError::InvalidConfig(format!(
                "database index cannot be negative (got {})",
                self.db
            )));
        }
        if self.max_size == 0 {
            return Err(KvError::InvalidConfig(
                "max pool size cannot be zero".to_string(),
            ));
        }
        if self.min_size > self.max_size {
            return Err(KvError::InvalidConfig(format!(
                "min pool size {} exceeds max pool size {}",
                self.min_size, self.max_size
            )));
        }
        Ok(())
    }
}
