use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory the file backend writes collection files into
    pub data_dir: String,
    /// Namespace prefix for persisted collection keys
    pub key_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("WATCHDESK_PORT").or_else(|_| env::var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging =
                v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Storage overrides
        if let Ok(v) = env::var("STORAGE_DATA_DIR") {
            self.storage.data_dir = v;
        }
        if let Ok(v) = env::var("STORAGE_KEY_PREFIX") {
            self.storage.key_prefix = v;
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours =
                v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 4000,
                enable_request_logging: true,
            },
            storage: StorageConfig {
                data_dir: ".watchdesk-mockdb".to_string(),
                key_prefix: "mockdb_".to_string(),
            },
            security: SecurityConfig {
                enable_cors: true,
                // Mock tokens only; never used against a real backend
                jwt_secret: "watchdesk-mock-secret".to_string(),
                jwt_expiry_hours: 24 * 7,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 4000,
                enable_request_logging: true,
            },
            storage: StorageConfig {
                data_dir: ".watchdesk-mockdb".to_string(),
                key_prefix: "mockdb_".to_string(),
            },
            security: SecurityConfig {
                enable_cors: true,
                jwt_secret: "watchdesk-mock-secret".to_string(),
                jwt_expiry_hours: 24,
            },
        }
    }

    fn production() -> Self {
        // The mock facade has no production deployment; this profile exists so
        // APP_ENV=production fails safe rather than panicking.
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 4000,
                enable_request_logging: false,
            },
            storage: StorageConfig {
                data_dir: ".watchdesk-mockdb".to_string(),
                key_prefix: "mockdb_".to_string(),
            },
            security: SecurityConfig {
                enable_cors: false,
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
