//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use inkpost_core::services::DEFAULT_MAX_SLUG_ATTEMPTS;
use inkpost_infra::database::DatabaseConfig;

#[cfg(feature = "auth")]
use inkpost_infra::JwtConfig;

use crate::telemetry::TelemetryConfig;

/// Application configuration, built once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "auth")]
    pub jwt: JwtConfig,
    pub posts: PostsConfig,
    /// Upper bound on a single request's store work.
    pub request_timeout: Duration,
    pub telemetry: TelemetryConfig,
}

/// Post listing and slug settings.
#[derive(Debug, Clone)]
pub struct PostsConfig {
    /// Page size used when a listing omits `limit`.
    pub default_limit: u64,
    pub max_slug_attempts: u32,
    /// Folder name images are stored under.
    pub image_folder: String,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            default_limit: inkpost_core::domain::ListingQuery::default().limit,
            max_slug_attempts: DEFAULT_MAX_SLUG_ATTEMPTS,
            image_folder: "posts".to_string(),
        }
    }
}

impl Default for AppConfig {
    /// Local in-memory setup with no database.
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: None,
            #[cfg(feature = "auth")]
            jwt: JwtConfig::default(),
            posts: PostsConfig::default(),
            request_timeout: Duration::from_secs(30),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            max_connections: parse_env("DB_MAX_CONNECTIONS", 100),
            min_connections: parse_env("DB_MIN_CONNECTIONS", 10),
            sqlx_logging: parse_env("DB_LOG_STATEMENTS", false),
            ..DatabaseConfig::new(url)
        });

        let defaults = PostsConfig::default();
        let posts = PostsConfig {
            default_limit: parse_env("POSTS_DEFAULT_LIMIT", defaults.default_limit).max(1),
            max_slug_attempts: parse_env("SLUG_MAX_ATTEMPTS", defaults.max_slug_attempts).max(1),
            image_folder: env::var("IMAGE_FOLDER").unwrap_or(defaults.image_folder),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_env("PORT", 8080),
            database,
            #[cfg(feature = "auth")]
            jwt: Self::jwt_from_env(),
            posts,
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 30)),
            telemetry: TelemetryConfig::from_env(),
        }
    }

    #[cfg(feature = "auth")]
    fn jwt_from_env() -> JwtConfig {
        let defaults = JwtConfig::default();
        JwtConfig {
            secret: env::var("JWT_SECRET").unwrap_or(defaults.secret),
            expiration_hours: parse_env("JWT_EXPIRATION_HOURS", defaults.expiration_hours),
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        }
    }

    /// Emit warnings for settings that are unsafe outside development.
    pub fn warn_insecure_defaults(&self) {
        #[cfg(feature = "auth")]
        if self.jwt.uses_default_secret() {
            let is_production = env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset or malformed.
fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_falls_back_on_garbage() {
        assert_eq!(parse_env("INKPOST_TEST_UNSET_KEY", 7u32), 7);
    }

    #[test]
    fn posts_defaults_match_listing_defaults() {
        let posts = PostsConfig::default();
        assert_eq!(posts.default_limit, 2);
        assert_eq!(posts.max_slug_attempts, DEFAULT_MAX_SLUG_ATTEMPTS);
    }
}
