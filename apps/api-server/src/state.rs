//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use inkpost_core::ports::{Clock, ImageStore, PostRepository, SystemClock, UserRepository};
use inkpost_core::services::{PostQueryService, PostService};
use inkpost_infra::memory::{InMemoryImageStore, InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
use inkpost_infra::database::{
    DatabaseConnections, PostgresPostRepository, PostgresUserRepository,
};

#[cfg(feature = "auth")]
use inkpost_core::ports::{PasswordService, TokenService};
#[cfg(feature = "auth")]
use inkpost_infra::{Argon2PasswordService, JwtTokenService};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub queries: Arc<PostQueryService>,
    pub posts: Arc<PostService>,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
    #[cfg(feature = "auth")]
    pub tokens: Arc<dyn TokenService>,
    #[cfg(feature = "auth")]
    pub passwords: Arc<dyn PasswordService>,
    pub default_limit: u64,
    pub request_timeout: Duration,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let users = Arc::new(PostgresUserRepository::new(connections.main.clone()));
                    let posts = Arc::new(PostgresPostRepository::new(connections.main.clone()));
                    let mut state = Self::assemble(config, posts, users);
                    state.db = Some(Arc::new(connections));
                    tracing::info!("Application state initialized (postgres)");
                    return state;
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        }

        if config.database.is_none() {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        let state = Self::in_memory(config);
        tracing::info!("Application state initialized (in-memory)");
        state
    }

    /// State backed entirely by in-process stores.
    pub fn in_memory(config: &AppConfig) -> Self {
        Self::assemble(
            config,
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        )
    }

    fn assemble(
        config: &AppConfig,
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let images: Arc<dyn ImageStore> =
            Arc::new(InMemoryImageStore::new(config.posts.image_folder.clone()));

        let queries = PostQueryService::new(posts.clone(), users.clone(), clock);
        let post_service = PostService::new(posts, users.clone(), images)
            .with_max_slug_attempts(config.posts.max_slug_attempts);

        Self {
            users,
            queries: Arc::new(queries),
            posts: Arc::new(post_service),
            #[cfg(feature = "postgres")]
            db: None,
            #[cfg(feature = "auth")]
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            #[cfg(feature = "auth")]
            passwords: Arc::new(Argon2PasswordService::new()),
            default_limit: config.posts.default_limit,
            request_timeout: config.request_timeout,
        }
    }
}
