//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::ports::{Clock, SystemClock, UserRepository};
use blogicum_core::services::{
    CatalogService, CommentService, FeedService, PostService, ProfileService, Repositories,
};
use blogicum_infra::InMemoryStore;
use blogicum_infra::database::{DatabaseConfig, DatabaseConnections};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub feed: FeedService,
    pub posts: PostService,
    pub comments: CommentService,
    pub profiles: ProfileService,
    pub catalog: CatalogService,
    pub users: Arc<dyn UserRepository>,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the state on PostgreSQL when configured and reachable, on the
    /// in-memory store otherwise.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        #[cfg(feature = "postgres")]
        let (repos, db) = match db_config {
            Some(config) => match DatabaseConnections::init(config).await {
                Ok(connections) => {
                    let repos = blogicum_infra::database::postgres_repositories(&connections.main);
                    (repos, Some(Arc::new(connections)))
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    (InMemoryStore::new().repositories(), None)
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                (InMemoryStore::new().repositories(), None)
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (repos, db) = {
            if db_config.is_some() {
                tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
            }
            (InMemoryStore::new().repositories(), None)
        };

        tracing::info!(database = db.is_some(), "Application state initialized");

        Self::from_repositories(repos, clock, db)
    }

    /// Wire the services over an existing set of repositories.
    pub fn from_repositories(
        repos: Repositories,
        clock: Arc<dyn Clock>,
        db: Option<Arc<DatabaseConnections>>,
    ) -> Self {
        Self {
            feed: FeedService::new(repos.clone(), clock.clone()),
            posts: PostService::new(repos.clone(), clock.clone()),
            comments: CommentService::new(repos.clone(), clock.clone()),
            profiles: ProfileService::new(repos.clone(), clock),
            catalog: CatalogService::new(repos.clone()),
            users: repos.users,
            db,
        }
    }
}
