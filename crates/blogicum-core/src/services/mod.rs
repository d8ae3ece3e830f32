//! Blog services - use cases composed from repositories and the visibility policy.

mod catalog;
mod comments;
mod feed;
mod pagination;
mod posts;
mod profiles;
pub mod validation;

use std::sync::Arc;

use crate::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};

pub use catalog::{CatalogService, CategoryChanges, CategoryDraft, LocationChanges, LocationDraft};
pub use comments::CommentService;
pub use feed::FeedService;
pub use pagination::{POSTS_PER_PAGE, Page};
pub use posts::{PostChanges, PostDetail, PostDraft, PostService};
pub use profiles::{ProfileChanges, ProfileService};

/// The set of repositories the services work against.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}
