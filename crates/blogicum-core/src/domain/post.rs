use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Location, User};

/// Post entity - a blog publication.
///
/// `pub_date` may lie in the future to schedule a deferred publication.
/// Category and location are nullable: deleting either keeps the post
/// and clears the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub image: Option<String>,
    pub author_id: Uuid,
    pub location_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

impl Post {
    /// Create a new published post.
    pub fn new(
        author_id: Uuid,
        category_id: Uuid,
        title: String,
        text: String,
        pub_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            text,
            pub_date,
            is_published: true,
            created_at: Utc::now(),
            image: None,
            author_id,
            location_id: None,
            category_id: Some(category_id),
        }
    }
}

/// A post with its relations resolved.
///
/// Any relation may be missing: the category or location may have been
/// deleted, and a storage backend may fail to resolve the author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub post: Post,
    pub author: Option<User>,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub comment_count: u64,
}
