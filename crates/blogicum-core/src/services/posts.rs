use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{CommentView, Post, PostView};
use crate::error::DomainError;
use crate::policy::{Viewer, can_mutate, is_visible};
use crate::ports::Clock;

use super::Repositories;
use super::validation;

/// Fields of a new post. A missing `pub_date` means "now".
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub pub_date: Option<DateTime<Utc>>,
    pub is_published: bool,
    pub category_id: Uuid,
    pub location_id: Option<Uuid>,
    pub image: Option<String>,
}

/// A partial post update. `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub text: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub is_published: Option<bool>,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Option<Uuid>>,
    pub image: Option<Option<String>>,
}

/// A post page: the post and its comments, oldest first.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

/// Reading and authoring posts.
#[derive(Clone)]
pub struct PostService {
    repos: Repositories,
    clock: Arc<dyn Clock>,
}

impl PostService {
    pub fn new(repos: Repositories, clock: Arc<dyn Clock>) -> Self {
        Self { repos, clock }
    }

    /// A post with its comments. Posts hidden from `viewer` are reported
    /// as missing.
    pub async fn detail(&self, id: Uuid, viewer: &Viewer) -> Result<PostDetail, DomainError> {
        let now = self.clock.now();
        let post = self
            .repos
            .posts
            .find_view(id)
            .await?
            .filter(|post| is_visible(post, viewer, now))
            .ok_or_else(|| DomainError::not_found("post", id))?;

        let comments = self.repos.comments.list_for_post(id).await?;
        Ok(PostDetail { post, comments })
    }

    pub async fn create(&self, author_id: Uuid, draft: PostDraft) -> Result<PostView, DomainError> {
        validation::title("title", &draft.title)?;
        validation::required("text", &draft.text)?;
        self.ensure_author(author_id).await?;
        self.ensure_category(draft.category_id).await?;
        if let Some(location_id) = draft.location_id {
            self.ensure_location(location_id).await?;
        }

        let now = self.clock.now();
        let mut post = Post::new(
            author_id,
            draft.category_id,
            draft.title,
            draft.text,
            draft.pub_date.unwrap_or(now),
        );
        post.created_at = now;
        post.is_published = draft.is_published;
        post.location_id = draft.location_id;
        post.image = draft.image;

        let saved = self.repos.posts.create(post).await?;
        tracing::info!(post_id = %saved.id, author_id = %author_id, "Post created");

        self.view(saved.id).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        requester: &Viewer,
        changes: PostChanges,
    ) -> Result<PostView, DomainError> {
        let mut post = self.owned(id, requester).await?;

        if let Some(title) = changes.title {
            validation::title("title", &title)?;
            post.title = title;
        }
        if let Some(text) = changes.text {
            validation::required("text", &text)?;
            post.text = text;
        }
        if let Some(pub_date) = changes.pub_date {
            post.pub_date = pub_date;
        }
        if let Some(is_published) = changes.is_published {
            post.is_published = is_published;
        }
        if let Some(category_id) = changes.category_id {
            self.ensure_category(category_id).await?;
            post.category_id = Some(category_id);
        }
        if let Some(location_id) = changes.location_id {
            if let Some(location_id) = location_id {
                self.ensure_location(location_id).await?;
            }
            post.location_id = location_id;
        }
        if let Some(image) = changes.image {
            post.image = image;
        }

        self.repos.posts.update(post).await?;
        tracing::info!(post_id = %id, "Post updated");

        self.view(id).await
    }

    /// Deletes a post together with its comments.
    pub async fn delete(&self, id: Uuid, requester: &Viewer) -> Result<(), DomainError> {
        self.owned(id, requester).await?;
        self.repos.posts.delete(id).await?;
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    async fn owned(&self, id: Uuid, requester: &Viewer) -> Result<Post, DomainError> {
        let post = self
            .repos
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))?;

        if !can_mutate(&post, requester) {
            tracing::warn!(post_id = %id, ?requester, "Rejected post mutation by non-author");
            return Err(DomainError::Forbidden);
        }
        Ok(post)
    }

    async fn view(&self, id: Uuid) -> Result<PostView, DomainError> {
        self.repos
            .posts
            .find_view(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))
    }

    async fn ensure_author(&self, author_id: Uuid) -> Result<(), DomainError> {
        match self.repos.users.find_by_id(author_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::Unauthorized),
        }
    }

    async fn ensure_category(&self, category_id: Uuid) -> Result<(), DomainError> {
        match self.repos.categories.find_by_id(category_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::Validation(format!(
                "category {category_id} does not exist"
            ))),
        }
    }

    async fn ensure_location(&self, location_id: Uuid) -> Result<(), DomainError> {
        match self.repos.locations.find_by_id(location_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::Validation(format!(
                "location {location_id} does not exist"
            ))),
        }
    }
}
