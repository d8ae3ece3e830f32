use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, CommentView};
use crate::error::DomainError;
use crate::policy::{Viewer, can_mutate, is_visible};
use crate::ports::Clock;

use super::Repositories;
use super::validation;

/// Commenting on posts.
#[derive(Clone)]
pub struct CommentService {
    repos: Repositories,
    clock: Arc<dyn Clock>,
}

impl CommentService {
    pub fn new(repos: Repositories, clock: Arc<dyn Clock>) -> Self {
        Self { repos, clock }
    }

    /// Adds a comment to a post the author can see.
    pub async fn create(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        text: String,
    ) -> Result<CommentView, DomainError> {
        let now = self.clock.now();
        let viewer = Viewer::User(author_id);
        self.repos
            .posts
            .find_view(post_id)
            .await?
            .filter(|post| is_visible(post, &viewer, now))
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        validation::required("text", &text)?;

        let author = self
            .repos
            .users
            .find_by_id(author_id)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let comment = self
            .repos
            .comments
            .create(Comment::new(post_id, author_id, text, now))
            .await?;
        tracing::info!(comment_id = %comment.id, post_id = %post_id, "Comment created");

        Ok(CommentView {
            comment,
            author: Some(author),
        })
    }

    pub async fn update(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        requester: &Viewer,
        text: String,
    ) -> Result<CommentView, DomainError> {
        let mut comment = self.owned(post_id, comment_id, requester).await?;
        validation::required("text", &text)?;
        comment.text = text;

        let comment = self.repos.comments.update(comment).await?;
        let author = self.repos.users.find_by_id(comment.author_id).await?;
        tracing::info!(comment_id = %comment_id, "Comment updated");

        Ok(CommentView { comment, author })
    }

    pub async fn delete(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        requester: &Viewer,
    ) -> Result<(), DomainError> {
        self.owned(post_id, comment_id, requester).await?;
        self.repos.comments.delete(comment_id).await?;
        tracing::info!(comment_id = %comment_id, "Comment deleted");
        Ok(())
    }

    /// A comment of `post_id` that `requester` wrote.
    async fn owned(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        requester: &Viewer,
    ) -> Result<Comment, DomainError> {
        let comment = self
            .repos
            .comments
            .find_by_id(comment_id)
            .await?
            .filter(|comment| comment.post_id == post_id)
            .ok_or_else(|| DomainError::not_found("comment", comment_id))?;

        if !can_mutate(&comment, requester) {
            tracing::warn!(comment_id = %comment_id, ?requester, "Rejected comment mutation by non-author");
            return Err(DomainError::Forbidden);
        }
        Ok(comment)
    }
}
