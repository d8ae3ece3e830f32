use std::sync::Arc;

use crate::domain::{Category, PostView, User};
use crate::error::DomainError;
use crate::policy::{Viewer, filter_visible};
use crate::ports::{Clock, PostScope};

use super::Repositories;
use super::pagination::{POSTS_PER_PAGE, Page};

/// Paginated post listings: the home page, category pages and profiles.
///
/// Every listing goes through [`filter_visible`].
#[derive(Clone)]
pub struct FeedService {
    repos: Repositories,
    clock: Arc<dyn Clock>,
}

impl FeedService {
    pub fn new(repos: Repositories, clock: Arc<dyn Clock>) -> Self {
        Self { repos, clock }
    }

    /// All posts visible to `viewer`.
    pub async fn home(&self, viewer: &Viewer, page: usize) -> Result<Page<PostView>, DomainError> {
        self.visible_page(PostScope::All, viewer, page).await
    }

    /// Posts of a published category.
    pub async fn category(
        &self,
        slug: &str,
        viewer: &Viewer,
        page: usize,
    ) -> Result<(Category, Page<PostView>), DomainError> {
        let category = self
            .repos
            .categories
            .find_by_slug(slug)
            .await?
            .filter(|category| category.is_published)
            .ok_or_else(|| DomainError::not_found("category", slug))?;

        let posts = self
            .visible_page(PostScope::Category(category.id), viewer, page)
            .await?;
        Ok((category, posts))
    }

    /// A user's posts. The owner also sees their hidden and scheduled posts.
    pub async fn profile(
        &self,
        username: &str,
        viewer: &Viewer,
        page: usize,
    ) -> Result<(User, Page<PostView>), DomainError> {
        let user = self
            .repos
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let posts = self
            .visible_page(PostScope::Author(user.id), viewer, page)
            .await?;
        Ok((user, posts))
    }

    async fn visible_page(
        &self,
        scope: PostScope,
        viewer: &Viewer,
        page: usize,
    ) -> Result<Page<PostView>, DomainError> {
        let now = self.clock.now();
        let candidates = self.repos.posts.list_views(scope).await?;
        let visible = filter_visible(candidates, viewer, now);
        tracing::debug!(?scope, visible = visible.len(), page, "Feed assembled");

        Ok(Page::paginate(visible, page, POSTS_PER_PAGE))
    }
}
