//! In-memory store - used when no database is configured, and in tests.
//!
//! Enforces the same uniqueness and delete rules as the PostgreSQL schema.
//! Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, CommentView, Location, Post, PostView, User};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostRepository,
    PostScope, UserRepository,
};
use blogicum_core::services::Repositories;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    locations: HashMap<Uuid, Location>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn post_view(&self, post: &Post) -> PostView {
        PostView {
            post: post.clone(),
            author: self.users.get(&post.author_id).cloned(),
            category: post
                .category_id
                .and_then(|id| self.categories.get(&id).cloned()),
            location: post
                .location_id
                .and_then(|id| self.locations.get(&id).cloned()),
            comment_count: self
                .comments
                .values()
                .filter(|c| c.post_id == post.id)
                .count() as u64,
        }
    }

    fn check_post_references(&self, post: &Post) -> Result<(), RepoError> {
        if !self.users.contains_key(&post.author_id) {
            return Err(RepoError::ForeignKey("post author does not exist".to_string()));
        }
        if post
            .category_id
            .is_some_and(|id| !self.categories.contains_key(&id))
        {
            return Err(RepoError::ForeignKey("post category does not exist".to_string()));
        }
        if post
            .location_id
            .is_some_and(|id| !self.locations.contains_key(&id))
        {
            return Err(RepoError::ForeignKey("post location does not exist".to_string()));
        }
        Ok(())
    }

    fn check_comment_references(&self, comment: &Comment) -> Result<(), RepoError> {
        if !self.users.contains_key(&comment.author_id) {
            return Err(RepoError::ForeignKey("comment author does not exist".to_string()));
        }
        if !self.posts.contains_key(&comment.post_id) {
            return Err(RepoError::ForeignKey("comment post does not exist".to_string()));
        }
        Ok(())
    }

    fn check_unique_username(&self, user: &User) -> Result<(), RepoError> {
        if self
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(RepoError::Constraint("username already exists".to_string()));
        }
        Ok(())
    }

    fn check_unique_slug(&self, category: &Category) -> Result<(), RepoError> {
        if self
            .categories
            .values()
            .any(|c| c.id != category.id && c.slug == category.slug)
        {
            return Err(RepoError::Constraint("slug already exists".to_string()));
        }
        Ok(())
    }

    fn remove_post(&mut self, id: Uuid) -> Option<Post> {
        let post = self.posts.remove(&id)?;
        self.comments.retain(|_, c| c.post_id != id);
        Some(post)
    }
}

/// Shared in-memory tables behind an async `RwLock`.
///
/// Cloning is cheap; clones see the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All repositories backed by this store.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.clone()),
            categories: Arc::new(self.clone()),
            locations: Arc::new(self.clone()),
            posts: Arc::new(self.clone()),
            comments: Arc::new(self.clone()),
        }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(RepoError::Constraint("user already exists".to_string()));
        }
        tables.check_unique_username(&user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_unique_username(&user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    /// Removes the user with their posts and comments.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;

        let authored: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in authored {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|_, c| c.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn create(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.categories.contains_key(&category.id) {
            return Err(RepoError::Constraint("category already exists".to_string()));
        }
        tables.check_unique_slug(&category)?;
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&category.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_unique_slug(&category)?;
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    /// Removes the category and clears it from its posts.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.categories.remove(&id).ok_or(RepoError::NotFound)?;
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(categories)
    }
}

#[async_trait]
impl BaseRepository<Location, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepoError> {
        Ok(self.tables.read().await.locations.get(&id).cloned())
    }

    async fn create(&self, location: Location) -> Result<Location, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.locations.contains_key(&location.id) {
            return Err(RepoError::Constraint("location already exists".to_string()));
        }
        tables.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn update(&self, location: Location) -> Result<Location, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.locations.contains_key(&location.id) {
            return Err(RepoError::NotFound);
        }
        tables.locations.insert(location.id, location.clone());
        Ok(location)
    }

    /// Removes the location and clears it from its posts.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.locations.remove(&id).ok_or(RepoError::NotFound)?;
        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Location>, RepoError> {
        let tables = self.tables.read().await;
        let mut locations: Vec<Location> = tables.locations.values().cloned().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("post already exists".to_string()));
        }
        tables.check_post_references(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_post_references(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    /// Removes the post with its comments.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.remove_post(id).ok_or(RepoError::NotFound)?;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_view(&self, id: Uuid) -> Result<Option<PostView>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).map(|post| tables.post_view(post)))
    }

    async fn list_views(&self, scope: PostScope) -> Result<Vec<PostView>, RepoError> {
        let tables = self.tables.read().await;
        let mut views: Vec<PostView> = tables
            .posts
            .values()
            .filter(|post| match scope {
                PostScope::All => true,
                PostScope::Category(id) => post.category_id == Some(id),
                PostScope::Author(id) => post.author_id == id,
            })
            .map(|post| tables.post_view(post))
            .collect();
        views.sort_by(|a, b| {
            b.post
                .pub_date
                .cmp(&a.post.pub_date)
                .then(a.post.id.cmp(&b.post.id))
        });
        Ok(views)
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn create(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.comments.contains_key(&comment.id) {
            return Err(RepoError::Constraint("comment already exists".to_string()));
        }
        tables.check_comment_references(&comment)?;
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.comments.contains_key(&comment.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_comment_references(&comment)?;
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.comments.remove(&id).ok_or(RepoError::NotFound)?;
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<CommentView> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .map(|c| CommentView {
                comment: c.clone(),
                author: tables.users.get(&c.author_id).cloned(),
            })
            .collect();
        comments.sort_by(|a, b| {
            a.comment
                .created_at
                .cmp(&b.comment.created_at)
                .then(a.comment.id.cmp(&b.comment.id))
        });
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    async fn seed(store: &InMemoryStore) -> (User, Category, Post) {
        let repos = store.repositories();
        let user = repos
            .users
            .create(User::new(
                "alice".to_string(),
                "alice@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();
        let category = repos
            .categories
            .create(Category::new(
                "Travel".to_string(),
                "Trips".to_string(),
                "travel".to_string(),
            ))
            .await
            .unwrap();
        let post = repos
            .posts
            .create(Post::new(
                user.id,
                category.id,
                "Title".to_string(),
                "Text".to_string(),
                Utc::now(),
            ))
            .await
            .unwrap();
        (user, category, post)
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = InMemoryStore::new();
        let repos = store.repositories();
        seed(&store).await;

        let result = repos
            .users
            .create(User::new(
                "alice".to_string(),
                "other@example.com".to_string(),
                "hash".to_string(),
            ))
            .await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_deleting_category_clears_post_reference() {
        let store = InMemoryStore::new();
        let repos = store.repositories();
        let (_, category, post) = seed(&store).await;

        repos.categories.delete(category.id).await.unwrap();

        let view = repos.posts.find_view(post.id).await.unwrap().unwrap();
        assert_eq!(view.post.category_id, None);
        assert!(view.category.is_none());
    }

    #[tokio::test]
    async fn test_deleting_post_removes_comments() {
        let store = InMemoryStore::new();
        let repos = store.repositories();
        let (user, _, post) = seed(&store).await;
        let comment = repos
            .comments
            .create(Comment::new(post.id, user.id, "First".to_string(), Utc::now()))
            .await
            .unwrap();

        repos.posts.delete(post.id).await.unwrap();

        assert!(repos.comments.find_by_id(comment.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_comment_count_in_view() {
        let store = InMemoryStore::new();
        let repos = store.repositories();
        let (user, _, post) = seed(&store).await;
        for text in ["one", "two"] {
            repos
                .comments
                .create(Comment::new(post.id, user.id, text.to_string(), Utc::now()))
                .await
                .unwrap();
        }

        let view = repos.posts.find_view(post.id).await.unwrap().unwrap();
        assert_eq!(view.comment_count, 2);
        assert_eq!(view.author.map(|a| a.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_post_requires_existing_author() {
        let store = InMemoryStore::new();
        let repos = store.repositories();
        let (_, category, _) = seed(&store).await;

        let result = repos
            .posts
            .create(Post::new(
                Uuid::new_v4(),
                category.id,
                "Title".to_string(),
                "Text".to_string(),
                Utc::now(),
            ))
            .await;

        assert!(matches!(result, Err(RepoError::ForeignKey(_))));
    }

    #[tokio::test]
    async fn test_deleting_user_removes_their_posts_and_comments() {
        let store = InMemoryStore::new();
        let repos = store.repositories();
        let (alice, category, alice_post) = seed(&store).await;
        let bob = repos
            .users
            .create(User::new(
                "bob".to_string(),
                "bob@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();
        let bob_post = repos
            .posts
            .create(Post::new(
                bob.id,
                category.id,
                "Bob's".to_string(),
                "Text".to_string(),
                Utc::now(),
            ))
            .await
            .unwrap();
        let on_own_post = repos
            .comments
            .create(Comment::new(alice_post.id, bob.id, "Reply".to_string(), Utc::now()))
            .await
            .unwrap();
        let on_bobs_post = repos
            .comments
            .create(Comment::new(bob_post.id, alice.id, "Hi".to_string(), Utc::now()))
            .await
            .unwrap();
        let bobs_comment = repos
            .comments
            .create(Comment::new(bob_post.id, bob.id, "Thanks".to_string(), Utc::now()))
            .await
            .unwrap();

        repos.users.delete(alice.id).await.unwrap();

        assert!(repos.posts.find_by_id(alice_post.id).await.unwrap().is_none());
        assert!(repos.comments.find_by_id(on_own_post.id).await.unwrap().is_none());
        assert!(repos.comments.find_by_id(on_bobs_post.id).await.unwrap().is_none());
        assert!(repos.posts.find_by_id(bob_post.id).await.unwrap().is_some());
        assert!(repos.comments.find_by_id(bobs_comment.id).await.unwrap().is_some());
        let view = repos.posts.find_view(bob_post.id).await.unwrap().unwrap();
        assert_eq!(view.comment_count, 1);
    }

    #[tokio::test]
    async fn test_equal_timestamps_order_by_id() {
        let store = InMemoryStore::new();
        let repos = store.repositories();
        let (user, category, first) = seed(&store).await;
        let at = first.pub_date;
        let mut post_ids = vec![first.id];
        for title in ["second", "third"] {
            let post = repos
                .posts
                .create(Post::new(
                    user.id,
                    category.id,
                    title.to_string(),
                    "Text".to_string(),
                    at,
                ))
                .await
                .unwrap();
            post_ids.push(post.id);
        }
        let mut comment_ids = Vec::new();
        for text in ["one", "two", "three"] {
            let comment = repos
                .comments
                .create(Comment::new(first.id, user.id, text.to_string(), at))
                .await
                .unwrap();
            comment_ids.push(comment.id);
        }
        post_ids.sort();
        comment_ids.sort();

        let listed: Vec<Uuid> = repos
            .posts
            .list_views(PostScope::All)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.post.id)
            .collect();
        assert_eq!(listed, post_ids);

        let listed: Vec<Uuid> = repos
            .comments
            .list_for_post(first.id)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.comment.id)
            .collect();
        assert_eq!(listed, comment_ids);
    }
}
