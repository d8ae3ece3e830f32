//! Post visibility and ownership policy.
//!
//! Every surface that returns posts decides visibility here, and every
//! mutation of an authored record checks ownership here. The current
//! instant is always supplied by the caller.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Comment, CommentView, Post, PostView};

/// The identity a request is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    User(Uuid),
}

impl Viewer {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(*id),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Viewer::Anonymous)
    }
}

impl From<Option<Uuid>> for Viewer {
    fn from(id: Option<Uuid>) -> Self {
        id.map_or(Viewer::Anonymous, Viewer::User)
    }
}

/// A record owned by a user.
///
/// `None` means the author relation could not be resolved.
pub trait Authored {
    fn author_id(&self) -> Option<Uuid>;
}

impl Authored for Post {
    fn author_id(&self) -> Option<Uuid> {
        Some(self.author_id)
    }
}

impl Authored for Comment {
    fn author_id(&self) -> Option<Uuid> {
        Some(self.author_id)
    }
}

impl Authored for PostView {
    fn author_id(&self) -> Option<Uuid> {
        self.author.as_ref().map(|user| user.id)
    }
}

impl Authored for CommentView {
    fn author_id(&self) -> Option<Uuid> {
        self.author.as_ref().map(|user| user.id)
    }
}

fn is_author<R: Authored + ?Sized>(record: &R, viewer: &Viewer) -> bool {
    match (record.author_id(), viewer.user_id()) {
        (Some(author), Some(viewer)) => author == viewer,
        _ => false,
    }
}

/// Whether `post` may be shown to `viewer` at instant `now`.
///
/// Authors always see their own posts. Everyone else sees a post only
/// when it is published, its category is present and published, and its
/// publication date has passed. A post without a resolvable author is
/// never visible.
pub fn is_visible(post: &PostView, viewer: &Viewer, now: DateTime<Utc>) -> bool {
    if post.author_id().is_none() {
        return false;
    }
    if is_author(post, viewer) {
        return true;
    }

    post.post.is_published
        && post
            .category
            .as_ref()
            .is_some_and(|category| category.is_published)
        && post.post.pub_date <= now
}

/// Whether `requester` may edit or delete `record`.
///
/// Anonymous requesters and records with an unresolved author always get
/// `false`.
pub fn can_mutate<R: Authored + ?Sized>(record: &R, requester: &Viewer) -> bool {
    is_author(record, requester)
}

/// Keeps the posts visible to `viewer`, preserving their order.
pub fn filter_visible<I>(posts: I, viewer: &Viewer, now: DateTime<Utc>) -> Vec<PostView>
where
    I: IntoIterator<Item = PostView>,
{
    posts
        .into_iter()
        .filter(|post| is_visible(post, viewer, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::domain::{Category, User};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn user(name: &str) -> User {
        User::new(name.to_string(), format!("{name}@example.com"), String::new())
    }

    fn category(published: bool) -> Category {
        let mut category = Category::new(
            "Travel".to_string(),
            "Trips".to_string(),
            "travel".to_string(),
        );
        category.is_published = published;
        category
    }

    fn post_view(author: &User, pub_date: DateTime<Utc>) -> PostView {
        let category = category(true);
        let post = Post::new(
            author.id,
            category.id,
            "Title".to_string(),
            "Text".to_string(),
            pub_date,
        );
        PostView {
            post,
            author: Some(author.clone()),
            category: Some(category),
            location: None,
            comment_count: 0,
        }
    }

    #[test]
    fn test_published_past_post_is_visible_to_anonymous() {
        let author = user("alice");
        let post = post_view(&author, now() - Duration::days(1));

        assert!(is_visible(&post, &Viewer::Anonymous, now()));
    }

    #[test]
    fn test_post_dated_exactly_now_is_visible() {
        let author = user("alice");
        let post = post_view(&author, now());

        assert!(is_visible(&post, &Viewer::Anonymous, now()));
    }

    #[test]
    fn test_scheduled_post_hidden_except_for_author() {
        let author = user("alice");
        let post = post_view(&author, now() + Duration::days(1));

        assert!(!is_visible(&post, &Viewer::Anonymous, now()));
        assert!(is_visible(&post, &Viewer::User(author.id), now()));
    }

    #[test]
    fn test_unpublished_post_hidden_from_other_users() {
        let author = user("alice");
        let other = user("bob");
        let mut post = post_view(&author, now() - Duration::days(1));
        post.post.is_published = false;

        assert!(!is_visible(&post, &Viewer::User(other.id), now()));
        assert!(is_visible(&post, &Viewer::User(author.id), now()));
    }

    #[test]
    fn test_each_gate_hides_the_post_on_its_own() {
        let author = user("alice");
        let viewer = Viewer::User(user("bob").id);
        let visible = post_view(&author, now() - Duration::hours(1));
        assert!(is_visible(&visible, &viewer, now()));

        let mut unpublished = visible.clone();
        unpublished.post.is_published = false;
        assert!(!is_visible(&unpublished, &viewer, now()));

        let mut hidden_category = visible.clone();
        hidden_category.category = Some(category(false));
        assert!(!is_visible(&hidden_category, &viewer, now()));

        let mut scheduled = visible.clone();
        scheduled.post.pub_date = now() + Duration::hours(1);
        assert!(!is_visible(&scheduled, &viewer, now()));
    }

    #[test]
    fn test_missing_category_hides_post_but_not_from_author() {
        let author = user("alice");
        let mut post = post_view(&author, now() - Duration::days(1));
        post.post.category_id = None;
        post.category = None;

        assert!(!is_visible(&post, &Viewer::Anonymous, now()));
        assert!(is_visible(&post, &Viewer::User(author.id), now()));
    }

    #[test]
    fn test_author_sees_everything_they_wrote() {
        let author = user("alice");
        let mut post = post_view(&author, now() + Duration::days(30));
        post.post.is_published = false;
        post.category = Some(category(false));

        assert!(is_visible(&post, &Viewer::User(author.id), now()));
    }

    #[test]
    fn test_unresolved_author_fails_closed() {
        let author = user("alice");
        let mut post = post_view(&author, now() - Duration::days(1));
        post.author = None;

        assert!(!is_visible(&post, &Viewer::Anonymous, now()));
        assert!(!is_visible(&post, &Viewer::User(author.id), now()));
        assert!(!can_mutate(&post, &Viewer::User(author.id)));
    }

    #[test]
    fn test_can_mutate_comment() {
        let author = user("alice");
        let other = user("bob");
        let comment = Comment::new(Uuid::new_v4(), author.id, "Nice".to_string(), now());

        assert!(can_mutate(&comment, &Viewer::User(author.id)));
        assert!(!can_mutate(&comment, &Viewer::User(other.id)));
        assert!(!can_mutate(&comment, &Viewer::Anonymous));
    }

    #[test]
    fn test_can_mutate_post() {
        let author = user("alice");
        let post = post_view(&author, now()).post;

        assert!(can_mutate(&post, &Viewer::User(author.id)));
        assert!(!can_mutate(&post, &Viewer::User(Uuid::new_v4())));
        assert!(!can_mutate(&post, &Viewer::Anonymous));
    }

    #[test]
    fn test_filter_visible_keeps_order() {
        let author = user("alice");
        let first = post_view(&author, now() - Duration::hours(1));
        let mut hidden = post_view(&author, now() - Duration::hours(2));
        hidden.post.is_published = false;
        let second = post_view(&author, now() - Duration::hours(3));
        let scheduled = post_view(&author, now() + Duration::hours(3));

        let result = filter_visible(
            vec![scheduled, first.clone(), hidden, second.clone()],
            &Viewer::Anonymous,
            now(),
        );

        let ids: Vec<Uuid> = result.iter().map(|p| p.post.id).collect();
        assert_eq!(ids, vec![first.post.id, second.post.id]);
    }

    #[test]
    fn test_filter_visible_for_author_keeps_everything() {
        let author = user("alice");
        let mut hidden = post_view(&author, now() + Duration::hours(2));
        hidden.post.is_published = false;
        let shown = post_view(&author, now() - Duration::hours(2));

        let result = filter_visible(vec![hidden, shown], &Viewer::User(author.id), now());

        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_viewer_from_option() {
        let id = Uuid::new_v4();
        assert_eq!(Viewer::from(Some(id)), Viewer::User(id));
        assert!(Viewer::from(None).is_anonymous());
    }
}
