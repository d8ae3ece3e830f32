//! Mapping from domain values to response DTOs.

use blogicum_core::domain::{Category, CommentView, Location, PostView, User};
use blogicum_core::services::Page;
use blogicum_shared::dto::{
    AuthorSummary, CategoryResponse, CategorySummary, CommentResponse, LocationResponse,
    PageResponse, PostResponse, ProfileSummary, UserResponse,
};

pub fn user(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        is_staff: user.is_staff,
        created_at: user.created_at,
    }
}

pub fn profile(user: User) -> ProfileSummary {
    ProfileSummary {
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        created_at: user.created_at,
    }
}

fn author(user: User) -> AuthorSummary {
    AuthorSummary {
        id: user.id,
        username: user.username,
    }
}

pub fn category(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        title: category.title,
        description: category.description,
        slug: category.slug,
        is_published: category.is_published,
        created_at: category.created_at,
    }
}

pub fn location(location: Location) -> LocationResponse {
    LocationResponse {
        id: location.id,
        name: location.name,
        is_published: location.is_published,
        created_at: location.created_at,
    }
}

pub fn post(view: PostView) -> PostResponse {
    let PostView {
        post,
        author: post_author,
        category: post_category,
        location: post_location,
        comment_count,
    } = view;

    PostResponse {
        id: post.id,
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        is_published: post.is_published,
        created_at: post.created_at,
        image: post.image,
        author: post_author.map(author),
        category: post_category.map(|c| CategorySummary {
            id: c.id,
            title: c.title,
            slug: c.slug,
        }),
        location: post_location.map(location),
        comment_count,
    }
}

pub fn comment(view: CommentView) -> CommentResponse {
    CommentResponse {
        id: view.comment.id,
        post_id: view.comment.post_id,
        text: view.comment.text,
        created_at: view.comment.created_at,
        author: view.author.map(author),
    }
}

pub fn page<T, U>(page: Page<T>, f: impl FnMut(T) -> U) -> PageResponse<U> {
    let total_pages = page.total_pages();
    let has_next = page.has_next();
    let page = page.map(f);

    PageResponse {
        items: page.items,
        page: page.number,
        per_page: page.per_page,
        total_items: page.total_items,
        total_pages,
        has_next,
    }
}
