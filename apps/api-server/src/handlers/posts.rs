//! Post handlers: home feed, detail and authoring.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blogicum_core::services::{PostChanges, PostDraft};
use blogicum_shared::dto::{
    CreatePostRequest, PageQuery, PostDetailResponse, UpdatePostRequest,
};

use super::responses;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts?page=N
pub async fn list(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .feed
        .home(&identity.viewer(), query.page.unwrap_or(1))
        .await?;

    Ok(HttpResponse::Ok().json(responses::page(page, responses::post)))
}

/// GET /api/posts/{id}
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let detail = state
        .posts
        .detail(path.into_inner(), &identity.viewer())
        .await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: responses::post(detail.post),
        comments: detail.comments.into_iter().map(responses::comment).collect(),
    }))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let draft = PostDraft {
        title: req.title,
        text: req.text,
        pub_date: req.pub_date,
        is_published: req.is_published,
        category_id: req.category_id,
        location_id: req.location_id,
        image: req.image,
    };

    let post = state.posts.create(identity.user_id, draft).await?;
    Ok(HttpResponse::Created().json(responses::post(post)))
}

/// PATCH /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = PostChanges {
        title: req.title,
        text: req.text,
        pub_date: req.pub_date,
        is_published: req.is_published,
        category_id: req.category_id,
        location_id: req.location_id,
        image: req.image,
    };

    let post = state
        .posts
        .update(path.into_inner(), &identity.viewer(), changes)
        .await?;
    Ok(HttpResponse::Ok().json(responses::post(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete(path.into_inner(), &identity.viewer())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
