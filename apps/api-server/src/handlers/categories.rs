//! Category handlers: listing, category feed and administration.

use actix_web::{HttpResponse, web};

use blogicum_core::services::{CategoryChanges, CategoryDraft};
use blogicum_shared::dto::{
    CategoryFeedResponse, CreateCategoryRequest, PageQuery, UpdateCategoryRequest,
};

use super::responses;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/categories
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.catalog.published_categories().await?;
    let body: Vec<_> = categories.into_iter().map(responses::category).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/categories/{slug}/posts?page=N
pub async fn posts(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let (category, page) = state
        .feed
        .category(&path, &identity.viewer(), query.page.unwrap_or(1))
        .await?;

    Ok(HttpResponse::Ok().json(CategoryFeedResponse {
        category: responses::category(category),
        posts: responses::page(page, responses::post),
    }))
}

/// POST /api/categories
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let draft = CategoryDraft {
        title: req.title,
        description: req.description,
        slug: req.slug,
        is_published: req.is_published,
    };

    let category = state
        .catalog
        .create_category(&identity.viewer(), draft)
        .await?;
    Ok(HttpResponse::Created().json(responses::category(category)))
}

/// PATCH /api/categories/{slug}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<UpdateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = CategoryChanges {
        title: req.title,
        description: req.description,
        slug: req.slug,
        is_published: req.is_published,
    };

    let category = state
        .catalog
        .update_category(&identity.viewer(), &path, changes)
        .await?;
    Ok(HttpResponse::Ok().json(responses::category(category)))
}

/// DELETE /api/categories/{slug}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state
        .catalog
        .delete_category(&identity.viewer(), &path)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
