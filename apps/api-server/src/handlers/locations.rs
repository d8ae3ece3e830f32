//! Location handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blogicum_core::services::{LocationChanges, LocationDraft};
use blogicum_shared::dto::{CreateLocationRequest, UpdateLocationRequest};

use super::responses;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/locations
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let locations = state.catalog.published_locations().await?;
    let body: Vec<_> = locations.into_iter().map(responses::location).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/locations
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateLocationRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let draft = LocationDraft {
        name: req.name,
        is_published: req.is_published,
    };

    let location = state
        .catalog
        .create_location(&identity.viewer(), draft)
        .await?;
    Ok(HttpResponse::Created().json(responses::location(location)))
}

/// PATCH /api/locations/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateLocationRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = LocationChanges {
        name: req.name,
        is_published: req.is_published,
    };

    let location = state
        .catalog
        .update_location(&identity.viewer(), path.into_inner(), changes)
        .await?;
    Ok(HttpResponse::Ok().json(responses::location(location)))
}

/// DELETE /api/locations/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .catalog
        .delete_location(&identity.viewer(), path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
