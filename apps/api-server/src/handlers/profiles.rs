//! Profile handlers.

use actix_web::{HttpResponse, web};

use blogicum_core::services::ProfileChanges;
use blogicum_shared::dto::{PageQuery, ProfileResponse, UpdateProfileRequest};

use super::responses;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/profile/{username}?page=N
///
/// The owner's feed includes their drafts and scheduled posts.
pub async fn show(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let (user, page) = state
        .feed
        .profile(&path, &identity.viewer(), query.page.unwrap_or(1))
        .await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        profile: responses::profile(user),
        posts: responses::page(page, responses::post),
    }))
}

/// PATCH /api/profile
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = ProfileChanges {
        username: req.username,
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
    };

    let user = state.profiles.update(identity.user_id, changes).await?;
    Ok(HttpResponse::Ok().json(responses::user(user)))
}
