//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod comments;
mod health;
mod locations;
mod posts;
mod profiles;
mod responses;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .wrap(RateLimitMiddleware)
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/{id}", web::get().to(posts::detail))
                    .route("/{id}", web::patch().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/comments", web::post().to(comments::create))
                    .route(
                        "/{id}/comments/{comment_id}",
                        web::patch().to(comments::update),
                    )
                    .route(
                        "/{id}/comments/{comment_id}",
                        web::delete().to(comments::delete),
                    ),
            )
            .service(
                web::scope("/categories")
                    .route("", web::get().to(categories::list))
                    .route("", web::post().to(categories::create))
                    .route("/{slug}", web::patch().to(categories::update))
                    .route("/{slug}", web::delete().to(categories::delete))
                    .route("/{slug}/posts", web::get().to(categories::posts)),
            )
            .service(
                web::scope("/locations")
                    .route("", web::get().to(locations::list))
                    .route("", web::post().to(locations::create))
                    .route("/{id}", web::patch().to(locations::update))
                    .route("/{id}", web::delete().to(locations::delete)),
            )
            .service(
                web::scope("/profile")
                    .route("", web::patch().to(profiles::update))
                    .route("/{username}", web::get().to(profiles::show)),
            ),
    );
}
