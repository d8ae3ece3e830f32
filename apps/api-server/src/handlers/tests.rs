use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

use blogicum_core::domain::Category;
use blogicum_core::ports::{
    BaseRepository, FixedClock, PasswordService, TokenService, UserRepository,
};
use blogicum_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::state::AppState;

fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    ))
}

macro_rules! test_app {
    ($store:expr) => {{
        let state = AppState::from_repositories($store.repositories(), fixed_clock(), None);
        let token_service: Arc<dyn TokenService> =
            Arc::new(JwtTokenService::new(JwtConfig::default()));
        let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(token_service))
                .app_data(web::Data::new(password_service))
                .configure(configure_routes),
        )
        .await
    }};
}

/// Sends a request and returns the status with the JSON body (`Null` when empty).
macro_rules! call {
    ($app:expr, $req:expr) => {{
        let res = test::call_service(&$app, $req.to_request()).await;
        let status = res.status();
        let body = test::read_body(res).await;
        let json: Value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }};
}

/// Registers `username` and returns its bearer header value.
macro_rules! register {
    ($app:expr, $username:expr) => {{
        let (status, body) = call!(
            $app,
            test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({
                    "username": $username,
                    "email": format!("{}@example.com", $username),
                    "password": "correct-horse",
                }))
        );
        assert_eq!(status, StatusCode::CREATED, "{body}");
        format!("Bearer {}", body["access_token"].as_str().unwrap())
    }};
}

async fn seed_category(store: &InMemoryStore, slug: &str, published: bool) -> Category {
    let mut category = Category::new(slug.to_string(), "About things".to_string(), slug.to_string());
    category.is_published = published;
    store.repositories().categories.create(category).await.unwrap()
}

async fn make_staff(store: &InMemoryStore, username: &str) {
    let users = store.repositories().users;
    let mut user = users.find_by_username(username).await.unwrap().unwrap();
    user.is_staff = true;
    users.update(user).await.unwrap();
}

fn post_body(category: &Category, title: &str) -> Value {
    json!({ "title": title, "text": "Body", "category_id": category.id })
}

#[actix_web::test]
async fn test_register_login_and_me() {
    let store = InMemoryStore::new();
    let app = test_app!(store);

    let token = register!(app, "alice");

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "username": "alice", "password": "correct-horse" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");

    let (status, body) = call!(
        app,
        test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header((header::AUTHORIZATION, token))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("password_hash").is_none());
}

#[actix_web::test]
async fn test_register_rejects_taken_username_and_bad_login() {
    let store = InMemoryStore::new();
    let app = test_app!(store);
    register!(app, "alice");

    let (status, _) = call!(
        app,
        test::TestRequest::post().uri("/api/auth/register").set_json(json!({
            "username": "alice",
            "password": "another-password",
        }))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "username": "alice", "password": "wrong-password" }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call!(
        app,
        test::TestRequest::post().uri("/api/auth/register").set_json(json!({
            "username": "bob",
            "password": "short",
        }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_protected_routes_need_a_token() {
    let store = InMemoryStore::new();
    let category = seed_category(&store, "travel", true).await;
    let app = test_app!(store);

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/posts")
            .set_json(post_body(&category, "Anonymous"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);

    let (status, _) = call!(
        app,
        test::TestRequest::get()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_feed_hides_drafts_from_everyone_but_the_author() {
    let store = InMemoryStore::new();
    let category = seed_category(&store, "travel", true).await;
    let app = test_app!(store);
    let alice = register!(app, "alice");

    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, alice.clone()))
            .set_json(post_body(&category, "Public"))
    );
    assert_eq!(status, StatusCode::CREATED);

    let mut draft = post_body(&category, "Draft");
    draft["is_published"] = json!(false);
    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, alice.clone()))
            .set_json(draft)
    );
    assert_eq!(status, StatusCode::CREATED);

    let (_, anonymous) = call!(app, test::TestRequest::get().uri("/api/posts"));
    assert_eq!(anonymous["total_items"], 1);
    assert_eq!(anonymous["items"][0]["title"], "Public");

    let (_, own) = call!(
        app,
        test::TestRequest::get()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, alice))
    );
    assert_eq!(own["total_items"], 2);

    let (_, profile) = call!(app, test::TestRequest::get().uri("/api/profile/alice"));
    assert_eq!(profile["profile"]["username"], "alice");
    assert_eq!(profile["posts"]["total_items"], 1);

    let (_, feed) = call!(app, test::TestRequest::get().uri("/api/categories/travel/posts"));
    assert_eq!(feed["category"]["slug"], "travel");
    assert_eq!(feed["posts"]["total_items"], 1);
}

#[actix_web::test]
async fn test_hidden_post_detail_is_not_found_for_others() {
    let store = InMemoryStore::new();
    let category = seed_category(&store, "travel", true).await;
    let app = test_app!(store);
    let alice = register!(app, "alice");
    let bob = register!(app, "bob");

    let mut scheduled = post_body(&category, "Later");
    scheduled["pub_date"] = json!("2024-06-01T00:00:00Z");
    let (_, post) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, alice.clone()))
            .set_json(scheduled)
    );
    let uri = format!("/api/posts/{}", post["id"].as_str().unwrap());

    let (status, _) = call!(app, test::TestRequest::get().uri(&uri));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call!(
        app,
        test::TestRequest::get()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, bob))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call!(
        app,
        test::TestRequest::get()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, alice))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["title"], "Later");
}

#[actix_web::test]
async fn test_only_the_author_edits_and_deletes() {
    let store = InMemoryStore::new();
    let category = seed_category(&store, "travel", true).await;
    let app = test_app!(store);
    let alice = register!(app, "alice");
    let bob = register!(app, "bob");

    let (_, post) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, alice.clone()))
            .set_json(post_body(&category, "Mine"))
    );
    let uri = format!("/api/posts/{}", post["id"].as_str().unwrap());

    let (status, _) = call!(
        app,
        test::TestRequest::patch()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, bob.clone()))
            .set_json(json!({ "title": "Stolen" }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call!(
        app,
        test::TestRequest::delete()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, bob))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(
        app,
        test::TestRequest::patch()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, alice.clone()))
            .set_json(json!({ "title": "Still mine" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Still mine");

    let (status, body) = call!(
        app,
        test::TestRequest::delete()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, alice))
    );
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = call!(app, test::TestRequest::get().uri(&uri));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_comments_on_visible_and_hidden_posts() {
    let store = InMemoryStore::new();
    let category = seed_category(&store, "travel", true).await;
    let app = test_app!(store);
    let alice = register!(app, "alice");
    let bob = register!(app, "bob");

    let (_, public) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, alice.clone()))
            .set_json(post_body(&category, "Public"))
    );
    let public_id = public["id"].as_str().unwrap().to_string();

    let (status, comment) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/posts/{public_id}/comments"))
            .insert_header((header::AUTHORIZATION, bob.clone()))
            .set_json(json!({ "text": "Nice trip" }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["author"]["username"], "bob");

    let comment_uri = format!(
        "/api/posts/{public_id}/comments/{}",
        comment["id"].as_str().unwrap()
    );
    let (status, _) = call!(
        app,
        test::TestRequest::patch()
            .uri(&comment_uri)
            .insert_header((header::AUTHORIZATION, alice.clone()))
            .set_json(json!({ "text": "Edited by someone else" }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, detail) = call!(app, test::TestRequest::get().uri(&format!("/api/posts/{public_id}")));
    assert_eq!(detail["post"]["comment_count"], 1);
    assert_eq!(detail["comments"][0]["text"], "Nice trip");

    let mut draft = post_body(&category, "Draft");
    draft["is_published"] = json!(false);
    let (_, hidden) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, alice))
            .set_json(draft)
    );
    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/posts/{}/comments", hidden["id"].as_str().unwrap()))
            .insert_header((header::AUTHORIZATION, bob.clone()))
            .set_json(json!({ "text": "Sneaky" }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call!(
        app,
        test::TestRequest::delete()
            .uri(&comment_uri)
            .insert_header((header::AUTHORIZATION, bob))
    );
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn test_category_administration_requires_staff() {
    let store = InMemoryStore::new();
    seed_category(&store, "hidden", false).await;
    let app = test_app!(store);
    let alice = register!(app, "alice");
    let admin = register!(app, "admin");
    make_staff(&store, "admin").await;

    let category = json!({ "title": "Food", "description": "Recipes", "slug": "food" });

    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/categories")
            .insert_header((header::AUTHORIZATION, alice))
            .set_json(category.clone())
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/categories")
            .insert_header((header::AUTHORIZATION, admin.clone()))
            .set_json(category.clone())
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_published"], true);

    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/categories")
            .insert_header((header::AUTHORIZATION, admin))
            .set_json(category)
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, listed) = call!(app, test::TestRequest::get().uri("/api/categories"));
    let slugs: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["food"]);

    let (status, _) = call!(app, test::TestRequest::get().uri("/api/categories/hidden/posts"));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_profile_update_and_health() {
    let store = InMemoryStore::new();
    let app = test_app!(store);
    let alice = register!(app, "alice");
    register!(app, "bob");

    let (status, body) = call!(
        app,
        test::TestRequest::patch()
            .uri("/api/profile")
            .insert_header((header::AUTHORIZATION, alice.clone()))
            .set_json(json!({ "first_name": "Alice" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Alice");

    let (status, _) = call!(
        app,
        test::TestRequest::patch()
            .uri("/api/profile")
            .insert_header((header::AUTHORIZATION, alice))
            .set_json(json!({ "username": "bob" }))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call!(app, test::TestRequest::get().uri("/api/profile/nobody"));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call!(app, test::TestRequest::get().uri("/api/health"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "in-memory");
}
