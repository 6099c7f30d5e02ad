//! Social graph, likes, comments and collections.

use actix_web::{test, web, App};
use chrono::Utc;
use std::sync::Arc;

use artfolio::api::{self, AppState};
use artfolio::auth::AuthService;
use artfolio::media::MediaClient;
use artfolio::models::{Artwork, SocialPost, User, UserRole, UserStats};
use artfolio::store::Store;

macro_rules! init_app {
    ($store:expr, $auth:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::from($auth.clone()))
                .app_data(web::Data::new(AppState::new(
                    $store.clone(),
                    $auth.clone(),
                    MediaClient::new(None, None),
                )))
                .configure(api::configure_routes),
        )
        .await
    };
}

macro_rules! authed {
    ($method:ident, $uri:expr, $token:expr) => {
        test::TestRequest::$method()
            .uri($uri.as_ref())
            .insert_header(("Authorization", format!("Bearer {}", $token)))
    };
}

macro_rules! get_json {
    ($app:expr, $uri:expr, $token:expr) => {{
        let req = authed!(get, $uri, $token).to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        body["data"].clone()
    }};
}

fn setup() -> (Arc<Store>, Arc<AuthService>) {
    (
        Arc::new(Store::in_memory().unwrap()),
        Arc::new(AuthService::new("test_secret".to_string())),
    )
}

fn seed_user(store: &Store, auth: &AuthService, username: &str, role: UserRole) -> (User, String) {
    let mut user = User {
        id: String::new(),
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: "unused".to_string(),
        role,
        display_name: username.to_string(),
        bio: String::new(),
        avatar_url: String::new(),
        liked_artwork_ids: Vec::new(),
        stats: UserStats::default(),
        deleted_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    store.create_user(&mut user).unwrap();
    let token = auth.generate_token(&user.id).unwrap();
    (user, token)
}

fn seed_artwork(store: &Store, artist_id: &str, title: &str) -> Artwork {
    let mut artwork = Artwork {
        id: String::new(),
        artist_id: artist_id.to_string(),
        image_url: "https://img.example.com/a.png".to_string(),
        title: title.to_string(),
        description: String::new(),
        tags: Vec::new(),
        likes: 0,
        comments: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    store.create_artwork(&mut artwork).unwrap();
    artwork
}

fn seed_post(store: &Store, author_id: &str, content: &str) -> SocialPost {
    let mut post = SocialPost {
        id: String::new(),
        author_id: author_id.to_string(),
        content: content.to_string(),
        image_url: None,
        liked_by: Vec::new(),
        comments: Vec::new(),
        created_at: Utc::now(),
    };
    store.create_post(&mut post).unwrap();
    post
}

#[actix_web::test]
async fn test_follow_toggle_updates_derived_counts() {
    let (store, auth) = setup();
    let (alice, alice_token) = seed_user(&store, &auth, "alice", UserRole::ArtLover);
    let (bob, _) = seed_user(&store, &auth, "bob", UserRole::Artist);
    let app = init_app!(store, auth);

    let req = authed!(post, format!("/api/users/{}/follow", bob.id), alice_token).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["stats"]["following"], 1);

    let bob_profile = get_json!(app, format!("/api/users/{}", bob.id), alice_token);
    assert_eq!(bob_profile["stats"]["followers"], 1);

    // Toggling off removes the edge and the counts follow.
    let req = authed!(post, format!("/api/users/{}/follow", bob.id), alice_token).to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["stats"]["following"], 0);

    let alice_profile = get_json!(app, format!("/api/users/{}", alice.id), alice_token);
    assert_eq!(alice_profile["stats"]["following"], 0);
}

#[actix_web::test]
async fn test_follow_validation() {
    let (store, auth) = setup();
    let (alice, alice_token) = seed_user(&store, &auth, "alice", UserRole::ArtLover);
    let app = init_app!(store, auth);

    let req = authed!(post, format!("/api/users/{}/follow", alice.id), alice_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = authed!(post, "/api/users/missing/follow", alice_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn test_artwork_like_toggle() {
    let (store, auth) = setup();
    let (artist, _) = seed_user(&store, &auth, "artist", UserRole::Artist);
    let (_, viewer_token) = seed_user(&store, &auth, "viewer", UserRole::ArtLover);
    let artwork = seed_artwork(&store, &artist.id, "Sunset");
    let app = init_app!(store, auth);

    let req = authed!(post, format!("/api/artworks/{}/like", artwork.id), viewer_token).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        body["data"]["liked_artwork_ids"],
        serde_json::json!([artwork.id])
    );
    assert_eq!(body["data"]["stats"]["liked"], 1);

    let fetched = get_json!(app, format!("/api/artworks/{}", artwork.id), viewer_token);
    assert_eq!(fetched["likes"], 1);

    let req = authed!(post, format!("/api/artworks/{}/like", artwork.id), viewer_token).to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["liked_artwork_ids"], serde_json::json!([]));

    let fetched = get_json!(app, format!("/api/artworks/{}", artwork.id), viewer_token);
    assert_eq!(fetched["likes"], 0);
}

#[actix_web::test]
async fn test_post_like_toggle() {
    let (store, auth) = setup();
    let (artist, _) = seed_user(&store, &auth, "artist", UserRole::Artist);
    let (viewer, viewer_token) = seed_user(&store, &auth, "viewer", UserRole::ArtLover);
    let post = seed_post(&store, &artist.id, "studio day");
    let app = init_app!(store, auth);

    let req = authed!(post, format!("/api/posts/{}/like", post.id), viewer_token).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["liked_by"], serde_json::json!([viewer.id]));

    let req = authed!(post, format!("/api/posts/{}/like", post.id), viewer_token).to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["liked_by"], serde_json::json!([]));
}

#[actix_web::test]
async fn test_comments_append_in_order() {
    let (store, auth) = setup();
    let (artist, _) = seed_user(&store, &auth, "artist", UserRole::Artist);
    let (_, viewer_token) = seed_user(&store, &auth, "viewer", UserRole::ArtLover);
    let post = seed_post(&store, &artist.id, "studio day");
    let app = init_app!(store, auth);

    for text in ["first", "second"] {
        let req = authed!(post, format!("/api/posts/{}/comments", post.id), viewer_token)
            .set_json(serde_json::json!({ "text": text }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    let posts = get_json!(app, "/api/posts", viewer_token);
    let fetched = posts
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == serde_json::json!(post.id))
        .unwrap();
    let texts: Vec<&str> = fetched["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["first", "second"]);
}

#[actix_web::test]
async fn test_blank_comment_is_rejected() {
    let (store, auth) = setup();
    let (artist, _) = seed_user(&store, &auth, "artist", UserRole::Artist);
    let (_, viewer_token) = seed_user(&store, &auth, "viewer", UserRole::ArtLover);
    let post = seed_post(&store, &artist.id, "studio day");
    let app = init_app!(store, auth);

    let req = authed!(post, format!("/api/posts/{}/comments", post.id), viewer_token)
        .set_json(serde_json::json!({ "text": "   " }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_web::test]
async fn test_collection_names_are_unique_per_user() {
    let (store, auth) = setup();
    let (_, alice_token) = seed_user(&store, &auth, "alice", UserRole::ArtLover);
    let (_, bob_token) = seed_user(&store, &auth, "bob", UserRole::ArtLover);
    let app = init_app!(store, auth);

    let req = authed!(post, "/api/collections", alice_token)
        .set_json(serde_json::json!({ "name": "Inspiration" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    let req = authed!(post, "/api/collections", alice_token)
        .set_json(serde_json::json!({ "name": "Inspiration" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    // The constraint is per user, not global.
    let req = authed!(post, "/api/collections", bob_token)
        .set_json(serde_json::json!({ "name": "Inspiration" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);
}

#[actix_web::test]
async fn test_default_favorites_collection_is_created_lazily() {
    let (store, auth) = setup();
    let (_, alice_token) = seed_user(&store, &auth, "alice", UserRole::ArtLover);
    let app = init_app!(store, auth);

    for title in ["Starry Night", "Water Lilies"] {
        let req = authed!(post, "/api/collections/items", alice_token)
            .set_json(serde_json::json!({
                "image_url": "https://img.example.com/x.png",
                "title": title,
                "artist_name": "Someone"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    let collections = get_json!(app, "/api/collections", alice_token);
    let collections = collections.as_array().unwrap();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0]["name"], "Favorites");
    assert_eq!(collections[0]["items"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_artwork_mutations_are_owner_guarded() {
    let (store, auth) = setup();
    let (artist, artist_token) = seed_user(&store, &auth, "artist", UserRole::Artist);
    let (_, intruder_token) = seed_user(&store, &auth, "intruder", UserRole::Artist);
    let artwork = seed_artwork(&store, &artist.id, "Sunset");
    let app = init_app!(store, auth);

    let req = authed!(put, format!("/api/artworks/{}", artwork.id), intruder_token)
        .set_json(serde_json::json!({ "title": "Stolen" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);

    let req = authed!(delete, format!("/api/artworks/{}", artwork.id), intruder_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);

    let req = authed!(put, format!("/api/artworks/{}", artwork.id), artist_token)
        .set_json(serde_json::json!({ "title": "Sunset II" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["title"], "Sunset II");
}

#[actix_web::test]
async fn test_blank_display_name_is_rejected() {
    let (store, auth) = setup();
    let (_, alice_token) = seed_user(&store, &auth, "alice", UserRole::ArtLover);
    let app = init_app!(store, auth);

    let req = authed!(put, "/api/users/me", alice_token)
        .set_json(serde_json::json!({ "display_name": "  " }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}
