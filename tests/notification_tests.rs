//! Notification fan-out tests: self-suppression, read-time actor joins
//! and per-owner lifecycle operations.

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

macro_rules! notifications {
    ($app:expr, $token:expr) => {{
        let req = authed!(get, "/api/notifications", $token).to_request();
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
async fn test_follow_notifies_the_target_only_on_follow() {
    let (store, auth) = setup();
    let (alice, alice_token) = seed_user(&store, &auth, "alice", UserRole::ArtLover);
    let (bob, bob_token) = seed_user(&store, &auth, "bob", UserRole::Artist);
    let app = init_app!(store, auth);

    let req = authed!(post, format!("/api/users/{}/follow", bob.id), alice_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let data = notifications!(app, bob_token);
    assert_eq!(data["total"], 1);
    assert_eq!(data["unread"], 1);
    assert_eq!(data["notifications"][0]["type"], "follow");
    assert_eq!(data["notifications"][0]["actor"]["id"], serde_json::json!(alice.id));

    // Unfollowing adds nothing and removes nothing.
    let req = authed!(post, format!("/api/users/{}/follow", bob.id), alice_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
    assert_eq!(notifications!(app, bob_token)["total"], 1);

    // A second follow fans out again.
    let req = authed!(post, format!("/api/users/{}/follow", bob.id), alice_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
    assert_eq!(notifications!(app, bob_token)["total"], 2);
}

#[actix_web::test]
async fn test_own_actions_never_notify_oneself() {
    let (store, auth) = setup();
    let (artist, artist_token) = seed_user(&store, &auth, "artist", UserRole::Artist);
    let artwork = seed_artwork(&store, &artist.id, "Self Portrait");
    let post = seed_post(&store, &artist.id, "first post");
    let app = init_app!(store, auth);

    let req = authed!(post, format!("/api/artworks/{}/like", artwork.id), artist_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = authed!(post, format!("/api/posts/{}/comments", post.id), artist_token)
        .set_json(serde_json::json!({ "text": "replying to myself" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    let data = notifications!(app, artist_token);
    assert_eq!(data["total"], 0);
    assert_eq!(data["unread"], 0);
}

#[actix_web::test]
async fn test_likes_and_comments_carry_previews() {
    let (store, auth) = setup();
    let (artist, artist_token) = seed_user(&store, &auth, "artist", UserRole::Artist);
    let (_, viewer_token) = seed_user(&store, &auth, "viewer", UserRole::ArtLover);
    let artwork = seed_artwork(&store, &artist.id, "Sunset");
    let post = seed_post(&store, &artist.id, "studio day");
    let app = init_app!(store, auth);

    let req = authed!(post, format!("/api/artworks/{}/like", artwork.id), viewer_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = authed!(post, format!("/api/posts/{}/comments", post.id), viewer_token)
        .set_json(serde_json::json!({ "text": "lovely work" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    let data = notifications!(app, artist_token);
    assert_eq!(data["total"], 2);

    // Newest first.
    assert_eq!(data["notifications"][0]["type"], "comment");
    assert_eq!(data["notifications"][0]["preview"], "lovely work");
    assert_eq!(data["notifications"][1]["type"], "like");
    assert_eq!(data["notifications"][1]["preview"], "Sunset");
}

#[actix_web::test]
async fn test_actor_identity_is_joined_at_read_time() {
    let (store, auth) = setup();
    let (_, alice_token) = seed_user(&store, &auth, "alice", UserRole::ArtLover);
    let (bob, bob_token) = seed_user(&store, &auth, "bob", UserRole::Artist);
    let app = init_app!(store, auth);

    let req = authed!(post, format!("/api/users/{}/follow", bob.id), alice_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = authed!(put, "/api/users/me", alice_token)
        .set_json(serde_json::json!({ "display_name": "Alice Ayers" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let data = notifications!(app, bob_token);
    assert_eq!(
        data["notifications"][0]["actor"]["display_name"],
        "Alice Ayers"
    );
}

#[actix_web::test]
async fn test_deleted_actor_degrades_to_a_placeholder() {
    let (store, auth) = setup();
    let (_, alice_token) = seed_user(&store, &auth, "alice", UserRole::ArtLover);
    let (bob, bob_token) = seed_user(&store, &auth, "bob", UserRole::Artist);
    let app = init_app!(store, auth);

    let req = authed!(post, format!("/api/users/{}/follow", bob.id), alice_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = authed!(delete, "/api/users/me", alice_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);

    let data = notifications!(app, bob_token);
    assert_eq!(data["total"], 1);
    assert_eq!(
        data["notifications"][0]["actor"]["display_name"],
        "Deleted user"
    );
}

#[actix_web::test]
async fn test_read_all_and_unread_count() {
    let (store, auth) = setup();
    let (_, alice_token) = seed_user(&store, &auth, "alice", UserRole::ArtLover);
    let (_, charlie_token) = seed_user(&store, &auth, "charlie", UserRole::ArtLover);
    let (bob, bob_token) = seed_user(&store, &auth, "bob", UserRole::Artist);
    let app = init_app!(store, auth);

    let req = authed!(post, format!("/api/users/{}/follow", bob.id), alice_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
    let req = authed!(post, format!("/api/users/{}/follow", bob.id), charlie_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = authed!(get, "/api/notifications/unread-count", bob_token).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["unread"], 2);

    let req = authed!(post, "/api/notifications/read-all", bob_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let data = notifications!(app, bob_token);
    assert_eq!(data["total"], 2);
    assert_eq!(data["unread"], 0);
    assert_eq!(data["notifications"][0]["read"], true);
}

#[actix_web::test]
async fn test_deletes_are_scoped_to_the_owner() {
    let (store, auth) = setup();
    let (_, alice_token) = seed_user(&store, &auth, "alice", UserRole::ArtLover);
    let (bob, bob_token) = seed_user(&store, &auth, "bob", UserRole::Artist);
    let (_, charlie_token) = seed_user(&store, &auth, "charlie", UserRole::ArtLover);
    let app = init_app!(store, auth);

    let req = authed!(post, format!("/api/users/{}/follow", bob.id), alice_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let data = notifications!(app, bob_token);
    let notification_id = data["notifications"][0]["id"].as_str().unwrap().to_string();

    // Another user's delete is a silent no-op.
    let req = authed!(
        delete,
        format!("/api/notifications/{}", notification_id),
        charlie_token
    )
    .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);
    assert_eq!(notifications!(app, bob_token)["total"], 1);

    // The owner's delete removes it.
    let req = authed!(
        delete,
        format!("/api/notifications/{}", notification_id),
        bob_token
    )
    .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);
    assert_eq!(notifications!(app, bob_token)["total"], 0);
}

#[actix_web::test]
async fn test_clear_empties_the_list() {
    let (store, auth) = setup();
    let (_, alice_token) = seed_user(&store, &auth, "alice", UserRole::ArtLover);
    let (bob, bob_token) = seed_user(&store, &auth, "bob", UserRole::Artist);
    let app = init_app!(store, auth);

    let req = authed!(post, format!("/api/users/{}/follow", bob.id), alice_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = authed!(delete, "/api/notifications", bob_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);

    let data = notifications!(app, bob_token);
    assert_eq!(data["total"], 0);
    assert_eq!(data["unread"], 0);
}
