//! Feed assembly tests: post/recommendation interleaving and the
//! per-viewer visibility overlay.

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

macro_rules! fetch_feed {
    ($app:expr, $token:expr) => {{
        let req = test::TestRequest::get()
            .uri("/api/feed")
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        body["data"].as_array().unwrap().clone()
    }};
}

fn shape(items: &[serde_json::Value]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|item| {
            (
                item["type"].as_str().unwrap().to_string(),
                item["data"]["id"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

#[actix_web::test]
async fn test_recommendations_are_interleaved_after_every_two_posts() {
    let (store, auth) = setup();
    let (artist, _) = seed_user(&store, &auth, "artist", UserRole::Artist);
    let (_, viewer_token) = seed_user(&store, &auth, "viewer", UserRole::ArtLover);

    let p1 = seed_post(&store, &artist.id, "one");
    let p2 = seed_post(&store, &artist.id, "two");
    let p3 = seed_post(&store, &artist.id, "three");
    let p4 = seed_post(&store, &artist.id, "four");
    let w1 = seed_artwork(&store, &artist.id, "First");
    let w2 = seed_artwork(&store, &artist.id, "Second");

    let app = init_app!(store, auth);
    let items = fetch_feed!(app, &viewer_token);

    // Posts newest first, a recommendation after every second post,
    // leftovers appended at the end.
    assert_eq!(
        shape(&items),
        vec![
            ("post".to_string(), p4.id),
            ("post".to_string(), p3.id),
            ("recommendation".to_string(), w2.id),
            ("post".to_string(), p2.id),
            ("post".to_string(), p1.id),
            ("recommendation".to_string(), w1.id),
        ]
    );
}

#[actix_web::test]
async fn test_hidden_post_is_excluded_until_unhidden() {
    let (store, auth) = setup();
    let (artist, _) = seed_user(&store, &auth, "artist", UserRole::Artist);
    let (_, viewer_token) = seed_user(&store, &auth, "viewer", UserRole::ArtLover);

    let p1 = seed_post(&store, &artist.id, "one");
    let p2 = seed_post(&store, &artist.id, "two");

    let app = init_app!(store, auth);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/hide", p1.id))
        .insert_header(("Authorization", format!("Bearer {}", viewer_token)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let items = fetch_feed!(app, &viewer_token);
    assert_eq!(shape(&items), vec![("post".to_string(), p2.id.clone())]);

    // Toggling again restores the post.
    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/hide", p1.id))
        .insert_header(("Authorization", format!("Bearer {}", viewer_token)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let items = fetch_feed!(app, &viewer_token);
    assert_eq!(items.len(), 2);
}

#[actix_web::test]
async fn test_dismissed_recommendation_never_returns() {
    let (store, auth) = setup();
    let (artist, _) = seed_user(&store, &auth, "artist", UserRole::Artist);
    let (_, viewer_token) = seed_user(&store, &auth, "viewer", UserRole::ArtLover);

    let w1 = seed_artwork(&store, &artist.id, "First");
    let w2 = seed_artwork(&store, &artist.id, "Second");

    let app = init_app!(store, auth);

    for _ in 0..2 {
        // Dismissal is idempotent.
        let req = test::TestRequest::post()
            .uri(&format!("/api/recommendations/{}/dismiss", w2.id))
            .insert_header(("Authorization", format!("Bearer {}", viewer_token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let items = fetch_feed!(app, &viewer_token);
        assert_eq!(shape(&items), vec![("recommendation".to_string(), w1.id.clone())]);
    }
}

#[actix_web::test]
async fn test_dismissal_promotes_the_next_pool_candidate() {
    let (store, auth) = setup();
    let (artist, _) = seed_user(&store, &auth, "artist", UserRole::Artist);
    let (_, viewer_token) = seed_user(&store, &auth, "viewer", UserRole::ArtLover);

    let works: Vec<Artwork> = (0..6)
        .map(|i| seed_artwork(&store, &artist.id, &format!("Work {}", i)))
        .collect();

    let app = init_app!(store, auth);

    // Newest five of six make the cut.
    let items = fetch_feed!(app, &viewer_token);
    assert_eq!(items.len(), 5);
    let ids: Vec<String> = shape(&items).into_iter().map(|(_, id)| id).collect();
    assert!(!ids.contains(&works[0].id));

    // Dismissing the newest lets the oldest back in.
    let req = test::TestRequest::post()
        .uri(&format!("/api/recommendations/{}/dismiss", works[5].id))
        .insert_header(("Authorization", format!("Bearer {}", viewer_token)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let items = fetch_feed!(app, &viewer_token);
    assert_eq!(items.len(), 5);
    let ids: Vec<String> = shape(&items).into_iter().map(|(_, id)| id).collect();
    assert!(!ids.contains(&works[5].id));
    assert!(ids.contains(&works[0].id));
}

#[actix_web::test]
async fn test_hidden_recommendation_stays_in_the_feed_flagged() {
    let (store, auth) = setup();
    let (artist, _) = seed_user(&store, &auth, "artist", UserRole::Artist);
    let (_, viewer_token) = seed_user(&store, &auth, "viewer", UserRole::ArtLover);

    let w1 = seed_artwork(&store, &artist.id, "First");
    seed_artwork(&store, &artist.id, "Second");

    let app = init_app!(store, auth);

    let req = test::TestRequest::post()
        .uri(&format!("/api/artworks/{}/hide", w1.id))
        .insert_header(("Authorization", format!("Bearer {}", viewer_token)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let items = fetch_feed!(app, &viewer_token);
    assert_eq!(items.len(), 2);

    for item in &items {
        assert_eq!(item["reason"], "Recommended for you");
        let expected_hidden = item["data"]["id"] == serde_json::json!(w1.id);
        assert_eq!(item["is_hidden"], expected_hidden);
    }
}

#[actix_web::test]
async fn test_own_artworks_are_never_recommended() {
    let (store, auth) = setup();
    let (artist, artist_token) = seed_user(&store, &auth, "artist", UserRole::Artist);
    seed_artwork(&store, &artist.id, "Mine");

    let app = init_app!(store, auth);
    let items = fetch_feed!(app, &artist_token);
    assert!(items.is_empty());
}
