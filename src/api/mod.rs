use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use std::sync::Arc;

use crate::auth::{AuthService, AuthUser, RequireAuth};
use crate::chat::{ChatError, ConversationEngine};
use crate::feed::FeedAssembler;
use crate::media::{MediaClient, MediaError};
use crate::models::*;
use crate::notify::Notifier;
use crate::prefs::Preferences;
use crate::social::{SocialError, SocialService};
use crate::store::{Store, StoreError};

pub struct AppState {
    pub store: Arc<Store>,
    pub auth_service: Arc<AuthService>,
    pub social: SocialService,
    pub chat: ConversationEngine,
    pub feed: FeedAssembler,
    pub notifier: Notifier,
    pub prefs: Preferences,
    pub media: MediaClient,
}

impl AppState {
    pub fn new(store: Arc<Store>, auth_service: Arc<AuthService>, media: MediaClient) -> Self {
        Self {
            social: SocialService::new(store.clone()),
            chat: ConversationEngine::new(store.clone()),
            feed: FeedAssembler::new(store.clone()),
            notifier: Notifier::new(store.clone()),
            prefs: Preferences::new(store.clone()),
            store,
            auth_service,
            media,
        }
    }
}

fn store_error_response(e: StoreError) -> HttpResponse {
    match e {
        StoreError::NotFound(msg) => HttpResponse::NotFound().json(ApiResponse::<()>::error(msg)),
        other => HttpResponse::InternalServerError().json(ApiResponse::<()>::error(other.to_string())),
    }
}

fn social_error_response(e: SocialError) -> HttpResponse {
    match e {
        SocialError::Validation(msg) => {
            HttpResponse::BadRequest().json(ApiResponse::<()>::error(msg))
        }
        SocialError::Store(e) => store_error_response(e),
    }
}

fn chat_error_response(e: ChatError) -> HttpResponse {
    match e {
        ChatError::Validation(msg) => {
            HttpResponse::BadRequest().json(ApiResponse::<()>::error(msg))
        }
        ChatError::Store(e) => store_error_response(e),
    }
}

// ==================== Health Check ====================

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

// ==================== Auth Endpoints ====================

pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> impl Responder {
    if body.username.trim().is_empty() || body.email.trim().is_empty() || body.password.is_empty()
    {
        return HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error("Username, email and password are required"));
    }

    let password_hash = match state.auth_service.hash_password(&body.password) {
        Ok(hash) => hash,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to hash password"))
        }
    };

    let mut user = User {
        id: String::new(),
        username: body.username.clone(),
        email: body.email.clone(),
        password_hash,
        role: body.role.unwrap_or(UserRole::ArtLover),
        display_name: body
            .display_name
            .clone()
            .unwrap_or_else(|| body.username.clone()),
        bio: String::new(),
        avatar_url: String::new(),
        liked_artwork_ids: Vec::new(),
        stats: UserStats::default(),
        deleted_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    if let Err(e) = state.store.create_user(&mut user) {
        return HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error(format!("Failed to create user: {}", e)));
    }

    let token = match state.auth_service.generate_token(&user.id) {
        Ok(t) => t,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to generate token"))
        }
    };

    HttpResponse::Created().json(ApiResponse::success(LoginResponse { token, user }))
}

pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> impl Responder {
    let user = match state.store.get_user_by_username(&body.username) {
        Ok(u) => u,
        Err(StoreError::NotFound(_)) => {
            return HttpResponse::Unauthorized()
                .json(ApiResponse::<()>::error("Invalid credentials"));
        }
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Database error"));
        }
    };

    let valid = state
        .auth_service
        .verify_password(&body.password, &user.password_hash)
        .unwrap_or(false);

    if !valid {
        return HttpResponse::Unauthorized().json(ApiResponse::<()>::error("Invalid credentials"));
    }

    let token = match state.auth_service.generate_token(&user.id) {
        Ok(t) => t,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to generate token"))
        }
    };

    HttpResponse::Ok().json(ApiResponse::success(LoginResponse { token, user }))
}

pub async fn get_current_user(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
) -> impl Responder {
    match state.store.get_user(&auth_user.user_id) {
        Ok(user) => HttpResponse::Ok().json(ApiResponse::success(user)),
        Err(_) => HttpResponse::NotFound().json(ApiResponse::<()>::error("User not found")),
    }
}

// ==================== User Endpoints ====================

pub async fn get_user(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.store.get_user(&path.into_inner()) {
        Ok(user) => HttpResponse::Ok().json(ApiResponse::success(user)),
        Err(e) => store_error_response(e),
    }
}

pub async fn update_profile(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    body: web::Json<UpdateProfileRequest>,
) -> impl Responder {
    if let Some(name) = &body.display_name {
        if name.trim().is_empty() {
            return HttpResponse::BadRequest()
                .json(ApiResponse::<()>::error("Display name cannot be empty"));
        }
    }

    let mut user = match state.store.get_user(&auth_user.user_id) {
        Ok(user) => user,
        Err(e) => return store_error_response(e),
    };

    if let Some(name) = &body.display_name {
        user.display_name = name.trim().to_string();
    }
    if let Some(bio) = &body.bio {
        user.bio = bio.clone();
    }
    if let Some(avatar_url) = &body.avatar_url {
        user.avatar_url = avatar_url.clone();
    }

    match state.store.update_user(&mut user) {
        Ok(_) => match state.store.get_user(&auth_user.user_id) {
            Ok(user) => HttpResponse::Ok().json(ApiResponse::success(user)),
            Err(e) => store_error_response(e),
        },
        Err(e) => store_error_response(e),
    }
}

pub async fn delete_account(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
) -> impl Responder {
    match state.store.soft_delete_user(&auth_user.user_id) {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => store_error_response(e),
    }
}

pub async fn toggle_follow(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    match state.social.toggle_follow(&auth_user.user_id, &path.into_inner()) {
        Ok(user) => HttpResponse::Ok().json(ApiResponse::success(user)),
        Err(e) => social_error_response(e),
    }
}

// ==================== Feed ====================

pub async fn get_feed(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
) -> impl Responder {
    // Read path: degrade to an empty feed rather than erroring.
    let items = state.feed.assemble(&auth_user.user_id).unwrap_or_else(|e| {
        log::warn!("Feed assembly failed for {}: {}", auth_user.user_id, e);
        Vec::new()
    });
    HttpResponse::Ok().json(ApiResponse::success(items))
}

// ==================== Artwork Endpoints ====================

#[derive(Debug, serde::Deserialize)]
pub struct ListArtworksQuery {
    pub artist_id: Option<String>,
}

pub async fn list_artworks(
    state: web::Data<AppState>,
    query: web::Query<ListArtworksQuery>,
) -> impl Responder {
    let result = match &query.artist_id {
        Some(artist_id) => state.store.list_artworks_by_artist(artist_id),
        None => state.store.list_artworks(),
    };
    HttpResponse::Ok().json(ApiResponse::success(result.unwrap_or_default()))
}

pub async fn create_artwork(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    body: web::Json<CreateArtworkRequest>,
) -> impl Responder {
    if body.title.trim().is_empty() || body.image_url.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error("Title and image are required"));
    }

    let mut artwork = Artwork {
        id: String::new(),
        artist_id: auth_user.user_id.clone(),
        image_url: body.image_url.clone(),
        title: body.title.trim().to_string(),
        description: body.description.clone().unwrap_or_default(),
        tags: body.tags.clone(),
        likes: 0,
        comments: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    match state.store.create_artwork(&mut artwork) {
        Ok(_) => HttpResponse::Created().json(ApiResponse::success(artwork)),
        Err(e) => store_error_response(e),
    }
}

pub async fn get_artwork(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.store.get_artwork(&path.into_inner()) {
        Ok(artwork) => HttpResponse::Ok().json(ApiResponse::success(artwork)),
        Err(e) => store_error_response(e),
    }
}

pub async fn update_artwork(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
    body: web::Json<UpdateArtworkRequest>,
) -> impl Responder {
    let mut artwork = match state.store.get_artwork(&path.into_inner()) {
        Ok(artwork) => artwork,
        Err(e) => return store_error_response(e),
    };

    if artwork.artist_id != auth_user.user_id {
        return HttpResponse::Forbidden()
            .json(ApiResponse::<()>::error("Not the owner of this artwork"));
    }

    if let Some(title) = &body.title {
        artwork.title = title.trim().to_string();
    }
    if let Some(description) = &body.description {
        artwork.description = description.clone();
    }
    if let Some(image_url) = &body.image_url {
        artwork.image_url = image_url.clone();
    }
    if let Some(tags) = &body.tags {
        artwork.tags = tags.clone();
    }

    match state.store.update_artwork(&mut artwork) {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::success(artwork)),
        Err(e) => store_error_response(e),
    }
}

pub async fn delete_artwork(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    let artwork = match state.store.get_artwork(&id) {
        Ok(artwork) => artwork,
        Err(e) => return store_error_response(e),
    };

    if artwork.artist_id != auth_user.user_id {
        return HttpResponse::Forbidden()
            .json(ApiResponse::<()>::error("Not the owner of this artwork"));
    }

    match state.store.delete_artwork(&id) {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => store_error_response(e),
    }
}

pub async fn toggle_artwork_like(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    match state
        .social
        .toggle_artwork_like(&auth_user.user_id, &path.into_inner())
    {
        Ok(user) => HttpResponse::Ok().json(ApiResponse::success(user)),
        Err(e) => social_error_response(e),
    }
}

pub async fn toggle_artwork_hidden(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    match state
        .prefs
        .toggle_hidden_artwork(&auth_user.user_id, &path.into_inner())
    {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::success(())),
        Err(e) => store_error_response(e),
    }
}

pub async fn dismiss_recommendation(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    match state
        .prefs
        .dismiss_recommendation(&auth_user.user_id, &path.into_inner())
    {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::success(())),
        Err(e) => store_error_response(e),
    }
}

// ==================== Post Endpoints ====================

pub async fn list_posts(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(
        state.store.list_posts().unwrap_or_default(),
    ))
}

pub async fn create_post(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    body: web::Json<CreatePostRequest>,
) -> impl Responder {
    if body.content.trim().is_empty() && body.image_url.is_none() {
        return HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error("Post content or image is required"));
    }

    let mut post = SocialPost {
        id: String::new(),
        author_id: auth_user.user_id.clone(),
        content: body.content.clone(),
        image_url: body.image_url.clone(),
        liked_by: Vec::new(),
        comments: Vec::new(),
        created_at: Utc::now(),
    };

    match state.store.create_post(&mut post) {
        Ok(_) => HttpResponse::Created().json(ApiResponse::success(post)),
        Err(e) => store_error_response(e),
    }
}

pub async fn delete_post(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    let post = match state.store.get_post(&id) {
        Ok(post) => post,
        Err(e) => return store_error_response(e),
    };

    if post.author_id != auth_user.user_id {
        return HttpResponse::Forbidden()
            .json(ApiResponse::<()>::error("Not the author of this post"));
    }

    match state.store.delete_post(&id) {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => store_error_response(e),
    }
}

pub async fn toggle_post_like(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    match state
        .social
        .toggle_post_like(&auth_user.user_id, &path.into_inner())
    {
        Ok(post) => HttpResponse::Ok().json(ApiResponse::success(post)),
        Err(e) => social_error_response(e),
    }
}

pub async fn add_comment(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
    body: web::Json<CommentRequest>,
) -> impl Responder {
    match state
        .social
        .add_comment(&auth_user.user_id, &path.into_inner(), &body.text)
    {
        Ok(comment) => HttpResponse::Created().json(ApiResponse::success(comment)),
        Err(e) => social_error_response(e),
    }
}

pub async fn toggle_post_hidden(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    match state
        .prefs
        .toggle_hidden_post(&auth_user.user_id, &path.into_inner())
    {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::success(())),
        Err(e) => store_error_response(e),
    }
}

// ==================== Collection Endpoints ====================

pub async fn list_collections(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(
        state
            .social
            .list_collections(&auth_user.user_id)
            .unwrap_or_default(),
    ))
}

pub async fn create_collection(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    body: web::Json<CreateCollectionRequest>,
) -> impl Responder {
    match state.social.create_collection(&auth_user.user_id, &body.name) {
        Ok(collection) => HttpResponse::Created().json(ApiResponse::success(collection)),
        Err(e) => social_error_response(e),
    }
}

pub async fn add_collection_item(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    body: web::Json<AddCollectionItemRequest>,
) -> impl Responder {
    match state.social.add_to_collection(&auth_user.user_id, &body) {
        Ok(item) => HttpResponse::Created().json(ApiResponse::success(item)),
        Err(e) => social_error_response(e),
    }
}

// ==================== Conversation Endpoints ====================

pub async fn list_conversations(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
) -> impl Responder {
    // Polled by clients; degrade to empty instead of erroring.
    let conversations = state.chat.list_for(&auth_user.user_id).unwrap_or_else(|e| {
        log::warn!("Conversation list failed for {}: {}", auth_user.user_id, e);
        Vec::new()
    });
    HttpResponse::Ok().json(ApiResponse::success(conversations))
}

pub async fn start_conversation(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    body: web::Json<StartConversationRequest>,
) -> impl Responder {
    match state.chat.start(&auth_user.user_id, &body.user_id) {
        Ok(conversation) => HttpResponse::Ok().json(ApiResponse::success(conversation)),
        Err(e) => chat_error_response(e),
    }
}

pub async fn get_messages(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    match state
        .chat
        .get_messages(&path.into_inner(), Some(&auth_user.user_id))
    {
        Ok(messages) => HttpResponse::Ok().json(ApiResponse::success(messages)),
        Err(e) => chat_error_response(e),
    }
}

pub async fn send_message(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
    body: web::Json<SendMessageRequest>,
) -> impl Responder {
    match state
        .chat
        .send(&path.into_inner(), &auth_user.user_id, &body.text)
    {
        Ok(message) => HttpResponse::Created().json(ApiResponse::success(message)),
        Err(e) => chat_error_response(e),
    }
}

pub async fn mark_conversation_read(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    match state.chat.mark_read(&path.into_inner(), &auth_user.user_id) {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::success(())),
        Err(e) => chat_error_response(e),
    }
}

pub async fn toggle_conversation_hidden(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    match state.chat.toggle_hide(&auth_user.user_id, &path.into_inner()) {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::success(())),
        Err(e) => chat_error_response(e),
    }
}

pub async fn delete_conversation(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    match state.chat.delete(&auth_user.user_id, &path.into_inner()) {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => chat_error_response(e),
    }
}

pub async fn delete_message(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (conversation_id, message_id) = path.into_inner();

    // Only participants may hard-delete.
    match state.store.get_conversation(&conversation_id) {
        Ok(conversation) if conversation.is_participant(&auth_user.user_id) => {}
        Ok(_) => {
            return HttpResponse::Forbidden()
                .json(ApiResponse::<()>::error("Not a participant"));
        }
        Err(e) => return store_error_response(e),
    }

    match state.chat.delete_message(&conversation_id, &message_id) {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => chat_error_response(e),
    }
}

pub async fn toggle_message_hidden(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    match state
        .chat
        .toggle_hide_message(&auth_user.user_id, &path.into_inner())
    {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::success(())),
        Err(e) => chat_error_response(e),
    }
}

// ==================== Notification Endpoints ====================

pub async fn list_notifications(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
) -> impl Responder {
    let notifications = state
        .notifier
        .list_for(&auth_user.user_id)
        .unwrap_or_default();
    let unread = state
        .notifier
        .unread_count(&auth_user.user_id)
        .unwrap_or(0);
    let total = notifications.len();

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": {
            "notifications": notifications,
            "total": total,
            "unread": unread
        }
    }))
}

pub async fn unread_notification_count(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
) -> impl Responder {
    let unread = state
        .notifier
        .unread_count(&auth_user.user_id)
        .unwrap_or(0);
    HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "unread": unread })))
}

pub async fn mark_all_notifications_read(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
) -> impl Responder {
    match state.notifier.mark_all_read(&auth_user.user_id) {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::success(())),
        Err(e) => store_error_response(e),
    }
}

pub async fn clear_notifications(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
) -> impl Responder {
    match state.notifier.clear(&auth_user.user_id) {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => store_error_response(e),
    }
}

pub async fn delete_notification(
    state: web::Data<AppState>,
    auth_user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    match state
        .notifier
        .delete_one(&auth_user.user_id, &path.into_inner())
    {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => store_error_response(e),
    }
}

// ==================== Media Endpoints ====================

pub async fn upload_image(
    state: web::Data<AppState>,
    request: HttpRequest,
    body: web::Bytes,
) -> impl Responder {
    if body.is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::<()>::error("Empty image body"));
    }

    let content_type = request
        .headers()
        .get("Content-Type")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let url = state.media.store_image(body.to_vec(), &content_type).await;
    HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "url": url })))
}

pub async fn enhance_image(
    state: web::Data<AppState>,
    body: web::Json<EnhanceRequest>,
) -> impl Responder {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    let bytes = match BASE64.decode(&body.image) {
        Ok(bytes) => bytes,
        Err(_) => {
            return HttpResponse::BadRequest()
                .json(ApiResponse::<()>::error("Image must be base64-encoded"));
        }
    };

    match state.media.enhance(&bytes, &body.instruction).await {
        Ok(enhanced) => HttpResponse::Ok().json(ApiResponse::success(
            serde_json::json!({ "image": BASE64.encode(enhanced) }),
        )),
        Err(MediaError::NotConfigured) => HttpResponse::ServiceUnavailable()
            .json(ApiResponse::<()>::error("Enhancement service is not configured")),
        Err(e) => HttpResponse::BadGateway().json(ApiResponse::<()>::error(e.to_string())),
    }
}

// ==================== Route Configuration ====================

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .route("/health", web::get().to(health))
        // Auth routes (no auth required)
        .service(
            web::scope("/api/auth")
                .route("/register", web::post().to(register))
                .route("/login", web::post().to(login))
                .service(
                    web::scope("")
                        .wrap(RequireAuth)
                        .route("/me", web::get().to(get_current_user)),
                ),
        )
        // Protected routes
        .service(
            web::scope("/api")
                .wrap(RequireAuth)
                // Feed
                .route("/feed", web::get().to(get_feed))
                // Users & social graph
                .route("/users/me", web::put().to(update_profile))
                .route("/users/me", web::delete().to(delete_account))
                .route("/users/{id}", web::get().to(get_user))
                .route("/users/{id}/follow", web::post().to(toggle_follow))
                // Artworks
                .route("/artworks", web::get().to(list_artworks))
                .route("/artworks", web::post().to(create_artwork))
                .route("/artworks/{id}", web::get().to(get_artwork))
                .route("/artworks/{id}", web::put().to(update_artwork))
                .route("/artworks/{id}", web::delete().to(delete_artwork))
                .route("/artworks/{id}/like", web::post().to(toggle_artwork_like))
                .route("/artworks/{id}/hide", web::post().to(toggle_artwork_hidden))
                .route(
                    "/recommendations/{id}/dismiss",
                    web::post().to(dismiss_recommendation),
                )
                // Posts
                .route("/posts", web::get().to(list_posts))
                .route("/posts", web::post().to(create_post))
                .route("/posts/{id}", web::delete().to(delete_post))
                .route("/posts/{id}/like", web::post().to(toggle_post_like))
                .route("/posts/{id}/comments", web::post().to(add_comment))
                .route("/posts/{id}/hide", web::post().to(toggle_post_hidden))
                // Collections
                .route("/collections", web::get().to(list_collections))
                .route("/collections", web::post().to(create_collection))
                .route("/collections/items", web::post().to(add_collection_item))
                // Conversations & messages
                .route("/conversations", web::get().to(list_conversations))
                .route("/conversations", web::post().to(start_conversation))
                .route(
                    "/conversations/{id}/messages",
                    web::get().to(get_messages),
                )
                .route(
                    "/conversations/{id}/messages",
                    web::post().to(send_message),
                )
                .route(
                    "/conversations/{id}/read",
                    web::post().to(mark_conversation_read),
                )
                .route(
                    "/conversations/{id}/hide",
                    web::post().to(toggle_conversation_hidden),
                )
                .route("/conversations/{id}", web::delete().to(delete_conversation))
                .route(
                    "/conversations/{id}/messages/{mid}",
                    web::delete().to(delete_message),
                )
                .route("/messages/{id}/hide", web::post().to(toggle_message_hidden))
                // Notifications
                .route("/notifications", web::get().to(list_notifications))
                .route(
                    "/notifications/unread-count",
                    web::get().to(unread_notification_count),
                )
                .route(
                    "/notifications/read-all",
                    web::post().to(mark_all_notifications_read),
                )
                .route("/notifications", web::delete().to(clear_notifications))
                .route("/notifications/{id}", web::delete().to(delete_notification))
                // Media boundary
                .route("/media/upload", web::post().to(upload_image))
                .route("/media/enhance", web::post().to(enhance_image)),
        );
}
