use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::env;
use std::sync::Arc;

use artfolio::api::{self, AppState};
use artfolio::auth::AuthService;
use artfolio::media::MediaClient;
use artfolio::store::Store;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Load environment variables
    dotenvy::dotenv().ok();

    // Get configuration from environment
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a number");

    let db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "artfolio.db".to_string());

    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
        log::warn!("JWT_SECRET not set, using default (not secure for production!)");
        "default_jwt_secret_change_me".to_string()
    });

    // Initialize store
    let store = Arc::new(Store::new(&db_path).expect("Failed to initialize database"));

    // Initialize the session boundary
    let auth_service = Arc::new(AuthService::new(jwt_secret));

    // External media collaborators (object store, enhancement service)
    if env::var("OBJECT_STORE_URL").is_err() {
        log::warn!("OBJECT_STORE_URL not set, image uploads will be embedded inline");
    }

    let server = HttpServer::new({
        let store = store.clone();
        let auth_service = auth_service.clone();
        move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(middleware::Logger::default())
                .wrap(cors)
                // Register AuthService individually for the auth middleware
                .app_data(web::Data::from(auth_service.clone()))
                .app_data(web::Data::new(AppState::new(
                    store.clone(),
                    auth_service.clone(),
                    MediaClient::from_env(),
                )))
                // Payload size limit for inline image uploads (25MB)
                .app_data(web::PayloadConfig::new(25 * 1024 * 1024))
                .configure(api::configure_routes)
        }
    });

    log::info!("Starting artfolio server on port {}", port);

    server.bind(("0.0.0.0", port))?.run().await
}
