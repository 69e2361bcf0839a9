use std::{net::SocketAddr, time::Duration};

use axum::{
    body::Body,
    http::{Request, Response},
    routing::get,
    Json, Router,
};
use surrealdb::{
    engine::any::{self, Any},
    opt::auth::Root,
    Surreal,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Span;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    routes::{
        playlist_routes::PlaylistRoutes, song_routes::SongRoutes, stream_routes::StreamRoutes,
        upload_routes::UploadRoutes, youtube_routes::YouTubeRoutes,
    },
    services::{file_service::FileService, youtube_service::YouTubeService},
};

pub use self::error::{Error, Result};

mod config;
mod error;
mod helpers;
mod models;
mod routes;
mod services;

#[derive(Clone)]
struct AppState {
    db: Surreal<Any>,
    files: FileService,
    youtube: YouTubeService,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    tracing::info!("Starting Music Library API...");

    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to database at: {}", config.db_url);

    let db = any::connect(&config.db_url).await?;
    db.use_ns(&config.db_ns).use_db(&config.db_name).await?;

    if let (Some(user), Some(password)) = (&config.db_user, &config.db_password) {
        db.signin(Root {
            username: user,
            password,
        })
        .await?;
    }

    tracing::info!("Database connected successfully!");

    let files = FileService::init(&config.storage_dir)?;
    tracing::info!("Blob storage ready at: {}", config.storage_dir);

    let app_state = AppState {
        db,
        files,
        youtube: YouTubeService::new(config.youtube_api_key.clone()),
    };

    let routes_api = Router::new()
        .nest("/youtube", YouTubeRoutes::routes())
        .nest("/songs", SongRoutes::routes())
        .nest("/upload", UploadRoutes::routes())
        .nest("/stream", StreamRoutes::routes())
        .nest("/playlists", PlaylistRoutes::routes());

    let routes_all = Router::new()
        .nest("/api", routes_api)
        .route("/health", get(health_handler))
        .with_state(app_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4();
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    tracing::info!(
                        "{} {}",
                        request.method(),
                        request.uri().path()
                    );
                })
                .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
                    let status = response.status();
                    let latency_ms = latency.as_millis();

                    match status.as_u16() {
                        200..=299 => tracing::info!("{} ({}ms)", status, latency_ms),
                        400..=499 => tracing::warn!("⚠️ {} ({}ms)", status, latency_ms),
                        500..=599 => tracing::error!("❌ {} ({}ms)", status, latency_ms),
                        _ => tracing::info!("{} ({}ms)", status, latency_ms),
                    }
                })
        )
        .layer(CorsLayer::very_permissive());

    let addr: SocketAddr = format!("{}:{}", config.bind_host, config.port)
        .parse()
        .expect("Invalid bind address");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(
        listener,
        routes_all.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp()
    }))
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            "music_library_api=debug,tower_http=info,info".into()
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .compact()
        )
        .init();
}
