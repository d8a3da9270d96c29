mod config;
mod db;
mod errors;
mod notify;
mod routes;
mod state;
mod submission;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, UploadConfig};
use crate::db::create_pool;
use crate::notify::email::EmailSink;
use crate::notify::sheets::{SheetSink, SheetsClient};
use crate::notify::NotificationSink;
use crate::routes::build_router;
use crate::state::AppState;
use crate::submission::resume::ResumeStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Careers API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and apply migrations
    let db = create_pool(&config.database_url).await?;

    // Initialize the resume object store when uploads are enabled
    let resume_store = match &config.upload {
        Some(upload) => {
            let store = ResumeStore {
                s3: build_s3_client(upload).await,
                bucket: upload.s3_bucket.clone(),
                public_base: upload.public_base.clone(),
            };
            info!("Resume object store initialized (bucket: {})", store.bucket);
            Some(Arc::new(store))
        }
        None => None,
    };

    // Assemble the notification sinks this deployment runs with
    let mut sinks: Vec<Arc<dyn NotificationSink>> = Vec::new();
    if let Some(email) = &config.email {
        sinks.push(Arc::new(EmailSink::new(email)?));
        info!("Email sink enabled (relay: {})", email.smtp_host);
    }
    if let Some(sheets) = &config.sheets {
        let client = SheetsClient::new(sheets.access_token.clone())?;
        sinks.push(Arc::new(SheetSink::new(client, sheets)));
        info!("Sheets sink enabled (spreadsheet: {})", sheets.spreadsheet_id);
    }
    if sinks.is_empty() {
        info!("No notification sinks enabled; submissions will only be persisted");
    }

    // Build app state
    let state = AppState {
        db,
        resume_store,
        sinks: sinks.into(),
        config: config.clone(),
    };

    // Build router
    let cors = match &config.allowed_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .context("ALLOWED_ORIGIN must be a valid origin")?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    };
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(upload: &UploadConfig) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &upload.aws_access_key_id,
        &upload.aws_secret_access_key,
        None,
        None,
        "careers-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&upload.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
