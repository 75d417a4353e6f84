//! Ficha server entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::path::PathBuf;

use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{App, HttpRequest, HttpServer, Result as ActixResult, http::header, web};
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ficha_server::api::{self, ApiDoc};
use ficha_server::auth::AdminKey;
use ficha_server::config::{ACCESS_TOKEN_HEADER, ADMIN_KEY_HEADER, Config};
use ficha_server::middleware::RequestLogger;
use ficha_server::migration::Migrator;
use ficha_server::services::notify;
use ficha_server::db;
use ficha_server::services::storage::Storage;

/// SPA fallback handler - serves index.html for client-side routing.
async fn spa_fallback(req: HttpRequest) -> ActixResult<NamedFile> {
    let static_dir: &PathBuf = req
        .app_data::<web::Data<PathBuf>>()
        .expect("Static dir not configured")
        .get_ref();
    Ok(NamedFile::open(static_dir.join("index.html"))?)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL and S3 credentials must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Ficha Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development defaults for DATABASE_URL, admin key and S3");
    }

    // Connect to PostgreSQL and run migrations
    let db = match db::connect(&config).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations complete");

    // Attachment store (S3/MinIO)
    let storage = match Storage::new(&config.s3).await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to initialize attachment store: {}", e);
            std::process::exit(1);
        }
    };
    info!("Attachment store ready (bucket '{}')", config.s3.bucket);

    // Review-result notifier (webhook or log-only)
    let notifier = web::Data::new(notify::from_config(&config));
    match config.notify_webhook_url {
        Some(ref url) => info!("Review notifications via webhook {}", url),
        None => info!("Review notifications log-only (FICHA_NOTIFY_WEBHOOK unset)"),
    }

    if config.admin_key.is_none() {
        warn!("FICHA_ADMIN_KEY unset; account registration is disabled");
    }

    // Prepare shared state
    let bind_address = config.bind_address();
    let admin_key = AdminKey::new(config.admin_key.clone());
    let max_upload_size = config.max_upload_size;
    let static_dir = config.static_dir.clone();
    let is_development = config.is_development();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    // Start HTTP server
    let server = HttpServer::new(move || {
        // Configure CORS
        let cors = if is_development {
            // Permissive CORS for development
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::CONTENT_TYPE,
                    ACCESS_TOKEN_HEADER.parse().unwrap(),
                    ADMIN_KEY_HEADER.parse().unwrap(),
                ])
                .max_age(3600)
        } else {
            // Restrictive CORS for production (same-origin only)
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::CONTENT_TYPE,
                    ACCESS_TOKEN_HEADER.parse().unwrap(),
                    ADMIN_KEY_HEADER.parse().unwrap(),
                ])
                .max_age(3600)
        };

        let mut app = App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(cors)
            // Add request logging middleware
            .wrap(RequestLogger)
            // Add shared state
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(admin_key.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(max_upload_size))
            .app_data(notifier.clone())
            // Allow slack over the document cap at the HTTP layer - the
            // per-file limit is enforced while reading the multipart stream
            .app_data(web::PayloadConfig::new(max_upload_size * 2))
            // Configure API routes
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_user_routes)
                    .configure(api::configure_ficha_routes)
                    .configure(api::configure_document_routes)
                    .configure(api::configure_review_routes)
                    .configure(api::configure_ticket_routes),
            )
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            );

        // Serve static dashboard assets in production (when FICHA_STATIC_DIR is set)
        if let Some(ref dir) = static_dir {
            app = app
                .app_data(web::Data::new(dir.clone()))
                // Serve static assets (js, css, images)
                .service(Files::new("/assets", dir.join("assets")).prefer_utf8(true))
                // SPA fallback - serve index.html for all other routes
                .default_service(web::route().to(spa_fallback));
        }

        app
    });

    // Set worker count
    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
