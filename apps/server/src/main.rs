//! FinSight server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use finsight_lib::api::{self, ApiDoc, UploadLimit};
use finsight_lib::config::Config;
use finsight_lib::db::{DbPool, DocumentStore};
use finsight_lib::middleware::RequestLogger;
use finsight_lib::services::{
    self, DocumentExtractor, DocumentService, LlmExtractor, Notifier, ObjectStore, Storage,
    WebhookNotifier,
};

fn cors(is_development: bool) -> Cors {
    let allowed_headers = vec![
        header::AUTHORIZATION,
        header::ACCEPT,
        header::CONTENT_TYPE,
        header::HeaderName::from_static("x-api-key"),
    ];

    if is_development {
        Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
            .allowed_headers(allowed_headers)
            .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
            .max_age(3600)
    } else {
        // Same-origin only
        Cors::default()
            .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
            .allowed_headers(allowed_headers)
            .max_age(3600)
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL, S3 credentials and LLM_API_KEY must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  FinSight Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations complete");

    let storage = match Storage::new(&config.storage).await {
        Ok(storage) => storage,
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            std::process::exit(1);
        }
    };

    let extractor = match LlmExtractor::new(&config.llm) {
        Ok(extractor) => extractor,
        Err(e) => {
            error!("Failed to initialize LLM client: {}", e);
            std::process::exit(1);
        }
    };
    if config.llm.api_key.is_none() {
        warn!("LLM_API_KEY is not set; analysis requests will fail");
    }

    let notifier = match WebhookNotifier::new(&config.notification) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!("Failed to initialize notifier: {}", e);
            std::process::exit(1);
        }
    };
    if config.notification.webhook_url.is_none() {
        info!("Owner notifications disabled (no webhook configured)");
    }

    let store: Arc<dyn DocumentStore> = Arc::new(pool.clone());
    let storage: Arc<dyn ObjectStore> = Arc::new(storage);
    let extractor: Arc<dyn DocumentExtractor> = Arc::new(extractor);
    let notifier: Arc<dyn Notifier> = Arc::new(notifier);

    let document_service = web::Data::new(DocumentService::new(
        Arc::clone(&store),
        storage,
        extractor,
        notifier,
        Duration::from_secs(config.storage.presign_ttl_secs),
    ));

    services::start_reconcile_task(store, config.reconcile.clone());

    let bind_address = config.bind_address();
    let max_upload_size = config.max_upload_size;
    let is_development = config.is_development();
    let pool_data = web::Data::new(pool);
    let upload_limit = web::Data::new(UploadLimit(max_upload_size));

    info!("Upload limit: {}MB", max_upload_size / 1024 / 1024);

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

    let server = HttpServer::new(move || {
        App::new()
            // CORS must wrap before other middleware
            .wrap(cors(is_development))
            .wrap(RequestLogger)
            .app_data(pool_data.clone())
            .app_data(document_service.clone())
            .app_data(upload_limit.clone())
            // Multipart framing adds overhead; the document size is enforced while streaming
            .app_data(web::PayloadConfig::new(max_upload_size * 2))
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_document_routes)
                    .configure(api::configure_platform_routes),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
