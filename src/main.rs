mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{
    dev::{fn_service, ServiceRequest, ServiceResponse},
    middleware::{Compress, Logger},
    web, App, HttpServer,
};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AppConfig, UPLOAD_URL_PREFIX};
use crate::database::{MongoUserRepository, UserRepository};
use crate::services::ProfileStorage;

fn build_cors(origins: &[String]) -> Cors {
    let cors = if origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::ACCEPT,
            actix_web::http::header::CACHE_CONTROL,
        ])
        .expose_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::CONTENT_DISPOSITION,
        ])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();

    log::info!("🚀 Starting User Management Service...");
    log::info!("📊 Database: {}", config.mongo_uri);

    let db = database::MongoDB::new(&config.mongo_uri)
        .await
        .expect("Failed to connect to MongoDB");

    log::info!("✅ MongoDB connected successfully");

    let repo: Arc<dyn UserRepository> = Arc::new(MongoUserRepository::new(db));
    let repo_data = web::Data::from(repo);

    std::fs::create_dir_all(&config.upload_dir)?;
    let storage = ProfileStorage::new(config.upload_dir.clone(), UPLOAD_URL_PREFIX);
    let storage_data = web::Data::new(storage.clone());
    log::info!("🖼️  Profile uploads: {} -> {}", storage.url_prefix(), storage.dir().display());

    let bind_addr = (config.host.clone(), config.port);
    let config_data = web::Data::new(config.clone());

    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);
    if let Some(dir) = &config.frontend_dir {
        log::info!("🖥️  Serving client bundle from {}", dir.display());
    }

    HttpServer::new(move || {
        let openapi = api::swagger::ApiDoc::openapi();

        let mut app = App::new()
            .app_data(repo_data.clone())
            .app_data(storage_data.clone())
            .app_data(config_data.clone())
            .wrap(build_cors(&config_data.cors_origins))
            .wrap(middleware::RequestMetrics)
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Metrics
            .route("/metrics", web::get().to(api::metrics::get_metrics))
            // Users: served directly and under the client's /api prefix
            .service(web::scope("/users").configure(api::users::configure))
            .service(web::scope("/api/users").configure(api::users::configure))
            // Uploaded profile images
            .service(Files::new(storage.url_prefix(), storage.dir()));

        // Client bundle last: unknown paths fall back to index.html for client-side routes
        if let Some(dir) = &config_data.frontend_dir {
            let index = dir.join("index.html");
            app = app.service(
                Files::new("/", dir)
                    .index_file("index.html")
                    .default_handler(fn_service(move |req: ServiceRequest| {
                        let index = index.clone();
                        async move {
                            let (req, _) = req.into_parts();
                            let file = NamedFile::open_async(index).await?;
                            let res = file.into_response(&req);
                            Ok::<_, actix_web::Error>(ServiceResponse::new(req, res))
                        }
                    })),
            );
        }

        app
    })
    .bind(bind_addr)?
    .run()
    .await
}
