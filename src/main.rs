use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::{info, warn};
use sqlx::postgres::PgPoolOptions;

use tasknest::auth::{AuthMiddleware, Authenticator};
use tasknest::config::Config;
use tasknest::routes::{self, health};
use tasknest::services::TaskService;
use tasknest::store::{CredentialStore, MemoryStore, PgStore, ResourceStore};

type Stores = (Arc<dyn CredentialStore>, Arc<dyn ResourceStore>);

async fn open_stores(config: &Config) -> io::Result<Stores> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
        let store = Arc::new(MemoryStore::new());
        let credentials: Arc<dyn CredentialStore> = store.clone();
        let resources: Arc<dyn ResourceStore> = store;
        return Ok((credentials, resources));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("database connection failed: {}", e)))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("migration failed: {}", e)))?;
    info!("database migrations applied");

    let store = Arc::new(PgStore::new(pool));
    let credentials: Arc<dyn CredentialStore> = store.clone();
    let resources: Arc<dyn ResourceStore> = store;
    Ok((credentials, resources))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let (credentials, resources) = open_stores(&config).await?;

    let authenticator = web::Data::new(Authenticator::new(credentials, &config.auth));
    let task_service = web::Data::new(TaskService::new(resources));

    info!("Starting TaskNest server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(authenticator.clone())
            .app_data(task_service.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
