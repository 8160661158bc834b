use std::io;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::Key;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use actix_web_flash_messages::FlashMessagesFramework;
use actix_web_flash_messages::storage::CookieMessageStore;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use env_logger::Env;
use pushkind_common::db::establish_connection_pool;
use tera::Tera;

use catalog_flux::models::config::ServerConfig;
use catalog_flux::repository::DieselRepository;
use catalog_flux::routes;
use catalog_flux::services::drafts::DraftSessions;
use catalog_flux::services::uploads::UploadDirectory;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let server_config = ServerConfig::load().map_err(|e| {
        log::error!("Failed to load configuration: {e}");
        io::Error::other(e)
    })?;

    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        log::error!("Failed to establish database connection: {e:?}");
        io::Error::other(format!("{e:?}"))
    })?;
    {
        let mut conn = pool.get().map_err(io::Error::other)?;
        let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            log::error!("Failed to run migrations: {e}");
            io::Error::other(e.to_string())
        })?;
        if !applied.is_empty() {
            log::info!("Applied {} migration(s)", applied.len());
        }
    }

    let uploads = UploadDirectory::new(&server_config.upload_path);
    uploads.ensure_exists()?;

    let tera = Tera::new(&server_config.templates_dir).map_err(|e| {
        log::error!("Failed to load templates: {e}");
        io::Error::other(e)
    })?;

    let secret_key = Key::try_from(server_config.secret.as_bytes()).unwrap_or_else(|e| {
        log::warn!("Invalid cookie secret ({e}), sessions will not survive a restart");
        Key::generate()
    });
    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let repo = web::Data::new(DieselRepository::new(pool));
    let drafts = web::Data::new(DraftSessions::with_idle_timeout(
        server_config.draft_idle_timeout(),
    ));
    let uploads = web::Data::new(uploads);
    let tera = web::Data::new(tera);
    let bind_address = (server_config.address.clone(), server_config.port);
    let server_config = web::Data::new(server_config);

    log::info!("Starting server on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                secret_key.clone(),
            ))
            .wrap(Logger::default())
            .app_data(repo.clone())
            .app_data(drafts.clone())
            .app_data(uploads.clone())
            .app_data(tera.clone())
            .app_data(server_config.clone())
            .configure(routes::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
