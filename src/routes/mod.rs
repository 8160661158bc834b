use actix_session::Session;
use actix_web::HttpResponse;
use actix_web::web::{self, Bytes};
use actix_web_flash_messages::IncomingFlashMessages;
use pushkind_common::routes::alert_level_to_str;
use tera::{Context, Tera};

use crate::services::drafts::SessionKey;
use crate::services::{ServiceError, ServiceResult};

pub mod api;
pub mod categories;
pub mod products;

/// Session entry holding the key of the session's product draft.
const DRAFT_KEY: &str = "draft_key";

/// Registers every HTML and API route of the catalog.
///
/// Shared data (`DieselRepository`, `ServerConfig`, `Tera`, `DraftSessions`,
/// `UploadDirectory`) must be added to the app by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(products::index)
        .service(products::list_huge)
        .service(products::list_chunked)
        .service(products::list_paced)
        .service(products::create_form)
        .service(products::edit_form)
        .service(products::submit_form)
        .service(products::delete_product)
        .service(products::show_picture)
        .service(categories::add_category)
        .service(
            web::scope("/api")
                .service(api::api_products_stream)
                .service(api::api_products)
                .service(api::api_product)
                .service(api::api_categories),
        );
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    HttpResponse::Ok().body(tera.render(template, context).unwrap_or_else(|e| {
        log::error!("Failed to render template '{template}': {e}");
        String::new()
    }))
}

/// Renders a piece of a streamed page.
pub fn render_fragment(tera: &Tera, template: &str, context: &Context) -> ServiceResult<Bytes> {
    tera.render(template, context)
        .map(Bytes::from)
        .map_err(|e| {
            log::error!("Failed to render template '{template}': {e}");
            ServiceError::Internal
        })
}

pub fn base_context(flash_messages: &IncomingFlashMessages, current_page: &str) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_page", current_page);
    context
}

/// Returns the draft key stored in the session cookie, creating one on first use.
pub fn session_key(session: &Session) -> Result<SessionKey, actix_web::Error> {
    if let Some(key) = session.get::<String>(DRAFT_KEY)? {
        return Ok(SessionKey::new(key));
    }
    let key = SessionKey::generate();
    session.insert(DRAFT_KEY, key.as_str())?;
    Ok(key)
}
