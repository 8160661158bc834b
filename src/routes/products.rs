use std::num::NonZeroUsize;
use std::sync::Arc;

use actix_files::NamedFile;
use actix_multipart::form::MultipartForm;
use actix_session::Session;
use actix_web::http::header::{ContentDisposition, ContentType, DispositionParam, DispositionType};
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use futures::future;
use futures::stream::{self, StreamExt};
use pushkind_common::routes::redirect;
use tera::{Context, Tera};

use crate::domain::draft::ProductDraft;
use crate::dto::categories::CategoryDto;
use crate::dto::products::ProductDto;
use crate::forms::listing::DeliveryParams;
use crate::forms::products::{ProductForm, ProductMultipartForm};
use crate::models::config::ServerConfig;
use crate::pipeline::DeliveryMode;
use crate::repository::DieselRepository;
use crate::routes::{base_context, render_fragment, render_template, session_key};
use crate::services::ServiceError;
use crate::services::categories::show_categories as show_categories_service;
use crate::services::drafts::{
    DraftSessions, show_create_form, show_edit_form, submit_draft,
};
use crate::services::listing::{collect_products, stream_products};
use crate::services::products::delete_product as delete_product_service;
use crate::services::uploads::{UploadDirectory, commit_draft, resolve_picture};

const LIST_TITLE: &str = "Product List";

fn render_listing(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    current_page: &str,
    products: Vec<ProductDto>,
) -> HttpResponse {
    let mut context = base_context(flash_messages, current_page);
    context.insert("title", LIST_TITLE);
    context.insert("products", &products);
    render_template(tera, "products/index.html", &context)
}

/// Streams a listing page: the head, one rows fragment per delivered batch,
/// then the tail. Dropping the response body cancels the pipeline.
fn stream_listing(
    tera: web::Data<Tera>,
    context: Context,
    repo: Arc<DieselRepository>,
    mode: DeliveryMode,
    chunk_size: NonZeroUsize,
) -> HttpResponse {
    let (head, tail) = match (
        render_fragment(&tera, "products/stream_head.html", &context),
        render_fragment(&tera, "products/stream_tail.html", &context),
    ) {
        (Ok(head), Ok(tail)) => (head, tail),
        _ => return HttpResponse::InternalServerError().finish(),
    };

    let rows = stream_products(repo, mode, chunk_size).map(move |batch| {
        let products: Vec<ProductDto> = batch?.into_iter().map(ProductDto::from).collect();
        let mut context = Context::new();
        context.insert("products", &products);
        render_fragment(&tera, "products/rows.html", &context)
    });

    let body = stream::once(future::ready(Ok::<_, ServiceError>(head)))
        .chain(rows)
        .chain(stream::once(future::ready(Ok(tail))));

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .streaming(body)
}

#[get("/")]
pub async fn index(
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match collect_products(repo.into_inner(), DeliveryMode::Immediate).await {
        Ok(products) => render_listing(
            &tera,
            &flash_messages,
            "index",
            products.into_iter().map(ProductDto::from).collect(),
        ),
        Err(err) => {
            log::error!("Failed to render product list: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// The listing replayed `replicate_count` times, rendered as one page.
#[get("/list-huge")]
pub async fn list_huge(
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mode = DeliveryMode::Replicated {
        count: server_config.replicate_count,
    };
    match collect_products(repo.into_inner(), mode).await {
        Ok(products) => render_listing(
            &tera,
            &flash_messages,
            "list-huge",
            products.into_iter().map(ProductDto::from).collect(),
        ),
        Err(err) => {
            log::error!("Failed to render replicated product list: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// The replicated listing flushed in `chunk_size` pieces as it is produced.
#[get("/list-chunked")]
pub async fn list_chunked(
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mode = DeliveryMode::Replicated {
        count: server_config.replicate_count,
    };
    let mut context = base_context(&flash_messages, "list-chunked");
    context.insert("title", LIST_TITLE);
    stream_listing(
        tera,
        context,
        repo.into_inner(),
        mode,
        server_config.chunk_size(),
    )
}

/// Paced listing; `mode`, `count`, `batch` and `delay_ms` override the
/// configured pacing.
#[get("/list")]
pub async fn list_paced(
    params: web::Query<DeliveryParams>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let defaults = server_config.delivery_defaults();
    let fallback = DeliveryMode::Paced {
        batch_size: defaults.batch_size,
        delay: defaults.delay,
    };
    let mode = match params.into_inner().into_mode(fallback, &defaults) {
        Ok(mode) => mode,
        Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
    };

    let mut context = base_context(&flash_messages, "list");
    context.insert("title", LIST_TITLE);
    stream_listing(
        tera,
        context,
        repo.into_inner(),
        mode,
        server_config.chunk_size(),
    )
}

/// What the product form page shows besides the categories.
struct FormPage<'a> {
    title: &'a str,
    button_text: &'a str,
    form: &'a ProductForm,
    draft: Option<&'a ProductDraft>,
    errors: Option<&'a str>,
}

fn render_form(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    repo: &DieselRepository,
    page: FormPage<'_>,
) -> HttpResponse {
    let categories: Vec<CategoryDto> = match show_categories_service(repo) {
        Ok(categories) => categories.into_iter().map(CategoryDto::from).collect(),
        Err(err) => {
            log::error!("Failed to load categories for product form: {err}");
            vec![]
        }
    };

    let mut context = base_context(flash_messages, "product-form");
    context.insert("title", page.title);
    context.insert("button_text", page.button_text);
    context.insert("product", page.form);
    context.insert("draft", &page.draft);
    context.insert("categories", &categories);
    context.insert("errors", &page.errors);
    render_template(tera, "products/form.html", &context)
}

#[get("/product-form")]
pub async fn create_form(
    session: Session,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    drafts: web::Data<DraftSessions>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let key = match session_key(&session) {
        Ok(key) => key,
        Err(err) => {
            log::error!("Failed to read session: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let draft = show_create_form(&key, drafts.get_ref());
    render_form(
        &tera,
        &flash_messages,
        repo.get_ref(),
        FormPage {
            title: "Product Form",
            button_text: "Create",
            form: &ProductForm::from(&draft),
            draft: Some(&draft),
            errors: None,
        },
    )
}

#[get("/product-form/{product_id}")]
pub async fn edit_form(
    product_id: web::Path<String>,
    session: Session,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    drafts: web::Data<DraftSessions>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let key = match session_key(&session) {
        Ok(key) => key,
        Err(err) => {
            log::error!("Failed to read session: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    match show_edit_form(&key, &product_id, drafts.get_ref(), repo.get_ref()) {
        Ok(draft) => render_form(
            &tera,
            &flash_messages,
            repo.get_ref(),
            FormPage {
                title: "Product Edit",
                button_text: "Edit",
                form: &ProductForm::from(&draft),
                draft: Some(&draft),
                errors: None,
            },
        ),
        Err(err) => {
            log::error!("Failed to open product form: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/product-form")]
pub async fn submit_form(
    session: Session,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    drafts: web::Data<DraftSessions>,
    uploads: web::Data<UploadDirectory>,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<ProductMultipartForm>,
) -> impl Responder {
    let key = match session_key(&session) {
        Ok(key) => key,
        Err(err) => {
            log::error!("Failed to read session: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let (fields, upload) = form.into_parts();
    let validated = match submit_draft(&key, fields.clone(), drafts.get_ref()) {
        Ok(validated) => validated,
        Err(ServiceError::Validation(message)) => {
            let draft = drafts.draft(&key);
            return render_form(
                &tera,
                &flash_messages,
                repo.get_ref(),
                FormPage {
                    title: "Product Edit",
                    button_text: "Save",
                    form: &fields,
                    draft: draft.as_ref(),
                    errors: Some(&message),
                },
            );
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("The form has expired, please fill it in again.").send();
            return redirect("/product-form");
        }
        Err(err) => {
            log::error!("Failed to submit product form: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    match commit_draft(validated, upload, repo.get_ref(), uploads.get_ref()).await {
        Ok(product) => {
            FlashMessage::success(format!("Product {} saved.", product.name)).send();
            redirect("/")
        }
        Err(ServiceError::CategoryUnresolved(category_id)) => {
            FlashMessage::error(format!("Category {category_id} does not exist.")).send();
            redirect("/product-form")
        }
        Err(ServiceError::Validation(message)) => {
            FlashMessage::error(message).send();
            redirect("/product-form")
        }
        Err(ServiceError::Persistence) => {
            FlashMessage::error("Failed to save the product.").send();
            redirect("/")
        }
        Err(ServiceError::UploadTransfer { product_id, .. }) => {
            FlashMessage::warning(format!(
                "Product {product_id} saved, but its picture could not be stored."
            ))
            .send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to commit product form: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/delete/{product_id}")]
pub async fn delete_product(
    product_id: web::Path<String>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match delete_product_service(&product_id, repo.get_ref()) {
        Ok(product) => FlashMessage::success(format!("Product {} deleted.", product.name)).send(),
        Err(ServiceError::NotFound) => FlashMessage::error("Product does not exist.").send(),
        Err(ServiceError::Persistence) => FlashMessage::error("Failed to delete the product.").send(),
        Err(err) => {
            log::error!("Failed to delete product: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    redirect("/")
}

/// Serves a stored picture as a download.
#[get("/uploads/img/{picture}")]
pub async fn show_picture(
    picture: web::Path<String>,
    uploads: web::Data<UploadDirectory>,
) -> actix_web::Result<NamedFile> {
    let picture = picture.into_inner();
    let path = resolve_picture(&picture, uploads.get_ref())
        .map_err(|_| actix_web::error::ErrorNotFound("picture not found"))?;

    let file = NamedFile::open_async(path).await?;
    Ok(file.set_content_disposition(ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(picture)],
    }))
}
