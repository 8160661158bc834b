use actix_web::{HttpResponse, Responder, post, web};
use actix_web_flash_messages::FlashMessage;
use pushkind_common::routes::redirect;

use crate::forms::categories::{AddCategoryForm, AddCategoryFormPayload};
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::categories::add_category as add_category_service;

#[post("/categories")]
pub async fn add_category(
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddCategoryForm>,
) -> impl Responder {
    let payload: AddCategoryFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect("/product-form");
        }
    };

    match add_category_service(payload, repo.get_ref()) {
        Ok(category) => FlashMessage::success(format!("Category {} added.", category.name)).send(),
        Err(ServiceError::Persistence) => {
            FlashMessage::error("Failed to add the category.").send()
        }
        Err(err) => {
            log::error!("Failed to add category: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    redirect("/product-form")
}
