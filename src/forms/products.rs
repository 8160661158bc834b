use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::draft::ProductDraft;
use crate::domain::types::{CategoryId, ProductName, ProductPrice, TypeConstraintError};
use crate::services::uploads::UploadDescriptor;

/// Product fields as submitted by the form, before validation.
///
/// Serialized back into the template when a submission is rejected.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ProductForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(required, range(min = 0.0))]
    pub price: Option<f64>,
    pub category_id: Option<String>,
    /// Creation timestamp carried through a hidden input when editing.
    pub created_at: Option<String>,
}

impl From<&ProductDraft> for ProductForm {
    fn from(draft: &ProductDraft) -> Self {
        Self {
            name: draft.name.clone(),
            price: draft.price,
            category_id: draft.category_id.as_ref().map(ToString::to_string),
            created_at: draft
                .created_at
                .map(|ts| ts.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

/// Validated product fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFormPayload {
    pub name: ProductName,
    pub price: ProductPrice,
    pub category_id: Option<CategoryId>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Error)]
pub enum ProductFormError {
    #[error("Product form validation failed: {0}")]
    Validation(String),
    #[error("Product form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for ProductFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for ProductFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<ProductForm> for ProductFormPayload {
    type Error = ProductFormError;

    fn try_from(value: ProductForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let price = value
            .price
            .ok_or_else(|| ProductFormError::Validation("price: required".to_string()))?;
        let created_at = blank_to_none(value.created_at)
            .map(|raw| {
                raw.trim().parse::<NaiveDateTime>().map_err(|_| {
                    TypeConstraintError::InvalidValue(format!("created_at: {raw}"))
                })
            })
            .transpose()?;

        Ok(Self {
            name: ProductName::new(value.name)?,
            price: ProductPrice::new(price)?,
            category_id: blank_to_none(value.category_id)
                .map(CategoryId::new)
                .transpose()?,
            created_at,
        })
    }
}

/// Multipart body of the product form: the fields plus an optional picture.
#[derive(MultipartForm)]
pub struct ProductMultipartForm {
    pub name: Option<Text<String>>,
    pub price: Option<Text<String>>,
    pub category_id: Option<Text<String>>,
    pub created_at: Option<Text<String>>,
    #[multipart(limit = "10MB")]
    pub file: Option<TempFile>,
}

impl ProductMultipartForm {
    /// Splits the body into the form fields and the upload descriptor.
    ///
    /// An unparsable price is treated as missing so that it is reported by
    /// validation rather than rejected by the extractor.
    pub fn into_parts(self) -> (ProductForm, Option<UploadDescriptor<TempFile>>) {
        let form = ProductForm {
            name: self.name.map(Text::into_inner).unwrap_or_default(),
            price: self
                .price
                .and_then(|p| p.into_inner().trim().replace(',', ".").parse::<f64>().ok()),
            category_id: self.category_id.map(Text::into_inner),
            created_at: self.created_at.map(Text::into_inner),
        };
        let upload = self.file.map(|file| UploadDescriptor {
            original_name: file.file_name.clone().unwrap_or_default(),
            body: file,
        });
        (form, upload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, price: Option<f64>) -> ProductForm {
        ProductForm {
            name: name.to_string(),
            price,
            category_id: None,
            created_at: None,
        }
    }

    #[test]
    fn accepts_complete_form() {
        let mut input = form(" Apple watch ", Some(200.99));
        input.category_id = Some("cat-1".to_string());
        input.created_at = Some("2024-05-01T10:30:00".to_string());

        let payload: ProductFormPayload = input.try_into().unwrap();

        assert_eq!(payload.name, "Apple watch");
        assert_eq!(payload.price, 200.99);
        assert_eq!(payload.category_id.unwrap(), "cat-1");
        assert!(payload.created_at.is_some());
    }

    #[test]
    fn rejects_missing_name() {
        let payload: Result<ProductFormPayload, _> = form("", Some(1.0)).try_into();
        assert!(matches!(payload, Err(ProductFormError::Validation(_))));
    }

    #[test]
    fn rejects_missing_price() {
        let payload: Result<ProductFormPayload, _> = form("TV", None).try_into();
        assert!(payload.is_err());
    }

    #[test]
    fn rejects_negative_price() {
        let payload: Result<ProductFormPayload, _> = form("TV", Some(-3.0)).try_into();
        assert!(payload.is_err());
    }

    #[test]
    fn blank_category_means_no_category() {
        let mut input = form("TV", Some(3.0));
        input.category_id = Some("  ".to_string());

        let payload: ProductFormPayload = input.try_into().unwrap();
        assert!(payload.category_id.is_none());
    }

    #[test]
    fn draft_round_trips_through_form() {
        let draft = ProductDraft {
            name: "Sony Notebook".to_string(),
            price: Some(1.0),
            created_at: "2024-05-01T10:30:00".parse().ok(),
            ..Default::default()
        };

        let payload: ProductFormPayload = ProductForm::from(&draft).try_into().unwrap();

        assert_eq!(payload.created_at, draft.created_at);
    }

    #[test]
    fn rejects_malformed_timestamp() {
        let mut input = form("TV", Some(3.0));
        input.created_at = Some("yesterday".to_string());

        let payload: Result<ProductFormPayload, _> = input.try_into();
        assert!(matches!(payload, Err(ProductFormError::TypeConstraint(_))));
    }
}
