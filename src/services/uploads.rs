//! Committing validated drafts together with their optional picture upload.
//!
//! The commit runs strictly in order: resolve the category, name the picture,
//! stamp the creation time, persist, then transfer the bytes. The picture name
//! is stored before the bytes are written, so a failed transfer leaves a
//! persisted product pointing at a missing file. There is no rollback.

use std::io;
use std::path::{Path, PathBuf};

use actix_multipart::form::tempfile::TempFile;
use chrono::Utc;

use crate::domain::draft::ValidatedDraft;
use crate::domain::product::{CategoryRef, NewProduct, Product};
use crate::domain::types::{PictureName, TypeConstraintError};
use crate::repository::{CategoryReader, ProductWriter};

use super::{ServiceError, ServiceResult};

/// An uploaded file as received with a submission: its original name and a
/// body that has not been written anywhere yet.
pub struct UploadDescriptor<B> {
    pub original_name: String,
    pub body: B,
}

impl<B> UploadDescriptor<B> {
    /// Whether the upload carries a file at all. Browsers submit an empty
    /// name when the file input was left blank.
    pub fn is_present(&self) -> bool {
        !self.original_name.is_empty()
    }
}

/// Byte content of an upload that can be written to its final location.
pub trait UploadBody: Send + 'static {
    fn transfer_to(self, destination: &Path) -> io::Result<()>;
}

impl UploadBody for TempFile {
    fn transfer_to(self, destination: &Path) -> io::Result<()> {
        std::fs::copy(self.file.path(), destination).map(|_| ())
    }
}

impl UploadBody for Vec<u8> {
    fn transfer_to(self, destination: &Path) -> io::Result<()> {
        std::fs::write(destination, self)
    }
}

/// Directory receiving uploaded pictures.
#[derive(Debug, Clone)]
pub struct UploadDirectory {
    root: PathBuf,
}

impl UploadDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the directory if it does not exist yet.
    pub fn ensure_exists(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// Location of `picture` inside the directory.
    pub fn path_for(&self, picture: &PictureName) -> PathBuf {
        self.root.join(picture.as_str())
    }
}

/// Strips the characters that are never kept in stored picture names.
pub fn sanitize_file_name(original: &str) -> String {
    original
        .chars()
        .filter(|c| !matches!(*c, ' ' | ':' | '\\' | '/'))
        .collect()
}

/// Builds a picture name unique to this upload: a fresh v4 uuid joined with
/// the sanitized original name.
pub fn generate_picture_name(original: &str) -> Result<PictureName, TypeConstraintError> {
    PictureName::new(format!(
        "{}-{}",
        uuid::Uuid::new_v4(),
        sanitize_file_name(original)
    ))
}

/// Persists `draft` and then stores its picture, if one was uploaded.
///
/// Errors:
/// * `CategoryUnresolved` when the referenced category does not exist;
///   nothing is persisted.
/// * `Persistence` when the store rejects the write; nothing is transferred.
/// * `UploadTransfer` when the bytes could not be written; the product stays
///   persisted with the generated picture name.
pub async fn commit_draft<R, B>(
    draft: ValidatedDraft,
    upload: Option<UploadDescriptor<B>>,
    repo: &R,
    uploads: &UploadDirectory,
) -> ServiceResult<Product>
where
    R: CategoryReader + ProductWriter,
    B: UploadBody,
{
    let category = match &draft.category_id {
        Some(category_id) => match repo.get_category_by_id(category_id) {
            Ok(Some(category)) => Some(CategoryRef::from(category)),
            Ok(None) => {
                log::warn!("Category {category_id} not found, product not saved");
                return Err(ServiceError::CategoryUnresolved(category_id.to_string()));
            }
            Err(e) => {
                log::error!("Failed to get category {category_id}: {e}");
                return Err(ServiceError::Internal);
            }
        },
        None => None,
    };

    let upload = upload.filter(UploadDescriptor::is_present);
    let picture = match &upload {
        Some(upload) => Some(generate_picture_name(&upload.original_name)?),
        None => draft.picture,
    };

    let product = NewProduct {
        id: draft.id,
        name: draft.name,
        price: draft.price,
        created_at: draft.created_at.unwrap_or_else(|| Utc::now().naive_utc()),
        category,
        picture,
    };

    let saved = match repo.save_product(&product) {
        Ok(saved) => saved,
        Err(e) => {
            log::error!("Failed to save product: {e}");
            return Err(ServiceError::Persistence);
        }
    };
    log::info!("Saved product {} ({})", saved.id, saved.name);

    if let (Some(upload), Some(picture)) = (upload, saved.picture.as_ref()) {
        let destination = uploads.path_for(picture);
        let transferred =
            tokio::task::spawn_blocking(move || upload.body.transfer_to(&destination)).await;

        let failure = match transferred {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(e) => Some(e.to_string()),
        };
        if let Some(reason) = failure {
            log::error!("Failed to store picture {picture} for product {}: {reason}", saved.id);
            return Err(ServiceError::UploadTransfer {
                product_id: saved.id.to_string(),
                picture: picture.to_string(),
            });
        }
    }

    Ok(saved)
}

/// Resolves a stored picture name to an existing file in the upload directory.
///
/// Names that are not plain file names and files that do not exist are both
/// `NotFound`.
pub fn resolve_picture(name: &str, uploads: &UploadDirectory) -> ServiceResult<PathBuf> {
    let picture = PictureName::new(name).map_err(|_| ServiceError::NotFound)?;
    let path = uploads.path_for(&picture);
    if path.is_file() {
        Ok(path)
    } else {
        Err(ServiceError::NotFound)
    }
}
