//! Session-scoped product drafts for the create/edit form.
//!
//! A draft is held between showing the form and submitting it. Each session
//! holds at most one draft; showing the form again overwrites it. A submission
//! that passes validation releases the draft before anything is persisted, so
//! a later commit failure never brings it back. Drafts left idle longer than
//! the idle timeout are dropped, the same way they would expire with the
//! session.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::draft::{ProductDraft, ValidatedDraft};
use crate::domain::types::ProductId;
use crate::forms::products::{ProductForm, ProductFormPayload};
use crate::repository::ProductReader;

use super::{ServiceError, ServiceResult};

/// Identity of the session a draft belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Creates a key for a session that has none yet.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where a session stands in the form workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    Empty,
    EditingNew,
    EditingExisting,
}

/// Default time a draft may sit untouched before it is dropped.
pub const DEFAULT_DRAFT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct HeldDraft {
    draft: ProductDraft,
    touched: Instant,
}

/// Drafts keyed by session.
///
/// The lock is only held for map operations and never across an await.
#[derive(Debug)]
pub struct DraftSessions {
    drafts: Mutex<HashMap<SessionKey, HeldDraft>>,
    idle_timeout: Duration,
}

impl Default for DraftSessions {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_DRAFT_IDLE_TIMEOUT)
    }
}

impl DraftSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            drafts: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionKey, HeldDraft>> {
        self.drafts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self, key: &SessionKey) -> DraftState {
        match self.lock().get(key) {
            None => DraftState::Empty,
            Some(held) if held.draft.is_new() => DraftState::EditingNew,
            Some(_) => DraftState::EditingExisting,
        }
    }

    /// Returns a copy of the draft held for `key`.
    pub fn draft(&self, key: &SessionKey) -> Option<ProductDraft> {
        self.lock().get(key).map(|held| held.draft.clone())
    }

    /// Number of sessions currently holding a draft.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every draft untouched for longer than the idle timeout and
    /// returns how many were dropped.
    pub fn evict_idle(&self) -> usize {
        let mut drafts = self.lock();
        let before = drafts.len();
        evict_idle_locked(&mut drafts, self.idle_timeout);
        before - drafts.len()
    }

    fn hold(&self, key: &SessionKey, draft: ProductDraft) {
        let mut drafts = self.lock();
        evict_idle_locked(&mut drafts, self.idle_timeout);
        drafts.insert(
            key.clone(),
            HeldDraft {
                draft,
                touched: Instant::now(),
            },
        );
    }
}

fn evict_idle_locked(drafts: &mut HashMap<SessionKey, HeldDraft>, idle_timeout: Duration) {
    let now = Instant::now();
    let before = drafts.len();
    drafts.retain(|_, held| now.duration_since(held.touched) <= idle_timeout);
    let evicted = before - drafts.len();
    if evicted > 0 {
        log::debug!("Dropped {evicted} idle product draft(s)");
    }
}

/// Starts a new empty draft for the session, replacing any held one.
pub fn show_create_form(key: &SessionKey, sessions: &DraftSessions) -> ProductDraft {
    let draft = ProductDraft::default();
    sessions.hold(key, draft.clone());
    draft
}

/// Starts a draft hydrated from the stored product `id`.
///
/// An unknown id silently falls back to a new empty draft. Store failures
/// leave the session untouched.
pub fn show_edit_form<R>(
    key: &SessionKey,
    id: &str,
    sessions: &DraftSessions,
    repo: &R,
) -> ServiceResult<ProductDraft>
where
    R: ProductReader,
{
    let product = match ProductId::new(id) {
        Ok(product_id) => match repo.get_product_by_id(&product_id) {
            Ok(product) => product,
            Err(e) => {
                log::error!("Failed to get product {product_id}: {e}");
                return Err(ServiceError::Internal);
            }
        },
        Err(_) => None,
    };

    let draft = match product {
        Some(product) => ProductDraft::from(product),
        None => {
            log::warn!("Product {id:?} not found, editing a new draft instead");
            ProductDraft::default()
        }
    };

    sessions.hold(key, draft.clone());
    Ok(draft)
}

/// Validates a submission against the session's draft.
///
/// On failure the draft is left exactly as it was and the validation message
/// is returned. On success the draft is removed from the session and merged
/// with the submitted fields. Submitting without a held draft is `NotFound`.
pub fn submit_draft(
    key: &SessionKey,
    form: ProductForm,
    sessions: &DraftSessions,
) -> ServiceResult<ValidatedDraft> {
    let mut drafts = sessions.lock();
    evict_idle_locked(&mut drafts, sessions.idle_timeout);

    let Some(held) = drafts.get_mut(key) else {
        return Err(ServiceError::NotFound);
    };
    held.touched = Instant::now();

    let payload = ProductFormPayload::try_from(form)
        .map_err(|e| ServiceError::Validation(e.to_string()))?;

    let Some(HeldDraft { draft, .. }) = drafts.remove(key) else {
        return Err(ServiceError::NotFound);
    };
    drop(drafts);

    Ok(ValidatedDraft {
        id: draft.id,
        name: payload.name,
        price: payload.price,
        created_at: payload.created_at.or(draft.created_at),
        category_id: payload.category_id,
        picture: draft.picture,
    })
}
