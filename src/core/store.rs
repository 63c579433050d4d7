//! Store trait for the persistent cat collection

use crate::core::application::{ApplicationRecord, ApplicationStatus};
use crate::core::cat::{CatRecord, CatSummary, CatStatus};
use crate::core::error::StoreError;
use crate::core::query::{CatFilter, SortOrder};
use async_trait::async_trait;
use uuid::Uuid;

/// Keyset-seekable access to persisted cats
///
/// Backends must be able to look up a record by id cheaply; `fetch_page`
/// resolves its cursor that way before seeking.
#[async_trait]
pub trait CatStore: Send + Sync {
    /// Fetch up to `take` cats matching `filter`, ordered by `order`
    ///
    /// When `after` is set, results start strictly after that record's
    /// position in `order`. The cursor record itself need not match
    /// `filter`. Returns [`StoreError::CursorNotFound`] if `after` names no
    /// stored record.
    async fn fetch_page(
        &self,
        filter: &CatFilter,
        order: SortOrder,
        after: Option<Uuid>,
        take: usize,
    ) -> Result<Vec<CatSummary>, StoreError>;

    /// Get a cat by id
    async fn get(&self, id: &Uuid) -> Result<Option<CatRecord>, StoreError>;

    /// List every cat, newest first
    async fn list(&self) -> Result<Vec<CatSummary>, StoreError>;

    /// Insert a cat
    async fn insert(&self, cat: CatRecord) -> Result<CatRecord, StoreError>;

    /// Change the lifecycle state of a cat; `false` if it does not exist
    async fn set_status(&self, id: &Uuid, status: CatStatus) -> Result<bool, StoreError>;

    /// Delete a cat and its applications; `false` if it did not exist
    async fn delete(&self, id: &Uuid) -> Result<bool, StoreError>;

    // === Applications ===

    /// Insert an application for an existing cat.
    ///
    /// Returns `false` without inserting when the same user already has a
    /// `PENDING` application on that cat. The check and the insert are atomic.
    async fn insert_application(&self, application: &ApplicationRecord) -> Result<bool, StoreError>;

    async fn get_application(&self, id: &Uuid) -> Result<Option<ApplicationRecord>, StoreError>;

    /// Applications filed by `user_id`, newest first
    async fn applications_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ApplicationRecord>, StoreError>;

    /// Number of `PENDING` applications on a cat
    async fn pending_applications(&self, cat_id: &Uuid) -> Result<u32, StoreError>;

    /// Move an application to `status` and return it; `None` if it does not exist
    async fn set_application_status(
        &self,
        id: &Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<ApplicationRecord>, StoreError>;
}
