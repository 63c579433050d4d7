//! In-memory implementation of CatStore for testing and development

use crate::core::application::{ApplicationRecord, ApplicationStatus};
use crate::core::cat::{CatRecord, CatStatus, CatSummary};
use crate::core::error::StoreError;
use crate::core::query::{CatFilter, SortBy, SortDir, SortOrder};
use crate::core::store::CatStore;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

const BACKEND: &str = "in-memory";

type Table<T> = Arc<RwLock<HashMap<Uuid, T>>>;

/// In-memory cat store
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
#[derive(Clone)]
pub struct InMemoryCatStore {
    cats: Table<CatRecord>,
    applications: Table<ApplicationRecord>,
}

impl InMemoryCatStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_cats(Vec::new())
    }

    /// Create a store holding `cats`
    pub fn with_cats(cats: impl IntoIterator<Item = CatRecord>) -> Self {
        let map = cats.into_iter().map(|cat| (cat.id, cat)).collect();
        Self {
            cats: Arc::new(RwLock::new(map)),
            applications: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.cats.read().map(|cats| cats.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn read<T>(table: &Table<T>) -> Result<RwLockReadGuard<'_, HashMap<Uuid, T>>, StoreError> {
    table.read().map_err(|e| StoreError::Unavailable {
        backend: format!("{} (read lock poisoned: {})", BACKEND, e),
    })
}

fn write<T>(table: &Table<T>) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, T>>, StoreError> {
    table.write().map_err(|e| StoreError::Unavailable {
        backend: format!("{} (write lock poisoned: {})", BACKEND, e),
    })
}

impl Default for InMemoryCatStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatStore for InMemoryCatStore {
    async fn fetch_page(
        &self,
        filter: &CatFilter,
        order: SortOrder,
        after: Option<Uuid>,
        take: usize,
    ) -> Result<Vec<CatSummary>, StoreError> {
        let cats = read(&self.cats)?;

        let cursor = match after {
            Some(id) => Some(cats.get(&id).ok_or(StoreError::CursorNotFound { id })?),
            None => None,
        };

        let mut matching: Vec<&CatRecord> = cats
            .values()
            .filter(|cat| filter.matches(cat))
            .filter(|cat| cursor.is_none_or(|c| order.is_after(cat, c)))
            .collect();
        matching.sort_by(|a, b| order.compare(a, b));

        Ok(matching
            .into_iter()
            .take(take)
            .map(CatSummary::from)
            .collect())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<CatRecord>, StoreError> {
        Ok(read(&self.cats)?.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<CatSummary>, StoreError> {
        let order = SortOrder::new(SortBy::CreatedAt, SortDir::Desc);
        let cats = read(&self.cats)?;
        let mut all: Vec<&CatRecord> = cats.values().collect();
        all.sort_by(|a, b| order.compare(a, b));
        Ok(all.into_iter().map(CatSummary::from).collect())
    }

    async fn insert(&self, cat: CatRecord) -> Result<CatRecord, StoreError> {
        write(&self.cats)?.insert(cat.id, cat.clone());
        Ok(cat)
    }

    async fn set_status(&self, id: &Uuid, status: CatStatus) -> Result<bool, StoreError> {
        let mut cats = write(&self.cats)?;
        Ok(cats.get_mut(id).map(|cat| cat.status = status).is_some())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, StoreError> {
        // Lock order: cats, then applications
        let mut cats = write(&self.cats)?;
        let removed = cats.remove(id).is_some();
        if removed {
            write(&self.applications)?.retain(|_, app| app.cat_id != *id);
        }
        Ok(removed)
    }

    async fn insert_application(&self, application: &ApplicationRecord) -> Result<bool, StoreError> {
        let mut applications = write(&self.applications)?;
        let duplicate = applications.values().any(|app| {
            app.cat_id == application.cat_id && app.user_id == application.user_id && app.is_pending()
        });
        if duplicate {
            return Ok(false);
        }
        applications.insert(application.id, application.clone());
        Ok(true)
    }

    async fn get_application(&self, id: &Uuid) -> Result<Option<ApplicationRecord>, StoreError> {
        Ok(read(&self.applications)?.get(id).cloned())
    }

    async fn applications_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ApplicationRecord>, StoreError> {
        let applications = read(&self.applications)?;
        let mut mine: Vec<ApplicationRecord> = applications
            .values()
            .filter(|app| app.user_id == *user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(mine)
    }

    async fn pending_applications(&self, cat_id: &Uuid) -> Result<u32, StoreError> {
        let count = read(&self.applications)?
            .values()
            .filter(|app| app.cat_id == *cat_id && app.is_pending())
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn set_application_status(
        &self,
        id: &Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        let mut applications = write(&self.applications)?;
        Ok(applications.get_mut(id).map(|app| {
            app.status = status;
            app.updated_at = Utc::now();
            app.clone()
        }))
    }
}
