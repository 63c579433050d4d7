//! Cat search service: validation, predicate construction and keyset paging

use crate::config::StaleCursorPolicy;
use crate::core::cat::{CatRecord, CatSummary};
use crate::core::error::{PawprintError, StoreError};
use crate::core::query::{SearchRequest, SearchResult, paginate};
use crate::core::store::CatStore;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Read-only query surface over a [`CatStore`]
///
/// Holds no mutable state; clones share the same store.
#[derive(Clone)]
pub struct CatSearchService {
    store: Arc<dyn CatStore>,
    stale_cursor: StaleCursorPolicy,
}

impl CatSearchService {
    pub fn new(store: Arc<dyn CatStore>) -> Self {
        Self {
            store,
            stale_cursor: StaleCursorPolicy::default(),
        }
    }

    pub fn with_stale_cursor_policy(mut self, policy: StaleCursorPolicy) -> Self {
        self.stale_cursor = policy;
        self
    }

    pub fn store(&self) -> &Arc<dyn CatStore> {
        &self.store
    }

    /// Search for cats and return one page plus a continuation cursor
    ///
    /// The request is validated before the store is touched. One extra row
    /// is fetched to learn whether a next page exists.
    #[tracing::instrument(
        skip(self, request),
        fields(
            sort_by = ?request.sort_by,
            sort_dir = ?request.sort_dir,
            limit = request.limit,
            has_cursor = request.cursor.is_some(),
        )
    )]
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResult, PawprintError> {
        request.validate()?;

        let filter = request.filter();
        let order = request.order();
        let take = request.limit + 1;
        tracing::debug!(?filter, "Built search predicate");

        let fetched = match self
            .store
            .fetch_page(&filter, order, request.cursor, take)
            .await
        {
            Ok(fetched) => fetched,
            Err(StoreError::CursorNotFound { id }) => match self.stale_cursor {
                StaleCursorPolicy::Reject => {
                    tracing::warn!(cursor = %id, "Rejecting stale cursor");
                    return Err(PawprintError::invalid(
                        "cursor",
                        format!("cursor '{}' does not reference an existing cat", id),
                    ));
                }
                StaleCursorPolicy::Restart => {
                    tracing::warn!(cursor = %id, "Stale cursor, restarting from first page");
                    self.store.fetch_page(&filter, order, None, take).await?
                }
            },
            Err(e) => return Err(e.into()),
        };

        let page = paginate(fetched, request.limit);
        tracing::debug!(
            returned = page.items.len(),
            has_next = page.next_cursor.is_some(),
            "Search page built"
        );
        Ok(page)
    }

    /// Get a single cat
    pub async fn get_cat(&self, id: &Uuid) -> Result<CatRecord, PawprintError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| PawprintError::cat_not_found(*id))
    }

    /// Every cat, newest first
    pub async fn list_cats(&self) -> Result<Vec<CatSummary>, PawprintError> {
        Ok(self.store.list().await?)
    }
}
