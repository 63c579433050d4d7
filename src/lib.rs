//! # Pawprint
//!
//! Catalogue service for a cat adoption site.
//!
//! ## Features
//!
//! - **Filtered Search**: status, sex, age range, breed, health flags and name text
//! - **Keyset Pagination**: opaque cursors that stay stable across pages
//! - **Deterministic Ordering**: ties on the sort key are broken by id
//! - **Central Authorization**: one policy check before every mutation
//! - **Pluggable Storage**: in-memory by default, PostgreSQL behind a feature flag
//! - **REST Exposure**: axum router with graceful shutdown
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pawprint::prelude::*;
//!
//! let store = Arc::new(InMemoryCatStore::new());
//! let search = CatSearchService::new(store);
//!
//! let page = search
//!     .search(SearchRequest {
//!         q: Some("lun".to_string()),
//!         sort_dir: SortDir::Asc,
//!         limit: 12,
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! if let Some(cursor) = page.next_cursor {
//!     let next = search.search(request.after(cursor)).await?;
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Domain ===
    pub use crate::core::application::{ApplicationRecord, ApplicationStatus};
    pub use crate::core::cat::{CatRecord, CatStatus, CatSummary, KNOWN_BREEDS, NewCat, Sex};
    pub use crate::core::query::{
        CatFilter, DEFAULT_LIMIT, MAX_LIMIT, SearchRequest, SearchResult, SortBy, SortDir,
        SortOrder,
    };

    // === Services ===
    pub use crate::core::{CatCatalog, CatSearchService, CatStore};

    // === Authorization ===
    pub use crate::core::auth::{
        Action, AuthContext, AuthPolicy, AuthProvider, HeaderAuthProvider, NoAuthProvider,
        PolicyEngine, Resource, Role,
    };

    // === Errors ===
    pub use crate::core::error::{
        ConfigError, ErrorResponse, FieldValidationError, PawprintError, StoreError,
        ValidationError,
    };

    // === Storage ===
    pub use crate::storage::InMemoryCatStore;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresCatStore;

    // === Config ===
    pub use crate::config::{AppConfig, SearchConfig, ServerConfig, StaleCursorPolicy};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
