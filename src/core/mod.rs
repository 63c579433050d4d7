//! Core module containing the domain types, search and policy logic

pub mod application;
pub mod auth;
pub mod cat;
pub mod catalog;
pub mod error;
pub mod query;
pub mod search;
pub mod store;

pub use application::{ApplicationRecord, ApplicationStatus};
pub use auth::{Action, AuthContext, AuthPolicy, AuthProvider, PolicyEngine, Resource, Role};
pub use cat::{CatRecord, CatStatus, CatSummary, NewCat, Sex};
pub use catalog::CatCatalog;
pub use error::{PawprintError, StoreError, ValidationError};
pub use query::{CatFilter, SearchRequest, SearchResult, SortBy, SortDir, SortOrder};
pub use search::CatSearchService;
pub use store::CatStore;
