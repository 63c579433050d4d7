//! Search request, predicate and keyset pagination utilities

use crate::core::cat::{CatRecord, CatStatus, CatSummary, Sex};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;
use validator::Validate;

/// Default page size
pub const DEFAULT_LIMIT: usize = 24;

/// Largest page a caller may request
pub const MAX_LIMIT: usize = 100;

/// Filter, sort and pagination parameters for a cat search
///
/// Every field is optional on the wire; missing fields take the defaults
/// below. Set-valued filters must be non-empty when present.
///
/// # Example
/// ```json
/// {"statuses": ["AVAILABLE"], "sexes": ["FEMALE"], "minAge": 6,
///  "q": "lun", "sortBy": "ageMonths", "sortDir": "asc", "limit": 12}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchRequest {
    #[validate(length(min = 1, message = "statuses must not be empty"))]
    pub statuses: Option<Vec<CatStatus>>,

    #[validate(length(min = 1, message = "sexes must not be empty"))]
    pub sexes: Option<Vec<Sex>>,

    /// Inclusive lower bound on `ageMonths`
    pub min_age: Option<u32>,

    /// Inclusive upper bound on `ageMonths`. `minAge > maxAge` matches nothing.
    pub max_age: Option<u32>,

    #[validate(length(min = 1, message = "breeds must not be empty"))]
    pub breeds: Option<Vec<String>>,

    pub desexed: Option<bool>,
    pub vaccinated: Option<bool>,
    pub microchipped: Option<bool>,

    /// Case-insensitive substring of the cat's name
    #[validate(length(min = 1, message = "q must not be empty"))]
    pub q: Option<String>,

    pub sort_by: SortBy,
    pub sort_dir: SortDir,

    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: usize,

    /// Id of the last item of the previous page
    pub cursor: Option<Uuid>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            statuses: None,
            sexes: None,
            min_age: None,
            max_age: None,
            breeds: None,
            desexed: None,
            vaccinated: None,
            microchipped: None,
            q: None,
            sort_by: SortBy::default(),
            sort_dir: SortDir::default(),
            limit: DEFAULT_LIMIT,
            cursor: None,
        }
    }
}

impl SearchRequest {
    /// Build the predicate for this request
    pub fn filter(&self) -> CatFilter {
        CatFilter {
            statuses: self.statuses.clone(),
            sexes: self.sexes.clone(),
            min_age: self.min_age,
            max_age: self.max_age,
            breeds: self.breeds.clone(),
            desexed: self.desexed,
            vaccinated: self.vaccinated,
            microchipped: self.microchipped,
            name_contains: self.q.as_ref().map(|q| q.to_lowercase()),
        }
    }

    pub fn order(&self) -> SortOrder {
        SortOrder {
            by: self.sort_by,
            dir: self.sort_dir,
        }
    }

    /// Same request positioned after `cursor`
    pub fn after(&self, cursor: Uuid) -> Self {
        Self {
            cursor: Some(cursor),
            ..self.clone()
        }
    }
}

/// Sort key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    CreatedAt,
    AgeMonths,
    Name,
}

impl SortBy {
    /// Column name in relational backends
    pub fn column(&self) -> &'static str {
        match self {
            SortBy::CreatedAt => "created_at",
            SortBy::AgeMonths => "age_months",
            SortBy::Name => "name",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Total order over cats: the sort key, then `id`, both in `dir`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOrder {
    pub by: SortBy,
    pub dir: SortDir,
}

impl SortOrder {
    pub fn new(by: SortBy, dir: SortDir) -> Self {
        Self { by, dir }
    }

    pub fn compare(&self, a: &CatRecord, b: &CatRecord) -> Ordering {
        let primary = match self.by {
            SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
            SortBy::AgeMonths => a.age_months.cmp(&b.age_months),
            SortBy::Name => a.name.cmp(&b.name),
        };
        let ordering = primary.then_with(|| a.id.cmp(&b.id));
        match self.dir {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        }
    }

    /// Whether `cat` sorts strictly after `cursor`
    pub fn is_after(&self, cat: &CatRecord, cursor: &CatRecord) -> bool {
        self.compare(cat, cursor) == Ordering::Greater
    }
}

/// Conjunction of optional constraints over a cat
///
/// Absent fields impose nothing. Set-valued fields match by membership.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatFilter {
    pub statuses: Option<Vec<CatStatus>>,
    pub sexes: Option<Vec<Sex>>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub breeds: Option<Vec<String>>,
    pub desexed: Option<bool>,
    pub vaccinated: Option<bool>,
    pub microchipped: Option<bool>,
    /// Already lowercased
    pub name_contains: Option<String>,
}

impl CatFilter {
    pub fn matches(&self, cat: &CatRecord) -> bool {
        self.statuses.as_ref().is_none_or(|s| s.contains(&cat.status))
            && self.sexes.as_ref().is_none_or(|s| s.contains(&cat.sex))
            && self.min_age.is_none_or(|min| cat.age_months >= min)
            && self.max_age.is_none_or(|max| cat.age_months <= max)
            && self.breeds.as_ref().is_none_or(|b| b.contains(&cat.breed))
            && self.desexed.is_none_or(|d| cat.desexed == d)
            && self.vaccinated.is_none_or(|v| cat.vaccinated == v)
            && self.microchipped.is_none_or(|m| cat.microchipped == m)
            && self
                .name_contains
                .as_ref()
                .is_none_or(|q| cat.name.to_lowercase().contains(q.as_str()))
    }

    /// True when no field constrains the result
    pub fn is_unconstrained(&self) -> bool {
        *self == CatFilter::default()
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub items: Vec<CatSummary>,

    /// Present iff more matching records exist beyond this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Uuid>,
}

/// Trim an over-fetched (`limit + 1`) batch down to one page
///
/// The extra row only signals that a next page exists; the cursor is the
/// id of the last row actually returned.
pub fn paginate(mut fetched: Vec<CatSummary>, limit: usize) -> SearchResult {
    if fetched.len() > limit {
        fetched.truncate(limit);
        let next_cursor = fetched.last().map(|cat| cat.id);
        SearchResult {
            items: fetched,
            next_cursor,
        }
    } else {
        SearchResult {
            items: fetched,
            next_cursor: None,
        }
    }
}
