//! Shared test harness for storage backend testing
//!
//! Provides a fixed catalogue of cats with deliberate sort-key ties and the
//! `cat_store_tests!` macro that checks any `CatStore` against it.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod cat_store_tests;

use chrono::{DateTime, TimeZone, Utc};
use pawprint::prelude::*;

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// Build a cat with a predictable id so backends can be compared exactly
pub fn harness_cat(
    n: u128,
    name: &str,
    created: i64,
    age_months: u32,
    sex: Sex,
    status: CatStatus,
) -> CatRecord {
    CatRecord {
        id: Uuid::from_u128(n),
        name: name.to_string(),
        sex,
        age_months,
        breed: if n % 2 == 0 { "Siamese" } else { "Bengal" }.to_string(),
        vaccinated: n % 2 == 0,
        desexed: n % 3 == 0,
        microchipped: n % 4 == 0,
        status,
        description: Some(format!("Harness cat {}", n)),
        primary_image_url: None,
        owner_id: None,
        created_at: at(created),
    }
}

/// A `PENDING` application with a fixed timestamp
pub fn harness_application(cat: &CatRecord, user_id: Uuid, created: i64) -> ApplicationRecord {
    let mut application = ApplicationRecord::new(cat.id, user_id);
    application.created_at = at(created);
    application.updated_at = at(created);
    application
}

/// Twelve cats. Creation times, ages and one name collide so that the id
/// tie-break decides part of every ordering.
pub fn catalogue() -> Vec<CatRecord> {
    use CatStatus::*;
    use Sex::*;
    vec![
        harness_cat(1, "Luna", 10, 14, Female, Available),
        harness_cat(2, "Max", 10, 3, Male, Available),
        harness_cat(3, "bella", 20, 14, Female, Pending),
        harness_cat(4, "Oliver", 20, 60, Male, Adopted),
        harness_cat(5, "Lucy", 20, 3, Female, Available),
        harness_cat(6, "Leo", 30, 7, Male, Available),
        harness_cat(7, "Nala", 40, 14, Unknown, Available),
        harness_cat(8, "Milo", 50, 24, Male, Pending),
        harness_cat(9, "Luna", 60, 2, Female, Available),
        harness_cat(10, "100% Tabby", 70, 36, Female, Available),
        harness_cat(11, "Simba_Jr", 80, 5, Male, Available),
        harness_cat(12, "Cleo", 80, 90, Female, Adopted),
    ]
}

/// Insert every record through the store's own API
pub async fn load(store: &dyn CatStore, cats: &[CatRecord]) {
    for cat in cats {
        store.insert(cat.clone()).await.unwrap();
    }
}

/// Ids of the cats in `cats` that match `filter`, in `order`
pub fn expected_ids(cats: &[CatRecord], filter: &CatFilter, order: SortOrder) -> Vec<Uuid> {
    let mut matching: Vec<&CatRecord> = cats.iter().filter(|c| filter.matches(c)).collect();
    matching.sort_by(|a, b| order.compare(a, b));
    matching.iter().map(|c| c.id).collect()
}

pub fn ids(page: &[CatSummary]) -> Vec<Uuid> {
    page.iter().map(|c| c.id).collect()
}

pub const ALL_ORDERS: [SortOrder; 6] = [
    SortOrder { by: SortBy::CreatedAt, dir: SortDir::Asc },
    SortOrder { by: SortBy::CreatedAt, dir: SortDir::Desc },
    SortOrder { by: SortBy::AgeMonths, dir: SortDir::Asc },
    SortOrder { by: SortBy::AgeMonths, dir: SortDir::Desc },
    SortOrder { by: SortBy::Name, dir: SortDir::Asc },
    SortOrder { by: SortBy::Name, dir: SortDir::Desc },
];
