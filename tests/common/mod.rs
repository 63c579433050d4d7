//! Shared fixtures for integration tests
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use pawprint::prelude::*;

/// Builder for test cats with neutral defaults
#[derive(Clone)]
pub struct CatBuilder {
    record: CatRecord,
}

impl CatBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            record: CatRecord {
                id: Uuid::new_v4(),
                name: name.to_string(),
                sex: Sex::Unknown,
                age_months: 12,
                breed: "Domestic Shorthair".to_string(),
                vaccinated: false,
                desexed: false,
                microchipped: false,
                status: CatStatus::Available,
                description: None,
                primary_image_url: None,
                owner_id: None,
                created_at: at(0),
            },
        }
    }

    pub fn id(mut self, n: u128) -> Self {
        self.record.id = Uuid::from_u128(n);
        self
    }

    pub fn created(mut self, secs: i64) -> Self {
        self.record.created_at = at(secs);
        self
    }

    pub fn age(mut self, months: u32) -> Self {
        self.record.age_months = months;
        self
    }

    pub fn sex(mut self, sex: Sex) -> Self {
        self.record.sex = sex;
        self
    }

    pub fn breed(mut self, breed: &str) -> Self {
        self.record.breed = breed.to_string();
        self
    }

    pub fn status(mut self, status: CatStatus) -> Self {
        self.record.status = status;
        self
    }

    pub fn flags(mut self, vaccinated: bool, desexed: bool, microchipped: bool) -> Self {
        self.record.vaccinated = vaccinated;
        self.record.desexed = desexed;
        self.record.microchipped = microchipped;
        self
    }

    pub fn owner(mut self, owner: Uuid) -> Self {
        self.record.owner_id = Some(owner);
        self
    }

    pub fn build(self) -> CatRecord {
        self.record
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// A varied shelter of 40 cats, with clustered creation times to force ties
pub fn shelter() -> Vec<CatRecord> {
    let names = [
        "Luna", "Max", "Bella", "Oliver", "Lucy", "Leo", "Nala", "Milo", "Cleo", "Simba",
    ];
    let breeds = ["Persian", "Siamese", "Bengal", "Maine Coon"];
    let sexes = [Sex::Male, Sex::Female, Sex::Unknown];
    let statuses = [CatStatus::Available, CatStatus::Pending, CatStatus::Adopted];

    (0..40u32)
        .map(|i| {
            CatBuilder::new(&format!("{} {}", names[i as usize % names.len()], i))
                .created(i64::from(i / 4))
                .age(i % 13)
                .breed(breeds[i as usize % breeds.len()])
                .sex(sexes[i as usize % sexes.len()])
                .status(statuses[i as usize % statuses.len()])
                .flags(i % 2 == 0, i % 3 == 0, i % 5 == 0)
                .build()
        })
        .collect()
}

pub fn service_over(cats: Vec<CatRecord>) -> CatSearchService {
    CatSearchService::new(Arc::new(InMemoryCatStore::with_cats(cats)))
}

/// Follow `nextCursor` until exhausted
pub async fn collect_all(service: &CatSearchService, request: SearchRequest) -> Vec<CatSummary> {
    let mut all = Vec::new();
    let mut request = request;
    loop {
        let page = service.search(request.clone()).await.unwrap();
        assert!(page.items.len() <= request.limit);
        all.extend(page.items);
        match page.next_cursor {
            Some(cursor) => request = request.after(cursor),
            None => return all,
        }
    }
}
