//! Cat records and their listing projection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Sex of a cat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "MALE",
            Sex::Female => "FEMALE",
            Sex::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MALE" => Ok(Sex::Male),
            "FEMALE" => Ok(Sex::Female),
            "UNKNOWN" => Ok(Sex::Unknown),
            other => Err(format!("unknown sex '{}'", other)),
        }
    }
}

/// Lifecycle state of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CatStatus {
    Available,
    Pending,
    Adopted,
}

impl CatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatStatus::Available => "AVAILABLE",
            CatStatus::Pending => "PENDING",
            CatStatus::Adopted => "ADOPTED",
        }
    }
}

impl FromStr for CatStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(CatStatus::Available),
            "PENDING" => Ok(CatStatus::Pending),
            "ADOPTED" => Ok(CatStatus::Adopted),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Breeds offered by the upload form. Search never enforces this list.
pub const KNOWN_BREEDS: &[&str] = &[
    "Domestic Shorthair",
    "Domestic Longhair",
    "Persian",
    "Maine Coon",
    "British Shorthair",
    "Ragdoll",
    "Siamese",
    "Bengal",
    "Russian Blue",
    "Scottish Fold",
    "Abyssinian",
    "Birman",
    "Himalayan",
    "Mixed Breed",
    "Other",
];

pub fn is_known_breed(breed: &str) -> bool {
    KNOWN_BREEDS.contains(&breed)
}

/// A persisted cat listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatRecord {
    pub id: Uuid,
    pub name: String,
    pub sex: Sex,
    pub age_months: u32,
    pub breed: String,
    pub vaccinated: bool,
    pub desexed: bool,
    pub microchipped: bool,
    pub status: CatStatus,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub primary_image_url: Option<String>,
    /// Uploader of the listing
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl CatRecord {
    /// Build a fresh `AVAILABLE` record from an upload
    pub fn from_new(new: NewCat, owner_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new.name.trim().to_string(),
            sex: new.sex,
            age_months: new.age_months,
            breed: new.breed,
            vaccinated: new.vaccinated,
            desexed: new.desexed,
            microchipped: new.microchipped,
            status: CatStatus::Available,
            description: new.description,
            primary_image_url: new.primary_image_url,
            owner_id,
            created_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> CatSummary {
        CatSummary::from(self)
    }
}

/// Listing projection returned by search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatSummary {
    pub id: Uuid,
    pub name: String,
    pub sex: Sex,
    pub age_months: u32,
    pub breed: String,
    pub desexed: bool,
    pub vaccinated: bool,
    pub microchipped: bool,
    pub status: CatStatus,
    pub primary_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&CatRecord> for CatSummary {
    fn from(cat: &CatRecord) -> Self {
        Self {
            id: cat.id,
            name: cat.name.clone(),
            sex: cat.sex,
            age_months: cat.age_months,
            breed: cat.breed.clone(),
            desexed: cat.desexed,
            vaccinated: cat.vaccinated,
            microchipped: cat.microchipped,
            status: cat.status,
            primary_image_url: cat.primary_image_url.clone(),
            created_at: cat.created_at,
        }
    }
}

/// Payload of the admin upload form
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCat {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    pub sex: Sex,
    #[validate(range(max = 600, message = "ageMonths must be at most 600"))]
    pub age_months: u32,
    #[validate(length(min = 1, message = "breed must not be empty"))]
    pub breed: String,
    #[serde(default)]
    pub vaccinated: bool,
    #[serde(default)]
    pub desexed: bool,
    #[serde(default)]
    pub microchipped: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub primary_image_url: Option<String>,
}
