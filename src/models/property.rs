use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::authz::{RecordOwnership, Role};
use crate::errors::AppError;
use crate::query::{FieldFilter, FieldValue, Filterable, MatchMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    House,
    Apartment,
    Villa,
    Office,
    Land,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::House,
        PropertyType::Apartment,
        PropertyType::Villa,
        PropertyType::Office,
        PropertyType::Land,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Apartment => "apartment",
            PropertyType::Villa => "villa",
            PropertyType::Office => "office",
            PropertyType::Land => "land",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Available,
    Reserved,
    Sold,
    Rented,
}

impl PropertyStatus {
    pub const ALL: [PropertyStatus; 4] = [
        PropertyStatus::Available,
        PropertyStatus::Reserved,
        PropertyStatus::Sold,
        PropertyStatus::Rented,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Reserved => "reserved",
            PropertyStatus::Sold => "sold",
            PropertyStatus::Rented => "rented",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Property {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub price: i64,
    pub bedrooms: Option<i64>,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listings belong to the platform, so only ADMIN passes the mutation rule.
impl RecordOwnership for Property {
    fn owning_role(&self) -> Option<Role> {
        Some(Role::Admin)
    }
}

const PROPERTY_FILTERS: &[FieldFilter] = &[
    FieldFilter::Search {
        key: "search",
        fields: &["title", "description"],
    },
    FieldFilter::AnyOf {
        key: "location",
        field: "location",
        mode: MatchMode::Contains,
    },
    FieldFilter::Range {
        min_key: "minPrice",
        max_key: "maxPrice",
        field: "price",
    },
    FieldFilter::Range {
        min_key: "minBedrooms",
        max_key: "maxBedrooms",
        field: "bedrooms",
    },
    FieldFilter::Exact {
        key: "type",
        field: "type",
    },
    FieldFilter::AnyOf {
        key: "status",
        field: "status",
        mode: MatchMode::Equals,
    },
];

impl Filterable for Property {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "title" => FieldValue::Text(&self.title),
            "description" => self.description.as_deref().map_or(FieldValue::Missing, FieldValue::Text),
            "location" => FieldValue::Text(&self.location),
            "price" => FieldValue::Number(self.price as f64),
            "bedrooms" => self.bedrooms.map_or(FieldValue::Missing, |n| FieldValue::Number(n as f64)),
            "type" => FieldValue::Text(self.property_type.as_str()),
            "status" => FieldValue::Text(self.status.as_str()),
            _ => FieldValue::Missing,
        }
    }

    fn filter_schema() -> &'static [FieldFilter] {
        PROPERTY_FILTERS
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbProperty {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub price: i64,
    pub bedrooms: Option<i64>,
    pub property_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<DbProperty> for Property {
    type Error = AppError;

    fn try_from(value: DbProperty) -> Result<Self, Self::Error> {
        let (Some(property_type), Some(status)) =
            (PropertyType::parse(&value.property_type), PropertyStatus::parse(&value.status))
        else {
            tracing::warn!(
                property_id = %value.id,
                property_type = %value.property_type,
                status = %value.status,
                "stored property has an unknown type or status"
            );
            return Err(AppError::internal("stored property record is invalid"));
        };

        Ok(Property {
            id: value.id,
            title: value.title,
            description: value.description,
            location: value.location,
            price: value.price,
            bedrooms: value.bedrooms,
            property_type,
            status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PropertyCreateRequest {
    #[schema(example = "Apartamento en Zona Norte")]
    pub title: String,
    #[schema(example = "Apartamento moderno con vista a los cerros")]
    pub description: Option<String>,
    #[schema(example = "Zona Norte, Bogotá")]
    pub location: String,
    #[schema(example = 180000)]
    pub price: i64,
    #[schema(example = 2)]
    pub bedrooms: Option<i64>,
    pub property_type: PropertyType,
    pub status: Option<PropertyStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PropertyUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price: Option<i64>,
    pub bedrooms: Option<i64>,
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
}

/// The three-listing catalogue used by the demo seed and the tests.
pub fn demo_catalog() -> Vec<PropertyCreateRequest> {
    vec![
        PropertyCreateRequest {
            title: "Casa en el Centro".to_string(),
            description: Some("Casa colonial con patio interior".to_string()),
            location: "Centro, Bogotá".to_string(),
            price: 250_000,
            bedrooms: Some(3),
            property_type: PropertyType::House,
            status: Some(PropertyStatus::Available),
        },
        PropertyCreateRequest {
            title: "Apartamento en Zona Norte".to_string(),
            description: Some("Apartamento moderno con vista a los cerros".to_string()),
            location: "Zona Norte, Bogotá".to_string(),
            price: 180_000,
            bedrooms: Some(2),
            property_type: PropertyType::Apartment,
            status: Some(PropertyStatus::Available),
        },
        PropertyCreateRequest {
            title: "Villa campestre".to_string(),
            description: Some("Villa con jardín y piscina".to_string()),
            location: "Chía".to_string(),
            price: 500_000,
            bedrooms: Some(5),
            property_type: PropertyType::Villa,
            status: Some(PropertyStatus::Reserved),
        },
    ]
}

impl PropertyCreateRequest {
    /// Materialise an unsaved listing, used by offline tooling and tests.
    pub fn into_property(self, id: Uuid, now: DateTime<Utc>) -> Property {
        Property {
            id,
            title: self.title,
            description: self.description,
            location: self.location,
            price: self.price,
            bedrooms: self.bedrooms,
            property_type: self.property_type,
            status: self.status.unwrap_or(PropertyStatus::Available),
            created_at: now,
            updated_at: now,
        }
    }
}
