use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::db::StoreError;

/// A named category with a URL-safe slug. Both text fields are globally
/// unique; the constraint is enforced by the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl NewCategory {
    /// Check the required fields, aggregating every failure into one
    /// validation report keyed by field name.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut errors = BTreeMap::new();

        if self.name.trim().is_empty() {
            errors.insert("name".to_string(), "name is required".to_string());
        }
        if self.slug.trim().is_empty() {
            errors.insert("slug".to_string(), "slug is required".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation { errors })
        }
    }
}
