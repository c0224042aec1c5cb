//! Item domain models and request validation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::FromRow;

use super::ValidationError;

/// Maximum length for item names, matching the VARCHAR(255) column.
const MAX_NAME_LEN: usize = 255;

/// Columns selected for every item payload, in declaration order.
pub const ITEM_COLUMNS: &str =
    "id, name, description, created_at, updated_at, smoker, longitude, latitude";

/// Persisted item row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub smoker: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

impl Item {
    /// Decode every row returned through the core's query interface.
    pub fn from_rows(rows: &[PgRow]) -> Result<Vec<Item>, sqlx::Error> {
        rows.iter().map(Item::from_row).collect()
    }

    /// Decode the first row, if any.
    pub fn first_from_rows(rows: &[PgRow]) -> Result<Option<Item>, sqlx::Error> {
        rows.first().map(Item::from_row).transpose()
    }
}

/// Create/update request body.
///
/// `name` is optional at the serde level so that a missing field surfaces
/// as a validation error rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub smoker: Option<String>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
}

impl ItemInput {
    /// Validate the body and return the required name.
    ///
    /// Runs before any statement is issued, so a bad body never touches
    /// the pool.
    pub fn validated_name(&self) -> Result<&str, ValidationError> {
        let name = self.name.as_deref().unwrap_or_default();
        if name.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        if name.len() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "name",
                max: MAX_NAME_LEN,
            });
        }
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_plain_name() {
        let input = ItemInput {
            name: Some("lamp".into()),
            ..Default::default()
        };
        assert_eq!(input.validated_name().unwrap(), "lamp");
    }

    #[test]
    fn rejects_missing_name() {
        let input = ItemInput::default();
        assert!(matches!(
            input.validated_name().unwrap_err(),
            ValidationError::Empty { field: "name" }
        ));
    }

    #[test]
    fn rejects_empty_name() {
        let input = ItemInput {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            input.validated_name().unwrap_err(),
            ValidationError::Empty { field: "name" }
        ));
    }

    #[test]
    fn rejects_overlong_name() {
        let input = ItemInput {
            name: Some("x".repeat(256)),
            ..Default::default()
        };
        assert!(matches!(
            input.validated_name().unwrap_err(),
            ValidationError::TooLong { max: 255, .. }
        ));
    }

    #[test]
    fn body_without_name_still_deserializes() {
        let input: ItemInput =
            serde_json::from_str(r#"{"description": "left on the shelf"}"#).unwrap();
        assert!(input.name.is_none());
        assert_eq!(input.description.as_deref(), Some("left on the shelf"));
    }
}
