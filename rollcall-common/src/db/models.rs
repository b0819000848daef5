//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A person record as stored in the `people` table
///
/// `age`, `gender` and `country` are only ever written by the enrichment
/// pipeline; requests cannot set them directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Person {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub name: String,
    pub surname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patronymic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Client-supplied fields for creating or replacing a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonInput {
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub patronymic: Option<String>,
}

impl PersonInput {
    /// Trim all fields, reject blank name/surname, collapse a blank patronymic to `None`
    pub fn normalized(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        let surname = self.surname.trim().to_string();

        if name.is_empty() {
            return Err(Error::InvalidInput("name must not be empty".to_string()));
        }
        if surname.is_empty() {
            return Err(Error::InvalidInput("surname must not be empty".to_string()));
        }

        let patronymic = self
            .patronymic
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(Self {
            name,
            surname,
            patronymic,
        })
    }
}

/// Attributes inferred for a name by the enrichment pipeline
///
/// Each field is `None` when the upstream service had no data for the name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub country: Option<String>,
}

/// One row of the `schema_migrations` ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MigrationRecord {
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, surname: &str, patronymic: Option<&str>) -> PersonInput {
        PersonInput {
            name: name.to_string(),
            surname: surname.to_string(),
            patronymic: patronymic.map(str::to_string),
        }
    }

    #[test]
    fn test_normalized_trims_fields() {
        let normalized = input("  Dmitriy ", " Ushakov", Some(" Vasilevich "))
            .normalized()
            .unwrap();
        assert_eq!(normalized, input("Dmitriy", "Ushakov", Some("Vasilevich")));
    }

    #[test]
    fn test_normalized_drops_blank_patronymic() {
        let normalized = input("Anna", "Smith", Some("   ")).normalized().unwrap();
        assert_eq!(normalized.patronymic, None);
    }

    #[test]
    fn test_normalized_rejects_blank_name() {
        let err = input("  ", "Smith", None).normalized().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(msg) if msg.contains("name")));
    }

    #[test]
    fn test_normalized_rejects_blank_surname() {
        let err = input("Anna", "", None).normalized().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(msg) if msg.contains("surname")));
    }

    #[test]
    fn test_person_serialization_omits_absent_fields() {
        let now = Utc::now();
        let person = Person {
            id: 1,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            name: "Anna".to_string(),
            surname: "Smith".to_string(),
            patronymic: None,
            age: Some(30),
            gender: None,
            country: None,
        };

        let json = serde_json::to_value(&person).unwrap();
        assert_eq!(json["age"], 30);
        assert!(json.get("gender").is_none());
        assert!(json.get("deleted_at").is_none());
        assert!(json.get("patronymic").is_none());
    }
}
