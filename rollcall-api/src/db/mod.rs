//! Data access layer for person records
//!
//! Use cases talk to storage through [`PersonStore`] so the pool is passed
//! explicitly and can be swapped for a test double.

use async_trait::async_trait;
use rollcall_common::db::{Enrichment, Person, PersonInput};
use rollcall_common::Result;

use crate::pagination::Pagination;

mod people;
pub use people::SqlitePersonStore;

/// List filters; `None` means "do not filter on this field"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonFilter {
    /// Case-insensitive substring of the given name
    pub name: Option<String>,
    /// Case-insensitive substring of the family name
    pub surname: Option<String>,
    /// Exact gender
    pub gender: Option<String>,
    /// Exact country code
    pub country: Option<String>,
}

impl PersonFilter {
    /// Treat blank values as absent, the way an empty query parameter reads
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            name: clean(self.name),
            surname: clean(self.surname),
            gender: clean(self.gender),
            country: clean(self.country),
        }
    }
}

/// One page of list results
#[derive(Debug, Clone, PartialEq)]
pub struct PersonPage {
    pub records: Vec<Person>,
    /// Matching rows across all pages
    pub total: i64,
}

/// Persistence operations over live (not soft-deleted) person records
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// Insert a new record with its enrichment
    async fn create(&self, input: &PersonInput, enrichment: &Enrichment) -> Result<Person>;

    /// Fetch a live record
    async fn get(&self, id: i64) -> Result<Option<Person>>;

    /// Replace name fields and enrichment; `None` if no live record has `id`
    async fn update(
        &self,
        id: i64,
        input: &PersonInput,
        enrichment: &Enrichment,
    ) -> Result<Option<Person>>;

    /// Soft-delete a live record; `false` if no live record has `id`
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Filtered page of live records ordered by id
    async fn list(&self, filter: &PersonFilter, pagination: Pagination) -> Result<PersonPage>;
}
