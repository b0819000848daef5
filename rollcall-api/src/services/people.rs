//! Person use cases
//!
//! Create and update route the given name through the enrichment pipeline
//! before anything is written; if enrichment fails nothing is persisted.

use rollcall_common::db::{Person, PersonInput};
use std::sync::Arc;
use tracing::info;

use super::enrichment::enrich;
use super::lookup_client::NameLookup;
use crate::db::{PersonFilter, PersonPage, PersonStore};
use crate::error::{ApiError, ApiResult};
use crate::pagination::Pagination;

/// Person use cases over an explicit store and lookup client
#[derive(Clone)]
pub struct PeopleService {
    store: Arc<dyn PersonStore>,
    lookup: Arc<dyn NameLookup>,
}

impl PeopleService {
    pub fn new(store: Arc<dyn PersonStore>, lookup: Arc<dyn NameLookup>) -> Self {
        Self { store, lookup }
    }

    /// Enrich and store a new person
    pub async fn create_person(&self, input: PersonInput) -> ApiResult<Person> {
        let input = input.normalized()?;

        let enrichment = enrich(self.lookup.as_ref(), &input.name).await?;
        let person = self.store.create(&input, &enrichment).await?;

        info!(id = person.id, "Created person");
        Ok(person)
    }

    /// Replace the name fields of a person and recompute enrichment
    ///
    /// A missing id is reported before any lookup is attempted.
    pub async fn update_person(&self, id: i64, input: PersonInput) -> ApiResult<Person> {
        if self.store.get(id).await?.is_none() {
            return Err(not_found(id));
        }

        let input = input.normalized()?;
        let enrichment = enrich(self.lookup.as_ref(), &input.name).await?;

        // Deleted between the existence check and the write
        let person = self
            .store
            .update(id, &input, &enrichment)
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(id = person.id, "Updated person");
        Ok(person)
    }

    pub async fn get_person(&self, id: i64) -> ApiResult<Person> {
        self.store.get(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn list_people(
        &self,
        filter: PersonFilter,
        pagination: Pagination,
    ) -> ApiResult<PersonPage> {
        let filter = filter.normalized();
        Ok(self.store.list(&filter, pagination).await?)
    }

    /// Soft-delete a person
    pub async fn delete_person(&self, id: i64) -> ApiResult<()> {
        if !self.store.delete(id).await? {
            return Err(not_found(id));
        }

        info!(id, "Deleted person");
        Ok(())
    }
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Person {} not found", id))
}
