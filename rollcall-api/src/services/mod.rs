//! Domain services: lookup client, enrichment pipeline, person use cases

pub mod enrichment;
pub mod lookup_client;
pub mod people;

pub use enrichment::{enrich, EnrichmentError};
pub use lookup_client::{LookupClient, LookupError, NameLookup};
pub use people::PeopleService;
