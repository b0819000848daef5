//! Enrichment pipeline
//!
//! Turns a given name into an [`Enrichment`] by running the age, gender and
//! nationality lookups one after another. The first failed lookup aborts the
//! pipeline; callers get either all three results or an error, never a
//! partially enriched value.

use rollcall_common::db::Enrichment;
use thiserror::Error;
use tracing::{debug, warn};

use super::lookup_client::{LookupError, NameLookup};

/// One of the lookups failed; nothing was enriched
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Enrichment failed: {0}")]
pub struct EnrichmentError(#[from] pub LookupError);

/// Look up age, gender and nationality for `name`
///
/// Country is the first nationality candidate exactly as ordered by the
/// service; an empty candidate list leaves it unset.
pub async fn enrich(lookup: &dyn NameLookup, name: &str) -> Result<Enrichment, EnrichmentError> {
    let result = run_lookups(lookup, name).await;

    match &result {
        Ok(enrichment) => debug!(
            name = %name,
            age = ?enrichment.age,
            gender = ?enrichment.gender,
            country = ?enrichment.country,
            "Enrichment complete"
        ),
        Err(e) => warn!(name = %name, "{}", e),
    }

    result
}

async fn run_lookups(lookup: &dyn NameLookup, name: &str) -> Result<Enrichment, EnrichmentError> {
    let age = lookup.age(name).await?;
    let gender = lookup.gender(name).await?;
    let nationality = lookup.nationality(name).await?;

    Ok(Enrichment {
        age: age.age,
        gender: gender.gender,
        country: nationality.top_country().map(str::to_string),
    })
}
