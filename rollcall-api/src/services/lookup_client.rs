//! Name lookup client
//!
//! Queries the three name-statistics services (age, gender, nationality).
//! Each call is one HTTP GET with a `name` query parameter. There are no
//! retries and no timeout beyond the transport default, so an unresponsive
//! endpoint stalls the caller until the connection fails.

use async_trait::async_trait;
use rollcall_common::config::LookupConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const USER_AGENT: &str = concat!("rollcall/", env!("CARGO_PKG_VERSION"));

/// Which lookup service a call went to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupService {
    Age,
    Gender,
    Nationality,
}

impl fmt::Display for LookupService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LookupService::Age => "age",
            LookupService::Gender => "gender",
            LookupService::Nationality => "nationality",
        };
        f.write_str(name)
    }
}

/// Failure of a single lookup call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("{service} lookup network error: {message}")]
    Transport {
        service: LookupService,
        message: String,
    },

    #[error("{service} lookup returned HTTP {status}: {body}")]
    Status {
        service: LookupService,
        status: u16,
        body: String,
    },

    #[error("{service} lookup returned a malformed body: {message}")]
    Decode {
        service: LookupService,
        message: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl LookupError {
    /// Service the failed call went to, if a call was made
    pub fn service(&self) -> Option<LookupService> {
        match self {
            LookupError::Transport { service, .. }
            | LookupError::Status { service, .. }
            | LookupError::Decode { service, .. } => Some(*service),
            LookupError::Client(_) => None,
        }
    }
}

/// Age service response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AgeEstimate {
    /// `null` when the service has no data for the name
    pub age: Option<i32>,
}

/// Gender service response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GenderEstimate {
    /// `null` when the service has no data for the name
    pub gender: Option<String>,
}

/// Nationality service response
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NationalityEstimate {
    /// Candidates as ordered by the service (descending probability)
    #[serde(default)]
    pub country: Vec<CountryCandidate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CountryCandidate {
    pub country_id: String,
    pub probability: f64,
}

impl NationalityEstimate {
    /// First candidate as delivered by the service
    ///
    /// The list is not re-sorted: upstream ordering is authoritative.
    pub fn top_country(&self) -> Option<&str> {
        self.country.first().map(|c| c.country_id.as_str())
    }
}

/// Name-based attribute lookups
///
/// Implemented by [`LookupClient`] for production and by test doubles.
#[async_trait]
pub trait NameLookup: Send + Sync {
    async fn age(&self, name: &str) -> Result<AgeEstimate, LookupError>;

    async fn gender(&self, name: &str) -> Result<GenderEstimate, LookupError>;

    async fn nationality(&self, name: &str) -> Result<NationalityEstimate, LookupError>;
}

/// HTTP client for the lookup services
pub struct LookupClient {
    http_client: reqwest::Client,
    endpoints: LookupConfig,
}

impl LookupClient {
    pub fn new(endpoints: LookupConfig) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LookupError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoints,
        })
    }

    fn endpoint(&self, service: LookupService) -> &str {
        match service {
            LookupService::Age => &self.endpoints.age_url,
            LookupService::Gender => &self.endpoints.gender_url,
            LookupService::Nationality => &self.endpoints.nationality_url,
        }
    }

    /// Issue one GET and decode the JSON body
    async fn fetch<T: DeserializeOwned>(
        &self,
        service: LookupService,
        name: &str,
    ) -> Result<T, LookupError> {
        let url = self.endpoint(service);

        tracing::debug!(service = %service, url = %url, name = %name, "Querying lookup service");

        let response = self
            .http_client
            .get(url)
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| LookupError::Transport {
                service,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status {
                service,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| LookupError::Transport {
            service,
            message: e.to_string(),
        })?;

        serde_json::from_slice(&bytes).map_err(|e| LookupError::Decode {
            service,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl NameLookup for LookupClient {
    async fn age(&self, name: &str) -> Result<AgeEstimate, LookupError> {
        self.fetch(LookupService::Age, name).await
    }

    async fn gender(&self, name: &str) -> Result<GenderEstimate, LookupError> {
        self.fetch(LookupService::Gender, name).await
    }

    async fn nationality(&self, name: &str) -> Result<NationalityEstimate, LookupError> {
        self.fetch(LookupService::Nationality, name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = LookupClient::new(LookupConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_endpoint_selection() {
        let client = LookupClient::new(LookupConfig {
            age_url: "http://age".to_string(),
            gender_url: "http://gender".to_string(),
            nationality_url: "http://nationality".to_string(),
        })
        .unwrap();

        assert_eq!(client.endpoint(LookupService::Age), "http://age");
        assert_eq!(client.endpoint(LookupService::Gender), "http://gender");
        assert_eq!(client.endpoint(LookupService::Nationality), "http://nationality");
    }

    #[test]
    fn test_decode_null_age_as_absent() {
        let estimate: AgeEstimate =
            serde_json::from_str(r#"{"count":0,"name":"Zyx","age":null}"#).unwrap();
        assert_eq!(estimate.age, None);
    }

    #[test]
    fn test_decode_nationality_keeps_upstream_order() {
        let estimate: NationalityEstimate = serde_json::from_str(concat!(
            r#"{"country":[{"country_id":"A","probability":0.4},"#,
            r#"{"country_id":"B","probability":0.6}]}"#,
        ))
        .unwrap();

        assert_eq!(estimate.top_country(), Some("A"));
    }

    #[test]
    fn test_top_country_empty() {
        let estimate: NationalityEstimate = serde_json::from_str(r#"{"country":[]}"#).unwrap();
        assert_eq!(estimate.top_country(), None);

        let missing: NationalityEstimate = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(missing.top_country(), None);
    }

    #[test]
    fn test_decode_wrong_type_fails() {
        let result = serde_json::from_str::<AgeEstimate>(r#"{"age":"thirty"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_error_reports_service() {
        let err = LookupError::Status {
            service: LookupService::Gender,
            status: 503,
            body: String::new(),
        };
        assert_eq!(err.service(), Some(LookupService::Gender));
        assert_eq!(err.to_string(), "gender lookup returned HTTP 503: ");
    }
}
