//! Reqwest implementation of the pets backend.

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::api::{ApiConfig, PetBackend};
use crate::errors::{Result, VitalsError};
use crate::types::{AccessorySlot, PetSnapshot};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePetRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EquipRequest<'a> {
    accessory_type: &'a str,
    // The backend expects an empty string to clear the slot.
    accessory_name: &'a str,
}

/// HTTP client for the pets REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    api_root: String,
}

impl HttpBackend {
    /// Create a new backend client. The bearer credential is attached to
    /// every request via default headers.
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", config.token))
                .map_err(|e| VitalsError::Configuration(format!("Invalid token format: {e}")))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .user_agent(format!("petvitals/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VitalsError::Transient(format!("Failed to create HTTP client: {e}")))?;

        info!("pets API client initialized for {}", config.base_url);

        Ok(Self {
            client,
            api_root: config.api_root(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_root)
    }

    /// Map a transport-level failure. Anything that never produced a
    /// status line is retryable by the background ticks.
    fn transport_error(err: reqwest::Error) -> VitalsError {
        if err.is_timeout() {
            VitalsError::Transient(format!("Request timed out: {err}"))
        } else {
            VitalsError::Transient(format!("Request failed: {err}"))
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "backend returned an error");
            return Err(VitalsError::from_status(status.as_u16(), message));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| VitalsError::Deserialization(e.to_string()))
    }
}

#[async_trait]
impl PetBackend for HttpBackend {
    async fn list_pets(&self) -> Result<Vec<PetSnapshot>> {
        let response = self
            .client
            .get(self.url("/pets"))
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::decode(response).await
    }

    async fn create_pet(&self, name: &str, color: Option<&str>) -> Result<PetSnapshot> {
        let response = self
            .client
            .post(self.url("/pets"))
            .json(&CreatePetRequest { name, color })
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::decode(response).await
    }

    async fn feed(&self, id: i64) -> Result<PetSnapshot> {
        let response = self
            .client
            .post(self.url(&format!("/pets/{id}/feed")))
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::decode(response).await
    }

    async fn cuddle(&self, id: i64) -> Result<PetSnapshot> {
        let response = self
            .client
            .post(self.url(&format!("/pets/{id}/cuddle")))
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::decode(response).await
    }

    async fn equip(
        &self,
        id: i64,
        slot: AccessorySlot,
        name: Option<&str>,
    ) -> Result<PetSnapshot> {
        let response = self
            .client
            .post(self.url(&format!("/pets/{id}/equip")))
            .json(&EquipRequest {
                accessory_type: slot.as_str(),
                accessory_name: name.unwrap_or(""),
            })
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::decode(response).await
    }

    async fn delete_pet(&self, id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/pets/{id}")))
            .send()
            .await
            .map_err(Self::transport_error)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(VitalsError::from_status(status.as_u16(), message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_api_root() {
        let config = ApiConfig {
            token: "secret".to_string(),
            ..ApiConfig::default()
        };
        let backend = HttpBackend::new(config).expect("valid config");
        assert_eq!(
            backend.url("/pets/3/feed"),
            "http://localhost:8080/api/pets/3/feed"
        );
    }

    #[test]
    fn test_rejects_empty_token() {
        let err = HttpBackend::new(ApiConfig::default()).expect_err("must reject");
        assert!(matches!(err, VitalsError::Configuration(_)));
    }

    #[test]
    fn test_equip_request_wire_shape() {
        let body = serde_json::to_value(EquipRequest {
            accessory_type: AccessorySlot::Hat.as_str(),
            accessory_name: "",
        })
        .expect("serializable");
        assert_eq!(body["accessoryType"], "hat");
        assert_eq!(body["accessoryName"], "");
    }
}
