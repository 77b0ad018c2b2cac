// API client module: a small blocking HTTP client for the Contabo compute
// API. One client instance covers the whole run: token exchange against the
// auth realm, instance lookup and the three snapshot operations.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Credentials;

const DEFAULT_AUTH_URL: &str = "https://auth.contabo.com";
const DEFAULT_API_URL: &str = "https://api.contabo.com";
const TOKEN_PATH: &str = "/auth/realms/contabo/protocol/openid-connect/token";

/// Page size requested from the paginated list endpoints.
const PAGE_SIZE: usize = 100;

/// Errors surfaced by the provider API. The HTTP variants carry the raw
/// response body so the operator sees exactly what the provider said.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("authentication failed ({status}): {body}")]
    Auth { status: StatusCode, body: String },

    #[error("listing failed ({status}): {body}")]
    Lookup { status: StatusCode, body: String },

    #[error("no instance named `{0}`")]
    InstanceNotFound(String),

    #[error("snapshot creation failed ({status}): {body}")]
    Create { status: StatusCode, body: String },

    #[error("snapshot deletion failed ({status}): {body}")]
    Delete { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A compute instance as returned by `GET /v1/compute/instances`. Fields the
/// tool does not use are left out; serde ignores them on deserialize.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub instance_id: i64,
    pub name: String,
}

/// A snapshot record. `created_date` stays the provider's display string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub snapshot_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_date: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Envelope for the list endpoints. `_pagination` is absent when the result
/// fits in one page.
#[derive(Debug, Deserialize)]
struct Paged<T> {
    data: Vec<T>,
    #[serde(rename = "_pagination")]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    current_page: usize,
    total_pages: usize,
}

/// Blocking client holding the auth and API base URLs. Base URLs carry no
/// trailing slash; paths below always start with one.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    auth_url: String,
    api_url: String,
}

impl ApiClient {
    /// Create a client for the given base URLs. Tests use this to point the
    /// client at a mock server.
    pub fn new(auth_url: impl Into<String>, api_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;
        Ok(ApiClient {
            client,
            auth_url: auth_url.into(),
            api_url: api_url.into(),
        })
    }

    /// Create a client configured from the environment variables
    /// `CONTABO_AUTH_URL` / `CONTABO_API_URL`, falling back to the public
    /// Contabo endpoints.
    pub fn from_env() -> Result<Self, ApiError> {
        let auth_url =
            std::env::var("CONTABO_AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.into());
        let api_url = std::env::var("CONTABO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        Self::new(auth_url, api_url)
    }

    /// Exchange credentials for a bearer token (OAuth2 password grant).
    /// Succeeds only on HTTP 200.
    pub fn fetch_token(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let url = format!("{}{}", self.auth_url, TOKEN_PATH);
        debug!(username = %credentials.username, "requesting access token");
        let res = self
            .client
            .post(&url)
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
                ("grant_type", "password"),
            ])
            .send()?;
        if res.status() != StatusCode::OK {
            return Err(ApiError::Auth {
                status: res.status(),
                body: body_text(res),
            });
        }
        let token: TokenResponse = res.json()?;
        Ok(token.access_token)
    }

    /// Resolve a hostname to its instance id by exact, case-sensitive name
    /// match. First match wins; later pages are only fetched while no match
    /// has been found.
    pub fn resolve_instance(&self, token: &str, hostname: &str) -> Result<i64, ApiError> {
        let mut page = 1;
        loop {
            let batch: Paged<Instance> = self.get_page(token, "/v1/compute/instances", page)?;
            if let Some(found) = batch.data.iter().find(|i| i.name == hostname) {
                info!(instance_id = found.instance_id, %hostname, "resolved instance");
                return Ok(found.instance_id);
            }
            match batch.pagination {
                Some(p) if p.current_page < p.total_pages => page += 1,
                _ => return Err(ApiError::InstanceNotFound(hostname.to_string())),
            }
        }
    }

    /// List all snapshots of an instance, aggregating every page. The
    /// provider's ordering within a page is preserved.
    pub fn list_snapshots(&self, token: &str, instance_id: i64) -> Result<Vec<Snapshot>, ApiError> {
        let path = format!("/v1/compute/instances/{instance_id}/snapshots");
        let mut snapshots = Vec::new();
        let mut page = 1;
        loop {
            let batch: Paged<Snapshot> = self.get_page(token, &path, page)?;
            snapshots.extend(batch.data);
            match batch.pagination {
                Some(p) if p.current_page < p.total_pages => page += 1,
                _ => {
                    debug!(count = snapshots.len(), instance_id, "listed snapshots");
                    return Ok(snapshots);
                }
            }
        }
    }

    /// Create a snapshot. The provider answers 201 on success; anything else
    /// is a failure with the raw body attached.
    pub fn create_snapshot(
        &self,
        token: &str,
        instance_id: i64,
        name: &str,
        description: &str,
    ) -> Result<(), ApiError> {
        let url = format!(
            "{}/v1/compute/instances/{instance_id}/snapshots",
            self.api_url
        );
        info!(instance_id, name, "creating snapshot");
        let res = self
            .request(Method::POST, &url, token)
            .form(&[("name", name), ("description", description)])
            .send()?;
        if res.status() != StatusCode::CREATED {
            return Err(ApiError::Create {
                status: res.status(),
                body: body_text(res),
            });
        }
        Ok(())
    }

    /// Delete a snapshot by id. The provider answers 204 on success.
    pub fn delete_snapshot(
        &self,
        token: &str,
        instance_id: i64,
        snapshot_id: &str,
    ) -> Result<(), ApiError> {
        let url = format!(
            "{}/v1/compute/instances/{instance_id}/snapshots/{snapshot_id}",
            self.api_url
        );
        info!(instance_id, snapshot_id, "deleting snapshot");
        let res = self.request(Method::DELETE, &url, token).send()?;
        if res.status() != StatusCode::NO_CONTENT {
            return Err(ApiError::Delete {
                status: res.status(),
                body: body_text(res),
            });
        }
        Ok(())
    }

    /// Fetch one page of a list endpoint. Non-200 maps to `Lookup`.
    fn get_page<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        page: usize,
    ) -> Result<Paged<T>, ApiError> {
        let url = format!("{}{}", self.api_url, path);
        let res = self
            .request(Method::GET, &url, token)
            .query(&[("page", page.to_string()), ("size", PAGE_SIZE.to_string())])
            .send()?;
        if res.status() != StatusCode::OK {
            return Err(ApiError::Lookup {
                status: res.status(),
                body: body_text(res),
            });
        }
        Ok(res.json()?)
    }

    /// Base request with bearer auth and fresh correlation headers. The ids
    /// must be unique per request so provider-side request traces line up.
    fn request(&self, method: Method, url: &str, token: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(token)
            .header("x-request-id", Uuid::new_v4().to_string())
            .header("x-trace-id", Uuid::new_v4().to_string())
    }
}

fn body_text(res: reqwest::blocking::Response) -> String {
    res.text().unwrap_or_else(|_| "".into())
}
