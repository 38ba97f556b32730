//! HTTP client for the osu! API v2
//!
//! # Endpoints
//!
//! - POST `{token_url}`: client-credentials grant, returns a guest bearer token
//! - GET `{base_url}/beatmapsets/{id}`: beatmap set artist and title
//! - GET `{base_url}/users?ids[]=1&ids[]=2`: batched user lookup
//!
//! The client performs no pacing of its own; request spacing is owned by
//! the resolver.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};

use super::types::{BeatmapsetResponse, TokenRequest, TokenResponse, UsersResponse};
use super::Catalog;
use crate::config::{ApiConfig, ClientCredentials};
use crate::error::{Error, Result};
use crate::picks::{BeatmapId, BeatmapMetadata, PlayerId, PlayerInfo};

/// Authenticated osu! API v2 client
#[derive(Clone)]
pub struct OsuApiClient {
    client: Client,
    base_url: String,
    token_url: String,
    token: Option<String>,
}

impl OsuApiClient {
    /// Create a client without a bearer token
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
            token: None,
        })
    }

    /// Use an already obtained bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Whether a bearer token is attached to requests
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Obtain a guest token through the client-credentials grant and keep it
    pub async fn request_guest_token(&mut self, credentials: &ClientCredentials) -> Result<()> {
        let body = TokenRequest {
            grant_type: "client_credentials",
            client_id: &credentials.client_id,
            client_secret: &credentials.client_secret,
            scope: "public",
        };

        let response = self.client.post(&self.token_url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("invalid token response: {}", e)))?;
        if token.access_token.is_empty() {
            return Err(Error::Auth("token response had no access token".to_string()));
        }

        tracing::info!(
            "Obtained guest token (expires in {}s)",
            token.expires_in.unwrap_or_default()
        );
        self.token = Some(token.access_token);
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl Catalog for OsuApiClient {
    async fn beatmapset(&self, id: BeatmapId) -> Result<BeatmapMetadata> {
        let url = self.url(&format!("beatmapsets/{}", id));
        let response = self.authorized(self.client.get(&url)).send().await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                let body = body.trim();
                if body.is_empty() || body == "null" {
                    return Err(Error::NotFound(format!("beatmapset {}", id)));
                }

                let set: BeatmapsetResponse = serde_json::from_str(body).map_err(|e| {
                    Error::InvalidResponse(format!("beatmapset {}: {}", id, e))
                })?;
                Ok(BeatmapMetadata::new(set.artist, set.title))
            }
            StatusCode::NOT_FOUND => Err(Error::NotFound(format!("beatmapset {}", id))),
            status => Err(Error::Status {
                status: status.as_u16(),
                url,
            }),
        }
    }

    async fn users(&self, ids: &[PlayerId]) -> Result<Vec<PlayerInfo>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.url("users");
        let query: Vec<(&str, String)> = ids.iter().map(|id| ("ids[]", id.to_string())).collect();
        let response = self
            .authorized(self.client.get(&url).query(&query))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body: UsersResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("users: {}", e)))?;

        let mut by_id: HashMap<i64, String> = body
            .users
            .into_iter()
            .map(|user| (user.id, user.username))
            .collect();

        // Keep the caller's order
        Ok(ids
            .iter()
            .filter_map(|id| {
                by_id.remove(&id.0).map(|name| PlayerInfo { id: *id, name })
            })
            .collect())
    }
}
