//! Wire types for the osu! API v2 endpoints we use

use serde::{Deserialize, Serialize};

/// Body of `POST /oauth/token` for the client-credentials grant
#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub grant_type: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub scope: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Subset of `GET /beatmapsets/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct BeatmapsetResponse {
    pub artist: String,
    pub title: String,
}

/// `GET /users?ids[]=..`
#[derive(Debug, Deserialize)]
pub(crate) struct UsersResponse {
    #[serde(default)]
    pub users: Vec<UserCompact>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserCompact {
    pub id: i64,
    pub username: String,
}
