//! Async HTTP client for the identity provider's auth endpoints.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use terencio_core::identity::Identity;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
  /// The server rejected the credentials or the bearer token.
  #[error("not authenticated")]
  Unauthorized,

  #[error("{method} {path} → {status}")]
  Status {
    method: &'static str,
    path:   &'static str,
    status: StatusCode,
  },

  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Body of `POST /api/v1/auth/login`.
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
  username: &'a str,
  password: &'a str,
}

/// Reply to a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
  pub token:      String,
  #[serde(rename = "type", default)]
  pub token_type: Option<String>,
  pub username:   String,
  #[serde(default)]
  pub role:       Option<String>,
}

/// Client for the identity provider. Holds the bearer token after login.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
  token:    Option<String>,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
    Ok(Self { client, base_url: base_url.into(), token: None })
  }

  pub fn base_url(&self) -> &str { &self.base_url }

  pub fn is_logged_in(&self) -> bool { self.token.is_some() }

  fn url(&self, path: &str) -> String {
    format!("{}/api/v1{}", self.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  fn check(
    resp: reqwest::Response,
    method: &'static str,
    path: &'static str,
  ) -> Result<reqwest::Response> {
    match resp.status() {
      s if s.is_success() => Ok(resp),
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized),
      status => Err(ClientError::Status { method, path, status }),
    }
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /api/v1/auth/login`. Keeps the returned token for later calls.
  pub async fn login(&mut self, username: &str, password: &str) -> Result<LoginResponse> {
    let resp = self
      .client
      .post(self.url("/auth/login"))
      .json(&LoginRequest { username, password })
      .send()
      .await?;
    let login: LoginResponse = Self::check(resp, "POST", "/auth/login")?.json().await?;

    tracing::info!(
      user = %login.username,
      role = ?login.role,
      token_type = ?login.token_type,
      "logged in"
    );
    self.token = Some(login.token.clone());
    Ok(login)
  }

  /// `GET /api/v1/auth/me`: the user and the company/store tree they may
  /// access.
  pub async fn current_identity(&self) -> Result<Identity> {
    if self.token.is_none() {
      return Err(ClientError::Unauthorized);
    }
    let resp = self.auth(self.client.get(self.url("/auth/me"))).send().await?;
    Ok(Self::check(resp, "GET", "/auth/me")?.json().await?)
  }

  /// `POST /api/v1/auth/logout`. Best effort: the local token is dropped
  /// whatever the server says.
  pub async fn logout(&mut self) {
    if self.token.is_none() {
      return;
    }
    let result = match self.auth(self.client.post(self.url("/auth/logout"))).send().await {
      Ok(resp) => Self::check(resp, "POST", "/auth/logout").map(drop),
      Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
      tracing::warn!(error = %e, "server-side logout failed");
    }
    self.token = None;
  }
}
