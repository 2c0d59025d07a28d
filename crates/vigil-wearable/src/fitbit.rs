//! OAuth token exchange and data proxy for the fitness provider.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/fitbit/token` | Body: `{"code":"..."}` |
//! | `GET`  | `/api/fitbit/data` | `?endpoint=activities/heart/date/today/1d.json&access_token=...` |
//! | `GET`  | `/api/test` | Which credentials are configured |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection},
  http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::{
  AppState,
  error::{Error, Result},
  monitor::sink::AlertSink,
  settings::WearableConfig,
};

// ─── Client ──────────────────────────────────────────────────────────────────

/// Thin client for the provider's token endpoint and user data API.
#[derive(Clone)]
pub struct FitbitClient {
  http:          reqwest::Client,
  client_id:     Option<String>,
  client_secret: Option<String>,
  redirect_uri:  Option<String>,
  token_url:     String,
  api_base:      String,
}

impl FitbitClient {
  pub fn new(config: &WearableConfig) -> Self {
    Self {
      http:          reqwest::Client::new(),
      client_id:     config.fitbit_client_id.clone(),
      client_secret: config.fitbit_client_secret.clone(),
      redirect_uri:  config.fitbit_redirect_uri.clone(),
      token_url:     config.fitbit_token_url.clone(),
      api_base:      config.fitbit_api_base.trim_end_matches('/').to_owned(),
    }
  }

  /// Exchange an authorization code for tokens. Returns the provider's JSON
  /// object untouched.
  pub async fn exchange_code(&self, code: &str) -> Result<Map<String, Value>> {
    let client_id = self.client_id.as_deref().ok_or(Error::NotConfigured("fitbit_client_id"))?;
    let secret = self
      .client_secret
      .as_deref()
      .ok_or(Error::NotConfigured("fitbit_client_secret"))?;
    let redirect_uri = self
      .redirect_uri
      .as_deref()
      .ok_or(Error::NotConfigured("fitbit_redirect_uri"))?;

    let resp = self
      .http
      .post(&self.token_url)
      .basic_auth(client_id, Some(secret))
      .form(&[
        ("client_id", client_id),
        ("grant_type", "authorization_code"),
        ("redirect_uri", redirect_uri),
        ("code", code),
      ])
      .send()
      .await?;

    let resp = check_status(resp).await?;
    tracing::info!("authorization code exchanged");
    Ok(resp.json().await?)
  }

  /// `GET <api_base>/1/user/-/<endpoint>` on behalf of the token holder.
  pub async fn fetch(&self, endpoint: &str, access_token: &str) -> Result<Value> {
    let url = format!("{}/1/user/-/{}", self.api_base, endpoint.trim_start_matches('/'));
    let resp = self.http.get(url).bearer_auth(access_token).send().await?;
    let resp = check_status(resp).await?;
    tracing::debug!(%endpoint, "provider data fetched");
    Ok(resp.json().await?)
  }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
  if resp.status().is_success() {
    return Ok(resp);
  }
  let status = StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
  let body = resp.json::<Value>().await.unwrap_or(Value::Null);
  Err(Error::Provider { status, body })
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
  pub code: Option<String>,
}

/// `POST /api/fitbit/token`
pub async fn token<K: AlertSink>(
  State(state): State<Arc<AppState<K>>>,
  body: std::result::Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<Value>> {
  let code = body
    .ok()
    .and_then(|Json(req)| req.code)
    .filter(|c| !c.trim().is_empty())
    .ok_or_else(|| Error::BadRequest("Authorization code is required".into()))?;

  let tokens = state.fitbit.exchange_code(code.trim()).await?;

  let mut reply = Map::new();
  reply.insert("success".into(), Value::Bool(true));
  reply.extend(tokens);
  Ok(Json(Value::Object(reply)))
}

#[derive(Debug, Deserialize)]
pub struct DataParams {
  pub endpoint:     Option<String>,
  pub access_token: Option<String>,
}

/// `GET /api/fitbit/data`
pub async fn data<K: AlertSink>(
  State(state): State<Arc<AppState<K>>>,
  Query(params): Query<DataParams>,
) -> Result<Json<Value>> {
  let access_token = params
    .access_token
    .filter(|t| !t.is_empty())
    .ok_or_else(|| Error::Unauthorized("Access token is required".into()))?;
  let endpoint = params
    .endpoint
    .filter(|e| !e.is_empty())
    .ok_or_else(|| Error::BadRequest("Endpoint is required".into()))?;

  let data = state.fitbit.fetch(&endpoint, &access_token).await?;
  Ok(Json(json!({ "success": true, "data": data })))
}

/// `GET /api/test`
pub async fn test<K: AlertSink>(State(state): State<Arc<AppState<K>>>) -> Json<Value> {
  let cfg = &state.config;
  Json(json!({
    "success": true,
    "message": "Backend server is running correctly",
    "environment": {
      "clientIdSet": cfg.fitbit_client_id.is_some(),
      "clientSecretSet": cfg.fitbit_client_secret.is_some(),
      "redirectUriSet": cfg.fitbit_redirect_uri.is_some(),
    },
  }))
}
