//! Async HTTP client wrapping the clinic JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clinic_core::{Params, analytics::Analytics, entity::EntityKind};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Async HTTP client for the clinic JSON API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  /// `POST /{kind}` with form-encoded parameters; returns the stored record.
  pub async fn create(&self, kind: EntityKind, params: &Params) -> Result<Value> {
    let path = format!("/{kind}");
    let resp = self
      .client
      .post(self.url(&path))
      .form(params)
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    decode(&path, resp).await
  }

  /// `GET /{kind}`
  pub async fn list(&self, kind: EntityKind) -> Result<Vec<Value>> {
    self.get_json(&format!("/{kind}")).await
  }

  /// `POST /doctor-patient`
  pub async fn link(&self, doctor_id: u64, patient_id: u64) -> Result<Value> {
    let resp = self
      .client
      .post(self.url("/doctor-patient"))
      .form(&[
        ("doctor_ID", doctor_id.to_string()),
        ("patient_ID", patient_id.to_string()),
      ])
      .send()
      .await
      .context("POST /doctor-patient failed")?;
    decode("/doctor-patient", resp).await
  }

  /// `GET /doctor-patient`
  pub async fn links(&self) -> Result<Value> { self.get_json("/doctor-patient").await }

  /// `GET /analytics`
  pub async fn analytics(&self) -> Result<Analytics> { self.get_json("/analytics").await }

  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let resp = self
      .client
      .get(self.url(path))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    decode(path, resp).await
  }
}

/// Turn a non-success response into an error carrying the server's message.
async fn decode<T: DeserializeOwned>(path: &str, resp: Response) -> Result<T> {
  let status = resp.status();
  if !status.is_success() {
    let message = resp
      .json::<Value>()
      .await
      .ok()
      .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned))
      .unwrap_or_else(|| status.to_string());
    return Err(anyhow!("{path} → {status}: {message}"));
  }
  resp
    .json()
    .await
    .with_context(|| format!("deserialising {path} response"))
}
