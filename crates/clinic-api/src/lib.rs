//! JSON HTTP API for the clinic record service.
//!
//! Exposes an axum [`Router`] backed by a [`Registry`] over any
//! [`clinic_core::KvStore`]. Tracing layers, TLS, and binding are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = clinic_api::api_router(Arc::new(Registry::new(store)));
//! ```

pub mod analytics;
pub mod error;
pub mod links;
pub mod params;
pub mod records;

use std::sync::Arc;

use axum::{Router, routing::get};
use clinic_core::{
  KvStore, Registry,
  entity::{CaseRecord, Facility, Individual, Practitioner},
};

pub use error::ApiError;

/// Build the API router for `registry`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(registry: Arc<Registry<S>>) -> Router<()>
where
  S: KvStore + 'static,
{
  Router::new()
    .route(
      "/hospital",
      get(records::list::<S, Facility>).post(records::create_facility::<S>),
    )
    .route(
      "/doctor",
      get(records::list::<S, Practitioner>).post(records::create_practitioner::<S>),
    )
    .route(
      "/patient",
      get(records::list::<S, Individual>).post(records::create_individual::<S>),
    )
    .route(
      "/diagnosis",
      get(records::list::<S, CaseRecord>).post(records::create_case_record::<S>),
    )
    .route("/doctor-patient", get(links::list::<S>).post(links::create::<S>))
    .route("/analytics", get(analytics::handler::<S>))
    .route("/health", get(health))
    .with_state(registry)
}

async fn health() -> &'static str { "ok" }

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use clinic_core::{MemoryStore, entity::EntityKind};
  use serde_json::Value;
  use tower::ServiceExt as _;

  async fn app() -> (Arc<MemoryStore>, Router) {
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(Registry::new(Arc::clone(&store)));
    registry.bootstrap().await.unwrap();
    (store, api_router(registry))
  }

  async fn post_form(app: &Router, uri: &str, body: &str) -> Response {
    let req = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
      .body(Body::from(body.to_string()))
      .unwrap();
    app.clone().oneshot(req).await.unwrap()
  }

  async fn get_uri(app: &Router, uri: &str) -> Response {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(req).await.unwrap()
  }

  async fn json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── Creates ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_hospital_returns_201_with_id() {
    let (_, app) = app().await;
    let resp = post_form(
      &app,
      "/hospital",
      "name=City+Hospital&address=Main+street&phone=123&beds_number=100",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = json(resp).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "City Hospital");
    assert_eq!(body["beds_number"], 100);
  }

  #[tokio::test]
  async fn query_string_parameters_are_accepted() {
    let (_, app) = app().await;
    let req = Request::builder()
      .method("POST")
      .uri("/doctor?surname=Smith&profession=surgeon")
      .body(Body::empty())
      .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(json(resp).await["hospital_ID"], Value::Null);
  }

  #[tokio::test]
  async fn json_body_is_accepted() {
    let (_, app) = app().await;
    let req = Request::builder()
      .method("POST")
      .uri("/patient")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(
        r#"{"surname":"Ivanov","born_date":"1980-04-12","sex":"M","mpn":"77"}"#,
      ))
      .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(json(resp).await["born_date"], "1980-04-12");
  }

  async fn post_json(app: &Router, uri: &str, body: &str) -> Response {
    let req = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    app.clone().oneshot(req).await.unwrap()
  }

  #[tokio::test]
  async fn json_scalars_are_taken_as_text() {
    let (_, app) = app().await;
    let resp = post_json(
      &app,
      "/hospital",
      r#"{"name":"City","address":"Main street","phone":null,"beds_number":100}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json(resp).await;
    assert_eq!(body["beds_number"], 100);
    assert_eq!(body["phone"], "");
  }

  #[tokio::test]
  async fn nested_json_values_are_rejected() {
    let (_, app) = app().await;
    let resp = post_json(
      &app,
      "/hospital",
      r#"{"name":"City","address":["Main","street"]}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("address"), "{body}");
  }

  #[tokio::test]
  async fn analytics_survives_partial_case_record() {
    let (store, app) = app().await;
    post_form(&app, "/patient", "surname=Ivanov&born_date=1980-04-12&sex=M&mpn=1").await;
    post_form(&app, "/diagnosis", "patient_ID=1&type=flu&information=").await;

    let registry = Registry::new(Arc::clone(&store));
    let id = registry.ids().allocate(EntityKind::CaseRecord).await.unwrap();
    let fields = [("patient_ID".to_owned(), "1".to_owned())].into_iter().collect();
    registry
      .repository()
      .put(EntityKind::CaseRecord, id, &fields)
      .await
      .unwrap();

    let resp = get_uri(&app, "/analytics").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await["avg_diagnoses_per_patient"], 2.0);

    let listed = json(get_uri(&app, "/diagnosis").await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn invalid_sex_is_400_naming_the_field() {
    let (_, app) = app().await;
    let resp = post_form(
      &app,
      "/patient",
      "surname=Ivanov&born_date=1980-04-12&sex=X&mpn=77",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("sex"), "{body}");
  }

  #[tokio::test]
  async fn dangling_reference_is_400() {
    let (_, app) = app().await;
    let resp = post_form(&app, "/diagnosis", "patient_ID=9&type=flu&information=").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("patient"), "{body}");
  }

  #[tokio::test]
  async fn store_outage_is_503() {
    let (store, app) = app().await;
    store.set_offline(true);
    let resp = get_uri(&app, "/analytics").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
  }

  // ── Listing ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_returns_records_in_id_order() {
    let (_, app) = app().await;
    for name in ["A", "B"] {
      post_form(&app, "/hospital", &format!("name={name}&address=x")).await;
    }
    let resp = get_uri(&app, "/hospital").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json(resp).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], 1);
    assert_eq!(rows[0]["name"], "A");
    assert_eq!(rows[1]["id"], 2);
  }

  // ── Links and analytics ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn link_and_analytics_flow() {
    let (_, app) = app().await;
    post_form(&app, "/doctor", "surname=Smith&profession=surgeon").await;
    post_form(&app, "/doctor", "surname=Jones&profession=therapist").await;
    for name in ["Ivanov", "Petrov"] {
      let resp = post_form(
        &app,
        "/patient",
        &format!("surname={name}&born_date=1980-04-12&sex=F&mpn=1"),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = post_form(&app, "/doctor-patient", "doctor_ID=1&patient_ID=1").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await["added"], true);
    let resp = post_form(&app, "/doctor-patient", "doctor_ID=1&patient_ID=2").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = post_form(&app, "/doctor-patient", "doctor_ID=1&patient_ID=2").await;
    assert_eq!(json(resp).await["added"], false);

    let links = json(get_uri(&app, "/doctor-patient").await).await;
    assert_eq!(links, serde_json::json!({ "1": [1, 2] }));

    for (patient, count) in [(1, 3), (2, 1)] {
      for _ in 0..count {
        let resp = post_form(
          &app,
          "/diagnosis",
          &format!("patient_ID={patient}&type=flu&information=rest"),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
      }
    }

    let stats = json(get_uri(&app, "/analytics").await).await;
    assert_eq!(stats["total_doctors"], 2);
    assert_eq!(stats["total_patients"], 2);
    assert_eq!(stats["total_diagnoses"], 4);
    assert_eq!(stats["avg_patients_per_doctor"], 1.0);
    assert_eq!(stats["avg_diagnoses_per_patient"], 2.0);
  }

  #[tokio::test]
  async fn link_to_unknown_doctor_is_400() {
    let (_, app) = app().await;
    let resp = post_form(&app, "/doctor-patient", "doctor_ID=1&patient_ID=1").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn health_is_ok() {
    let (_, app) = app().await;
    assert_eq!(get_uri(&app, "/health").await.status(), StatusCode::OK);
  }
}
