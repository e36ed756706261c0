//! [`WriteParams`] — the named string parameters of a write request.
//!
//! Parameters are read from the query string and, for form-encoded or JSON
//! bodies, from the body as well. Body values win over query values of the
//! same name. A JSON body must be a flat object; numbers and booleans are
//! taken in their textual form and `null` as the empty string. Bodies of any
//! other content type are not read, so their fields count as missing.

use axum::{
  Form, Json,
  extract::{FromRequest, Query, Request},
  http::header,
};
use clinic_core::Params;
use serde_json::{Map, Value};

use crate::error::ApiError;

pub struct WriteParams(pub Params);

impl<S> FromRequest<S> for WriteParams
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let Query(mut params) = Query::<Params>::try_from_uri(req.uri())
      .map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let content_type = req
      .headers()
      .get(header::CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .unwrap_or_default()
      .to_owned();

    if content_type.starts_with("application/x-www-form-urlencoded") {
      let Form(body) = Form::<Params>::from_request(req, state)
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
      params.extend(body);
    } else if content_type.starts_with("application/json") {
      let Json(body) = Json::<Map<String, Value>>::from_request(req, state)
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
      for (name, value) in body {
        let text = scalar_text(&name, value)?;
        params.insert(name, text);
      }
    }

    Ok(Self(params))
  }
}

fn scalar_text(name: &str, value: Value) -> Result<String, ApiError> {
  match value {
    Value::String(s) => Ok(s),
    Value::Number(n) => Ok(n.to_string()),
    Value::Bool(b) => Ok(b.to_string()),
    Value::Null => Ok(String::new()),
    Value::Array(_) | Value::Object(_) => Err(ApiError::BadRequest(format!(
      "parameter {name:?} must be a string, number or boolean"
    ))),
  }
}
