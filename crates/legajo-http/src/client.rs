//! Async HTTP client wrapping the case-management JSON API.

use std::time::Duration;

use legajo_core::{
  TransportError,
  backend::{BackendResult, CaseBackend},
  localizacion::Localizacion,
  persona::PersonaCandidate,
  satellites::{
    CoberturaMedica, CondicionVulnerabilidad, DemandaFullDetail, Educacion,
  },
  vinculo::{PersonaVinculo, VinculoCreate, VinculoFields},
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;

use crate::Result;

/// Connection settings for the backend API.
#[derive(Debug, Clone)]
pub struct HttpConfig {
  /// API root, e.g. `https://runna.example.org/api`.
  pub base_url: String,
  /// Bearer token; requests are anonymous when `None`.
  pub token:    Option<String>,
  pub timeout:  Duration,
}

/// Async HTTP client for the case-management REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpBackend {
  client: Client,
  config: HttpConfig,
}

impl HttpBackend {
  pub fn new(config: HttpConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/{}",
      self.config.base_url.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.config.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
    let url = self.url(path);
    tracing::debug!(%url, "GET");
    let resp = self
      .auth(self.client.get(&url))
      .send()
      .await
      .map_err(network)?;
    decode(resp, path, false).await
  }

  async fn send_json<B, T>(
    &self,
    method: Method,
    path: &str,
    body: &B,
  ) -> BackendResult<T>
  where
    B: Serialize + ?Sized + Sync,
    T: DeserializeOwned,
  {
    let url = self.url(path);
    tracing::debug!(%url, %method, "sending");
    let resp = self
      .auth(self.client.request(method, &url))
      .json(body)
      .send()
      .await
      .map_err(network)?;
    decode(resp, path, true).await
  }
}

// ─── Response handling ───────────────────────────────────────────────────────

fn network(e: reqwest::Error) -> TransportError {
  TransportError::Network(e.to_string())
}

async fn decode<T: DeserializeOwned>(
  resp: Response,
  path: &str,
  mutation: bool,
) -> BackendResult<T> {
  let status = resp.status();
  if status.is_success() {
    return resp
      .json()
      .await
      .map_err(|e| TransportError::Decode(format!("{path}: {e}")));
  }
  let body = resp.text().await.unwrap_or_default();
  Err(classify(status, path, &body, mutation))
}

/// Map a failed response onto the transport taxonomy. Mutations refused for
/// business reasons become conflicts; everything else keeps its status.
fn classify(
  status: StatusCode,
  path: &str,
  body: &str,
  mutation: bool,
) -> TransportError {
  let message = error_message(body);
  match status {
    StatusCode::NOT_FOUND => TransportError::NotFound(path.to_string()),
    StatusCode::CONFLICT => TransportError::Conflict(message),
    StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY if mutation => {
      TransportError::Conflict(message)
    }
    other => TransportError::Rejected {
      status: other.as_u16(),
      message,
    },
  }
}

/// Pull a readable message out of an error body (`{"detail": ...}`,
/// `{"error": ...}`, or plain text).
fn error_message(body: &str) -> String {
  if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
    for key in ["detail", "error", "non_field_errors"] {
      match value.get(key) {
        Some(serde_json::Value::String(s)) => return s.clone(),
        Some(serde_json::Value::Array(items)) => {
          return items
            .iter()
            .filter_map(serde_json::Value::as_str)
            .collect::<Vec<_>>()
            .join("; ");
        }
        _ => {}
      }
    }
    return value.to_string();
  }
  body.chars().take(200).collect()
}

// ─── CaseBackend impl ────────────────────────────────────────────────────────

impl CaseBackend for HttpBackend {
  // ── Relationships ─────────────────────────────────────────────────────────

  /// `GET legajos/{id}/nnya/vinculos/`
  async fn list_vinculos(&self, legajo_id: i64) -> BackendResult<Vec<PersonaVinculo>> {
    self
      .get_json(&format!("legajos/{legajo_id}/nnya/vinculos/"))
      .await
  }

  /// `POST legajos/{id}/nnya/vinculos/` or
  /// `POST legajos/{id}/nnya/vinculos/nueva-persona/`
  async fn create_vinculo(
    &self,
    legajo_id: i64,
    payload: &VinculoCreate,
  ) -> BackendResult<PersonaVinculo> {
    let path = match payload {
      VinculoCreate::Existente { .. } => {
        format!("legajos/{legajo_id}/nnya/vinculos/")
      }
      VinculoCreate::Nueva { .. } => {
        format!("legajos/{legajo_id}/nnya/vinculos/nueva-persona/")
      }
    };
    self.send_json(Method::POST, &path, payload).await
  }

  /// `PATCH legajos/{id}/nnya/vinculos/{vinculo_id}/`
  async fn update_vinculo(
    &self,
    legajo_id: i64,
    vinculo_id: i64,
    fields: &VinculoFields,
  ) -> BackendResult<PersonaVinculo> {
    self
      .send_json(
        Method::PATCH,
        &format!("legajos/{legajo_id}/nnya/vinculos/{vinculo_id}/"),
        fields,
      )
      .await
  }

  /// `POST legajos/{id}/nnya/vinculos/{vinculo_id}/desvincular/`
  async fn desvincular(
    &self,
    legajo_id: i64,
    vinculo_id: i64,
    justificacion: &str,
  ) -> BackendResult<PersonaVinculo> {
    self
      .send_json(
        Method::POST,
        &format!("legajos/{legajo_id}/nnya/vinculos/{vinculo_id}/desvincular/"),
        &json!({ "justificacion": justificacion }),
      )
      .await
  }

  /// `GET personas/buscar/?q=<query>`
  async fn search_personas(&self, query: &str) -> BackendResult<Vec<PersonaCandidate>> {
    let path = "personas/buscar/";
    let url = self.url(path);
    tracing::debug!(%url, query, "GET");
    let resp = self
      .auth(self.client.get(&url))
      .query(&[("q", query)])
      .send()
      .await
      .map_err(network)?;
    decode(resp, path, false).await
  }

  // ── Person satellites ─────────────────────────────────────────────────────

  /// `GET localizacion-persona/{persona_id}/`
  async fn get_localizacion(&self, persona_id: i64) -> BackendResult<Localizacion> {
    self
      .get_json(&format!("localizacion-persona/{persona_id}/"))
      .await
  }

  /// `GET persona/{persona_id}/educacion/`
  async fn get_educacion(&self, persona_id: i64) -> BackendResult<Educacion> {
    self
      .get_json(&format!("persona/{persona_id}/educacion/"))
      .await
  }

  /// `GET persona/{persona_id}/cobertura-medica/`
  async fn get_cobertura_medica(
    &self,
    persona_id: i64,
  ) -> BackendResult<CoberturaMedica> {
    self
      .get_json(&format!("persona/{persona_id}/cobertura-medica/"))
      .await
  }

  /// `GET persona/{persona_id}/vulnerabilidad/`
  async fn get_vulnerabilidad(
    &self,
    persona_id: i64,
  ) -> BackendResult<Vec<CondicionVulnerabilidad>> {
    self
      .get_json(&format!("persona/{persona_id}/vulnerabilidad/"))
      .await
  }

  /// `GET registro-demanda-form/{demanda_id}/full-detail/`
  async fn get_demanda_full_detail(
    &self,
    demanda_id: i64,
  ) -> BackendResult<DemandaFullDetail> {
    self
      .get_json(&format!("registro-demanda-form/{demanda_id}/full-detail/"))
      .await
  }
}
