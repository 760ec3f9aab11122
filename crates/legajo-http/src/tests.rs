//! Tests for `HttpBackend` against an in-process axum server.

use std::{collections::HashMap, time::Duration};

use axum::{
  Json, Router,
  extract::{Path, Query},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
  routing::{get, patch, post},
};
use legajo_core::{
  TransportError,
  backend::CaseBackend,
  vinculo::{NuevaPersona, VinculoCreate, VinculoFields},
};
use serde_json::{Value, json};

use crate::{HttpBackend, HttpConfig};

fn vinculo_json(id: i64, activo: bool, justificacion: Option<&str>) -> Value {
  json!({
    "id": id,
    "persona_origen": 1,
    "persona_destino": 20,
    "tipo_vinculo": { "id": 3, "nombre": "Madre" },
    "es_referente_principal": false,
    "activo": activo,
    "justificacion_desvincular": justificacion,
    "desvinculado_por": if activo { Value::Null } else { json!("operadora") },
  })
}

async fn list(Path(legajo): Path<i64>) -> Json<Value> {
  assert_eq!(legajo, 5);
  Json(json!([vinculo_json(1, true, None)]))
}

async fn create_existing(Json(body): Json<Value>) -> impl IntoResponse {
  if body["es_referente_principal"] == json!(true) {
    return (
      StatusCode::CONFLICT,
      Json(json!({ "detail": "referente principal en disputa" })),
    );
  }
  assert!(body.get("persona_destino").is_some());
  (StatusCode::CREATED, Json(vinculo_json(2, true, None)))
}

async fn create_new(Json(body): Json<Value>) -> impl IntoResponse {
  assert_eq!(body["persona_nueva"]["apellido"], json!("Sosa"));
  (StatusCode::CREATED, Json(vinculo_json(3, true, None)))
}

async fn update(
  Path((_, vinculo)): Path<(i64, i64)>,
  Json(body): Json<Value>,
) -> Json<Value> {
  assert!(body.get("destino_info").is_none());
  let mut v = vinculo_json(vinculo, true, None);
  v["conviviente"] = body["conviviente"].clone();
  Json(v)
}

async fn unlink(
  Path((_, vinculo)): Path<(i64, i64)>,
  Json(body): Json<Value>,
) -> Json<Value> {
  let text = body["justificacion"].as_str().unwrap_or_default().to_string();
  Json(vinculo_json(vinculo, false, Some(&text)))
}

async fn search(
  headers: HeaderMap,
  Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
  if headers.get("authorization").and_then(|h| h.to_str().ok())
    != Some("Bearer secreto")
  {
    return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "no" })));
  }
  let q = params.get("q").cloned().unwrap_or_default();
  (
    StatusCode::OK,
    Json(json!([
      { "id": 20, "nombre": q, "apellido": "Gómez", "dni": 20111222, "adulto": true }
    ])),
  )
}

async fn broken() -> impl IntoResponse {
  (StatusCode::BAD_GATEWAY, "upstream down")
}

async fn educacion_missing() -> impl IntoResponse {
  (StatusCode::NOT_FOUND, Json(json!({ "detail": "No encontrado." })))
}

async fn serve() -> String {
  let router = Router::new()
    .route(
      "/api/legajos/{legajo}/nnya/vinculos/",
      get(list).post(create_existing),
    )
    .route(
      "/api/legajos/{legajo}/nnya/vinculos/nueva-persona/",
      post(create_new),
    )
    .route("/api/legajos/{legajo}/nnya/vinculos/{vinculo}/", patch(update))
    .route(
      "/api/legajos/{legajo}/nnya/vinculos/{vinculo}/desvincular/",
      post(unlink),
    )
    .route("/api/personas/buscar/", get(search))
    .route("/api/persona/{id}/educacion/", get(educacion_missing))
    .route("/api/persona/{id}/vulnerabilidad/", get(broken));

  let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
    .await
    .expect("bind test listener");
  let addr = listener.local_addr().expect("local addr");
  tokio::spawn(async move {
    axum::serve(listener, router).await.expect("test server");
  });
  format!("http://{addr}/api/")
}

async fn backend() -> HttpBackend {
  HttpBackend::new(HttpConfig {
    base_url: serve().await,
    token:    Some("secreto".into()),
    timeout:  Duration::from_secs(5),
  })
  .expect("http backend")
}

#[tokio::test]
async fn lists_vinculos() {
  let b = backend().await;
  let links = b.list_vinculos(5).await.unwrap();
  assert_eq!(links.len(), 1);
  assert!(links[0].is_active());
  assert_eq!(links[0].tipo_vinculo.nombre, "Madre");
}

#[tokio::test]
async fn create_paths_use_distinct_endpoints() {
  let b = backend().await;
  let existing = VinculoCreate::Existente {
    persona_destino: 20,
    vinculo:         VinculoFields { tipo_vinculo: Some(3), ..Default::default() },
  };
  assert_eq!(b.create_vinculo(5, &existing).await.unwrap().id, 2);

  let nueva = VinculoCreate::Nueva {
    persona_nueva: NuevaPersona {
      nombre: "Luis".into(),
      apellido: "Sosa".into(),
      ..Default::default()
    },
    vinculo:       VinculoFields { tipo_vinculo: Some(3), ..Default::default() },
  };
  assert_eq!(b.create_vinculo(5, &nueva).await.unwrap().id, 3);
}

#[tokio::test]
async fn conflict_is_classified() {
  let b = backend().await;
  let payload = VinculoCreate::Existente {
    persona_destino: 20,
    vinculo:         VinculoFields {
      tipo_vinculo: Some(3),
      es_referente_principal: true,
      ..Default::default()
    },
  };
  let err = b.create_vinculo(5, &payload).await.unwrap_err();
  assert_eq!(
    err,
    TransportError::Conflict("referente principal en disputa".into())
  );
}

#[tokio::test]
async fn update_sends_mutable_fields() {
  let b = backend().await;
  let fields = VinculoFields {
    tipo_vinculo: Some(3),
    conviviente: true,
    ..Default::default()
  };
  let v = b.update_vinculo(5, 9, &fields).await.unwrap();
  assert_eq!(v.id, 9);
  assert!(v.conviviente);
}

#[tokio::test]
async fn unlink_posts_justification() {
  let b = backend().await;
  let v = b
    .desvincular(5, 1, "se mudó a otra provincia con su familia")
    .await
    .unwrap();
  assert!(!v.is_active());
  assert_eq!(
    v.justificacion_desvincular.as_deref(),
    Some("se mudó a otra provincia con su familia")
  );
}

#[tokio::test]
async fn search_sends_query_and_token() {
  let b = backend().await;
  let hits = b.search_personas("Marta").await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].display_name(), "Marta Gómez");
}

#[tokio::test]
async fn missing_satellite_is_not_found() {
  let b = backend().await;
  let err = b.get_educacion(10).await.unwrap_err();
  assert!(matches!(err, TransportError::NotFound(_)));
}

#[tokio::test]
async fn server_errors_are_transient() {
  let b = backend().await;
  let err = b.get_vulnerabilidad(10).await.unwrap_err();
  assert_eq!(err, TransportError::Rejected {
    status:  502,
    message: "upstream down".into(),
  });
  assert!(err.is_transient());
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
  let b = HttpBackend::new(HttpConfig {
    base_url: "http://127.0.0.1:9/api".into(),
    token:    None,
    timeout:  Duration::from_secs(2),
  })
  .unwrap();
  let err = b.get_localizacion(1).await.unwrap_err();
  assert!(matches!(err, TransportError::Network(_)));
}
