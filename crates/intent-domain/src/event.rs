// event.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Interacción registrada por el almacén externo (una fila de
/// `website_event`). Inmutable; sólo vive durante el lote en curso.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionEvent {
  pub url_path: String,
  pub event_name: String,
  pub created_at: DateTime<Utc>,
}

impl InteractionEvent {
  pub fn new(url_path: impl Into<String>, event_name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
    Self { url_path: url_path.into(), event_name: event_name.into(), created_at }
  }
}

/// Fila de `llm_enriched_config`. El documento se guarda sin interpretar;
/// la normalización ocurre en `FlowConfig::from_document`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRecord {
  pub session_id: String,
  pub event_name: String,
  pub created_at: DateTime<Utc>,
  pub enriched_config: serde_json::Value,
}
