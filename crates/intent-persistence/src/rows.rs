//! Filas Diesel y su conversión a los tipos del dominio.
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use intent_domain::{ConfigRecord, InteractionEvent};

/// Proyección de `website_event` usada por el conector.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct EventRow {
  pub url_path: String,
  pub event_name: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl From<EventRow> for InteractionEvent {
  /// `event_name` NULL se consume como nombre vacío: avanza el cursor y
  /// nunca coincide con un paso.
  fn from(row: EventRow) -> Self {
    InteractionEvent::new(row.url_path, row.event_name.unwrap_or_default(), row.created_at)
  }
}

#[derive(Debug, Clone, PartialEq, Queryable)]
pub struct ConfigRow {
  pub session_id: String,
  pub event_name: String,
  pub created_at: DateTime<Utc>,
  pub enriched_config: serde_json::Value,
}

impl From<ConfigRow> for ConfigRecord {
  fn from(row: ConfigRow) -> Self {
    ConfigRecord { session_id: row.session_id,
                   event_name: row.event_name,
                   created_at: row.created_at,
                   enriched_config: row.enriched_config }
  }
}
