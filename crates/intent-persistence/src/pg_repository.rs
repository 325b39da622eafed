use crate::config::WorkerConfig;
use crate::rows::{ConfigRow, EventRow};
use crate::schema::llm_enriched_config::dsl as cfg_dsl;
use crate::schema::website_event::dsl as ev_dsl;
use chrono::{DateTime, Utc};
use diesel::dsl::max;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use flow::cursor::Cursor;
use flow::errors::{FlowError, Result};
use flow::repository::InteractionRepository;
use intent_domain::{ConfigRecord, InteractionEvent};
use std::sync::{Mutex, MutexGuard};

/// Repositorio Postgres sobre una única conexión persistente compartida por
/// los dos conectores. `reconnect` la cierra y la vuelve a abrir; `close` la
/// suelta sin reabrir.
pub struct PgInteractionRepository {
  database_url: String,
  conn: Mutex<Option<PgConnection>>,
}

impl PgInteractionRepository {
  /// Abre la conexión de inmediato: un fallo aquí es fatal al arrancar.
  pub fn connect(database_url: &str) -> Result<Self> {
    let conn = establish(database_url)?;
    log::info!("connected to the interaction store");
    Ok(Self { database_url: database_url.to_string(), conn: Mutex::new(Some(conn)) })
  }

  /// Lee `WorkerConfig` del entorno y conecta.
  pub fn new_from_env() -> Result<(WorkerConfig, Self)> {
    let config = WorkerConfig::from_env()?;
    let repo = Self::connect(&config.database_url)?;
    Ok((config, repo))
  }

  fn lock(&self) -> MutexGuard<'_, Option<PgConnection>> {
    self.conn.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Ejecuta `op` sobre la conexión compartida. Sin conexión abierta (tras
  /// un `close` o un reconectar fallido) se intenta abrir una.
  fn with_conn<T, F>(&self, op: F) -> Result<T>
    where F: FnOnce(&mut PgConnection) -> QueryResult<T>
  {
    let mut guard = self.lock();
    if guard.is_none() {
      *guard = Some(establish(&self.database_url)?);
    }
    let Some(conn) = guard.as_mut() else {
      return Err(FlowError::Connection("connection unavailable".into()));
    };
    op(conn).map_err(map_db_err)
  }
}

fn establish(database_url: &str) -> Result<PgConnection> {
  PgConnection::establish(database_url).map_err(|e| FlowError::Connection(format!("connect: {}", e)))
}

// Cualquier fallo de consulta cuenta como error de conector: el llamador
// reconecta y reintenta la misma ventana en el siguiente tick.
fn map_db_err(e: DieselError) -> FlowError {
  FlowError::Connection(format!("db: {}", e))
}

impl InteractionRepository for PgInteractionRepository {
  fn fetch_events_since(&self, cursor: &Cursor) -> Result<Vec<InteractionEvent>> {
    let rows = self.with_conn(|conn| {
                     ev_dsl::website_event.filter(ev_dsl::created_at.gt(cursor.timestamp()))
                                          .order(ev_dsl::created_at.asc())
                                          .select((ev_dsl::url_path, ev_dsl::event_name, ev_dsl::created_at))
                                          .load::<EventRow>(conn)
                   })?;
    Ok(rows.into_iter().map(InteractionEvent::from).collect())
  }

  fn fetch_configs_since(&self, cursor: &Cursor) -> Result<Vec<ConfigRecord>> {
    let rows = self.with_conn(|conn| {
                     cfg_dsl::llm_enriched_config.filter(cfg_dsl::created_at.gt(cursor.timestamp()))
                                                 .order(cfg_dsl::created_at.asc())
                                                 .select((cfg_dsl::session_id,
                                                          cfg_dsl::event_name,
                                                          cfg_dsl::created_at,
                                                          cfg_dsl::enriched_config))
                                                 .load::<ConfigRow>(conn)
                   })?;
    Ok(rows.into_iter().map(ConfigRecord::from).collect())
  }

  fn latest_event_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
    self.with_conn(|conn| ev_dsl::website_event.select(max(ev_dsl::created_at)).get_result(conn))
  }

  fn latest_config_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
    self.with_conn(|conn| cfg_dsl::llm_enriched_config.select(max(cfg_dsl::created_at)).get_result(conn))
  }

  fn reconnect(&self) -> Result<()> {
    let mut guard = self.lock();
    // soltar la conexión vieja antes de abrir la nueva
    guard.take();
    *guard = Some(establish(&self.database_url)?);
    Ok(())
  }

  fn close(&self) -> Result<()> {
    if self.lock().take().is_some() {
      log::debug!("interaction store connection dropped");
    }
    Ok(())
  }
}
