//! Configuración del worker leída del entorno.
use flow::engine::FlowEngineConfig;
use flow::errors::{FlowError, Result};
use flow::scheduler::SchedulerConfig;
use intent_domain::FlagSchema;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const POLL_INTERVAL_VAR: &str = "WEBSITE_EVENT_POLL_INTERVAL_MS";
pub const FLAGS_VAR: &str = "INTENTFLOW_FLAGS";
/// Timeout de conexión (segundos) agregado a la URL si no trae uno.
pub const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Configuración del proceso worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
  /// URL de conexión, ya con `connect_timeout`.
  pub database_url: String,
  pub scheduler: SchedulerConfig,
  pub schema: FlagSchema,
}

impl WorkerConfig {
  /// Lee `.env` (si existe) y luego el entorno del proceso.
  pub fn from_env() -> Result<Self> {
    dotenvy::dotenv().ok();
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Construye la configuración a partir de una función de búsqueda de
  /// variables. `DATABASE_URL` ausente o vacía es un error fatal.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where F: Fn(&str) -> Option<String>
  {
    let url = lookup(DATABASE_URL_VAR).filter(|u| !u.trim().is_empty())
                                      .ok_or_else(|| FlowError::Configuration(format!("{} is not set", DATABASE_URL_VAR)))?;
    let scheduler = SchedulerConfig::from_raw_interval(lookup(POLL_INTERVAL_VAR).as_deref());
    let schema = match lookup(FLAGS_VAR) {
      Some(raw) => FlagSchema::parse_list(&raw).map_err(|e| FlowError::Configuration(format!("{}: {}", FLAGS_VAR, e)))?,
      None => FlagSchema::default(),
    };
    Ok(Self { database_url: with_connect_timeout(url.trim()), scheduler, schema })
  }

  pub fn engine_config(&self) -> FlowEngineConfig {
    FlowEngineConfig { schema: self.schema.clone() }
  }
}

/// Agrega `connect_timeout` a la cadena de conexión cuando no lo trae.
/// Acepta URLs (`postgres://…`) y cadenas clave=valor.
pub fn with_connect_timeout(url: &str) -> String {
  if url.contains("connect_timeout=") {
    return url.to_string();
  }
  let lower = url.to_lowercase();
  if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{}{}connect_timeout={}", url, sep, CONNECT_TIMEOUT_SECS)
  } else {
    format!("{} connect_timeout={}", url, CONNECT_TIMEOUT_SECS)
  }
}
