// Archivo: repository.rs
// Propósito: definir el contrato `InteractionRepository` que deben
// implementar los almacenes externos (Postgres, en memoria, etc.).
use crate::cursor::Cursor;
use crate::errors::Result;
use chrono::{DateTime, Utc};
use intent_domain::{ConfigRecord, InteractionEvent};

/// Contrato del almacén externo de interacciones y configuraciones.
///
/// Ambas relaciones son append-only y se consultan de forma ascendente por
/// `createdAt > cursor`. Las dos lecturas comparten una única conexión
/// persistente: un `FlowError::Connection` en cualquiera de ellas implica
/// que el llamador debe pedir `reconnect`.
pub trait InteractionRepository: Send + Sync {
    /// Eventos con `created_at > cursor`, ordenados ascendentemente.
    fn fetch_events_since(&self, cursor: &Cursor) -> Result<Vec<InteractionEvent>>;

    /// Filas de configuración con `created_at > cursor`, ordenadas
    /// ascendentemente.
    fn fetch_configs_since(&self, cursor: &Cursor) -> Result<Vec<ConfigRecord>>;

    /// `created_at` más reciente de la relación de eventos, si hay filas.
    fn latest_event_timestamp(&self) -> Result<Option<DateTime<Utc>>>;

    /// `created_at` más reciente de la relación de configuración.
    fn latest_config_timestamp(&self) -> Result<Option<DateTime<Utc>>>;

    /// Cierra y vuelve a abrir la conexión compartida.
    fn reconnect(&self) -> Result<()>;

    /// Cierra la conexión compartida (apagado).
    fn close(&self) -> Result<()>;
}
