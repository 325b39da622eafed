// Archivo: connectors.rs
// Propósito: conectores incrementales sobre `InteractionRepository`.
//
// Ambos conectores leen el cursor de su stream, piden al repositorio las
// filas posteriores y avanzan el cursor sólo si la lectura tuvo éxito. Un
// error deja el cursor intacto para reintentar la misma ventana en el
// siguiente tick (entrega al-menos-una-vez).
use crate::cursor::{CursorStore, Stream};
use crate::errors::Result;
use crate::repository::InteractionRepository;
use chrono::{DateTime, Utc};
use intent_domain::{DomainError, FlowConfig, InteractionEvent};
use std::sync::Arc;

/// Conector del stream de eventos de interacción.
pub struct EventConnector<R>
    where R: InteractionRepository
{
    repo: Arc<R>,
    cursors: Arc<CursorStore>,
}

impl<R> EventConnector<R> where R: InteractionRepository
{
    pub fn new(repo: Arc<R>, cursors: Arc<CursorStore>) -> Self {
        Self { repo, cursors }
    }

    /// Trae los eventos nuevos (ascendentes por `created_at`) y avanza el
    /// cursor al máximo observado, coincidan o no con algún paso.
    pub fn fetch(&self) -> Result<Vec<InteractionEvent>> {
        let baseline = self.cursors.get(Stream::Events);
        let mut events = self.repo.fetch_events_since(&baseline)?;
        events.retain(|e| e.created_at > baseline.timestamp());
        events.sort_by_key(|e| e.created_at);

        if let Some(last) = events.last() {
            let cursor = self.cursors.advance(Stream::Events, last.created_at);
            log::debug!("{} cursor advanced to {}", Stream::Events, cursor.timestamp());
        }
        Ok(events)
    }
}

/// Metadatos de la fila de configuración aplicada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOrigin {
    pub session_id: String,
    pub event_name: String,
    pub created_at: DateTime<Utc>,
}

/// Resultado de un refresco de configuración.
#[derive(Debug, Clone)]
pub enum ConfigPoll {
    /// No hubo filas nuevas.
    Unchanged,
    /// La fila más reciente del lote decodificó correctamente.
    Latest { origin: ConfigOrigin, config: FlowConfig, superseded: usize },
    /// La fila más reciente no se pudo decodificar; el estado previo se
    /// conserva. El cursor igualmente avanzó.
    Malformed { origin: ConfigOrigin, error: DomainError, superseded: usize },
}

/// Conector del stream de configuración (reemplazo por la más reciente).
pub struct ConfigConnector<R>
    where R: InteractionRepository
{
    repo: Arc<R>,
    cursors: Arc<CursorStore>,
}

impl<R> ConfigConnector<R> where R: InteractionRepository
{
    pub fn new(repo: Arc<R>, cursors: Arc<CursorStore>) -> Self {
        Self { repo, cursors }
    }

    /// Trae las filas nuevas y se queda sólo con la de mayor `created_at`;
    /// las anteriores del mismo lote se descartan sin efecto. El cursor
    /// avanza al máximo del lote para no volver a leer ninguna.
    pub fn refresh(&self) -> Result<ConfigPoll> {
        let baseline = self.cursors.get(Stream::Config);
        let mut rows = self.repo.fetch_configs_since(&baseline)?;
        rows.retain(|r| r.created_at > baseline.timestamp());
        rows.sort_by_key(|r| r.created_at);

        let Some(latest) = rows.pop() else {
            return Ok(ConfigPoll::Unchanged);
        };
        let superseded = rows.len();
        for skipped in &rows {
            log::debug!("config row from session {} at {} superseded by a newer row in the same batch",
                        skipped.session_id,
                        skipped.created_at);
        }
        self.cursors.advance(Stream::Config, latest.created_at);

        let origin = ConfigOrigin { session_id: latest.session_id.clone(),
                                    event_name: latest.event_name.clone(),
                                    created_at: latest.created_at };
        Ok(match FlowConfig::from_document(&latest.enriched_config) {
               Ok(config) => ConfigPoll::Latest { origin, config, superseded },
               Err(error) => ConfigPoll::Malformed { origin, error, superseded },
           })
    }
}
