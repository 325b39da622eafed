// Archivo: engine.rs
// Propósito: implementar el `FlowEngine`, que ejecuta un tick completo:
// refresco de configuración -> lectura de eventos -> comparación ->
// aplicación atómica de flags.
use crate::connectors::{ConfigConnector, ConfigPoll, EventConnector};
use crate::cursor::{CursorStore, Stream};
use crate::errors::{FlowError, Result};
use crate::matcher::FlowMatcher;
use crate::repository::InteractionRepository;
use crate::state::FlowStateStore;
use intent_domain::FlagSchema;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Configuración del motor.
#[derive(Debug, Clone, Default)]
pub struct FlowEngineConfig {
    /// Claves de flag reconocidas.
    pub schema: FlagSchema,
}

/// Qué pasó con la configuración durante un tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOutcome {
    Unchanged,
    Replaced { steps: usize, discarded: usize, superseded: usize },
    /// Documento malformado: se conservó el estado anterior.
    Rejected(String),
}

/// Resumen de un tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub config: ConfigOutcome,
    pub events_fetched: usize,
    pub flags_set: Vec<String>,
    /// Motivo si el tick terminó degradado por un error de conector.
    pub degraded: Option<String>,
}

impl TickReport {
    fn new(tick: u64) -> Self {
        Self { tick, config: ConfigOutcome::Unchanged, events_fetched: 0, flags_set: Vec::new(), degraded: None }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Motor de estado de flujos.
///
/// Dueño exclusivo de los cursores y del `FlowStateStore`. `tick` está
/// serializado internamente: dos ticks nunca se intercalan.
pub struct FlowEngine<R>
    where R: InteractionRepository
{
    repo: Arc<R>,
    cursors: Arc<CursorStore>,
    events: EventConnector<R>,
    configs: ConfigConnector<R>,
    matcher: FlowMatcher,
    store: Arc<FlowStateStore>,
    ticks: AtomicU64,
    tick_lock: Mutex<()>,
}

impl<R> FlowEngine<R> where R: InteractionRepository
{
    /// Crea el motor con cursores en el origen y un estado vacío.
    pub fn new(repo: Arc<R>, config: FlowEngineConfig) -> Self {
        let cursors = Arc::new(CursorStore::new());
        Self { events: EventConnector::new(repo.clone(), cursors.clone()),
               configs: ConfigConnector::new(repo.clone(), cursors.clone()),
               repo,
               cursors,
               matcher: FlowMatcher::new(),
               store: Arc::new(FlowStateStore::new(&config.schema)),
               ticks: AtomicU64::new(0),
               tick_lock: Mutex::new(()) }
    }

    pub fn store(&self) -> Arc<FlowStateStore> {
        self.store.clone()
    }

    pub fn cursors(&self) -> Arc<CursorStore> {
        self.cursors.clone()
    }

    /// Fija ambos cursores al `created_at` más reciente de cada relación para
    /// no reprocesar el histórico. Relación vacía: se queda en el origen.
    pub fn initialize_cursors(&self) -> Result<()> {
        match self.repo.latest_event_timestamp()? {
            Some(ts) => {
                self.cursors.advance(Stream::Events, ts);
                log::info!("initial {} cursor set to {}", Stream::Events, ts);
            }
            None => log::info!("no existing {} rows found", Stream::Events),
        }
        match self.repo.latest_config_timestamp()? {
            Some(ts) => {
                self.cursors.advance(Stream::Config, ts);
                log::info!("initial {} cursor set to {}", Stream::Config, ts);
            }
            None => log::info!("no existing {} rows found", Stream::Config),
        }
        Ok(())
    }

    /// Ejecuta un tick. Nunca falla: los errores de conector se registran,
    /// disparan la reconexión y dejan el resto del tick como no-op.
    pub fn tick(&self) -> TickReport {
        let _guard = self.tick_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut report = TickReport::new(self.ticks.fetch_add(1, Ordering::SeqCst) + 1);

        // 1. configuración antes que eventos
        match self.configs.refresh() {
            Ok(ConfigPoll::Unchanged) => {}
            Ok(ConfigPoll::Latest { origin, config, superseded }) => {
                let steps = config.steps.len();
                let discarded = config.discarded.len();
                log::info!("flow step cache refreshed for comparisons: total_steps={} discarded_steps={} \
                            discarded_sample={} sample_steps={} superseded_rows={}",
                           steps,
                           discarded,
                           sample(&config.discarded),
                           sample(&config.steps),
                           superseded);
                if discarded > 0 {
                    log::warn!("{} flow steps discarded (missing parentUIComp or flags)", discarded);
                }
                self.store.replace_config(config, Some(origin));
                report.config = ConfigOutcome::Replaced { steps, discarded, superseded };
            }
            Ok(ConfigPoll::Malformed { origin, error, .. }) => {
                let error = FlowError::from(error);
                log::error!("failed to parse enriched_config from session {} at {}: {}; keeping cached flow steps",
                            origin.session_id,
                            origin.created_at,
                            error);
                report.config = ConfigOutcome::Rejected(error.to_string());
            }
            Err(e) => return self.degrade(report, Stream::Config, e),
        }

        // 2. eventos nuevos
        let events = match self.events.fetch() {
            Ok(events) => events,
            Err(e) => return self.degrade(report, Stream::Events, e),
        };
        report.events_fetched = events.len();
        if events.is_empty() {
            return report;
        }

        // 3. comparación contra los pasos vigentes al inicio de este tick
        let snapshot = self.store.snapshot();
        if snapshot.config.steps().is_empty() {
            log::debug!("{} events consumed with no cached flow steps", events.len());
            return report;
        }
        let batch = self.matcher.match_batch(&events, snapshot.config.steps());

        // 4. una sola actualización atómica por tick
        if !batch.is_empty() {
            report.flags_set = self.store.apply_flags(&batch.flags).newly_set;
        }
        report
    }

    fn degrade(&self, mut report: TickReport, stream: Stream, error: FlowError) -> TickReport {
        log::error!("{} polling error: {}", stream, error);
        match self.repo.reconnect() {
            Ok(()) => log::info!("reconnected to the interaction store"),
            Err(e) => log::error!("reconnection attempt failed: {}", e),
        }
        report.degraded = Some(format!("{}: {}", stream, error));
        report
    }

    /// Cierra la conexión compartida.
    pub fn close(&self) -> Result<()> {
        self.repo.close()
    }
}

fn sample<T: serde::Serialize>(items: &[T]) -> String {
    serde_json::to_string(&items[..items.len().min(3)]).unwrap_or_default()
}
