// Archivo: stubs.rs
// Propósito: implementaciones en memoria para pruebas y wiring rápido.
//
// Incluye un repositorio de interacciones en memoria con fallos de conexión
// simulados, una fuente de ticks manual y un canal de override guionado.
// No son durables; se usan en pruebas y demos locales.
use crate::cursor::Cursor;
use crate::errors::{FlowError, Result};
use crate::repository::InteractionRepository;
use crate::scheduler::TickSource;
use crate::service::{OverrideChannel, OverrideRequest, OverrideResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use intent_domain::{ConfigRecord, InteractionEvent};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc;

/// Repositorio en memoria de eventos y configuraciones.
#[derive(Debug, Default)]
pub struct InMemoryInteractionRepository {
    events: Mutex<Vec<InteractionEvent>>,
    configs: Mutex<Vec<ConfigRecord>>,
    /// Lecturas que fallarán con `FlowError::Connection` antes de volver a
    /// responder.
    pending_failures: AtomicUsize,
    /// Como `pending_failures`, pero sólo para la lectura de eventos.
    pending_event_failures: AtomicUsize,
    reconnects: AtomicUsize,
    closed: AtomicBool,
}

impl InMemoryInteractionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_event(&self, event: InteractionEvent) {
        lock(&self.events).push(event);
    }

    pub fn push_config(&self, record: ConfigRecord) {
        lock(&self.configs).push(record);
    }

    /// Las próximas `n` lecturas fallan como si la conexión se hubiera caído.
    pub fn fail_next(&self, n: usize) {
        self.pending_failures.store(n, Ordering::SeqCst);
    }

    /// Las próximas `n` lecturas de eventos fallan; la configuración sigue
    /// respondiendo.
    pub fn fail_events_next(&self, n: usize) {
        self.pending_event_failures.store(n, Ordering::SeqCst);
    }

    pub fn reconnect_count(&self) -> usize {
        self.reconnects.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn check_connection(&self) -> Result<()> {
        if take_failure(&self.pending_failures) {
            return Err(FlowError::Connection("simulated connection loss".into()));
        }
        if self.is_closed() {
            return Err(FlowError::Connection("connection closed".into()));
        }
        Ok(())
    }
}

fn take_failure(pending: &AtomicUsize) -> bool {
    pending.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok()
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl InteractionRepository for InMemoryInteractionRepository {
    fn fetch_events_since(&self, cursor: &Cursor) -> Result<Vec<InteractionEvent>> {
        self.check_connection()?;
        if take_failure(&self.pending_event_failures) {
            return Err(FlowError::Connection("simulated connection loss while reading events".into()));
        }
        let mut rows: Vec<InteractionEvent> =
            lock(&self.events).iter().filter(|e| e.created_at > cursor.timestamp()).cloned().collect();
        rows.sort_by_key(|e| e.created_at);
        Ok(rows)
    }

    fn fetch_configs_since(&self, cursor: &Cursor) -> Result<Vec<ConfigRecord>> {
        self.check_connection()?;
        let mut rows: Vec<ConfigRecord> =
            lock(&self.configs).iter().filter(|c| c.created_at > cursor.timestamp()).cloned().collect();
        rows.sort_by_key(|c| c.created_at);
        Ok(rows)
    }

    fn latest_event_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
        self.check_connection()?;
        Ok(lock(&self.events).iter().map(|e| e.created_at).max())
    }

    fn latest_config_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
        self.check_connection()?;
        Ok(lock(&self.configs).iter().map(|c| c.created_at).max())
    }

    fn reconnect(&self) -> Result<()> {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        self.closed.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Fuente de ticks manejada a mano: cada `()` enviado es un tick; soltar el
/// emisor agota la fuente.
#[derive(Debug)]
pub struct ManualTicks {
    rx: mpsc::UnboundedReceiver<()>,
}

impl ManualTicks {
    pub fn channel() -> (mpsc::UnboundedSender<()>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

#[async_trait]
impl TickSource for ManualTicks {
    async fn next_tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

/// Canal de override con respuestas guionadas. Sin guion pendiente responde
/// vacío.
#[derive(Debug, Default)]
pub struct ScriptedOverrideChannel {
    script: Mutex<VecDeque<Result<OverrideResponse>>>,
    requests: Mutex<Vec<OverrideRequest>>,
}

impl ScriptedOverrideChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, response: OverrideResponse) {
        lock(&self.script).push_back(Ok(response));
    }

    pub fn fail(&self, message: &str) {
        lock(&self.script).push_back(Err(FlowError::Connection(message.to_string())));
    }

    /// Peticiones recibidas, en orden.
    pub fn requests(&self) -> Vec<OverrideRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl OverrideChannel for ScriptedOverrideChannel {
    async fn update(&self, request: &OverrideRequest) -> Result<OverrideResponse> {
        lock(&self.requests).push(request.clone());
        lock(&self.script).pop_front().unwrap_or_else(|| Ok(OverrideResponse::default()))
    }
}
