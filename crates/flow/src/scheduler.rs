// Archivo: scheduler.rs
// Propósito: bucle periódico que dirige los ticks del `FlowEngine`, con
// fuente de ticks inyectable y apagado explícito.
use crate::engine::FlowEngine;
use crate::repository::InteractionRepository;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};

/// Intervalo de sondeo por defecto (ms).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

/// Configuración del planificador.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub poll_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS) }
    }
}

impl SchedulerConfig {
    /// Interpreta el override del intervalo: entero positivo en ms. Ausente,
    /// no numérico o no positivo -> valor por defecto.
    pub fn from_raw_interval(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match raw.trim().parse::<i64>() {
            Ok(ms) if ms > 0 => Self { poll_interval: Duration::from_millis(ms as u64) },
            _ => {
                log::warn!("invalid poll interval '{}', falling back to {} ms", raw, DEFAULT_POLL_INTERVAL_MS);
                Self::default()
            }
        }
    }
}

/// Fuente de ticks. Permite sustituir el reloj real en pruebas.
#[async_trait]
pub trait TickSource: Send {
    /// Espera al siguiente tick. `false` si la fuente se agotó.
    async fn next_tick(&mut self) -> bool;
}

/// Ticks de un `tokio::time::Interval`. El primer tick es inmediato.
pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl TickSource for IntervalTicks {
    async fn next_tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Estado de salida registrado al terminar el bucle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Apagado ordenado (señal o fuente de ticks agotada).
    Graceful,
    /// Fallo no capturado dentro de un tick.
    Fault,
}

impl ExitStatus {
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Graceful => 0,
            ExitStatus::Fault => 1,
        }
    }
}

/// Resumen de una ejecución del planificador.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub degraded_ticks: u64,
    pub exit: ExitStatus,
}

/// Lado emisor del apagado. Clonable.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Lado receptor del apagado.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resuelve cuando se pide el apagado. Si todos los `ShutdownHandle` se
    /// soltaron sin disparar, no resuelve nunca.
    pub async fn wait(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Crea el par (handle, señal) de apagado.
pub fn shutdown_channel() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx: Arc::new(tx) }, ShutdownSignal { rx })
}

/// Planificador: un tick del motor por cada tick de la fuente.
///
/// El trabajo bloqueante del tick corre en `spawn_blocking`. Un tick en
/// curso siempre termina antes de atender el apagado. Un pánico dentro del
/// tick se trata como fallo no capturado y termina el bucle con
/// `ExitStatus::Fault`.
pub struct Scheduler<R, T>
    where R: InteractionRepository + 'static,
          T: TickSource
{
    engine: Arc<FlowEngine<R>>,
    ticks: T,
    shutdown: ShutdownSignal,
}

impl<R, T> Scheduler<R, T>
    where R: InteractionRepository + 'static,
          T: TickSource
{
    pub fn new(engine: Arc<FlowEngine<R>>, ticks: T, shutdown: ShutdownSignal) -> Self {
        Self { engine, ticks, shutdown }
    }

    pub async fn run(mut self) -> RunSummary {
        let mut summary = RunSummary { ticks: 0, degraded_ticks: 0, exit: ExitStatus::Graceful };
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.wait() => {
                    log::info!("shutdown requested, stopping poll loop");
                    break;
                }
                more = self.ticks.next_tick() => {
                    if !more {
                        log::info!("tick source exhausted, stopping poll loop");
                        break;
                    }
                    let engine = self.engine.clone();
                    match tokio::task::spawn_blocking(move || engine.tick()).await {
                        Ok(report) => {
                            summary.ticks += 1;
                            if report.is_degraded() {
                                summary.degraded_ticks += 1;
                            }
                            log::debug!("tick {} finished: {:?}", report.tick, report);
                        }
                        Err(e) => {
                            log::error!("uncaught fault during tick: {}", e);
                            summary.exit = ExitStatus::Fault;
                            break;
                        }
                    }
                }
            }
        }

        match self.engine.close() {
            Ok(()) => log::info!("interaction store connection closed"),
            Err(e) => log::error!("failed to close interaction store connection: {}", e),
        }
        log::info!("poll loop finished: ticks={} degraded={} exit={:?}",
                   summary.ticks,
                   summary.degraded_ticks,
                   summary.exit);
        summary
    }
}
