//! Worker de polling: lee eventos y configuración de Postgres, mantiene el
//! estado de flags y la elegibilidad de superficies.
//!
//! Variables de entorno: `DATABASE_URL` (obligatoria),
//! `WEBSITE_EVENT_POLL_INTERVAL_MS`, `INTENTFLOW_FLAGS`, `RUST_LOG`.
//!
//! Código de salida: 0 en apagado ordenado, 1 si falla el arranque o un tick
//! termina con un fallo no capturado.
use flow::engine::FlowEngine;
use flow::scheduler::{shutdown_channel, IntervalTicks, Scheduler, ShutdownHandle};
use intent_persistence::PgInteractionRepository;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // también recoge los registros de `log` de los crates del workspace
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_logging();

    let (config, repo) = match PgInteractionRepository::new_from_env() {
        Ok(pair) => pair,
        Err(e) => {
            log::error!("startup failed: {}", e);
            process::exit(1);
        }
    };
    log::info!("poll interval {:?}, {} flags tracked", config.scheduler.poll_interval, config.schema.len());

    let engine = Arc::new(FlowEngine::new(Arc::new(repo), config.engine_config()));
    if let Err(e) = engine.initialize_cursors() {
        log::error!("failed to initialize cursors: {}", e);
        process::exit(1);
    }

    let (shutdown, signal) = shutdown_channel();
    tokio::spawn(wait_for_signal(shutdown));

    let ticks = IntervalTicks::new(config.scheduler.poll_interval);
    let summary = Scheduler::new(engine, ticks, signal).run().await;
    process::exit(summary.exit.code());
}

/// Dispara el apagado con SIGINT o SIGTERM.
async fn wait_for_signal(shutdown: ShutdownHandle) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => log::info!("SIGINT received"),
                    _ = term.recv() => log::info!("SIGTERM received"),
                }
            }
            Err(e) => {
                log::warn!("cannot listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                log::info!("SIGINT received");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        log::info!("interrupt received");
    }
    shutdown.trigger();
}
