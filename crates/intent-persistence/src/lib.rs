//! Persistencia Postgres (Diesel) para el contrato `InteractionRepository`.
//!
//! Expone el esquema de las dos relaciones consultadas, el repositorio
//! `PgInteractionRepository` y la configuración del worker (`WorkerConfig`)
//! leída del entorno.

mod config;
mod pg_repository;
pub mod rows;
pub mod schema;

pub use config::{with_connect_timeout, WorkerConfig, CONNECT_TIMEOUT_SECS, DATABASE_URL_VAR, FLAGS_VAR, POLL_INTERVAL_VAR};
pub use pg_repository::PgInteractionRepository;
