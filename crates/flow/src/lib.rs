//! Crate `flow`: motor de estado de flujos de intención.
//!
//! Lee de forma incremental los eventos de interacción y la configuración de
//! flujos de un almacén externo (`InteractionRepository`), compara cada lote
//! de eventos contra los pasos de flujo vigentes, aplica los flags
//! resultantes de forma monótona y deriva qué superficie de la interfaz
//! (`bottomCard` / `centeredModal`) es elegible.
//!
//! Diseño resumido:
//! - Cursores por stream (`CursorStore`) que sólo avanzan tras una lectura
//!   exitosa.
//! - Configuración por reemplazo: sólo la fila más reciente de cada lote se
//!   aplica; un documento malformado conserva el estado previo.
//! - Un único recurso mutable compartido (`FlowStateStore`) que publica
//!   snapshots inmutables por un canal `watch`.
//! - `Scheduler` con fuente de ticks inyectable y apagado explícito.
//!
//! Ejemplo rápido:
//! ```rust
//! use flow::stubs::InMemoryInteractionRepository;
//! use flow::engine::{FlowEngine, FlowEngineConfig};
//! use std::sync::Arc;
//! let repo = Arc::new(InMemoryInteractionRepository::new());
//! let engine = FlowEngine::new(repo, FlowEngineConfig::default());
//! let report = engine.tick();
//! assert!(!report.is_degraded());
//! ```
pub mod connectors;
pub mod cursor;
pub mod engine;
pub mod errors;
pub mod matcher;
pub mod repository;
pub mod resolver;
pub mod scheduler;
pub mod service;
pub mod state;
pub mod stubs;
pub mod surface;

pub use connectors::*;
pub use cursor::*;
pub use engine::*;
pub use errors::*;
pub use matcher::*;
pub use repository::*;
pub use resolver::*;
pub use scheduler::*;
pub use service::*;
pub use state::*;
pub use stubs::*;
pub use surface::*;
