// Archivo: errors.rs
// Propósito: definir los errores del motor de estado de flujos y el alias
// Result<T> usado por las APIs del crate.
use intent_domain::{DomainError, SurfaceId};
use thiserror::Error;

use crate::surface::SurfaceState;

/// Errores comunes del motor.
///
/// - `Configuration`: falta configuración obligatoria al arrancar (fatal).
/// - `Connection`: pérdida transitoria de conectividad con el almacén.
/// - `Parse`: documento de configuración malformado.
/// - `InvalidTransition`: transición no permitida en una superficie.
#[derive(Error, Debug)]
pub enum FlowError {
  /// Configuración obligatoria ausente o inválida.
  #[error("Error de configuración: {0}")]
  Configuration(String),
  /// Error de conectividad; dispara reconexión.
  #[error("Error de conexión: {0}")]
  Connection(String),
  /// Documento no parseable; se conserva el estado anterior.
  #[error("Error de parseo: {0}")]
  Parse(#[from] DomainError),
  /// Transición de superficie no permitida.
  #[error("Transición inválida en {surface}: {from:?} -> {to:?}")]
  InvalidTransition { surface: SurfaceId, from: SurfaceState, to: SurfaceState },
}

impl FlowError {
  /// Verdadero para los errores que deben provocar reconexión.
  pub fn is_connection(&self) -> bool {
    matches!(self, FlowError::Connection(_))
  }
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, FlowError>;
