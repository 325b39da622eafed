// visibility.rs
use crate::{EventFlagMappingEntry, SurfaceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Superficie -> lista de flags requeridos (semántica AND). Se deriva y
/// se reemplaza completa con cada refresco de configuración.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityMapping {
  required: BTreeMap<SurfaceId, Vec<String>>,
}

impl VisibilityMapping {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, surface: SurfaceId, flags: &[&str]) -> Self {
    self.required.insert(surface, flags.iter().map(|f| f.to_string()).collect());
    self
  }

  pub fn insert(&mut self, surface: SurfaceId, flags: Vec<String>) {
    self.required.insert(surface, flags);
  }

  /// Flags requeridos por la superficie; vacío si no está configurada.
  pub fn required(&self, surface: SurfaceId) -> &[String] {
    self.required.get(&surface).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn iter(&self) -> impl Iterator<Item = (SurfaceId, &[String])> {
    self.required.iter().map(|(s, f)| (*s, f.as_slice()))
  }

  /// Verdadero si ninguna superficie tiene flags requeridos.
  pub fn is_empty(&self) -> bool {
    self.required.values().all(Vec::is_empty)
  }

  /// Regla de derivación:
  /// 1. agrupar las listas de `eventFlagMapping` por superficie destino,
  ///    concatenando en orden de aparición (se permiten duplicados);
  /// 2. si todos los grupos quedan vacíos, usar `injectionConfig` tal cual;
  /// 3. si no, el agrupado gana por completo (sin mezcla parcial).
  pub fn derive(entries: &[EventFlagMappingEntry], injection_config: &VisibilityMapping) -> Self {
    let mut grouped = VisibilityMapping::default();
    for entry in entries {
      match entry.surface {
        Some(surface) => grouped.required.entry(surface).or_default().extend(entry.flags.iter().cloned()),
        None => log::warn!("eventFlagMapping entry '{}' targets unknown surface '{}', ignored",
                           entry.key,
                           entry.component_content),
      }
    }
    if grouped.is_empty() {
      injection_config.clone()
    } else {
      grouped
    }
  }
}
