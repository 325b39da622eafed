// Archivo: surface.rs
// Propósito: máquina de estados por superficie de inyección del lado de
// presentación.
//
// Transiciones permitidas:
//   Hidden   -> Eligible   (el resolvedor la marca elegible)
//   Eligible -> Shown      (se entrega el contenido)
//   Hidden | Eligible | Dismissed -> Shown   (override forzado; otra
//                                            superficie mostrada pasa a Dismissed)
//   Shown    -> Dismissed  (acción explícita del usuario)
// No hay timeouts: una superficie mostrada sólo sale por `dismiss`.
use crate::errors::{FlowError, Result};
use crate::resolver::VisibilityDecision;
use intent_domain::{ComponentContent, SurfaceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceState {
    Hidden,
    Eligible,
    Shown,
    Dismissed,
}

/// Estado de una superficie y el contenido que está mostrando.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSlot {
    pub state: SurfaceState,
    /// Abierta por el canal de override y no por elegibilidad.
    pub forced: bool,
    pub content: Option<ComponentContent>,
}

impl Default for SurfaceSlot {
    fn default() -> Self {
        Self { state: SurfaceState::Hidden, forced: false, content: None }
    }
}

/// Tablero de superficies de una sesión de presentación.
///
/// Precedencia entre canales: una superficie forzada permanece abierta hasta
/// que el usuario la cierra, sin importar la elegibilidad por flags; mientras
/// haya una superficie mostrada, la decisión por flags no presenta otra.
#[derive(Debug, Clone, Default)]
pub struct SurfaceBoard {
    slots: BTreeMap<SurfaceId, SurfaceSlot>,
    forced: Option<SurfaceId>,
    error: Option<String>,
}

impl SurfaceBoard {
    pub fn new() -> Self {
        let slots = SurfaceId::PRIORITY.iter().map(|s| (*s, SurfaceSlot::default())).collect();
        Self { slots, forced: None, error: None }
    }

    pub fn state(&self, surface: SurfaceId) -> SurfaceState {
        self.slots.get(&surface).map(|s| s.state).unwrap_or(SurfaceState::Hidden)
    }

    pub fn slot(&self, surface: SurfaceId) -> Option<&SurfaceSlot> {
        self.slots.get(&surface)
    }

    /// Superficie forzada activa, si hay una.
    pub fn forced(&self) -> Option<SurfaceId> {
        self.forced
    }

    pub fn shown(&self) -> Vec<SurfaceId> {
        self.slots.iter().filter(|(_, s)| s.state == SurfaceState::Shown).map(|(id, _)| *id).collect()
    }

    fn slot_mut(&mut self, surface: SurfaceId) -> &mut SurfaceSlot {
        self.slots.entry(surface).or_default()
    }

    /// `Hidden -> Eligible` para cada superficie que la decisión marca como
    /// elegible. Devuelve las superficies que cambiaron.
    pub fn observe(&mut self, decision: &VisibilityDecision) -> Vec<SurfaceId> {
        let mut changed = Vec::new();
        for surface in SurfaceId::PRIORITY {
            if decision.is_eligible(surface) && self.state(surface) == SurfaceState::Hidden {
                self.slot_mut(surface).state = SurfaceState::Eligible;
                changed.push(surface);
            }
        }
        changed
    }

    /// `Eligible -> Shown` al entregar el contenido.
    pub fn deliver(&mut self, surface: SurfaceId, content: Option<ComponentContent>) -> Result<()> {
        let from = self.state(surface);
        if from != SurfaceState::Eligible {
            return Err(FlowError::InvalidTransition { surface, from, to: SurfaceState::Shown });
        }
        let slot = self.slot_mut(surface);
        slot.state = SurfaceState::Shown;
        slot.content = content;
        Ok(())
    }

    /// Observa la decisión y, si ninguna superficie está mostrada, entrega la
    /// superficie destino. Devuelve la superficie presentada.
    pub fn present(&mut self, decision: &VisibilityDecision) -> Option<SurfaceId> {
        self.observe(decision);
        if !self.shown().is_empty() {
            return None;
        }
        let target = decision.target.filter(|t| self.state(*t) == SurfaceState::Eligible)?;
        self.deliver(target, decision.content.clone()).ok()?;
        log::info!("surface {} shown from flag eligibility", target);
        Some(target)
    }

    /// Override: abre `surface` con `content` sin consultar la elegibilidad.
    /// Nunca quedan dos superficies mostradas: cualquier otra que estuviera
    /// en `Shown` (forzada o por elegibilidad) pasa a `Dismissed`, y sólo hay
    /// una superficie forzada a la vez.
    pub fn force_open(&mut self, surface: SurfaceId, content: ComponentContent) {
        for (id, slot) in self.slots.iter_mut().filter(|(id, _)| **id != surface) {
            slot.forced = false;
            if slot.state == SurfaceState::Shown {
                slot.state = SurfaceState::Dismissed;
                log::debug!("surface {} dismissed by override of {}", id, surface);
            }
        }
        let slot = self.slot_mut(surface);
        slot.state = SurfaceState::Shown;
        slot.forced = true;
        slot.content = Some(content);
        self.forced = Some(surface);
        log::info!("surface {} forced open by override channel", surface);
    }

    /// `Shown -> Dismissed` por acción del usuario.
    pub fn dismiss(&mut self, surface: SurfaceId) -> Result<()> {
        let from = self.state(surface);
        if from != SurfaceState::Shown {
            return Err(FlowError::InvalidTransition { surface, from, to: SurfaceState::Dismissed });
        }
        let slot = self.slot_mut(surface);
        slot.state = SurfaceState::Dismissed;
        slot.forced = false;
        if self.forced == Some(surface) {
            self.forced = None;
        }
        Ok(())
    }

    /// Indicador de error no bloqueante; no toca las superficies mostradas.
    pub fn report_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}
