// Archivo: resolver.rs
// Propósito: función pura (FlagSet, VisibilityMapping) -> decisión de
// visibilidad por superficie.
use intent_domain::{ComponentContent, FlagSet, SurfaceId, VisibilityMapping};
use serde::Serialize;
use std::collections::BTreeMap;

/// Decisión derivada: elegibilidad por superficie y, como mucho, una
/// superficie destino con su contenido.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityDecision {
    pub eligibility: BTreeMap<SurfaceId, bool>,
    pub target: Option<SurfaceId>,
    pub content: Option<ComponentContent>,
}

impl VisibilityDecision {
    pub fn is_eligible(&self, surface: SurfaceId) -> bool {
        self.eligibility.get(&surface).copied().unwrap_or(false)
    }
}

/// Una superficie es elegible cuando todos sus flags requeridos están en
/// `true`. Lista vacía o ausente: no elegible. El destino se elige por la
/// prioridad fija `SurfaceId::PRIORITY`.
pub fn resolve(flags: &FlagSet,
               mapping: &VisibilityMapping,
               content: &BTreeMap<SurfaceId, ComponentContent>)
               -> VisibilityDecision {
    let eligibility: BTreeMap<SurfaceId, bool> =
        SurfaceId::PRIORITY.iter().map(|s| (*s, flags.all_set(mapping.required(*s)))).collect();
    let target = SurfaceId::PRIORITY.iter().copied().find(|s| eligibility.get(s).copied().unwrap_or(false));
    let content = target.and_then(|s| content.get(&s).cloned());
    VisibilityDecision { eligibility, target, content }
}
